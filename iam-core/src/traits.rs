//! Core trait definitions
//!
//! Persistence and crypto are capabilities handed to the services; the
//! services never reach for a concrete backend themselves.

use crate::error::IamResult;
use crate::types::*;
use async_trait::async_trait;

/// Persistent user records
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. A taken username is a `Conflict`.
    async fn insert_user(&self, user: NewUser) -> IamResult<User>;

    async fn user_by_id(&self, id: UserId) -> IamResult<Option<User>>;

    /// Look a user up by name. The hash is only loaded when `with_secret` is set.
    async fn user_by_username(&self, username: &str, with_secret: bool)
        -> IamResult<Option<User>>;

    async fn list_users(&self) -> IamResult<Vec<User>>;

    /// Returns `false` when no row matched
    async fn delete_user(&self, id: UserId) -> IamResult<bool>;
}

/// Persistent permission records
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Insert a new permission. A taken name is a `Conflict`.
    async fn insert_permission(&self, permission: NewPermission) -> IamResult<Permission>;

    async fn permission_by_id(&self, id: PermissionId) -> IamResult<Option<Permission>>;

    async fn permission_by_name(&self, name: &str) -> IamResult<Option<Permission>>;

    async fn list_permissions(&self) -> IamResult<Vec<Permission>>;

    /// Rewrite name and description of an editable permission.
    ///
    /// Fails with `NotEditable` when the row is missing or protected.
    async fn update_permission(
        &self,
        id: PermissionId,
        name: &str,
        description: &str,
    ) -> IamResult<Permission>;

    /// Remove a deletable permission. Fails with `NotDeletable` otherwise.
    async fn delete_permission(&self, id: PermissionId) -> IamResult<()>;
}

/// Persistent user-permission assignments
#[async_trait]
pub trait GrantStore: Send + Sync {
    /// Record an assignment. A duplicate pair is a `Conflict`.
    async fn insert_grant(&self, user_id: UserId, permission_id: PermissionId)
        -> IamResult<Grant>;

    async fn grant_for(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
    ) -> IamResult<Option<Grant>>;

    /// Returns `false` when no row matched
    async fn delete_grant(&self, id: GrantId) -> IamResult<bool>;

    /// Assignments of a user whose permission still exists
    async fn grants_for_user(&self, user_id: UserId) -> IamResult<Vec<Grant>>;

    /// Whether the user holds a live permission with this exact name
    async fn holds_permission(&self, user_id: UserId, permission_name: &str) -> IamResult<bool>;
}

/// One-way password hashing
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> IamResult<String>;

    /// Malformed stored hashes verify as `false`
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Issues and verifies signed access tokens carrying a user id
pub trait TokenCodec: Send + Sync {
    fn issue(&self, user_id: UserId) -> IamResult<String>;

    /// Any signature, algorithm or shape failure is `InvalidToken`
    fn verify(&self, token: &str) -> IamResult<UserId>;
}
