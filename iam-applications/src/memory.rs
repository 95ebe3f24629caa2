//! In-memory store for development and tests
//!
//! Mirrors the SQL backend: ids are monotonic and never reused, names are
//! unique, protection flags are enforced on write and grant reads join to
//! live users and permissions.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use iam_core::{
    Grant, GrantId, GrantStore, IamError, IamResult, NewPermission, NewUser,
    Permission, PermissionId, PermissionStore, User, UserId, UserStore,
};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy)]
struct GrantRow {
    id: GrantId,
    user_id: UserId,
    permission_id: PermissionId,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    permissions: BTreeMap<PermissionId, Permission>,
    grants: BTreeMap<GrantId, GrantRow>,
    next_user: i64,
    next_permission: i64,
    next_grant: i64,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    /// Grants of deleted users or deleted permissions are invisible
    fn join(&self, row: &GrantRow) -> Option<Grant> {
        if !self.users.contains_key(&row.user_id) {
            return None;
        }
        self.permissions.get(&row.permission_id).map(|permission| Grant {
            id: row.id,
            user_id: row.user_id,
            permission_id: row.permission_id,
            permission_name: permission.name.clone(),
        })
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> IamResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(IamError::conflict(format!(
                "The username {} is already taken",
                user.username
            )));
        }

        let id = UserId(Tables::next_id(&mut tables.next_user));
        let record = User {
            id,
            username: user.username,
            password_hash: Some(user.password_hash),
            created_at: Utc::now(),
        };
        tables.users.insert(id, record.clone());
        Ok(record.without_secret())
    }

    async fn user_by_id(&self, id: UserId) -> IamResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned().map(User::without_secret))
    }

    async fn user_by_username(
        &self,
        username: &str,
        with_secret: bool,
    ) -> IamResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
            .map(|u| if with_secret { u } else { u.without_secret() }))
    }

    async fn list_users(&self) -> IamResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .cloned()
            .map(User::without_secret)
            .collect())
    }

    async fn delete_user(&self, id: UserId) -> IamResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.remove(&id).is_some())
    }
}

#[async_trait]
impl PermissionStore for MemoryStore {
    async fn insert_permission(&self, permission: NewPermission) -> IamResult<Permission> {
        let mut tables = self.tables.write().await;
        if tables
            .permissions
            .values()
            .any(|p| p.name == permission.name)
        {
            return Err(IamError::conflict(format!(
                "A permission named {} already exists",
                permission.name
            )));
        }

        let id = PermissionId(Tables::next_id(&mut tables.next_permission));
        let now = Utc::now();
        let record = Permission {
            id,
            name: permission.name,
            description: permission.description,
            deletable: permission.deletable,
            editable: permission.editable,
            created_at: now,
            updated_at: now,
        };
        tables.permissions.insert(id, record.clone());
        Ok(record)
    }

    async fn permission_by_id(&self, id: PermissionId) -> IamResult<Option<Permission>> {
        Ok(self.tables.read().await.permissions.get(&id).cloned())
    }

    async fn permission_by_name(&self, name: &str) -> IamResult<Option<Permission>> {
        let tables = self.tables.read().await;
        Ok(tables.permissions.values().find(|p| p.name == name).cloned())
    }

    async fn list_permissions(&self) -> IamResult<Vec<Permission>> {
        Ok(self.tables.read().await.permissions.values().cloned().collect())
    }

    async fn update_permission(
        &self,
        id: PermissionId,
        name: &str,
        description: &str,
    ) -> IamResult<Permission> {
        let mut tables = self.tables.write().await;
        if tables
            .permissions
            .values()
            .any(|p| p.id != id && p.name == name)
        {
            return Err(IamError::conflict(format!(
                "A permission named {} already exists",
                name
            )));
        }

        let record = tables
            .permissions
            .get_mut(&id)
            .filter(|p| p.editable)
            .ok_or(IamError::NotEditable)?;
        record.name = name.to_string();
        record.description = description.to_string();
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn delete_permission(&self, id: PermissionId) -> IamResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.permissions.get(&id).is_some_and(|p| p.deletable) {
            return Err(IamError::NotDeletable);
        }

        tables.permissions.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl GrantStore for MemoryStore {
    async fn insert_grant(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
    ) -> IamResult<Grant> {
        let mut tables = self.tables.write().await;
        if tables
            .grants
            .values()
            .any(|g| g.user_id == user_id && g.permission_id == permission_id)
        {
            return Err(IamError::conflict("The user already has this permission"));
        }

        let row = GrantRow {
            id: GrantId(Tables::next_id(&mut tables.next_grant)),
            user_id,
            permission_id,
        };
        let grant = tables.join(&row).ok_or(IamError::NotFound {
            resource: "permission",
        })?;
        tables.grants.insert(row.id, row);
        Ok(grant)
    }

    async fn grant_for(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
    ) -> IamResult<Option<Grant>> {
        let tables = self.tables.read().await;
        Ok(tables
            .grants
            .values()
            .find(|g| g.user_id == user_id && g.permission_id == permission_id)
            .and_then(|row| tables.join(row)))
    }

    async fn delete_grant(&self, id: GrantId) -> IamResult<bool> {
        Ok(self.tables.write().await.grants.remove(&id).is_some())
    }

    async fn grants_for_user(&self, user_id: UserId) -> IamResult<Vec<Grant>> {
        let tables = self.tables.read().await;
        Ok(tables
            .grants
            .values()
            .filter(|g| g.user_id == user_id)
            .filter_map(|row| tables.join(row))
            .collect())
    }

    async fn holds_permission(&self, user_id: UserId, permission_name: &str) -> IamResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .grants
            .values()
            .filter(|g| g.user_id == user_id)
            .filter_map(|row| tables.join(row))
            .any(|g| g.permission_name == permission_name))
    }
}
