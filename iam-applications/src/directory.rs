//! User directory: user CRUD and credential verification

use std::sync::Arc;

use iam_core::validation::{validate_password, validate_username};
use iam_core::{
    CredentialHasher, IamError, IamResult, NewUser, User, UserId, UserLookup, UserStore,
};
use tracing::{debug, info};

const USER: &str = "user";

#[derive(Clone)]
pub struct UserDirectory {
    users: Arc<dyn UserStore>,
    hasher: Arc<dyn CredentialHasher>,
}

impl UserDirectory {
    pub fn new(users: Arc<dyn UserStore>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { users, hasher }
    }

    /// Register a new user. The returned record never carries the hash.
    pub async fn create(&self, username: &str, password: &str) -> IamResult<User> {
        validate_username(username)?;

        match self.get_by_username(username, false).await {
            Ok(_) => {
                return Err(IamError::conflict(format!(
                    "The username {} is already taken",
                    username
                )))
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        validate_password(password)?;
        let password_hash = self.hasher.hash(password)?;

        let user = self
            .users
            .insert_user(NewUser {
                username: username.to_string(),
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "User created");
        Ok(user.without_secret())
    }

    pub async fn get_by_id(&self, id: UserId) -> IamResult<User> {
        debug!(user_id = %id, "Looking up user by id");
        self.users
            .user_by_id(id)
            .await?
            .map(User::without_secret)
            .ok_or(IamError::NotFound { resource: USER })
    }

    /// Only login should ask for the secret
    pub async fn get_by_username(&self, username: &str, with_secret: bool) -> IamResult<User> {
        debug!(username, with_secret, "Looking up user by username");
        let user = self
            .users
            .user_by_username(username, with_secret)
            .await?
            .ok_or(IamError::NotFound { resource: USER })?;

        Ok(if with_secret {
            user
        } else {
            user.without_secret()
        })
    }

    /// Resolve a `{find}` path segment
    pub async fn find(&self, lookup: &UserLookup) -> IamResult<User> {
        match lookup {
            UserLookup::Id(id) => self.get_by_id(*id).await,
            UserLookup::Username(username) => self.get_by_username(username, false).await,
        }
    }

    /// Hard delete. Self-protection is the caller's job.
    pub async fn delete(&self, id: UserId) -> IamResult<()> {
        if !self.users.delete_user(id).await? {
            return Err(IamError::NotFound { resource: USER });
        }
        info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// An empty directory is `Ok(vec![])`, not an error
    pub async fn list_all(&self) -> IamResult<Vec<User>> {
        Ok(self
            .users
            .list_users()
            .await?
            .into_iter()
            .map(User::without_secret)
            .collect())
    }

    /// Check a username/password pair.
    ///
    /// Unknown users and wrong passwords fail identically.
    pub async fn authenticate(&self, username: &str, password: &str) -> IamResult<User> {
        if username.is_empty() {
            return Err(IamError::validation("username", "The username is required"));
        }
        if password.is_empty() {
            return Err(IamError::validation("password", "The password is required"));
        }

        let user = match self.get_by_username(username, true).await {
            Ok(user) => user,
            Err(e) if e.is_not_found() => return Err(IamError::InvalidCredentials),
            Err(e) => return Err(e),
        };

        let matches = user
            .password_hash
            .as_deref()
            .is_some_and(|hash| self.hasher.verify(password, hash));

        if !matches {
            debug!(username, "Credential mismatch");
            return Err(IamError::InvalidCredentials);
        }

        Ok(user.without_secret())
    }
}
