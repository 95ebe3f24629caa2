//! Shared fixtures for service tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use iam_core::{
    CredentialHasher, IamResult, NewUser, Permission, User, UserId, UserStore,
};

use crate::{Authorizer, GrantLedger, MemoryStore, PermissionRegistry, UserDirectory};

/// Reversible stand-in for a real password hash
pub struct PlainHasher;

impl CredentialHasher for PlainHasher {
    fn hash(&self, password: &str) -> IamResult<String> {
        Ok(format!("plain${}", password))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        hash.strip_prefix("plain$") == Some(password)
    }
}

/// User store that only records that it was called
#[derive(Default)]
pub struct CountingUserStore {
    calls: AtomicUsize,
}

impl CountingUserStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserStore for CountingUserStore {
    async fn insert_user(&self, user: NewUser) -> IamResult<User> {
        self.hit();
        Ok(User {
            id: UserId(1),
            username: user.username,
            password_hash: Some(user.password_hash),
            created_at: chrono::Utc::now(),
        })
    }

    async fn user_by_id(&self, _id: UserId) -> IamResult<Option<User>> {
        self.hit();
        Ok(None)
    }

    async fn user_by_username(&self, _username: &str, _with_secret: bool) -> IamResult<Option<User>> {
        self.hit();
        Ok(None)
    }

    async fn list_users(&self) -> IamResult<Vec<User>> {
        self.hit();
        Ok(Vec::new())
    }

    async fn delete_user(&self, _id: UserId) -> IamResult<bool> {
        self.hit();
        Ok(false)
    }
}

/// All services wired to one in-memory store
pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub directory: UserDirectory,
    pub registry: PermissionRegistry,
    pub ledger: GrantLedger,
    pub authorizer: Authorizer,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            directory: UserDirectory::new(store.clone(), Arc::new(PlainHasher)),
            registry: PermissionRegistry::new(store.clone()),
            ledger: GrantLedger::new(store.clone()),
            authorizer: Authorizer::new(store.clone()),
            store,
        }
    }

    pub async fn user(&self, username: &str) -> User {
        self.directory.create(username, "secret").await.unwrap()
    }

    pub async fn permission(&self, name: &str) -> Permission {
        self.registry.create(name, "a description").await.unwrap()
    }
}
