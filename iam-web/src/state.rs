//! Application state shared by every handler

use crate::{
    auth::{Argon2Hasher, JwtCodec},
    database::SqliteStore,
    seed::seed_system,
    WebResult,
};
use iam_applications::{Authorizer, GrantLedger, MemoryStore, PermissionRegistry, UserDirectory};
use iam_core::{
    CredentialHasher, GrantStore, IamConfig, PermissionStore, TokenCodec, UserStore,
};
use std::sync::Arc;
use tracing::info;

/// Selects the in-process store instead of SQLite
pub const MEMORY_DATABASE: &str = "memory";

/// Services wired to one store; cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<IamConfig>,
    pub directory: UserDirectory,
    pub registry: PermissionRegistry,
    pub ledger: GrantLedger,
    pub authorizer: Authorizer,
    pub tokens: Arc<dyn TokenCodec>,
}

impl AppState {
    /// Connect the configured store, create the schema and seed system data
    pub async fn new(config: IamConfig) -> WebResult<Self> {
        if config.database.url == MEMORY_DATABASE {
            info!("Using in-memory store");
            Self::with_store(config, Arc::new(MemoryStore::new())).await
        } else {
            let store = SqliteStore::connect(&config.database.url).await?;
            Self::with_store(config, Arc::new(store)).await
        }
    }

    /// Build state over any store, seeding it first
    pub async fn with_store<S>(config: IamConfig, store: Arc<S>) -> WebResult<Self>
    where
        S: UserStore + PermissionStore + GrantStore + 'static,
    {
        let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2Hasher);
        let superadmin = seed_system(store.as_ref(), hasher.as_ref(), &config.seed).await?;
        info!(user_id = %superadmin.id, "System permissions seeded");

        let tokens: Arc<dyn TokenCodec> = Arc::new(JwtCodec::new(config.auth.jwt_secret.as_bytes()));

        Ok(Self {
            directory: UserDirectory::new(store.clone(), hasher),
            registry: PermissionRegistry::new(store.clone()),
            ledger: GrantLedger::new(store.clone()),
            authorizer: Authorizer::new(store),
            tokens,
            config: Arc::new(config),
        })
    }
}
