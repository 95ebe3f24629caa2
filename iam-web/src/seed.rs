//! Initial data: protected system permissions and the superadmin

use iam_core::{
    system_permissions, CredentialHasher, GrantStore, IamResult, NewPermission, NewUser,
    PermissionStore, SeedConfig, User, UserStore,
};
use tracing::info;

/// Make sure every system permission, the superadmin and its grants exist.
///
/// Safe to run on every start; existing rows are left untouched, including a
/// superadmin whose password was changed.
pub async fn seed_system<S>(
    store: &S,
    hasher: &dyn CredentialHasher,
    seed: &SeedConfig,
) -> IamResult<User>
where
    S: UserStore + PermissionStore + GrantStore + ?Sized,
{
    let mut permissions = Vec::with_capacity(system_permissions::ALL.len());
    for (name, description) in system_permissions::ALL {
        let permission = match store.permission_by_name(name).await? {
            Some(existing) => existing,
            None => {
                info!(name, "Seeding system permission");
                store
                    .insert_permission(NewPermission::protected(*name, *description))
                    .await?
            }
        };
        permissions.push(permission);
    }

    let superadmin = match store
        .user_by_username(&seed.superadmin_username, false)
        .await?
    {
        Some(existing) => existing,
        None => {
            info!(username = %seed.superadmin_username, "Seeding superadmin");
            store
                .insert_user(NewUser {
                    username: seed.superadmin_username.clone(),
                    password_hash: hasher.hash(&seed.superadmin_password)?,
                })
                .await?
                .without_secret()
        }
    };

    for permission in &permissions {
        if store
            .grant_for(superadmin.id, permission.id)
            .await?
            .is_none()
        {
            store.insert_grant(superadmin.id, permission.id).await?;
        }
    }

    Ok(superadmin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Argon2Hasher;
    use crate::database::SqliteStore;
    use iam_applications::MemoryStore;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        let seed = SeedConfig::default();

        let first = seed_system(&store, &Argon2Hasher, &seed).await.unwrap();
        let second = seed_system(&store, &Argon2Hasher, &seed).await.unwrap();
        assert_eq!(first.id, second.id);

        let permissions = store.list_permissions().await.unwrap();
        assert_eq!(permissions.len(), system_permissions::ALL.len());
        assert!(permissions.iter().all(|p| !p.deletable && !p.editable));

        let grants = store.grants_for_user(first.id).await.unwrap();
        assert_eq!(grants.len(), system_permissions::ALL.len());
    }

    #[tokio::test]
    async fn test_superadmin_holds_every_system_permission() {
        let store = MemoryStore::new();
        let superadmin = seed_system(&store, &Argon2Hasher, &SeedConfig::default())
            .await
            .unwrap();

        for (name, _) in system_permissions::ALL {
            assert!(store.holds_permission(superadmin.id, name).await.unwrap());
        }
    }
}
