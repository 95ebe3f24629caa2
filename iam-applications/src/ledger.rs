//! Grant ledger: user to permission assignments

use std::sync::Arc;

use iam_core::{Grant, GrantId, GrantStore, IamError, IamResult, PermissionId, UserId};
use tracing::info;

const GRANT: &str = "permission assignment";

#[derive(Clone)]
pub struct GrantLedger {
    grants: Arc<dyn GrantStore>,
}

impl GrantLedger {
    pub fn new(grants: Arc<dyn GrantStore>) -> Self {
        Self { grants }
    }

    /// Assign a permission. Both ends must already be resolved by the caller.
    pub async fn grant(&self, user_id: UserId, permission_id: PermissionId) -> IamResult<Grant> {
        match self.get_grant(user_id, permission_id).await {
            Ok(_) => return Err(IamError::conflict("The user already has this permission")),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let grant = self.grants.insert_grant(user_id, permission_id).await?;
        info!(
            grant_id = %grant.id,
            user_id = %user_id,
            permission = %grant.permission_name,
            "Permission granted"
        );
        Ok(grant)
    }

    pub async fn get_grant(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
    ) -> IamResult<Grant> {
        self.grants
            .grant_for(user_id, permission_id)
            .await?
            .ok_or(IamError::NotFound { resource: GRANT })
    }

    /// Delete by the grant's own id. Resolve it first with [`Self::get_grant`].
    pub async fn revoke(&self, grant_id: GrantId) -> IamResult<()> {
        if !self.grants.delete_grant(grant_id).await? {
            return Err(IamError::NotFound { resource: GRANT });
        }
        info!(grant_id = %grant_id, "Permission revoked");
        Ok(())
    }

    pub async fn list_by_user(&self, user_id: UserId) -> IamResult<Vec<Grant>> {
        self.grants.grants_for_user(user_id).await
    }
}
