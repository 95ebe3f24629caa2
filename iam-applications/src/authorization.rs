//! Authorization check
//!
//! Every protected request re-reads the persisted grants. Nothing is cached,
//! so a revocation is visible to the very next request.

use std::sync::Arc;

use iam_core::{GrantStore, IamError, IamResult};
use tracing::{debug, warn};

use crate::principal::Principal;

#[derive(Clone)]
pub struct Authorizer {
    grants: Arc<dyn GrantStore>,
}

impl Authorizer {
    pub fn new(grants: Arc<dyn GrantStore>) -> Self {
        Self { grants }
    }

    /// Allow when the principal holds a grant on a permission named `permission`.
    ///
    /// Hands back the principal that passed the check.
    pub async fn verify_permission(
        &self,
        principal: Option<&Principal>,
        permission: &str,
    ) -> IamResult<Principal> {
        let Some(principal) = principal else {
            warn!(permission, "Permission check without an authenticated identity");
            return Err(IamError::Forbidden {
                permission: permission.to_string(),
            });
        };

        if self
            .grants
            .holds_permission(principal.user_id, permission)
            .await?
        {
            debug!(user_id = %principal.user_id, permission, "Permission granted");
            Ok(*principal)
        } else {
            warn!(user_id = %principal.user_id, permission, "Permission denied");
            Err(IamError::Forbidden {
                permission: permission.to_string(),
            })
        }
    }
}
