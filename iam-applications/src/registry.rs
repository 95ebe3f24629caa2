//! Permission registry: named permissions and their protection flags

use std::sync::Arc;

use iam_core::validation::{validate_permission_description, validate_permission_name};
use iam_core::{IamError, IamResult, NewPermission, Permission, PermissionId, PermissionStore};
use tracing::{debug, info, warn};

const PERMISSION: &str = "permission";

#[derive(Clone)]
pub struct PermissionRegistry {
    permissions: Arc<dyn PermissionStore>,
}

impl PermissionRegistry {
    pub fn new(permissions: Arc<dyn PermissionStore>) -> Self {
        Self { permissions }
    }

    /// Create a permission. API-created permissions are always mutable.
    pub async fn create(&self, name: &str, description: &str) -> IamResult<Permission> {
        validate_permission_name(name)?;
        validate_permission_description(description)?;
        self.ensure_name_free(name, None).await?;

        let permission = self
            .permissions
            .insert_permission(NewPermission::mutable(name, description))
            .await?;

        info!(permission_id = %permission.id, name = %permission.name, "Permission created");
        Ok(permission)
    }

    /// Partial update: empty fields keep their current value.
    pub async fn update(
        &self,
        id: PermissionId,
        name: &str,
        description: &str,
    ) -> IamResult<Permission> {
        let existing = self.get_by_id(id).await?;
        if !existing.editable {
            warn!(permission_id = %id, "Update of a protected permission rejected");
            return Err(IamError::NotEditable);
        }

        let name = if name.is_empty() {
            existing.name.as_str()
        } else {
            name
        };
        let description = if description.is_empty() {
            existing.description.as_str()
        } else {
            description
        };

        if name != existing.name {
            validate_permission_name(name)?;
            self.ensure_name_free(name, Some(id)).await?;
        }
        if description != existing.description {
            validate_permission_description(description)?;
        }

        let updated = self
            .permissions
            .update_permission(id, name, description)
            .await?;

        info!(permission_id = %id, name = %updated.name, "Permission updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: PermissionId) -> IamResult<()> {
        let existing = self.get_by_id(id).await?;
        if !existing.deletable {
            warn!(permission_id = %id, "Delete of a protected permission rejected");
            return Err(IamError::NotDeletable);
        }

        self.permissions.delete_permission(id).await?;
        info!(permission_id = %id, name = %existing.name, "Permission deleted");
        Ok(())
    }

    pub async fn get_by_id(&self, id: PermissionId) -> IamResult<Permission> {
        debug!(permission_id = %id, "Looking up permission by id");
        self.permissions
            .permission_by_id(id)
            .await?
            .ok_or(IamError::NotFound {
                resource: PERMISSION,
            })
    }

    pub async fn get_by_name(&self, name: &str) -> IamResult<Permission> {
        debug!(name, "Looking up permission by name");
        self.permissions
            .permission_by_name(name)
            .await?
            .ok_or(IamError::NotFound {
                resource: PERMISSION,
            })
    }

    pub async fn list_all(&self) -> IamResult<Vec<Permission>> {
        self.permissions.list_permissions().await
    }

    async fn ensure_name_free(&self, name: &str, except: Option<PermissionId>) -> IamResult<()> {
        match self.get_by_name(name).await {
            Ok(other) if Some(other.id) != except => Err(IamError::conflict(format!(
                "A permission named {} already exists",
                name
            ))),
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }
}
