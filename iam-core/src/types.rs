//! Core data types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

numeric_id!(
    /// System-assigned, monotonic user identifier
    UserId
);
numeric_id!(
    /// Permission identifier
    PermissionId
);
numeric_id!(
    /// Identifier of a single user-permission assignment
    GrantId
);

/// A user identity.
///
/// `password_hash` is only populated by lookups that explicitly ask for the
/// secret (login); it is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip)]
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Drop the stored secret so the record is safe to echo back
    pub fn without_secret(mut self) -> Self {
        self.password_hash = None;
        self
    }
}

/// Data required to persist a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}

/// A named permission with its mutation-protection flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: PermissionId,
    pub name: String,
    pub description: String,
    pub deletable: bool,
    pub editable: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Permission {
    /// Whether the permission is immune to at least one kind of mutation
    pub fn is_protected(&self) -> bool {
        !self.deletable || !self.editable
    }
}

/// Data required to persist a new permission
#[derive(Debug, Clone)]
pub struct NewPermission {
    pub name: String,
    pub description: String,
    pub deletable: bool,
    pub editable: bool,
}

impl NewPermission {
    /// A permission created through the API: always mutable
    pub fn mutable(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            deletable: true,
            editable: true,
        }
    }

    /// A protected system permission
    pub fn protected(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            deletable: false,
            editable: false,
        }
    }
}

/// A persisted fact that a user holds a permission.
///
/// `permission_name` is denormalized from the permission registry for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub id: GrantId,
    pub user_id: UserId,
    pub permission_id: PermissionId,
    pub permission_name: String,
}

/// How a `{find}` path segment identifies a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    Id(UserId),
    Username(String),
}

impl UserLookup {
    /// Numeric segments are ids; anything else is a username
    pub fn parse(segment: &str) -> Self {
        match segment.parse::<i64>() {
            Ok(id) => Self::Id(UserId(id)),
            Err(_) => Self::Username(segment.to_string()),
        }
    }
}

impl std::fmt::Display for UserLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserLookup::Id(id) => write!(f, "{}", id),
            UserLookup::Username(username) => f.write_str(username),
        }
    }
}

/// Names of the permissions guarding the mutating endpoints
pub mod system_permissions {
    pub const CREATE_PERMISSION: &str = "create_permission";
    pub const UPDATE_PERMISSION: &str = "update_permission";
    pub const DELETE_PERMISSION: &str = "delete_permission";
    pub const CREATE_USER: &str = "create_user";
    pub const DELETE_USER: &str = "delete_user";
    pub const GRANT_PERMISSION: &str = "grant_permission";
    pub const REVOKE_PERMISSION: &str = "revoke_permission";

    /// Seeded permissions with their descriptions
    pub const ALL: &[(&str, &str)] = &[
        (CREATE_PERMISSION, "Allows creating new permissions"),
        (UPDATE_PERMISSION, "Allows editing existing permissions"),
        (DELETE_PERMISSION, "Allows deleting existing permissions"),
        (CREATE_USER, "Allows creating users on behalf of others"),
        (DELETE_USER, "Allows deleting users"),
        (GRANT_PERMISSION, "Allows granting permissions to users"),
        (REVOKE_PERMISSION, "Allows revoking permissions from users"),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_lookup_prefers_numeric_id() {
        assert_eq!(UserLookup::parse("42"), UserLookup::Id(UserId(42)));
        assert_eq!(
            UserLookup::parse("meli"),
            UserLookup::Username("meli".to_string())
        );
        assert_eq!(
            UserLookup::parse("12ab"),
            UserLookup::Username("12ab".to_string())
        );
    }

    #[test]
    fn test_user_never_serializes_password_hash() {
        let user = User {
            id: UserId(1),
            username: "superadmin".to_string(),
            password_hash: Some("$argon2id$secret".to_string()),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["username"], "superadmin");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_system_permission_descriptions_fit_bounds() {
        for (name, description) in system_permissions::ALL {
            assert!(crate::validation::validate_permission_name(name).is_ok());
            assert!(crate::validation::validate_permission_description(description).is_ok());
        }
    }
}
