//! Input shape and length rules for usernames, passwords and permissions

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{IamError, IamResult};

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_]*$").expect("identifier pattern is a valid regex")
});

pub const USERNAME_LENGTH: (usize, usize) = (4, 10);
pub const PASSWORD_LENGTH: (usize, usize) = (4, 15);
pub const PERMISSION_NAME_LENGTH: (usize, usize) = (4, 25);
pub const PERMISSION_DESCRIPTION_LENGTH: (usize, usize) = (10, 150);

fn within(value: &str, (min, max): (usize, usize)) -> bool {
    let len = value.chars().count();
    len >= min && len <= max
}

/// Shared rule for identifier-like fields: present, `[a-zA-Z0-9_]` only, bounded
fn validate_identifier(
    field: &'static str,
    label: &str,
    value: &str,
    bounds: (usize, usize),
) -> IamResult<()> {
    if value.is_empty() {
        return Err(IamError::validation(field, format!("The {} is required", label)));
    }

    if !IDENTIFIER.is_match(value) {
        return Err(IamError::validation(
            field,
            format!("The {} cannot contain spaces or special characters", label),
        ));
    }

    if !within(value, bounds) {
        return Err(IamError::validation(
            field,
            format!(
                "The {} must be between {} and {} characters",
                label, bounds.0, bounds.1
            ),
        ));
    }

    Ok(())
}

pub fn validate_username(username: &str) -> IamResult<()> {
    validate_identifier("username", "username", username, USERNAME_LENGTH)
}

pub fn validate_password(password: &str) -> IamResult<()> {
    validate_identifier("password", "password", password, PASSWORD_LENGTH)
}

pub fn validate_permission_name(name: &str) -> IamResult<()> {
    validate_identifier("name", "permission name", name, PERMISSION_NAME_LENGTH)
}

/// Descriptions are free text; only presence and length are checked
pub fn validate_permission_description(description: &str) -> IamResult<()> {
    if description.is_empty() {
        return Err(IamError::validation(
            "description",
            "The permission description is required",
        ));
    }

    if !within(description, PERMISSION_DESCRIPTION_LENGTH) {
        return Err(IamError::validation(
            "description",
            format!(
                "The permission description must be between {} and {} characters",
                PERMISSION_DESCRIPTION_LENGTH.0, PERMISSION_DESCRIPTION_LENGTH.1
            ),
        ));
    }

    Ok(())
}
