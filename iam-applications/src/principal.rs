//! The acting identity of a request

use iam_core::{IamError, IamResult, SelfAction, UserId};

/// Identity recovered from a verified bearer token.
///
/// Only the authentication gate constructs one; handlers receive it as a
/// typed value rather than looking it up by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
}

impl Principal {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn is(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    /// Reject an action the principal would perform on its own account
    pub fn ensure_not_self(&self, target: UserId, action: SelfAction) -> IamResult<()> {
        if self.is(target) {
            tracing::warn!(user_id = %self.user_id, ?action, "Self-directed action rejected");
            return Err(IamError::SelfAction(action));
        }
        Ok(())
    }
}
