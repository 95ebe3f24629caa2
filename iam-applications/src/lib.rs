//! IAM Applications - identity and access services
//!
//! The services here own the business rules of the system and talk to
//! persistence only through the store capabilities from `iam-core`:
//!
//! - [`UserDirectory`]: user CRUD and credential checks
//! - [`PermissionRegistry`]: named permissions and their protection flags
//! - [`GrantLedger`]: user to permission assignments
//! - [`Authorizer`]: the per-request permission check
//!
//! ## Architecture
//!
//! - **Core** (iam-core): data model, errors, capability traits
//! - **Applications** (this crate): rules and orchestration
//! - **Presentation** (iam-web): HTTP surface and concrete backends

pub mod authorization;
pub mod directory;
pub mod ledger;
pub mod memory;
pub mod principal;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use authorization::Authorizer;
pub use directory::UserDirectory;
pub use ledger::GrantLedger;
pub use memory::MemoryStore;
pub use principal::Principal;
pub use registry::PermissionRegistry;

pub use iam_core::{IamError, IamResult};
