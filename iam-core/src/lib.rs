//! IAM Core - shared data model and capability traits
//!
//! This crate defines the entities, error taxonomy, configuration and the store
//! / crypto capability interfaces the rest of the IAM system is built on.

pub mod config;
pub mod error;
pub mod logging;
pub mod traits;
pub mod types;
pub mod validation;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use traits::*;
pub use types::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tracing;
