//! Terramaas Core
//!
//! Error types, VLAN id rules and the HCL block model shared by every
//! terramaas crate.

pub mod error;
pub mod hcl;
pub mod types;
pub mod vlan;

pub use error::TerramaasError;
pub use hcl::{Block, HclWriter, Value};
pub use types::*;

/// Result type for terramaas operations
pub type Result<T> = std::result::Result<T, TerramaasError>;
