//! Compatibility layer for deprecated task module paths.
//!
//! # Responsibility
//! - Declare forwarding shims from deprecated paths to canonical ones.
//! - Keep deprecated resolution working while nudging callers to migrate.
//! - Gate optional task modules behind their install extras.
//!
//! # See also
//! - `crate::catalog` for the canonical module registry underneath.
//! - `crate::diagnostics` for how deprecation notices reach callers.

pub mod router;
pub mod shim;

pub use router::{CompatError, CompatResult, CompatRouter, ModuleBindings, ShimState};
pub use shim::{ShimSpec, ShimSpecError};
