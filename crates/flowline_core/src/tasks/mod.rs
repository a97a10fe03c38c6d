//! Builtin task modules and their compatibility shims.
//!
//! # Responsibility
//! - Declare the task modules this build ships with.
//! - Keep pre-restructure `contrib.tasks.*` paths resolvable via shims.
//! - Gate optional modules behind their install extras.
//!
//! # Invariants
//! - Shims are installed for every known deprecated path, including paths
//!   whose canonical module is compiled out in this build.

pub mod databricks;
pub mod mysql;

use crate::catalog::{CatalogResult, TaskCatalog};
use crate::compat::{CompatResult, CompatRouter};

/// Registers every task module compiled into this build.
pub fn install_builtin_modules(catalog: &mut TaskCatalog) -> CatalogResult<()> {
    catalog.register_module(databricks::task_module()?)?;
    #[cfg(feature = "mysql")]
    catalog.register_module(mysql::task_module()?)?;
    Ok(())
}

/// Registers compatibility shims for every pre-restructure path.
pub fn install_builtin_shims(router: &mut CompatRouter) -> CompatResult<()> {
    router.register_shim(databricks::compat_shim()?)?;
    router.register_shim(mysql::compat_shim()?)?;
    Ok(())
}
