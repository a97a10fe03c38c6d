//! MySQL task module, compiled in behind the `mysql` feature.
//!
//! The compatibility shim below is declared in every build. When the
//! feature is off the canonical module never gets registered, and the
//! shim's guard reports the missing extra instead of a bare lookup error.

use crate::catalog::path::ModulePath;
use crate::catalog::CatalogResult;
use crate::compat::shim::ShimSpec;

#[cfg(feature = "mysql")]
use crate::catalog::task::{StubTask, TaskModule};
#[cfg(feature = "mysql")]
use std::sync::Arc;

/// Canonical path of the MySQL task module.
pub const MYSQL_PATH: &str = "tasks.mysql";

/// Pre-restructure path still answered through a compatibility shim.
pub const MYSQL_COMPAT_PATH: &str = "contrib.tasks.mysql";

/// Install extra that brings the MySQL task module in.
pub const MYSQL_EXTRA: &str = "mysql";

/// Builds the canonical MySQL task module.
#[cfg(feature = "mysql")]
pub fn task_module() -> CatalogResult<TaskModule> {
    let mut module = TaskModule::new(ModulePath::parse(MYSQL_PATH)?);
    module.insert(Arc::new(StubTask::new(
        "mysql_execute",
        "Executes a statement against a MySQL database.",
    )))?;
    module.insert(Arc::new(StubTask::new(
        "mysql_fetch",
        "Runs a query against a MySQL database and fetches the result rows.",
    )))?;
    Ok(module)
}

/// Builds the shim forwarding the pre-restructure MySQL path.
pub fn compat_shim() -> CatalogResult<ShimSpec> {
    Ok(ShimSpec {
        deprecated_path: ModulePath::parse(MYSQL_COMPAT_PATH)?,
        replacement_path: ModulePath::parse(MYSQL_PATH)?,
        forwarded_names: vec!["mysql_execute".to_string(), "mysql_fetch".to_string()],
        required_extra: Some(MYSQL_EXTRA.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::{compat_shim, MYSQL_COMPAT_PATH, MYSQL_EXTRA, MYSQL_PATH};

    #[cfg(feature = "mysql")]
    #[test]
    fn module_defines_execute_and_fetch() {
        let module = super::task_module().expect("builtin module builds");
        assert_eq!(module.path().as_str(), MYSQL_PATH);
        assert_eq!(module.task_names(), vec!["mysql_execute", "mysql_fetch"]);
    }

    #[test]
    fn shim_is_guarded_by_the_mysql_extra() {
        let shim = compat_shim().expect("builtin shim builds");
        shim.validate().expect("builtin shim is well formed");
        assert_eq!(shim.deprecated_path.as_str(), MYSQL_COMPAT_PATH);
        assert_eq!(shim.replacement_path.as_str(), MYSQL_PATH);
        assert_eq!(shim.required_extra.as_deref(), Some(MYSQL_EXTRA));
        assert_eq!(shim.forwarded_names.len(), 2);
    }
}
