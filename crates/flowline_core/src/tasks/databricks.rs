//! Databricks task module shipped with every build.

use crate::catalog::path::ModulePath;
use crate::catalog::task::{StubTask, TaskModule};
use crate::catalog::CatalogResult;
use crate::compat::shim::ShimSpec;
use std::sync::Arc;

/// Canonical path of the Databricks task module.
pub const DATABRICKS_PATH: &str = "tasks.databricks";

/// Pre-restructure path still answered through a compatibility shim.
pub const DATABRICKS_COMPAT_PATH: &str = "contrib.tasks.databricks";

/// Builds the canonical Databricks task module.
pub fn task_module() -> CatalogResult<TaskModule> {
    let mut module = TaskModule::new(ModulePath::parse(DATABRICKS_PATH)?);
    module.insert(Arc::new(StubTask::new(
        "databricks_submit_run",
        "Submits a one-off run through the Databricks jobs run-submit endpoint.",
    )))?;
    module.insert(Arc::new(StubTask::new(
        "databricks_run_now",
        "Triggers an existing job through the Databricks jobs run-now endpoint.",
    )))?;
    Ok(module)
}

/// Builds the shim forwarding the pre-restructure Databricks path.
///
/// The module ships unconditionally, so the shim carries no extra guard.
pub fn compat_shim() -> CatalogResult<ShimSpec> {
    Ok(ShimSpec {
        deprecated_path: ModulePath::parse(DATABRICKS_COMPAT_PATH)?,
        replacement_path: ModulePath::parse(DATABRICKS_PATH)?,
        forwarded_names: vec![
            "databricks_submit_run".to_string(),
            "databricks_run_now".to_string(),
        ],
        required_extra: None,
    })
}
