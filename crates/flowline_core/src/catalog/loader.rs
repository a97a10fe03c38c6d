//! Deferred module bodies executed on first catalog load.

use crate::catalog::path::ModulePath;
use crate::catalog::task::TaskModule;
use std::error::Error;

/// Opaque failure raised by a module body itself.
///
/// The catalog never interprets these; they belong to the collaborator that
/// registered the loader and are surfaced verbatim.
pub type ModuleLoadError = Box<dyn Error + Send + Sync>;

/// Deferred module body run by the catalog on first load.
///
/// Mirrors host-environment import semantics: the body executes at most once
/// per catalog on success, and stays retryable after its own failures.
pub trait ModuleLoader: Send + Sync {
    /// Path this loader provides.
    fn module_path(&self) -> &ModulePath;

    /// Builds the module namespace.
    fn load(&self) -> Result<TaskModule, ModuleLoadError>;
}

/// Loader wrapping a prebuilt in-memory module.
///
/// Loads clone the held module; clones share entity handles, so identity is
/// stable across repeated loads.
pub struct StaticModuleLoader {
    module: TaskModule,
}

impl StaticModuleLoader {
    pub fn new(module: TaskModule) -> Self {
        Self { module }
    }
}

impl ModuleLoader for StaticModuleLoader {
    fn module_path(&self) -> &ModulePath {
        self.module.path()
    }

    fn load(&self) -> Result<TaskModule, ModuleLoadError> {
        Ok(self.module.clone())
    }
}
