//! Process-wide task library runtime.
//!
//! # Responsibility
//! - Pair one task catalog with one compatibility router behind a single
//!   resolution surface.
//! - Route deprecated paths through their shims and canonical paths
//!   straight to the catalog.
//! - Hold the process-wide library instance behind a mutex.
//!
//! # Invariants
//! - The process-wide instance is built once, on first use, with the
//!   builtin modules and shims installed and notices going to the log
//!   channel.
//!
//! # See also
//! - `crate::tasks` for what the builtin wiring installs.

use crate::catalog::path::ModulePath;
use crate::catalog::registry::{Availability, TaskCatalog};
use crate::catalog::task::Task;
use crate::compat::router::{CompatResult, CompatRouter, ModuleBindings};
use crate::diagnostics::{DiagnosticsSink, LogDiagnosticsSink};
use crate::tasks;
use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex, PoisonError};

/// One catalog plus one router, resolved through together.
pub struct TaskLibrary {
    catalog: TaskCatalog,
    router: CompatRouter,
}

impl TaskLibrary {
    /// Creates an empty library reporting through the provided sink.
    pub fn new(sink: Arc<dyn DiagnosticsSink>) -> Self {
        Self {
            catalog: TaskCatalog::new(),
            router: CompatRouter::new(sink),
        }
    }

    /// Creates a library with the builtin modules and shims installed.
    pub fn with_builtin(sink: Arc<dyn DiagnosticsSink>) -> CompatResult<Self> {
        let mut library = Self::new(sink);
        tasks::install_builtin_modules(&mut library.catalog)?;
        tasks::install_builtin_shims(&mut library.router)?;
        Ok(library)
    }

    pub fn catalog(&self) -> &TaskCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut TaskCatalog {
        &mut self.catalog
    }

    pub fn router(&self) -> &CompatRouter {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut CompatRouter {
        &mut self.router
    }

    /// Resolves one task by module path and entity name.
    ///
    /// Deprecated paths go through their shim, which may emit a one-time
    /// deprecation notice; canonical paths hit the catalog directly.
    pub fn resolve(&mut self, path: &ModulePath, name: &str) -> CompatResult<Arc<dyn Task>> {
        if self.router.is_registered(path) {
            return self.router.resolve(&mut self.catalog, path, name);
        }
        Ok(self.catalog.resolve(path, name)?)
    }

    /// Drives one shim to its terminal outcome.
    pub fn ensure_shim_ready(&mut self, deprecated: &ModulePath) -> CompatResult<ModuleBindings> {
        self.router.ensure_ready(&mut self.catalog, deprecated)
    }

    /// Probes module availability without running any module body.
    pub fn availability(&self, path: &ModulePath) -> Availability {
        self.catalog.availability(path)
    }
}

static LIBRARY: Lazy<Mutex<TaskLibrary>> = Lazy::new(|| {
    let library = TaskLibrary::with_builtin(Arc::new(LogDiagnosticsSink::new()))
        .expect("builtin task library wiring is valid");
    Mutex::new(library)
});

/// Runs a closure against the process-wide task library.
///
/// The library is created on first use. A poisoned lock is recovered
/// rather than propagated; the registries stay usable after a panicking
/// caller.
pub fn with_task_library<T>(f: impl FnOnce(&mut TaskLibrary) -> T) -> T {
    let mut guard = LIBRARY.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard)
}
