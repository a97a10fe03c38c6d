//! Task catalog and compatibility core for Flowline.
//! This crate is the single source of truth for task module paths, shims
//! and install extras.

pub mod catalog;
pub mod compat;
pub mod diagnostics;
pub mod logging;
pub mod runtime;
pub mod tasks;

pub use catalog::{
    Availability, CatalogError, CatalogResult, ModuleLoader, ModulePath, PathError, StubTask,
    Task, TaskCatalog, TaskModule,
};
pub use compat::{CompatError, CompatResult, CompatRouter, ModuleBindings, ShimSpec, ShimState};
pub use diagnostics::{
    DeprecationNotice, DiagnosticsSink, LogDiagnosticsSink, RecordingDiagnosticsSink,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError, LoggingResult};
pub use runtime::{with_task_library, TaskLibrary};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
