//! Task catalog: validated module paths, named entities and lazy loading.
//!
//! This module owns the canonical namespace universe the compatibility layer
//! forwards into. Module bodies run at most once per catalog; entity handles
//! are shared `Arc`s so forwarding preserves referential identity.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod loader;
pub mod path;
pub mod registry;
pub mod task;

pub use loader::{ModuleLoadError, ModuleLoader, StaticModuleLoader};
pub use path::{ModulePath, PathError};
pub use registry::{Availability, TaskCatalog};
pub use task::{StubTask, Task, TaskModule, TaskModuleError};

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog registration, loading and resolution errors.
#[derive(Debug)]
pub enum CatalogError {
    /// Invalid module path text.
    Path(PathError),
    /// Module construction rejected an entity.
    Module(TaskModuleError),
    /// A loader is already registered for the path.
    DuplicateModule(ModulePath),
    /// No loader is registered for the path.
    ModuleNotFound(ModulePath),
    /// The module loaded, but does not expose the requested entity.
    NameNotFound { module: ModulePath, name: String },
    /// A module body produced a namespace for a different path.
    PathMismatch {
        expected: ModulePath,
        actual: ModulePath,
    },
    /// The module body itself failed; surfaced verbatim, never interpreted.
    Load {
        module: ModulePath,
        source: ModuleLoadError,
    },
}

impl CatalogError {
    /// Returns whether this error signals an unresolved module or entity.
    ///
    /// This is the class a guarded compatibility shim translates into a
    /// missing-extra error; loader-body failures are excluded.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ModuleNotFound(_) | Self::NameNotFound { .. })
    }
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(err) => write!(f, "{err}"),
            Self::Module(err) => write!(f, "{err}"),
            Self::DuplicateModule(path) => write!(f, "module already registered: `{path}`"),
            Self::ModuleNotFound(path) => write!(f, "module not found: `{path}`"),
            Self::NameNotFound { module, name } => {
                write!(f, "task `{name}` not found in module `{module}`")
            }
            Self::PathMismatch { expected, actual } => {
                write!(f, "loader for `{expected}` produced module `{actual}`")
            }
            Self::Load { module, source } => {
                write!(f, "module `{module}` failed to load: {source}")
            }
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Path(err) => Some(err),
            Self::Module(err) => Some(err),
            Self::Load { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<PathError> for CatalogError {
    fn from(value: PathError) -> Self {
        Self::Path(value)
    }
}

impl From<TaskModuleError> for CatalogError {
    fn from(value: TaskModuleError) -> Self {
        Self::Module(value)
    }
}
