//! Task module registry with once-only load semantics.
//!
//! # Responsibility
//! - Track registered module loaders by validated path.
//! - Run each module body at most once per catalog and cache the namespace.
//! - Resolve named entities with a typed not-found/load-failure split.
//!
//! # Invariants
//! - A path maps to at most one loader.
//! - Successful loads are cached for the catalog lifetime; failed loads are
//!   not cached and stay retryable.

use crate::catalog::loader::{ModuleLoader, StaticModuleLoader};
use crate::catalog::path::ModulePath;
use crate::catalog::task::{Task, TaskModule};
use crate::catalog::{CatalogError, CatalogResult};
use log::{error, info};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

/// Tagged availability probe outcome for one module path.
///
/// Probing has no side effects: no module body runs and nothing is cached.
pub enum Availability {
    /// A loader is registered for the path.
    Available(Arc<dyn ModuleLoader>),
    /// No loader is registered for the path.
    Unavailable { reason: String },
}

impl Availability {
    /// Returns whether the probed path can be loaded.
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

/// In-process module registry and cache.
#[derive(Default)]
pub struct TaskCatalog {
    loaders: BTreeMap<ModulePath, Arc<dyn ModuleLoader>>,
    loaded: BTreeMap<ModulePath, TaskModule>,
}

impl TaskCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one deferred module body under its own path.
    pub fn register_loader(&mut self, loader: Arc<dyn ModuleLoader>) -> CatalogResult<()> {
        let path = loader.module_path().clone();
        if self.loaders.contains_key(&path) {
            return Err(CatalogError::DuplicateModule(path));
        }

        self.loaders.insert(path, loader);
        Ok(())
    }

    /// Registers a prebuilt module behind a static loader.
    pub fn register_module(&mut self, module: TaskModule) -> CatalogResult<()> {
        self.register_loader(Arc::new(StaticModuleLoader::new(module)))
    }

    /// Returns whether a loader is registered for the path.
    pub fn is_registered(&self, path: &ModulePath) -> bool {
        self.loaders.contains_key(path)
    }

    /// Probes path availability without loading anything.
    pub fn availability(&self, path: &ModulePath) -> Availability {
        match self.loaders.get(path) {
            Some(loader) => Availability::Available(loader.clone()),
            None => Availability::Unavailable {
                reason: format!("no module registered at `{path}`"),
            },
        }
    }

    /// Returns sorted registered module paths.
    pub fn registered_paths(&self) -> Vec<ModulePath> {
        self.loaders.keys().cloned().collect()
    }

    /// Returns sorted paths whose module body has already run.
    pub fn loaded_paths(&self) -> Vec<ModulePath> {
        self.loaded.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    /// Loads one module, running its body at most once per catalog.
    pub fn load(&mut self, path: &ModulePath) -> CatalogResult<&TaskModule> {
        if !self.loaded.contains_key(path) {
            let module = self.run_loader(path)?;
            self.loaded.insert(path.clone(), module);
        }

        self.loaded
            .get(path)
            .ok_or_else(|| CatalogError::ModuleNotFound(path.clone()))
    }

    /// Resolves one named entity from a module.
    pub fn resolve(&mut self, path: &ModulePath, name: &str) -> CatalogResult<Arc<dyn Task>> {
        let module = self.load(path)?;
        module.get(name).ok_or_else(|| CatalogError::NameNotFound {
            module: path.clone(),
            name: name.trim().to_string(),
        })
    }

    fn run_loader(&self, path: &ModulePath) -> CatalogResult<TaskModule> {
        let loader = match self.loaders.get(path) {
            Some(loader) => loader.clone(),
            None => return Err(CatalogError::ModuleNotFound(path.clone())),
        };

        let started_at = Instant::now();
        info!("event=module_load module=catalog status=start path={path}");

        let module = match loader.load() {
            Ok(module) => module,
            Err(source) => {
                error!(
                    "event=module_load module=catalog status=error path={} duration_ms={} error_code=module_body_failed error={}",
                    path,
                    started_at.elapsed().as_millis(),
                    source
                );
                return Err(CatalogError::Load {
                    module: path.clone(),
                    source,
                });
            }
        };

        if module.path() != path {
            error!(
                "event=module_load module=catalog status=error path={} duration_ms={} error_code=module_path_mismatch actual={}",
                path,
                started_at.elapsed().as_millis(),
                module.path()
            );
            return Err(CatalogError::PathMismatch {
                expected: path.clone(),
                actual: module.path().clone(),
            });
        }

        info!(
            "event=module_load module=catalog status=ok path={} duration_ms={} tasks={}",
            path,
            started_at.elapsed().as_millis(),
            module.len()
        );
        Ok(module)
    }
}
