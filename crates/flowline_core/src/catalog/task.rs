//! Task entity contracts and module namespaces.
//!
//! # Responsibility
//! - Define the opaque named entities a catalog module exposes.
//! - Hold one namespace worth of entities under a validated module path.
//!
//! # Invariants
//! - Entity names are lowercase identifiers, unique within their module.
//! - A bound entity is shared by `Arc`; clones of a module keep identity.

use crate::catalog::path::ModulePath;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// Opaque named task entity exposed by a catalog module.
///
/// Execution semantics belong to the orchestration engine; the catalog only
/// carries identity and description.
pub trait Task: Debug + Send + Sync {
    /// Stable entity name inside its module, e.g. `databricks_submit_run`.
    fn name(&self) -> &str;

    /// User-facing one-line summary.
    fn summary(&self) -> &str;
}

/// Declaration-level task stub used by first-party modules.
///
/// Runtime task behavior is intentionally out of scope; stubs carry the
/// catalog-facing identity only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StubTask {
    /// Entity name registered in the owning module.
    pub name: String,
    /// Short human-readable description.
    pub summary: String,
}

impl StubTask {
    /// Creates a stub entity; name grammar is enforced on module insert.
    pub fn new(name: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            summary: summary.into(),
        }
    }
}

impl Task for StubTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn summary(&self) -> &str {
        &self.summary
    }
}

/// One catalog namespace mapping entity names to shared task handles.
#[derive(Debug, Clone)]
pub struct TaskModule {
    path: ModulePath,
    entries: BTreeMap<String, Arc<dyn Task>>,
}

impl TaskModule {
    /// Creates an empty module for the given path.
    pub fn new(path: ModulePath) -> Self {
        Self {
            path,
            entries: BTreeMap::new(),
        }
    }

    /// Returns the module path this namespace is registered under.
    pub fn path(&self) -> &ModulePath {
        &self.path
    }

    /// Inserts one entity under its own name.
    pub fn insert(&mut self, task: Arc<dyn Task>) -> Result<(), TaskModuleError> {
        let name = task.name().to_string();
        if !is_valid_task_name(name.as_str()) {
            return Err(TaskModuleError::InvalidTaskName(name));
        }
        if self.entries.contains_key(name.as_str()) {
            return Err(TaskModuleError::DuplicateTaskName(name));
        }

        self.entries.insert(name, task);
        Ok(())
    }

    /// Returns one entity handle by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Task>> {
        self.entries.get(name.trim()).cloned()
    }

    /// Returns sorted entity names.
    pub fn task_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_valid_task_name(value: &str) -> bool {
    let mut chars = value.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    if !first.is_ascii_lowercase() {
        return false;
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Module assembly errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskModuleError {
    InvalidTaskName(String),
    DuplicateTaskName(String),
}

impl Display for TaskModuleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTaskName(value) => write!(f, "task name is invalid: `{value}`"),
            Self::DuplicateTaskName(value) => {
                write!(f, "task name already bound in module: `{value}`")
            }
        }
    }
}

impl Error for TaskModuleError {}
