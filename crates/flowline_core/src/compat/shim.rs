//! Compatibility shim declarations and validation.

use crate::catalog::path::ModulePath;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Declarative forwarding shim for one moved module path.
///
/// A shim re-exports an exact set of entity names from its replacement path.
/// Guarded shims additionally name the optional extra whose absence they
/// report instead of a raw not-found error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShimSpec {
    /// Legacy path callers still resolve through.
    pub deprecated_path: ModulePath,
    /// Canonical path the shim forwards to.
    pub replacement_path: ModulePath,
    /// Exact entity names re-exported by the shim.
    pub forwarded_names: Vec<String>,
    /// Optional extra gating the replacement module.
    pub required_extra: Option<String>,
}

impl ShimSpec {
    /// Returns whether this shim translates not-found failures into a
    /// missing-extra error.
    pub fn is_guarded(&self) -> bool {
        self.required_extra.is_some()
    }

    /// Validates declaration-level shim invariants.
    pub fn validate(&self) -> Result<(), ShimSpecError> {
        if self.deprecated_path == self.replacement_path {
            return Err(ShimSpecError::SelfForwarding(self.deprecated_path.clone()));
        }

        if self.forwarded_names.is_empty() {
            return Err(ShimSpecError::MissingForwardedNames);
        }

        let mut dedup = BTreeSet::<&str>::new();
        for name in &self.forwarded_names {
            if name.is_empty() {
                return Err(ShimSpecError::EmptyForwardedName);
            }
            if !is_valid_entity_name(name) {
                return Err(ShimSpecError::InvalidForwardedName(name.clone()));
            }
            if !dedup.insert(name.as_str()) {
                return Err(ShimSpecError::DuplicateForwardedName(name.clone()));
            }
        }

        if let Some(extra) = &self.required_extra {
            if !is_valid_entity_name(extra) {
                return Err(ShimSpecError::InvalidExtraName(extra.clone()));
            }
        }

        Ok(())
    }
}

fn is_valid_entity_name(value: &str) -> bool {
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

/// Shim declaration validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShimSpecError {
    SelfForwarding(ModulePath),
    MissingForwardedNames,
    EmptyForwardedName,
    InvalidForwardedName(String),
    DuplicateForwardedName(String),
    InvalidExtraName(String),
}

impl Display for ShimSpecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelfForwarding(path) => {
                write!(f, "shim must not forward `{path}` to itself")
            }
            Self::MissingForwardedNames => write!(f, "shim forwarded names must not be empty"),
            Self::EmptyForwardedName => write!(f, "shim contains empty forwarded name"),
            Self::InvalidForwardedName(value) => {
                write!(f, "shim forwarded name is invalid: `{value}`")
            }
            Self::DuplicateForwardedName(value) => {
                write!(f, "shim forwarded name is duplicated: `{value}`")
            }
            Self::InvalidExtraName(value) => write!(f, "shim extra name is invalid: `{value}`"),
        }
    }
}

impl Error for ShimSpecError {}
