//! Dotted module path grammar for catalog namespaces.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

static MODULE_PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9_]*(\.[a-z0-9][a-z0-9_]*)*$").expect("valid module path regex")
});

/// Validated dotted module path, e.g. `tasks.databricks`.
///
/// Segments are lowercase `[a-z0-9_]` identifiers separated by single dots.
/// Construction goes through [`ModulePath::parse`]; the inner string is
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ModulePath(String);

impl ModulePath {
    /// Parses and validates one module path from text.
    ///
    /// Surrounding whitespace is trimmed before validation.
    pub fn parse(value: &str) -> Result<Self, PathError> {
        let normalized = value.trim();
        if normalized.is_empty() {
            return Err(PathError::Empty);
        }
        if !MODULE_PATH_RE.is_match(normalized) {
            return Err(PathError::Invalid(normalized.to_string()));
        }
        Ok(Self(normalized.to_string()))
    }

    /// Returns the path as a borrowed string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ModulePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ModulePath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Module path parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    Empty,
    Invalid(String),
}

impl Display for PathError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "module path must not be empty"),
            Self::Invalid(value) => write!(
                f,
                "module path is invalid: `{value}` (expected dotted lowercase segments)"
            ),
        }
    }
}

impl Error for PathError {}
