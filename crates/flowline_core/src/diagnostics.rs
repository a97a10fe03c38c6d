//! Deprecation notices and the diagnostics sink contract.
//!
//! # Responsibility
//! - Model one deprecation notice with a stable message shape.
//! - Define the injectable sink the compat layer reports through.
//!
//! # Invariants
//! - Notice messages always contain both the deprecated and the replacement
//!   path.
//! - Sinks never fail and never panic; reporting is side-effect only.

use crate::catalog::path::ModulePath;
use log::warn;
use serde::Serialize;
use std::sync::{Mutex, PoisonError};

/// One user-visible deprecation event for a moved module path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeprecationNotice {
    /// Path callers should stop using.
    pub deprecated_path: ModulePath,
    /// Path callers should migrate to.
    pub replacement_path: ModulePath,
    /// Rendered message naming both paths.
    pub message: String,
}

impl DeprecationNotice {
    /// Builds the standard notice for a module that moved paths.
    pub fn moved_module(deprecated: &ModulePath, replacement: &ModulePath) -> Self {
        Self {
            deprecated_path: deprecated.clone(),
            replacement_path: replacement.clone(),
            message: format!(
                "Resolving tasks from `{deprecated}` is deprecated; use `{replacement}` instead."
            ),
        }
    }
}

/// Shared diagnostics channel for non-fatal compatibility warnings.
///
/// Hosts inject an implementation; capturing, filtering or escalating
/// notices to hard errors is the host's choice.
pub trait DiagnosticsSink: Send + Sync {
    /// Reports one deprecation notice. Implementations must not panic.
    fn deprecation(&self, notice: &DeprecationNotice);
}

/// Sink forwarding notices to the process log channel at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnosticsSink;

impl LogDiagnosticsSink {
    pub fn new() -> Self {
        Self
    }
}

impl DiagnosticsSink for LogDiagnosticsSink {
    fn deprecation(&self, notice: &DeprecationNotice) {
        warn!(
            "event=deprecation_notice module=diagnostics status=warn deprecated={} replacement={} message={}",
            notice.deprecated_path, notice.replacement_path, notice.message
        );
    }
}

/// Sink recording notices in memory.
///
/// Used by tests and by hosts that escalate deprecations to errors.
#[derive(Debug, Default)]
pub struct RecordingDiagnosticsSink {
    notices: Mutex<Vec<DeprecationNotice>>,
}

impl RecordingDiagnosticsSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of recorded notices in emission order.
    pub fn notices(&self) -> Vec<DeprecationNotice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticsSink for RecordingDiagnosticsSink {
    fn deprecation(&self, notice: &DeprecationNotice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice.clone());
    }
}
