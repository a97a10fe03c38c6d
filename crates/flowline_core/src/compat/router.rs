//! Deprecated-path routing with once-only shim readiness.
//!
//! # Responsibility
//! - Register forwarding shims and drive their lifecycle states.
//! - Bind forwarded names to canonical entities exactly once per shim.
//! - Emit one deprecation notice per shim on first successful bind.
//! - Translate not-found failures into missing-extra errors for guarded
//!   shims only.
//!
//! # Invariants
//! - `Ready` and `Unavailable` are terminal; repeated calls replay the
//!   outcome without re-resolving and without further notices.
//! - Collaborator load failures propagate verbatim and leave the shim
//!   `Pending`.

use crate::catalog::path::ModulePath;
use crate::catalog::registry::{Availability, TaskCatalog};
use crate::catalog::task::Task;
use crate::catalog::CatalogError;
use crate::compat::shim::{ShimSpec, ShimSpecError};
use crate::diagnostics::{DeprecationNotice, DiagnosticsSink};
use log::{info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type CompatResult<T> = Result<T, CompatError>;

/// Compatibility routing errors.
#[derive(Debug)]
pub enum CompatError {
    /// Shim declaration failed validation.
    InvalidShim(ShimSpecError),
    /// A shim is already registered for the deprecated path.
    DuplicateShim(ModulePath),
    /// No shim is registered for the deprecated path.
    UnknownShim(ModulePath),
    /// The shim is ready but does not forward the requested name.
    NameNotExported {
        deprecated_path: ModulePath,
        name: String,
    },
    /// The replacement module is absent and the shim is guarded by an extra.
    MissingExtra {
        extra: String,
        deprecated_path: ModulePath,
    },
    /// Catalog failure surfaced unchanged.
    Catalog(CatalogError),
}

impl Display for CompatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidShim(err) => write!(f, "invalid shim declaration: {err}"),
            Self::DuplicateShim(path) => write!(f, "shim already registered for `{path}`"),
            Self::UnknownShim(path) => write!(f, "no shim registered for `{path}`"),
            Self::NameNotExported {
                deprecated_path,
                name,
            } => write!(
                f,
                "shim `{deprecated_path}` does not forward task `{name}`"
            ),
            Self::MissingExtra {
                extra,
                deprecated_path,
            } => write!(
                f,
                "using `{deprecated_path}` requires the library to be installed with the `{extra}` extra"
            ),
            Self::Catalog(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CompatError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidShim(err) => Some(err),
            Self::Catalog(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CatalogError> for CompatError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

/// Observable shim lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShimState {
    /// Registered, nothing bound yet.
    Pending,
    /// Names bound, notice emitted.
    Ready,
    /// Missing-extra outcome reached; nothing bound.
    Unavailable,
}

/// Bound namespace of one ready shim.
///
/// Clones share entity handles with the canonical module.
#[derive(Debug, Clone)]
pub struct ModuleBindings {
    deprecated_path: ModulePath,
    replacement_path: ModulePath,
    entries: BTreeMap<String, Arc<dyn Task>>,
}

impl ModuleBindings {
    /// Returns the deprecated path these bindings answer for.
    pub fn deprecated_path(&self) -> &ModulePath {
        &self.deprecated_path
    }

    /// Returns the canonical path the entities come from.
    pub fn replacement_path(&self) -> &ModulePath {
        &self.replacement_path
    }

    /// Returns one forwarded entity handle by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Task>> {
        self.entries.get(name.trim()).cloned()
    }

    /// Returns sorted forwarded names.
    pub fn bound_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

enum ShimOutcome {
    Pending,
    Ready(ModuleBindings),
    Unavailable { extra: String },
}

struct ShimEntry {
    spec: ShimSpec,
    outcome: ShimOutcome,
}

/// Compatibility router over a task catalog.
pub struct CompatRouter {
    sink: Arc<dyn DiagnosticsSink>,
    shims: BTreeMap<ModulePath, ShimEntry>,
}

impl CompatRouter {
    /// Creates a router reporting through the provided sink.
    pub fn new(sink: Arc<dyn DiagnosticsSink>) -> Self {
        Self {
            sink,
            shims: BTreeMap::new(),
        }
    }

    /// Registers one shim declaration after validation.
    pub fn register_shim(&mut self, spec: ShimSpec) -> CompatResult<()> {
        spec.validate().map_err(CompatError::InvalidShim)?;
        let deprecated = spec.deprecated_path.clone();
        if self.shims.contains_key(&deprecated) {
            return Err(CompatError::DuplicateShim(deprecated));
        }

        self.shims.insert(
            deprecated,
            ShimEntry {
                spec,
                outcome: ShimOutcome::Pending,
            },
        );
        Ok(())
    }

    /// Returns whether a shim answers for the deprecated path.
    pub fn is_registered(&self, deprecated: &ModulePath) -> bool {
        self.shims.contains_key(deprecated)
    }

    /// Returns sorted deprecated paths with registered shims.
    pub fn shim_paths(&self) -> Vec<ModulePath> {
        self.shims.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.shims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shims.is_empty()
    }

    /// Returns one registered shim declaration.
    pub fn shim_spec(&self, deprecated: &ModulePath) -> Option<&ShimSpec> {
        self.shims.get(deprecated).map(|entry| &entry.spec)
    }

    /// Returns the lifecycle state of one shim.
    pub fn shim_state(&self, deprecated: &ModulePath) -> Option<ShimState> {
        self.shims.get(deprecated).map(|entry| match entry.outcome {
            ShimOutcome::Pending => ShimState::Pending,
            ShimOutcome::Ready(_) => ShimState::Ready,
            ShimOutcome::Unavailable { .. } => ShimState::Unavailable,
        })
    }

    /// Probes the replacement module behind one shim without loading it.
    pub fn extra_availability(
        &self,
        catalog: &TaskCatalog,
        deprecated: &ModulePath,
    ) -> CompatResult<Availability> {
        let entry = self
            .shims
            .get(deprecated)
            .ok_or_else(|| CompatError::UnknownShim(deprecated.clone()))?;
        Ok(catalog.availability(&entry.spec.replacement_path))
    }

    /// Drives one shim to a terminal outcome and returns its bindings.
    ///
    /// # Contract
    /// - First successful call binds every forwarded name and emits exactly
    ///   one deprecation notice through the sink.
    /// - Later calls on a `Ready` shim reuse the bindings; no further notice.
    /// - Guarded shims turn not-found failures into `MissingExtra` and stay
    ///   `Unavailable`; no notice is emitted on that edge.
    /// - Any other catalog failure propagates unchanged and leaves the shim
    ///   `Pending`.
    pub fn ensure_ready(
        &mut self,
        catalog: &mut TaskCatalog,
        deprecated: &ModulePath,
    ) -> CompatResult<ModuleBindings> {
        let entry = self
            .shims
            .get(deprecated)
            .ok_or_else(|| CompatError::UnknownShim(deprecated.clone()))?;

        match &entry.outcome {
            ShimOutcome::Ready(bindings) => return Ok(bindings.clone()),
            ShimOutcome::Unavailable { extra } => {
                return Err(CompatError::MissingExtra {
                    extra: extra.clone(),
                    deprecated_path: deprecated.clone(),
                });
            }
            ShimOutcome::Pending => {}
        }

        let spec = entry.spec.clone();
        let mut entries = BTreeMap::new();
        for name in &spec.forwarded_names {
            match catalog.resolve(&spec.replacement_path, name) {
                Ok(task) => {
                    entries.insert(name.clone(), task);
                }
                Err(err) => return self.fail_pending_bind(&spec, err),
            }
        }

        let bindings = ModuleBindings {
            deprecated_path: spec.deprecated_path.clone(),
            replacement_path: spec.replacement_path.clone(),
            entries,
        };
        let notice =
            DeprecationNotice::moved_module(&spec.deprecated_path, &spec.replacement_path);

        if let Some(entry) = self.shims.get_mut(deprecated) {
            entry.outcome = ShimOutcome::Ready(bindings.clone());
        }
        info!(
            "event=shim_ready module=compat status=ok deprecated={} replacement={} names={}",
            spec.deprecated_path,
            spec.replacement_path,
            bindings.len()
        );
        self.sink.deprecation(&notice);
        Ok(bindings)
    }

    /// Resolves one forwarded entity through a shim.
    ///
    /// Names the shim does not forward fail with `NameNotExported` even when
    /// the canonical module defines them; the deprecated surface stays
    /// exactly as declared.
    pub fn resolve(
        &mut self,
        catalog: &mut TaskCatalog,
        deprecated: &ModulePath,
        name: &str,
    ) -> CompatResult<Arc<dyn Task>> {
        let bindings = self.ensure_ready(catalog, deprecated)?;
        bindings.get(name).ok_or_else(|| CompatError::NameNotExported {
            deprecated_path: deprecated.clone(),
            name: name.trim().to_string(),
        })
    }

    fn fail_pending_bind(
        &mut self,
        spec: &ShimSpec,
        err: CatalogError,
    ) -> CompatResult<ModuleBindings> {
        if let Some(extra) = spec.required_extra.as_deref() {
            if err.is_not_found() {
                warn!(
                    "event=shim_gate module=compat status=unavailable deprecated={} extra={} error_code=missing_extra",
                    spec.deprecated_path, extra
                );
                if let Some(entry) = self.shims.get_mut(&spec.deprecated_path) {
                    entry.outcome = ShimOutcome::Unavailable {
                        extra: extra.to_string(),
                    };
                }
                return Err(CompatError::MissingExtra {
                    extra: extra.to_string(),
                    deprecated_path: spec.deprecated_path.clone(),
                });
            }
        }

        warn!(
            "event=shim_bind module=compat status=error deprecated={} error={}",
            spec.deprecated_path, err
        );
        Err(CompatError::Catalog(err))
    }
}

#[cfg(test)]
mod tests {
    use super::{CompatError, CompatRouter, ShimState};
    use crate::catalog::loader::{ModuleLoadError, ModuleLoader};
    use crate::catalog::path::ModulePath;
    use crate::catalog::registry::TaskCatalog;
    use crate::catalog::task::{StubTask, TaskModule};
    use crate::catalog::CatalogError;
    use crate::compat::shim::ShimSpec;
    use crate::diagnostics::RecordingDiagnosticsSink;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn deprecated_path() -> ModulePath {
        ModulePath::parse("contrib.tasks.sample").expect("valid deprecated path")
    }

    fn replacement_path() -> ModulePath {
        ModulePath::parse("tasks.sample").expect("valid replacement path")
    }

    fn sample_spec(required_extra: Option<&str>) -> ShimSpec {
        ShimSpec {
            deprecated_path: deprecated_path(),
            replacement_path: replacement_path(),
            forwarded_names: vec!["sample_run".to_string(), "sample_fetch".to_string()],
            required_extra: required_extra.map(|value| value.to_string()),
        }
    }

    fn sample_module() -> TaskModule {
        let mut module = TaskModule::new(replacement_path());
        module
            .insert(Arc::new(StubTask::new("sample_run", "Runs the sample job.")))
            .expect("insert sample_run");
        module
            .insert(Arc::new(StubTask::new("sample_fetch", "Fetches sample rows.")))
            .expect("insert sample_fetch");
        module
    }

    fn router_with_sink() -> (CompatRouter, Arc<RecordingDiagnosticsSink>) {
        let sink = Arc::new(RecordingDiagnosticsSink::new());
        (CompatRouter::new(sink.clone()), sink)
    }

    struct FlakyLoader {
        module: TaskModule,
        calls: AtomicUsize,
    }

    impl ModuleLoader for FlakyLoader {
        fn module_path(&self) -> &ModulePath {
            self.module.path()
        }

        fn load(&self) -> Result<TaskModule, ModuleLoadError> {
            let attempt = self.calls.fetch_add(1, Ordering::SeqCst);
            if attempt == 0 {
                return Err("credentials file missing: /etc/sample.toml".into());
            }
            Ok(self.module.clone())
        }
    }

    #[test]
    fn rejects_invalid_and_duplicate_shims() {
        let (mut router, _sink) = router_with_sink();

        let mut invalid = sample_spec(None);
        invalid.forwarded_names.clear();
        let err = router
            .register_shim(invalid)
            .expect_err("invalid shim must fail");
        assert!(matches!(err, CompatError::InvalidShim(_)));

        router
            .register_shim(sample_spec(None))
            .expect("first registration");
        let err = router
            .register_shim(sample_spec(None))
            .expect_err("duplicate registration must fail");
        assert!(matches!(err, CompatError::DuplicateShim(_)));
        assert_eq!(router.len(), 1);
    }

    #[test]
    fn binds_forwarded_names_and_emits_one_notice() {
        let (mut router, sink) = router_with_sink();
        let mut catalog = TaskCatalog::new();
        catalog
            .register_module(sample_module())
            .expect("module registration");
        router
            .register_shim(sample_spec(None))
            .expect("shim registration");

        let bindings = router
            .ensure_ready(&mut catalog, &deprecated_path())
            .expect("shim should become ready");
        assert_eq!(bindings.bound_names(), vec!["sample_fetch", "sample_run"]);
        assert_eq!(bindings.replacement_path(), &replacement_path());
        assert_eq!(
            router.shim_state(&deprecated_path()),
            Some(ShimState::Ready)
        );

        let notices = sink.notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].message.contains("contrib.tasks.sample"));
        assert!(notices[0].message.contains("tasks.sample"));
    }

    #[test]
    fn ready_bindings_render_debug_with_paths_and_names() {
        let (mut router, _sink) = router_with_sink();
        let mut catalog = TaskCatalog::new();
        catalog
            .register_module(sample_module())
            .expect("module registration");
        router
            .register_shim(sample_spec(None))
            .expect("shim registration");

        let bindings = router
            .ensure_ready(&mut catalog, &deprecated_path())
            .expect("shim should become ready");
        let rendered = format!("{bindings:?}");
        assert!(rendered.contains("deprecated_path"));
        assert!(rendered.contains("contrib.tasks.sample"));
        assert!(rendered.contains("sample_run"));
    }

    #[test]
    fn repeated_ensure_reuses_bindings_without_new_notice() {
        let (mut router, sink) = router_with_sink();
        let mut catalog = TaskCatalog::new();
        catalog
            .register_module(sample_module())
            .expect("module registration");
        router
            .register_shim(sample_spec(None))
            .expect("shim registration");

        let first = router
            .ensure_ready(&mut catalog, &deprecated_path())
            .expect("first ensure");
        let second = router
            .ensure_ready(&mut catalog, &deprecated_path())
            .expect("second ensure");

        let first_task = first.get("sample_run").expect("first handle");
        let second_task = second.get("sample_run").expect("second handle");
        assert!(Arc::ptr_eq(&first_task, &second_task));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn forwarded_handles_keep_canonical_identity() {
        let (mut router, _sink) = router_with_sink();
        let mut catalog = TaskCatalog::new();
        catalog
            .register_module(sample_module())
            .expect("module registration");
        router
            .register_shim(sample_spec(None))
            .expect("shim registration");

        let via_shim = router
            .resolve(&mut catalog, &deprecated_path(), "sample_run")
            .expect("shim resolution");
        let via_catalog = catalog
            .resolve(&replacement_path(), "sample_run")
            .expect("canonical resolution");
        assert!(Arc::ptr_eq(&via_shim, &via_catalog));
    }

    #[test]
    fn unguarded_shim_propagates_module_not_found() {
        let (mut router, sink) = router_with_sink();
        let mut catalog = TaskCatalog::new();
        router
            .register_shim(sample_spec(None))
            .expect("shim registration");

        let err = router
            .ensure_ready(&mut catalog, &deprecated_path())
            .expect_err("absent module must fail");
        assert!(matches!(
            err,
            CompatError::Catalog(CatalogError::ModuleNotFound(_))
        ));
        assert_eq!(
            router.shim_state(&deprecated_path()),
            Some(ShimState::Pending)
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn guarded_shim_translates_absent_module_into_missing_extra() {
        let (mut router, sink) = router_with_sink();
        let mut catalog = TaskCatalog::new();
        router
            .register_shim(sample_spec(Some("sample")))
            .expect("shim registration");

        let err = router
            .ensure_ready(&mut catalog, &deprecated_path())
            .expect_err("absent module must surface missing extra");
        match &err {
            CompatError::MissingExtra { extra, .. } => assert_eq!(extra, "sample"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("`sample` extra"));
        assert_eq!(
            router.shim_state(&deprecated_path()),
            Some(ShimState::Unavailable)
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn guarded_shim_translates_missing_forwarded_name() {
        let (mut router, sink) = router_with_sink();
        let mut catalog = TaskCatalog::new();
        let mut partial = TaskModule::new(replacement_path());
        partial
            .insert(Arc::new(StubTask::new("sample_run", "Runs the sample job.")))
            .expect("insert sample_run");
        catalog
            .register_module(partial)
            .expect("module registration");
        router
            .register_shim(sample_spec(Some("sample")))
            .expect("shim registration");

        let err = router
            .ensure_ready(&mut catalog, &deprecated_path())
            .expect_err("missing forwarded name must surface missing extra");
        assert!(matches!(err, CompatError::MissingExtra { .. }));
        assert!(sink.is_empty());
    }

    #[test]
    fn missing_extra_outcome_is_terminal() {
        let (mut router, sink) = router_with_sink();
        let mut catalog = TaskCatalog::new();
        router
            .register_shim(sample_spec(Some("sample")))
            .expect("shim registration");

        for _ in 0..3 {
            let err = router
                .ensure_ready(&mut catalog, &deprecated_path())
                .expect_err("unavailable outcome should replay");
            assert!(matches!(err, CompatError::MissingExtra { .. }));
        }
        assert_eq!(
            router.shim_state(&deprecated_path()),
            Some(ShimState::Unavailable)
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn guarded_shim_passes_collaborator_failure_verbatim() {
        let (mut router, sink) = router_with_sink();
        let mut catalog = TaskCatalog::new();
        catalog
            .register_loader(Arc::new(FlakyLoader {
                module: sample_module(),
                calls: AtomicUsize::new(0),
            }))
            .expect("loader registration");
        router
            .register_shim(sample_spec(Some("sample")))
            .expect("shim registration");

        let err = router
            .ensure_ready(&mut catalog, &deprecated_path())
            .expect_err("collaborator failure must propagate");
        assert!(matches!(
            err,
            CompatError::Catalog(CatalogError::Load { .. })
        ));
        assert!(err.to_string().contains("credentials file missing"));
        assert_eq!(
            router.shim_state(&deprecated_path()),
            Some(ShimState::Pending)
        );
        assert!(sink.is_empty());

        // Pending shims stay retryable once the collaborator recovers.
        let bindings = router
            .ensure_ready(&mut catalog, &deprecated_path())
            .expect("retry after collaborator recovery");
        assert_eq!(bindings.len(), 2);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn resolve_rejects_names_outside_forwarded_set() {
        let (mut router, _sink) = router_with_sink();
        let mut catalog = TaskCatalog::new();
        let mut module = sample_module();
        module
            .insert(Arc::new(StubTask::new("sample_admin", "Admin-only task.")))
            .expect("insert sample_admin");
        catalog.register_module(module).expect("module registration");
        router
            .register_shim(sample_spec(None))
            .expect("shim registration");

        let err = router
            .resolve(&mut catalog, &deprecated_path(), "sample_admin")
            .expect_err("non-forwarded name must fail");
        assert!(matches!(err, CompatError::NameNotExported { .. }));

        // The canonical path still serves the full namespace.
        assert!(catalog.resolve(&replacement_path(), "sample_admin").is_ok());
    }

    #[test]
    fn reports_unknown_shim() {
        let (mut router, _sink) = router_with_sink();
        let mut catalog = TaskCatalog::new();
        let err = router
            .ensure_ready(&mut catalog, &deprecated_path())
            .expect_err("unknown shim must fail");
        assert!(matches!(err, CompatError::UnknownShim(_)));
    }

    #[test]
    fn probes_extra_availability_through_shim() {
        let (mut router, _sink) = router_with_sink();
        let mut catalog = TaskCatalog::new();
        router
            .register_shim(sample_spec(Some("sample")))
            .expect("shim registration");

        let probe = router
            .extra_availability(&catalog, &deprecated_path())
            .expect("probe should succeed");
        assert!(!probe.is_available());

        catalog
            .register_module(sample_module())
            .expect("module registration");
        let probe = router
            .extra_availability(&catalog, &deprecated_path())
            .expect("probe should succeed");
        assert!(probe.is_available());
    }
}
