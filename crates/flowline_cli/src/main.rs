//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `flowline_core` linkage.
//! - List the canonical modules registered in this build.
//! - Probe the deprecated task paths this build answers for.

use flowline_core::tasks::databricks::DATABRICKS_COMPAT_PATH;
use flowline_core::tasks::mysql::MYSQL_COMPAT_PATH;
use flowline_core::{with_task_library, ModulePath};

fn main() {
    println!("flowline_core version={}", flowline_core::core_version());
    list_modules();
    probe(DATABRICKS_COMPAT_PATH, "databricks_submit_run");
    probe(MYSQL_COMPAT_PATH, "mysql_execute");
    probe_extra(MYSQL_COMPAT_PATH);
}

fn list_modules() {
    let paths = with_task_library(|library| library.catalog().registered_paths());
    let joined = paths
        .iter()
        .map(|path| path.as_str())
        .collect::<Vec<_>>()
        .join(",");
    println!("modules={joined}");
}

fn probe(path: &str, name: &str) {
    let parsed = match ModulePath::parse(path) {
        Ok(parsed) => parsed,
        Err(err) => {
            println!("{path}::{name} error={err}");
            return;
        }
    };

    match with_task_library(|library| library.resolve(&parsed, name)) {
        Ok(task) => println!("{path}::{name} ok summary={:?}", task.summary()),
        Err(err) => println!("{path}::{name} unavailable error={err}"),
    }
}

fn probe_extra(path: &str) {
    let parsed = match ModulePath::parse(path) {
        Ok(parsed) => parsed,
        Err(err) => {
            println!("{path} error={err}");
            return;
        }
    };

    let probed = with_task_library(|library| {
        library
            .router()
            .extra_availability(library.catalog(), &parsed)
            .map(|availability| availability.is_available())
    });
    match probed {
        Ok(available) => println!("{path} extra_available={available}"),
        Err(err) => println!("{path} error={err}"),
    }
}
