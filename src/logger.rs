//! Structured logging setup: an `AtomicBool`-guarded `init`/`init_debug`
//! pair, single `flexi_logger` backend rather than a multi-backend
//! `cfg_if` dispatch since this crate targets one platform.

use std::sync::atomic::{AtomicBool, Ordering};

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Installs the `flexi_logger` backend at `info` level. Safe to call
/// more than once; only the first call takes effect.
pub fn init() {
    install(flexi_logger::LogSpecification::info());
}

/// Same as `init`, but at `debug` level -- used by the launcher's
/// `--debug`-equivalent no-op slot today, and by tests that want to see
/// the interpreter's per-opcode trace.
pub fn init_debug() {
    install(flexi_logger::LogSpecification::debug());
}

fn install(spec: flexi_logger::LogSpecification) {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }
    if let Err(error) = flexi_logger::Logger::with(spec).start() {
        eprintln!("failed to start logger: {error}");
    }
}
