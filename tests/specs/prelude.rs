// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared imports and helpers for the specs.

use std::sync::Once;

pub use fakeproc::{
    pattern, Any, Definition, DispatchError, Dispatcher, Exec, ExecError, FakeChild, Invocation,
    Matcher, ProcessError, Registry, Signal, SpawnOptions, StdinResponse,
};
pub use serial_test::serial;
pub use std::time::Duration;

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once; filter with `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Dispatch through the process-wide dispatcher with text-mode options.
pub fn run(args: &[&str]) -> Result<Box<dyn fakeproc::Process>, DispatchError> {
    init_tracing();
    Dispatcher::global().dispatch(args, &SpawnOptions::new().text(true))
}

/// Stdout of a dispatched process as a string.
pub fn stdout(process: &dyn fakeproc::Process) -> String {
    process.stdout().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
}
