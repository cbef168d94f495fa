// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

use std::time::Duration;

/// Poll interval used while waiting on a real process with a timeout
/// (default 10ms, configurable via `FAKEPROC_POLL_INTERVAL_MS`).
pub fn poll_interval() -> Duration {
    std::env::var("FAKEPROC_POLL_INTERVAL_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(10))
}

/// Shell used for shell-style launches: FAKEPROC_SHELL > sh
pub fn shell() -> String {
    std::env::var("FAKEPROC_SHELL").ok().filter(|s| !s.is_empty()).unwrap_or_else(|| "sh".into())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
