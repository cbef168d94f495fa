// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-registration record of the handles a registration produced.

use std::sync::Arc;

use fakeproc_core::CommandPattern;
use parking_lot::Mutex;

use crate::FakeChild;

/// Every [`FakeChild`] built from one registration, in creation order.
///
/// Returned by [`Registry::register`](crate::Registry::register). Clones
/// share the same record.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<FakeChild>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&self, child: FakeChild) {
        self.calls.lock().push(child);
    }

    pub fn calls(&self) -> Vec<FakeChild> {
        self.calls.lock().clone()
    }

    pub fn first_call(&self) -> Option<FakeChild> {
        self.calls.lock().first().cloned()
    }

    pub fn last_call(&self) -> Option<FakeChild> {
        self.calls.lock().last().cloned()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Number of recorded handles whose arguments satisfy `pattern`.
    pub fn matching_count(&self, pattern: impl Into<CommandPattern>) -> usize {
        self.matching_calls(pattern).len()
    }

    pub fn was_called(&self) -> bool {
        !self.calls.lock().is_empty()
    }

    pub fn was_called_with(&self, pattern: impl Into<CommandPattern>) -> bool {
        let pattern = pattern.into();
        self.calls.lock().iter().any(|c| pattern.matches(c.args()))
    }

    pub fn matching_calls(&self, pattern: impl Into<CommandPattern>) -> Vec<FakeChild> {
        let pattern = pattern.into();
        self.calls.lock().iter().filter(|c| pattern.matches(c.args())).cloned().collect()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

#[cfg(test)]
#[path = "recorder_tests.rs"]
mod tests;
