// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! FIFO queue of definitions registered under one pattern.

use std::collections::VecDeque;

use crate::{Definition, Recorder};

/// A consumable definition and the recorder of the registration it came from.
#[derive(Debug, Clone)]
pub(crate) struct QueuedDefinition {
    pub(crate) definition: Definition,
    pub(crate) recorder: Recorder,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct DefinitionQueue {
    entries: VecDeque<QueuedDefinition>,
}

impl DefinitionQueue {
    /// Append one independent entry per occurrence.
    pub(crate) fn push(&mut self, definition: &Definition, recorder: &Recorder) {
        for _ in 0..definition.occurrences {
            self.entries.push_back(QueuedDefinition {
                definition: definition.clone(),
                recorder: recorder.clone(),
            });
        }
    }

    /// Next entry in registration order. With `retain_last`, the final
    /// entry is handed out again instead of being removed.
    pub(crate) fn take(&mut self, retain_last: bool) -> Option<QueuedDefinition> {
        if retain_last && self.entries.len() == 1 {
            return self.entries.front().cloned();
        }
        self.entries.pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
