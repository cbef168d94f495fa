// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registries: one stack frame of registrations and policy flags.

use std::ops::Deref;
use std::sync::Arc;

use fakeproc_core::{CommandPattern, Invocation};
use indexmap::IndexMap;
use parking_lot::{Mutex, MutexGuard};

use crate::queue::DefinitionQueue;
use crate::{Definition, DefinitionError, Dispatcher, Recorder};

#[derive(Debug, Default)]
pub(crate) struct RegistryState {
    /// Keyed in registration order; the first matching pattern wins.
    pub(crate) queues: IndexMap<CommandPattern, DefinitionQueue>,
    /// Remaining real-execution occurrences per pattern.
    pub(crate) pass_through: IndexMap<CommandPattern, usize>,
    pub(crate) allow_unregistered: bool,
    pub(crate) retain_last: bool,
    pub(crate) calls: Vec<Invocation>,
}

/// Queues and pass-through counts of a registry at one point in time.
#[derive(Debug, Clone)]
pub(crate) struct Snapshot {
    queues: IndexMap<CommandPattern, DefinitionQueue>,
    pass_through: IndexMap<CommandPattern, usize>,
}

/// Registrations and scope-local policy.
///
/// A registry does nothing until it is entered on a [`Dispatcher`]; the
/// returned [`Scope`] pops it again when dropped.
///
/// ```ignore
/// let registry = Registry::new();
/// let recorder = registry.register("git status", Definition::new().stdout("clean"))?;
/// let _scope = registry.enter();
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry {
    state: Arc<Mutex<RegistryState>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `definition.occurrences` independent copies of `definition`
    /// under `pattern`. Malformed patterns are rejected here, never at
    /// match time.
    pub fn register(
        &self,
        pattern: impl Into<CommandPattern>,
        definition: Definition,
    ) -> Result<Recorder, DefinitionError> {
        let pattern = pattern.into();
        pattern.validate()?;
        if definition.occurrences == 0 {
            return Err(DefinitionError::ZeroOccurrences);
        }

        let recorder = Recorder::new();
        tracing::debug!(%pattern, occurrences = definition.occurrences, "registered definition");
        self.lock().queues.entry(pattern).or_default().push(&definition, &recorder);
        Ok(recorder)
    }

    /// Let the next `occurrences` matches of `pattern` run for real.
    pub fn pass_through(
        &self,
        pattern: impl Into<CommandPattern>,
        occurrences: usize,
    ) -> Result<(), DefinitionError> {
        let pattern = pattern.into();
        pattern.validate()?;
        if occurrences == 0 {
            return Err(DefinitionError::ZeroOccurrences);
        }
        *self.lock().pass_through.entry(pattern).or_default() += occurrences;
        Ok(())
    }

    pub fn allow_unregistered(&self, allow: bool) {
        self.lock().allow_unregistered = allow;
    }

    /// Keep handing out the last definition of each queue instead of
    /// exhausting it.
    pub fn retain_last(&self, keep: bool) {
        self.lock().retain_last = keep;
    }

    /// Literal invocations dispatched while this registry was active.
    pub fn calls(&self) -> Vec<Invocation> {
        self.lock().calls.clone()
    }

    /// Number of logged invocations satisfying `pattern`; wildcards allowed.
    pub fn call_count(&self, pattern: impl Into<CommandPattern>) -> usize {
        let pattern = pattern.into();
        self.lock().calls.iter().filter(|inv| pattern.matches(inv)).count()
    }

    /// Definitions still queued under exactly `pattern`.
    pub fn remaining(&self, pattern: impl Into<CommandPattern>) -> usize {
        let pattern = pattern.into();
        self.lock().queues.get(&pattern).map_or(0, DefinitionQueue::len)
    }

    /// Push onto the process-wide dispatcher.
    pub fn enter(&self) -> Scope {
        self.enter_on(Dispatcher::global())
    }

    pub fn enter_on(&self, dispatcher: &Dispatcher) -> Scope {
        dispatcher.push(self.clone());
        Scope { registry: self.clone(), dispatcher: dispatcher.clone() }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock()
    }

    pub(crate) fn same(&self, other: &Registry) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        let state = self.lock();
        Snapshot { queues: state.queues.clone(), pass_through: state.pass_through.clone() }
    }

    pub(crate) fn restore(&self, snapshot: Snapshot) {
        let mut state = self.lock();
        state.queues = snapshot.queues;
        state.pass_through = snapshot.pass_through;
    }

    /// Forget everything scoped to this registry.
    pub(crate) fn reset(&self) {
        *self.lock() = RegistryState::default();
    }
}

/// An active registry. Dropping the scope pops the registry from its
/// dispatcher, even while unwinding.
#[must_use = "the registry is popped as soon as the scope is dropped"]
#[derive(Debug)]
pub struct Scope {
    registry: Registry,
    dispatcher: Dispatcher,
}

impl Scope {
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Enter a fresh registry nested above this one.
    pub fn context(&self) -> Scope {
        Registry::new().enter_on(&self.dispatcher)
    }
}

impl Deref for Scope {
    type Target = Registry;

    fn deref(&self) -> &Registry {
        &self.registry
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.dispatcher.pop(&self.registry);
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
