// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatcher: resolves invocations against the stack of active registries.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, LazyLock};

use fakeproc_adapters::SystemSpawner;
use fakeproc_core::{CommandPattern, Invocation, Process, SpawnError, SpawnOptions, Spawner};
use parking_lot::Mutex;

use crate::queue::QueuedDefinition;
use crate::registry::Snapshot;
use crate::{FakeChild, Registry, Scope};

static GLOBAL: LazyLock<Dispatcher> = LazyLock::new(Dispatcher::new);

/// Synthetic pids, unique within the process. The first handed out is 1.
static NEXT_PID: AtomicU32 = AtomicU32::new(1);

fn next_pid() -> u32 {
    NEXT_PID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("The process '{command}' was not registered.")]
    NotRegistered { command: Invocation },

    #[error(transparent)]
    Spawn(#[from] SpawnError),
}

struct Frame {
    registry: Registry,
    /// Outer registries as they were when this frame was pushed.
    restore: Vec<(Registry, Snapshot)>,
}

#[derive(Default)]
struct DispatcherState {
    frames: Vec<Frame>,
    calls: Vec<Invocation>,
}

enum Resolution {
    Fake(FakeChild),
    Real,
}

/// Stack of active registries plus a log of every dispatched invocation.
///
/// [`Dispatcher::global`] is the process-wide instance used by
/// [`Registry::enter`] and [`Exec`](crate::Exec); independent instances
/// behave identically but share nothing except the pid counter.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Mutex<DispatcherState>>,
    spawner: Arc<dyn Spawner>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Dispatcher whose real-execution delegate launches OS processes.
    pub fn new() -> Self {
        Self::with_spawner(SystemSpawner)
    }

    pub fn with_spawner(spawner: impl Spawner + 'static) -> Self {
        Self { inner: Arc::new(Mutex::new(DispatcherState::default())), spawner: Arc::new(spawner) }
    }

    pub fn global() -> &'static Dispatcher {
        &GLOBAL
    }

    /// Push a fresh registry and return its scope.
    pub fn context(&self) -> Scope {
        Registry::new().enter_on(self)
    }

    /// Number of active registries.
    pub fn depth(&self) -> usize {
        self.inner.lock().frames.len()
    }

    pub fn is_active(&self) -> bool {
        self.depth() > 0
    }

    /// Every invocation dispatched since the outermost registry was entered.
    pub fn calls(&self) -> Vec<Invocation> {
        self.inner.lock().calls.clone()
    }

    pub fn call_count(&self, pattern: impl Into<CommandPattern>) -> usize {
        let pattern = pattern.into();
        self.inner.lock().calls.iter().filter(|inv| pattern.matches(inv)).count()
    }

    /// Resolve `invocation` to a fake handle or a real process.
    ///
    /// With no active registry the invocation runs for real and is not
    /// logged.
    pub fn dispatch(
        &self,
        invocation: impl Into<Invocation>,
        options: &SpawnOptions,
    ) -> Result<Box<dyn Process>, DispatchError> {
        let invocation = invocation.into();
        match self.resolve(&invocation, options)? {
            Resolution::Fake(child) => Ok(Box::new(child)),
            Resolution::Real => {
                tracing::info!(command = %invocation, "dispatching to real process");
                Ok(self.spawner.spawn(&invocation, options)?)
            }
        }
    }

    /// Log, match, consume and record in one critical section, so recorders
    /// list handles in pid order.
    fn resolve(
        &self,
        invocation: &Invocation,
        options: &SpawnOptions,
    ) -> Result<Resolution, DispatchError> {
        let mut state = self.inner.lock();
        if state.frames.is_empty() {
            return Ok(Resolution::Real);
        }

        state.calls.push(invocation.clone());
        for frame in &state.frames {
            frame.registry.lock().calls.push(invocation.clone());
        }

        for frame in state.frames.iter().rev() {
            let mut registry = frame.registry.lock();

            let passed = registry
                .pass_through
                .iter()
                .position(|(pattern, remaining)| *remaining > 0 && pattern.matches(invocation));
            if let Some(index) = passed {
                let exhausted = match registry.pass_through.get_index_mut(index) {
                    Some((_, remaining)) => {
                        *remaining -= 1;
                        *remaining == 0
                    }
                    None => false,
                };
                if exhausted {
                    registry.pass_through.shift_remove_index(index);
                }
                next_pid();
                return Ok(Resolution::Real);
            }

            let retain_last = registry.retain_last;
            let hit = registry
                .queues
                .iter_mut()
                .enumerate()
                .filter(|(_, (pattern, _))| pattern.matches(invocation))
                .find_map(|(index, (_, queue))| queue.take(retain_last).map(|e| (index, e)));
            if let Some((index, entry)) = hit {
                if registry.queues.get_index(index).is_some_and(|(_, q)| q.is_empty()) {
                    registry.queues.shift_remove_index(index);
                }
                drop(registry);
                return Ok(Resolution::Fake(start(invocation, entry, options)));
            }
        }

        let allow = state.frames.last().is_some_and(|f| f.registry.lock().allow_unregistered);
        if allow {
            next_pid();
            return Ok(Resolution::Real);
        }
        tracing::warn!(command = %invocation, "unregistered command");
        Err(DispatchError::NotRegistered { command: invocation.clone() })
    }

    pub(crate) fn push(&self, registry: Registry) {
        let mut state = self.inner.lock();
        if state.frames.is_empty() {
            state.calls.clear();
        }
        let restore: Vec<_> =
            state.frames.iter().map(|f| (f.registry.clone(), f.registry.snapshot())).collect();
        state.frames.push(Frame { registry, restore });
        tracing::debug!(depth = state.frames.len(), "registry entered");
    }

    pub(crate) fn pop(&self, registry: &Registry) {
        let mut state = self.inner.lock();
        let Some(index) = state.frames.iter().rposition(|f| f.registry.same(registry)) else {
            return;
        };
        let frame = state.frames.remove(index);
        for (outer, snapshot) in frame.restore {
            if state.frames.iter().any(|f| f.registry.same(&outer)) {
                outer.restore(snapshot);
            }
        }
        if !state.frames.iter().any(|f| f.registry.same(registry)) {
            registry.reset();
        }
        tracing::debug!(depth = state.frames.len(), "registry exited");
    }
}

fn start(invocation: &Invocation, entry: QueuedDefinition, options: &SpawnOptions) -> FakeChild {
    let pid = next_pid();
    tracing::debug!(command = %invocation, pid, "dispatching to fake process");
    let child = FakeChild::start(invocation.clone(), pid, entry.definition, options);
    entry.recorder.record(child.clone());
    child
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("Dispatcher")
            .field("depth", &state.frames.len())
            .field("calls", &state.calls.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
