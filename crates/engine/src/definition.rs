// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Definitions: one simulated outcome for a matched invocation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use fakeproc_core::{BoxError, Content, PatternError, Signal};
use serde_json::{Map, Value};

use crate::handle::ProcessControl;

/// Keyword arguments handed to a completion callback.
pub type CallbackArgs = Map<String, Value>;

/// Runs on the completion worker; may mutate the handle through the control.
pub type Callback =
    Arc<dyn Fn(&ProcessControl, &CallbackArgs) -> Result<(), BoxError> + Send + Sync>;

/// Inspects raw stdin input and returns content to append.
pub type StdinCallback = Arc<dyn Fn(&[u8]) -> Result<StdinResponse, BoxError> + Send + Sync>;

/// Runs synchronously for every signal sent to the handle.
pub type SignalCallback =
    Arc<dyn Fn(&ProcessControl, Signal) -> Result<(), BoxError> + Send + Sync>;

/// Content a stdin callback asks to append to the output buffers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StdinResponse {
    pub stdout: Option<Content>,
    pub stderr: Option<Content>,
}

impl StdinResponse {
    pub fn new() -> Self {
        Self::default()
    }

    fakeproc_core::setters! {
        option {
            stdout: Content,
            stderr: Content,
        }
    }
}

/// Registration rejected before anything was queued.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("occurrences must be at least 1")]
    ZeroOccurrences,
}

/// Simulated outcome of one invocation.
///
/// Built with chained setters and handed to
/// [`Registry::register`](crate::Registry::register):
///
/// ```ignore
/// let def = Definition::new()
///     .stdout(["line1", "line2"])
///     .returncode(1)
///     .delay(Duration::from_millis(50));
/// ```
#[derive(Clone)]
pub struct Definition {
    pub(crate) stdout: Option<Content>,
    pub(crate) stderr: Option<Content>,
    pub(crate) returncode: i32,
    pub(crate) delay: Option<Duration>,
    pub(crate) callback: Option<Callback>,
    pub(crate) callback_args: CallbackArgs,
    pub(crate) stdin_callback: Option<StdinCallback>,
    pub(crate) signal_callback: Option<SignalCallback>,
    pub(crate) occurrences: usize,
}

impl Default for Definition {
    fn default() -> Self {
        Self {
            stdout: None,
            stderr: None,
            returncode: 0,
            delay: None,
            callback: None,
            callback_args: CallbackArgs::new(),
            stdin_callback: None,
            signal_callback: None,
            occurrences: 1,
        }
    }
}

impl Definition {
    pub fn new() -> Self {
        Self::default()
    }

    fakeproc_core::setters! {
        set {
            returncode: i32,
            occurrences: usize,
        }
        option {
            stdout: Content,
            stderr: Content,
            delay: Duration,
        }
    }

    /// Run `f` on the completion worker before the handle turns terminal.
    pub fn callback<F>(mut self, f: F) -> Self
    where
        F: Fn(&ProcessControl, &CallbackArgs) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(f));
        self
    }

    pub fn callback_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.callback_args.insert(key.into(), value.into());
        self
    }

    pub fn stdin_callback<F>(mut self, f: F) -> Self
    where
        F: Fn(&[u8]) -> Result<StdinResponse, BoxError> + Send + Sync + 'static,
    {
        self.stdin_callback = Some(Arc::new(f));
        self
    }

    pub fn signal_callback<F>(mut self, f: F) -> Self
    where
        F: Fn(&ProcessControl, Signal) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.signal_callback = Some(Arc::new(f));
        self
    }

    /// Whether construction needs a background completion worker.
    pub(crate) fn needs_worker(&self) -> bool {
        self.delay.is_some() || self.callback.is_some()
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("stdout", &self.stdout)
            .field("stderr", &self.stderr)
            .field("returncode", &self.returncode)
            .field("delay", &self.delay)
            .field("callback", &self.callback.is_some())
            .field("callback_args", &self.callback_args)
            .field("stdin_callback", &self.stdin_callback.is_some())
            .field("signal_callback", &self.signal_callback.is_some())
            .field("occurrences", &self.occurrences)
            .finish()
    }
}

#[cfg(test)]
#[path = "definition_tests.rs"]
mod tests;
