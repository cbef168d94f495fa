// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared by every fakeproc crate.

use std::time::Duration;

use crate::Invocation;

/// Condition raised by a user-supplied callback.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A command pattern that can never be well-formed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("command pattern is empty")]
    Empty,

    #[error("min cannot be greater than max (min={min}, max={max})")]
    InvalidBounds { min: usize, max: usize },

    #[error("pattern `{pattern}` uses more than one Any() wildcard")]
    MultipleWildcards { pattern: String },

    #[error("pattern `{pattern}` uses Program() after the first position")]
    MisplacedProgram { pattern: String },
}

/// Errors surfaced by a process handle (fake or real).
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// The handle did not finish before the deadline. Recoverable: wait again.
    #[error("Command '{command}' timed out after {secs} seconds", secs = .timeout.as_secs_f64())]
    Timeout { command: Invocation, timeout: Duration },

    /// Deferred condition raised inside a callback, stdin callback or signal callback.
    #[error("process callback failed: {0}")]
    Callback(#[source] BoxError),

    #[error("process i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("signal delivery failed: {0}")]
    Signal(#[from] nix::errno::Errno),
}

/// Failure of the real-execution delegate.
#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    #[error("cannot spawn an empty command")]
    EmptyCommand,

    #[error("failed to spawn `{command}`: {source}")]
    Io { command: String, source: std::io::Error },
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
