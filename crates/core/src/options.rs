// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Options bag passed along with every launch attempt.

use std::path::PathBuf;

/// Where a standard stream goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Redirect {
    /// Capture into a buffer readable from the handle.
    #[default]
    Pipe,
    /// Discard.
    Null,
    /// Share the launching process' own stream.
    Inherit,
}

/// Where standard error goes; it may additionally be merged into stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StderrRedirect {
    #[default]
    Pipe,
    Null,
    Inherit,
    /// Append to the stdout buffer instead of keeping a separate one.
    Stdout,
}

/// Launch options. Streams default to [`Redirect::Pipe`] so a handle's
/// output is always observable unless the caller opts out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnOptions {
    pub stdin: Redirect,
    pub stdout: Redirect,
    pub stderr: StderrRedirect,
    pub text: bool,
    pub universal_newlines: bool,
    /// Run the space-joined invocation through a shell (real execution only).
    pub shell: bool,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl SpawnOptions {
    pub fn new() -> Self {
        Self::default()
    }

    crate::setters! {
        set {
            stdin: Redirect,
            stdout: Redirect,
            stderr: StderrRedirect,
            text: bool,
            universal_newlines: bool,
            shell: bool,
        }
        option {
            cwd: PathBuf,
        }
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Text mode is on when either `text` or `universal_newlines` is set.
    pub fn is_text_mode(&self) -> bool {
        self.text || self.universal_newlines
    }
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;
