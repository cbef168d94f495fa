// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The observable surface of a launched process, fake or real.
//!
//! Calling code depends only on [`Process`]; whether the handle came from a
//! registered definition or from real execution is invisible to it.

use std::fmt::Debug;
use std::time::Duration;

pub use nix::sys::signal::Signal;

use crate::{Invocation, ProcessError, SpawnError, SpawnOptions, StreamData};

/// Streams collected by [`Process::communicate`]. A stream that was not
/// piped is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Communication {
    pub stdout: Option<StreamData>,
    pub stderr: Option<StreamData>,
}

/// Handle contract shared by the fake handle and the real-process adapter.
pub trait Process: Send + Debug {
    /// The literal arguments as invoked.
    fn args(&self) -> &Invocation;

    fn pid(&self) -> u32;

    /// Snapshot of the stdout buffer, `None` when stdout is not piped.
    fn stdout(&self) -> Option<StreamData>;

    /// Snapshot of the stderr buffer, `None` when stderr is not piped.
    fn stderr(&self) -> Option<StreamData>;

    /// Return code once resolved.
    fn returncode(&self) -> Option<i32>;

    /// Non-blocking completion check.
    fn poll(&mut self) -> Option<i32>;

    /// Block until completion or until `timeout` elapses.
    fn wait(&mut self, timeout: Option<Duration>) -> Result<i32, ProcessError>;

    /// Feed `input` to stdin, wait, and return the accumulated streams.
    fn communicate(
        &mut self,
        input: Option<&[u8]>,
        timeout: Option<Duration>,
    ) -> Result<Communication, ProcessError>;

    fn send_signal(&mut self, signal: Signal) -> Result<(), ProcessError>;

    fn terminate(&mut self) -> Result<(), ProcessError> {
        self.send_signal(Signal::SIGTERM)
    }

    fn kill(&mut self) -> Result<(), ProcessError> {
        self.send_signal(Signal::SIGKILL)
    }

    /// Every signal delivered to this handle, in order, duplicates kept.
    fn received_signals(&self) -> Vec<Signal>;
}

/// Real-execution delegate: runs an invocation for real and hands back a
/// handle with the same observable surface.
pub trait Spawner: Send + Sync {
    fn spawn(
        &self,
        invocation: &Invocation,
        options: &SpawnOptions,
    ) -> Result<Box<dyn Process>, SpawnError>;
}
