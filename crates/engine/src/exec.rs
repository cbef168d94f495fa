// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interception boundary: the launch API calling code uses instead of
//! `std::process::Command`.

use std::ffi::OsStr;
use std::path::PathBuf;
use std::time::Duration;

use fakeproc_core::{
    Invocation, Process, ProcessError, Redirect, SpawnOptions, StderrRedirect, StreamData,
};

use crate::{DispatchError, Dispatcher};

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("Command '{command}' returned non-zero exit status {code}.")]
    NonZeroExit {
        command: Invocation,
        code: i32,
        stdout: Option<StreamData>,
        stderr: Option<StreamData>,
    },
}

/// Collected result of a finished launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub returncode: i32,
    pub stdout: Option<StreamData>,
    pub stderr: Option<StreamData>,
}

impl Output {
    pub fn success(&self) -> bool {
        self.returncode == 0
    }
}

/// Launch builder.
///
/// Routes through [`Dispatcher::global`] unless another dispatcher is given
/// with [`via`](Self::via). Whether the result is a fake or a real process
/// is invisible to the caller.
///
/// ```ignore
/// let out = Exec::new("git").args(["rev-parse", "HEAD"]).text(true).check_output()?;
/// ```
#[derive(Debug, Clone)]
pub struct Exec {
    invocation: Invocation,
    options: SpawnOptions,
    input: Option<Vec<u8>>,
    timeout: Option<Duration>,
    dispatcher: Option<Dispatcher>,
}

impl Exec {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self::from_invocation(Invocation::new([program]), SpawnOptions::default())
    }

    /// Shell-style command line; matched as its space-separated tokens and
    /// run through the shell when it goes to real execution.
    pub fn shell(line: &str) -> Self {
        Self::from_invocation(Invocation::from_line(line), SpawnOptions::new().shell(true))
    }

    fn from_invocation(invocation: Invocation, options: SpawnOptions) -> Self {
        Self { invocation, options, input: None, timeout: None, dispatcher: None }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.invocation.push(arg);
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self.invocation.push(arg);
        }
        self
    }

    pub fn stdin(mut self, redirect: Redirect) -> Self {
        self.options.stdin = redirect;
        self
    }

    pub fn stdout(mut self, redirect: Redirect) -> Self {
        self.options.stdout = redirect;
        self
    }

    pub fn stderr(mut self, redirect: StderrRedirect) -> Self {
        self.options.stderr = redirect;
        self
    }

    pub fn text(mut self, text: bool) -> Self {
        self.options.text = text;
        self
    }

    pub fn universal_newlines(mut self, enabled: bool) -> Self {
        self.options.universal_newlines = enabled;
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.env.push((key.into(), value.into()));
        self
    }

    /// Bytes written to stdin by [`output`](Self::output) and friends.
    pub fn input(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn via(mut self, dispatcher: &Dispatcher) -> Self {
        self.dispatcher = Some(dispatcher.clone());
        self
    }

    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    pub fn options(&self) -> &SpawnOptions {
        &self.options
    }

    pub fn spawn(&self) -> Result<Box<dyn Process>, ExecError> {
        let dispatcher = match &self.dispatcher {
            Some(dispatcher) => dispatcher,
            None => Dispatcher::global(),
        };
        Ok(dispatcher.dispatch(self.invocation.clone(), &self.options)?)
    }

    /// Launch, feed the configured input, wait, and collect both streams.
    pub fn output(&self) -> Result<Output, ExecError> {
        let mut process = self.spawn()?;
        let streams = process.communicate(self.input.as_deref(), self.timeout)?;
        let returncode = process.wait(self.timeout)?;
        Ok(Output { returncode, stdout: streams.stdout, stderr: streams.stderr })
    }

    /// Launch and wait for the return code.
    pub fn status(&self) -> Result<i32, ExecError> {
        let mut process = self.spawn()?;
        Ok(process.wait(self.timeout)?)
    }

    /// Like [`output`](Self::output), failing on a non-zero return code.
    pub fn check_output(&self) -> Result<Output, ExecError> {
        let output = self.output()?;
        if !output.success() {
            return Err(ExecError::NonZeroExit {
                command: self.invocation.clone(),
                code: output.returncode,
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }
        Ok(output)
    }

    pub fn check_status(&self) -> Result<(), ExecError> {
        let code = self.status()?;
        if code != 0 {
            return Err(ExecError::NonZeroExit {
                command: self.invocation.clone(),
                code,
                stdout: None,
                stderr: None,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod tests;
