// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real-execution delegate over `std::process`.

use std::io::{ErrorKind, Read, Write};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use fakeproc_core::{
    normalize_newlines, Communication, Invocation, Process, ProcessError, Redirect, Signal,
    SpawnError, SpawnOptions, Spawner, StderrRedirect, StreamData,
};
use nix::errno::Errno;
use nix::unistd::Pid;
use parking_lot::Mutex;

use crate::env;

/// Spawner that launches real OS processes.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemSpawner;

impl Spawner for SystemSpawner {
    fn spawn(
        &self,
        invocation: &Invocation,
        options: &SpawnOptions,
    ) -> Result<Box<dyn Process>, SpawnError> {
        Ok(Box::new(SystemProcess::spawn(invocation, options)?))
    }
}

/// A real child process behind the [`Process`] contract.
///
/// Piped streams are drained by background readers from the moment of
/// launch so a chatty child never blocks on a full pipe.
#[derive(Debug)]
pub struct SystemProcess {
    args: Invocation,
    child: Child,
    text: bool,
    universal_newlines: bool,
    merge_stderr: bool,
    stdout: Option<Capture>,
    stderr: Option<Capture>,
    returncode: Option<i32>,
    signals: Vec<Signal>,
}

impl SystemProcess {
    pub fn spawn(invocation: &Invocation, options: &SpawnOptions) -> Result<Self, SpawnError> {
        let mut cmd = build_command(invocation, options)?;
        let mut child = cmd
            .spawn()
            .map_err(|source| SpawnError::Io { command: invocation.to_string(), source })?;

        let pid = child.id();
        tracing::info!(command = %invocation, pid, "spawned real process");

        let stdout = child.stdout.take().map(|s| Capture::start(s, format!("stdout-{pid}")));
        let stderr = child.stderr.take().map(|s| Capture::start(s, format!("stderr-{pid}")));

        Ok(Self {
            args: invocation.clone(),
            child,
            text: options.is_text_mode(),
            universal_newlines: options.universal_newlines,
            merge_stderr: options.stderr == StderrRedirect::Stdout,
            stdout,
            stderr,
            returncode: None,
            signals: Vec::new(),
        })
    }

    fn finish(&mut self, status: ExitStatus) -> i32 {
        let code = exit_code(status);
        self.returncode = Some(code);
        if let Some(capture) = self.stdout.as_mut() {
            capture.join();
        }
        if let Some(capture) = self.stderr.as_mut() {
            capture.join();
        }
        tracing::debug!(command = %self.args, code, "real process exited");
        code
    }

    fn to_stream(&self, raw: Vec<u8>) -> StreamData {
        let data = if self.universal_newlines { normalize_newlines(&raw) } else { raw };
        StreamData::from_buffer(&data, self.text)
    }

    fn write_stdin(stdin: Option<ChildStdin>, input: Option<&[u8]>) -> Result<(), ProcessError> {
        let (Some(mut stdin), Some(input)) = (stdin, input) else {
            return Ok(());
        };
        match stdin.write_all(input) {
            // The child may exit without reading its input.
            Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
            other => Ok(other?),
        }
    }
}

impl Process for SystemProcess {
    fn args(&self) -> &Invocation {
        &self.args
    }

    fn pid(&self) -> u32 {
        self.child.id()
    }

    fn stdout(&self) -> Option<StreamData> {
        let mut data = self.stdout.as_ref()?.snapshot();
        if self.merge_stderr {
            if let Some(stderr) = &self.stderr {
                data.extend(stderr.snapshot());
            }
        }
        Some(self.to_stream(data))
    }

    fn stderr(&self) -> Option<StreamData> {
        if self.merge_stderr {
            return None;
        }
        self.stderr.as_ref().map(|c| self.to_stream(c.snapshot()))
    }

    fn returncode(&self) -> Option<i32> {
        self.returncode
    }

    fn poll(&mut self) -> Option<i32> {
        if self.returncode.is_some() {
            return self.returncode;
        }
        match self.child.try_wait() {
            Ok(Some(status)) => Some(self.finish(status)),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(command = %self.args, error = %e, "poll failed");
                None
            }
        }
    }

    fn wait(&mut self, timeout: Option<Duration>) -> Result<i32, ProcessError> {
        if let Some(code) = self.returncode {
            return Ok(code);
        }
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t).map(|d| (t, d)));
        let status = match deadline {
            None => self.child.wait()?,
            Some((timeout, deadline)) => {
                let interval = env::poll_interval();
                loop {
                    if let Some(status) = self.child.try_wait()? {
                        break status;
                    }
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(ProcessError::Timeout { command: self.args.clone(), timeout });
                    }
                    std::thread::sleep(interval.min(deadline - now));
                }
            }
        };
        Ok(self.finish(status))
    }

    fn communicate(
        &mut self,
        input: Option<&[u8]>,
        timeout: Option<Duration>,
    ) -> Result<Communication, ProcessError> {
        // Taking stdin closes it once the input is written.
        Self::write_stdin(self.child.stdin.take(), input)?;
        self.wait(timeout)?;
        Ok(Communication { stdout: self.stdout(), stderr: self.stderr() })
    }

    fn send_signal(&mut self, signal: Signal) -> Result<(), ProcessError> {
        self.signals.push(signal);
        // Never signal a pid that has already been reaped.
        if self.poll().is_some() {
            return Ok(());
        }
        let raw = i32::try_from(self.child.id()).map_err(|_| Errno::ESRCH)?;
        nix::sys::signal::kill(Pid::from_raw(raw), signal)?;
        tracing::debug!(command = %self.args, ?signal, "signal delivered");
        Ok(())
    }

    fn received_signals(&self) -> Vec<Signal> {
        self.signals.clone()
    }
}

fn build_command(invocation: &Invocation, options: &SpawnOptions) -> Result<Command, SpawnError> {
    let mut cmd = if options.shell {
        let mut c = Command::new(env::shell());
        c.arg("-c").arg(invocation.to_string());
        c
    } else {
        let (program, rest) = invocation.tokens().split_first().ok_or(SpawnError::EmptyCommand)?;
        let mut c = Command::new(program);
        c.args(rest);
        c
    };

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }
    cmd.envs(options.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    cmd.stdin(stdio(options.stdin));
    cmd.stdout(stdio(options.stdout));
    cmd.stderr(match options.stderr {
        StderrRedirect::Pipe | StderrRedirect::Stdout => Stdio::piped(),
        StderrRedirect::Null => Stdio::null(),
        StderrRedirect::Inherit => Stdio::inherit(),
    });
    Ok(cmd)
}

fn stdio(redirect: Redirect) -> Stdio {
    match redirect {
        Redirect::Pipe => Stdio::piped(),
        Redirect::Null => Stdio::null(),
        Redirect::Inherit => Stdio::inherit(),
    }
}

/// Exit code, negated signal number when the child was killed by a signal.
fn exit_code(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return -sig;
        }
    }
    status.code().unwrap_or(-1)
}

/// Background reader accumulating one output pipe.
#[derive(Debug)]
struct Capture {
    buffer: Arc<Mutex<Vec<u8>>>,
    reader: Option<JoinHandle<()>>,
}

impl Capture {
    fn start<R: Read + Send + 'static>(mut source: R, name: String) -> Self {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buffer);
        let reader = std::thread::Builder::new().name(name).spawn(move || {
            let mut chunk = [0u8; 8192];
            loop {
                match source.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => sink.lock().extend_from_slice(&chunk[..n]),
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => {
                        tracing::debug!(error = %e, "stream reader stopped");
                        break;
                    }
                }
            }
        });
        match reader {
            Ok(handle) => Self { buffer, reader: Some(handle) },
            Err(e) => {
                tracing::warn!(error = %e, "could not start stream reader");
                Self { buffer, reader: None }
            }
        }
    }

    fn snapshot(&self) -> Vec<u8> {
        self.buffer.lock().clone()
    }

    fn join(&mut self) {
        if let Some(handle) = self.reader.take() {
            if handle.join().is_err() {
                tracing::warn!("stream reader panicked");
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use fakeproc_core::{
        Communication, Invocation, Process, ProcessError, Signal, SpawnError, SpawnOptions,
        Spawner, StreamData,
    };
    use parking_lot::Mutex;

    static NEXT_STUB_PID: AtomicU32 = AtomicU32::new(90_000);

    /// Recorded real-execution request
    #[derive(Debug, Clone)]
    pub struct SpawnCall {
        pub invocation: Invocation,
        pub options: SpawnOptions,
    }

    struct FakeSpawnerState {
        calls: Vec<SpawnCall>,
        returncode: i32,
        stdout: Vec<u8>,
        fail: bool,
    }

    /// Fake real-execution delegate for testing
    #[derive(Clone)]
    pub struct FakeSpawner {
        inner: Arc<Mutex<FakeSpawnerState>>,
    }

    impl Default for FakeSpawner {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeSpawnerState {
                    calls: Vec::new(),
                    returncode: 0,
                    stdout: Vec::new(),
                    fail: false,
                })),
            }
        }
    }

    impl FakeSpawner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every stub exit with `returncode` after printing `stdout`.
        pub fn with_output(self, returncode: i32, stdout: impl Into<Vec<u8>>) -> Self {
            {
                let mut inner = self.inner.lock();
                inner.returncode = returncode;
                inner.stdout = stdout.into();
            }
            self
        }

        /// Make every spawn attempt fail as if the program were missing.
        pub fn failing(self) -> Self {
            self.inner.lock().fail = true;
            self
        }

        /// Get all recorded spawn requests
        pub fn calls(&self) -> Vec<SpawnCall> {
            self.inner.lock().calls.clone()
        }
    }

    impl Spawner for FakeSpawner {
        fn spawn(
            &self,
            invocation: &Invocation,
            options: &SpawnOptions,
        ) -> Result<Box<dyn Process>, SpawnError> {
            let mut inner = self.inner.lock();
            inner.calls.push(SpawnCall { invocation: invocation.clone(), options: options.clone() });
            if inner.fail {
                return Err(SpawnError::Io {
                    command: invocation.to_string(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                });
            }
            Ok(Box::new(StubProcess {
                args: invocation.clone(),
                pid: NEXT_STUB_PID.fetch_add(1, Ordering::Relaxed),
                returncode: inner.returncode,
                stdout: inner.stdout.clone(),
                signals: Vec::new(),
            }))
        }
    }

    /// Already-finished process produced by [`FakeSpawner`]
    #[derive(Debug)]
    pub struct StubProcess {
        args: Invocation,
        pid: u32,
        returncode: i32,
        stdout: Vec<u8>,
        signals: Vec<Signal>,
    }

    impl Process for StubProcess {
        fn args(&self) -> &Invocation {
            &self.args
        }

        fn pid(&self) -> u32 {
            self.pid
        }

        fn stdout(&self) -> Option<StreamData> {
            Some(StreamData::Bytes(self.stdout.clone()))
        }

        fn stderr(&self) -> Option<StreamData> {
            Some(StreamData::Bytes(Vec::new()))
        }

        fn returncode(&self) -> Option<i32> {
            Some(self.returncode)
        }

        fn poll(&mut self) -> Option<i32> {
            Some(self.returncode)
        }

        fn wait(&mut self, _timeout: Option<Duration>) -> Result<i32, ProcessError> {
            Ok(self.returncode)
        }

        fn communicate(
            &mut self,
            _input: Option<&[u8]>,
            _timeout: Option<Duration>,
        ) -> Result<Communication, ProcessError> {
            Ok(Communication { stdout: self.stdout(), stderr: self.stderr() })
        }

        fn send_signal(&mut self, signal: Signal) -> Result<(), ProcessError> {
            self.signals.push(signal);
            Ok(())
        }

        fn received_signals(&self) -> Vec<Signal> {
            self.signals.clone()
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSpawner, SpawnCall, StubProcess};

#[cfg(test)]
#[path = "system_tests.rs"]
mod tests;
