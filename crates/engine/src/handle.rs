// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake process handle.
//!
//! A [`FakeChild`] moves through `Created → Completing → Terminal`. Handles
//! without a delay or callback finish synchronously during construction;
//! the rest hand their completion to a named background worker thread that
//! sleeps, runs the callback, then flips the handle to terminal and wakes
//! every waiter.

use std::fmt;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use fakeproc_core::{
    BoxError, Communication, Content, Invocation, Process, ProcessError, Redirect, Signal,
    SpawnOptions, StderrRedirect, StreamData,
};
use parking_lot::{Condvar, Mutex};

use crate::definition::{Callback, CallbackArgs, Definition, SignalCallback, StdinCallback};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    Completing,
    Terminal,
}

struct HandleState {
    stdout: Option<Vec<u8>>,
    stderr: Option<Vec<u8>>,
    configured: i32,
    /// Set by a callback; wins over `configured`.
    override_code: Option<i32>,
    returncode: Option<i32>,
    phase: Phase,
    signals: Vec<Signal>,
    deferred: Option<BoxError>,
}

struct Shared {
    args: Invocation,
    pid: u32,
    text: bool,
    universal_newlines: bool,
    merge_stderr: bool,
    state: Mutex<HandleState>,
    finished: Condvar,
    /// Serializes signal delivery (log append + callback).
    signal_lock: Mutex<()>,
    stdin_callback: Option<StdinCallback>,
    signal_callback: Option<SignalCallback>,
}

#[derive(Clone)]
struct Completion {
    delay: Option<Duration>,
    callback: Option<(Callback, CallbackArgs)>,
}

impl Shared {
    fn defer(&self, err: BoxError) {
        let mut state = self.state.lock();
        if state.deferred.is_some() {
            tracing::warn!(command = %self.args, pid = self.pid, error = %err, "dropping secondary callback error");
        } else {
            state.deferred = Some(err);
        }
    }

    /// Run a user callback, deferring its error or panic.
    fn guarded<T>(&self, callback: impl FnOnce() -> Result<T, BoxError>) -> Option<T> {
        match panic::catch_unwind(AssertUnwindSafe(callback)) {
            Ok(Ok(value)) => Some(value),
            Ok(Err(err)) => {
                self.defer(err);
                None
            }
            Err(payload) => {
                self.defer(panic_message(payload).into());
                None
            }
        }
    }

    fn append(&self, stdout: Option<&Content>, stderr: Option<&Content>) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if let (Some(content), Some(buf)) = (stdout, state.stdout.as_mut()) {
            buf.extend(content.render_for(self.universal_newlines));
        }
        if let Some(content) = stderr {
            let target =
                if self.merge_stderr { state.stdout.as_mut() } else { state.stderr.as_mut() };
            if let Some(buf) = target {
                buf.extend(content.render_for(self.universal_newlines));
            }
        }
    }

    fn finish(&self) {
        let mut state = self.state.lock();
        state.returncode = Some(state.override_code.unwrap_or(state.configured));
        state.phase = Phase::Terminal;
        self.finished.notify_all();
    }

    fn complete(self: &Arc<Self>, job: Completion) {
        if let Some(delay) = job.delay {
            std::thread::sleep(delay);
        }
        if let Some((callback, args)) = job.callback {
            let control = ProcessControl { shared: Arc::clone(self) };
            self.guarded(|| callback(&control, &args));
        }
        self.finish();
        tracing::debug!(command = %self.args, pid = self.pid, "fake process completed");
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("callback panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("callback panicked: {s}")
    } else {
        "callback panicked".to_string()
    }
}

/// Simulated process returned in place of a real child.
///
/// Cloning yields another handle to the same simulated process; the
/// per-registration [`Recorder`](crate::Recorder) keeps such clones.
#[derive(Clone)]
pub struct FakeChild {
    shared: Arc<Shared>,
}

impl FakeChild {
    pub(crate) fn start(
        args: Invocation,
        pid: u32,
        definition: Definition,
        options: &SpawnOptions,
    ) -> Self {
        let universal_newlines = options.universal_newlines;
        let render = |content: &Option<Content>| {
            content.as_ref().map(|c| c.render_for(universal_newlines)).unwrap_or_default()
        };

        let mut stdout = match options.stdout {
            Redirect::Pipe => Some(render(&definition.stdout)),
            Redirect::Null => None,
            Redirect::Inherit => {
                write_inherited(&mut std::io::stdout(), &render(&definition.stdout));
                None
            }
        };
        let stderr = match options.stderr {
            StderrRedirect::Pipe => Some(render(&definition.stderr)),
            StderrRedirect::Null => None,
            StderrRedirect::Inherit => {
                write_inherited(&mut std::io::stderr(), &render(&definition.stderr));
                None
            }
            StderrRedirect::Stdout => {
                if let Some(buf) = stdout.as_mut() {
                    buf.extend(render(&definition.stderr));
                }
                None
            }
        };

        let job = Completion {
            delay: definition.delay,
            callback: definition.callback.clone().map(|cb| (cb, definition.callback_args.clone())),
        };
        let needs_worker = definition.needs_worker();

        let shared = Arc::new(Shared {
            args,
            pid,
            text: options.is_text_mode(),
            universal_newlines,
            merge_stderr: options.stderr == StderrRedirect::Stdout,
            state: Mutex::new(HandleState {
                stdout,
                stderr,
                configured: definition.returncode,
                override_code: None,
                returncode: None,
                phase: Phase::Created,
                signals: Vec::new(),
                deferred: None,
            }),
            finished: Condvar::new(),
            signal_lock: Mutex::new(()),
            stdin_callback: definition.stdin_callback,
            signal_callback: definition.signal_callback,
        });

        if needs_worker {
            shared.state.lock().phase = Phase::Completing;
            let worker = Arc::clone(&shared);
            let background = job.clone();
            let spawned = std::thread::Builder::new()
                .name(format!("fakeproc-{pid}"))
                .spawn(move || worker.complete(background));
            if let Err(e) = spawned {
                tracing::warn!(pid, error = %e, "no completion worker, completing inline");
                shared.complete(job);
            }
        } else {
            shared.finish();
        }

        Self { shared }
    }

    pub fn args(&self) -> &Invocation {
        &self.shared.args
    }

    pub fn pid(&self) -> u32 {
        self.shared.pid
    }

    pub fn is_text(&self) -> bool {
        self.shared.text
    }

    pub fn stdout(&self) -> Option<StreamData> {
        let state = self.shared.state.lock();
        state.stdout.as_ref().map(|buf| StreamData::from_buffer(buf, self.shared.text))
    }

    pub fn stderr(&self) -> Option<StreamData> {
        let state = self.shared.state.lock();
        state.stderr.as_ref().map(|buf| StreamData::from_buffer(buf, self.shared.text))
    }

    pub fn returncode(&self) -> Option<i32> {
        self.shared.state.lock().returncode
    }

    /// Return code if terminal; never blocks and never runs the callback.
    pub fn poll(&self) -> Option<i32> {
        let state = self.shared.state.lock();
        match state.phase {
            Phase::Terminal => state.returncode,
            Phase::Created | Phase::Completing => None,
        }
    }

    /// Block until terminal or until `timeout` elapses.
    ///
    /// A deferred callback error is returned by the first wait that
    /// observes it, then cleared.
    pub fn wait(&self, timeout: Option<Duration>) -> Result<i32, ProcessError> {
        let mut state = self.shared.state.lock();
        // A deadline past the clock's range waits without one.
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t).map(|d| (t, d)));
        match deadline {
            None => {
                while state.phase != Phase::Terminal {
                    self.shared.finished.wait(&mut state);
                }
            }
            Some((timeout, deadline)) => {
                while state.phase != Phase::Terminal {
                    let result = self.shared.finished.wait_until(&mut state, deadline);
                    if result.timed_out() && state.phase != Phase::Terminal {
                        return Err(ProcessError::Timeout {
                            command: self.shared.args.clone(),
                            timeout,
                        });
                    }
                }
            }
        }
        if let Some(err) = state.deferred.take() {
            return Err(ProcessError::Callback(err));
        }
        Ok(state.returncode.unwrap_or(state.configured))
    }

    /// Feed `input` to the stdin callback, wait, and collect both streams.
    pub fn communicate(
        &self,
        input: Option<&[u8]>,
        timeout: Option<Duration>,
    ) -> Result<Communication, ProcessError> {
        let input = input.filter(|i| !i.is_empty());
        if let (Some(input), Some(callback)) = (input, &self.shared.stdin_callback) {
            if let Some(response) = self.shared.guarded(|| callback(input)) {
                self.shared.append(response.stdout.as_ref(), response.stderr.as_ref());
            }
        }
        self.wait(timeout)?;
        Ok(Communication { stdout: self.stdout(), stderr: self.stderr() })
    }

    /// Record `signal` and run the signal callback, if any. Never blocks on
    /// completion and never changes the phase.
    pub fn send_signal(&self, signal: Signal) -> Result<(), ProcessError> {
        let _serial = self.shared.signal_lock.lock();
        self.shared.state.lock().signals.push(signal);
        tracing::debug!(command = %self.shared.args, pid = self.shared.pid, ?signal, "signal received");
        if let Some(callback) = &self.shared.signal_callback {
            let control = self.control();
            self.shared.guarded(|| callback(&control, signal));
        }
        Ok(())
    }

    pub fn terminate(&self) -> Result<(), ProcessError> {
        self.send_signal(Signal::SIGTERM)
    }

    pub fn kill(&self) -> Result<(), ProcessError> {
        self.send_signal(Signal::SIGKILL)
    }

    pub fn received_signals(&self) -> Vec<Signal> {
        self.shared.state.lock().signals.clone()
    }

    /// Callback-side view of this handle.
    pub fn control(&self) -> ProcessControl {
        ProcessControl { shared: Arc::clone(&self.shared) }
    }

    /// [`wait`](Self::wait) on tokio's blocking pool.
    pub async fn wait_async(&self, timeout: Option<Duration>) -> Result<i32, ProcessError> {
        let child = self.clone();
        tokio::task::spawn_blocking(move || child.wait(timeout))
            .await
            .map_err(|e| ProcessError::Io(std::io::Error::other(e)))?
    }

    /// [`communicate`](Self::communicate) on tokio's blocking pool.
    pub async fn communicate_async(
        &self,
        input: Option<Vec<u8>>,
        timeout: Option<Duration>,
    ) -> Result<Communication, ProcessError> {
        let child = self.clone();
        tokio::task::spawn_blocking(move || child.communicate(input.as_deref(), timeout))
            .await
            .map_err(|e| ProcessError::Io(std::io::Error::other(e)))?
    }
}

fn write_inherited(sink: &mut impl Write, data: &[u8]) {
    if data.is_empty() {
        return;
    }
    if let Err(e) = sink.write_all(data).and_then(|()| sink.flush()) {
        tracing::debug!(error = %e, "failed to write inherited stream");
    }
}

impl fmt::Debug for FakeChild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("FakeChild")
            .field("args", &self.shared.args)
            .field("pid", &self.shared.pid)
            .field("phase", &state.phase)
            .field("returncode", &state.returncode)
            .field("signals", &state.signals)
            .finish()
    }
}

impl Process for FakeChild {
    fn args(&self) -> &Invocation {
        FakeChild::args(self)
    }

    fn pid(&self) -> u32 {
        FakeChild::pid(self)
    }

    fn stdout(&self) -> Option<StreamData> {
        FakeChild::stdout(self)
    }

    fn stderr(&self) -> Option<StreamData> {
        FakeChild::stderr(self)
    }

    fn returncode(&self) -> Option<i32> {
        FakeChild::returncode(self)
    }

    fn poll(&mut self) -> Option<i32> {
        FakeChild::poll(self)
    }

    fn wait(&mut self, timeout: Option<Duration>) -> Result<i32, ProcessError> {
        FakeChild::wait(self, timeout)
    }

    fn communicate(
        &mut self,
        input: Option<&[u8]>,
        timeout: Option<Duration>,
    ) -> Result<Communication, ProcessError> {
        FakeChild::communicate(self, input, timeout)
    }

    fn send_signal(&mut self, signal: Signal) -> Result<(), ProcessError> {
        FakeChild::send_signal(self, signal)
    }

    fn received_signals(&self) -> Vec<Signal> {
        FakeChild::received_signals(self)
    }
}

/// What a callback may read and change on the handle it runs for.
#[derive(Clone)]
pub struct ProcessControl {
    shared: Arc<Shared>,
}

impl ProcessControl {
    pub fn args(&self) -> &Invocation {
        &self.shared.args
    }

    pub fn pid(&self) -> u32 {
        self.shared.pid
    }

    /// Code set by a callback so far, else the resolved code.
    pub fn returncode(&self) -> Option<i32> {
        let state = self.shared.state.lock();
        state.override_code.or(state.returncode)
    }

    /// Override the configured return code. Applies immediately when the
    /// handle is already terminal.
    pub fn set_returncode(&self, code: i32) {
        let mut state = self.shared.state.lock();
        state.override_code = Some(code);
        if state.phase == Phase::Terminal {
            state.returncode = Some(code);
        }
    }

    pub fn write_stdout(&self, content: impl Into<Content>) {
        self.shared.append(Some(&content.into()), None);
    }

    pub fn write_stderr(&self, content: impl Into<Content>) {
        self.shared.append(None, Some(&content.into()));
    }

    pub fn received_signals(&self) -> Vec<Signal> {
        self.shared.state.lock().signals.clone()
    }
}

impl fmt::Debug for ProcessControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessControl")
            .field("args", &self.shared.args)
            .field("pid", &self.shared.pid)
            .finish()
    }
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
