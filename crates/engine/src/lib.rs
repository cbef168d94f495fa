// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fakeproc: register what external commands should appear to do, then
//! intercept launches and hand back simulated process handles.

mod definition;
mod dispatcher;
mod exec;
mod handle;
mod queue;
mod recorder;
mod registry;

pub use definition::{
    Callback, CallbackArgs, Definition, DefinitionError, SignalCallback, StdinCallback,
    StdinResponse,
};
pub use dispatcher::{DispatchError, Dispatcher};
pub use exec::{Exec, ExecError, Output};
pub use handle::{FakeChild, ProcessControl};
pub use recorder::Recorder;
pub use registry::{Registry, Scope};

pub use fakeproc_core::{
    pattern, Any, BoxError, CommandPattern, Communication, Content, Invocation, Matcher,
    PatternError, Process, ProcessError, Redirect, Signal, SpawnError, SpawnOptions, Spawner,
    StderrRedirect, StreamData,
};
