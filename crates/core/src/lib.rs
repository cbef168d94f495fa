// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fakeproc-core: command patterns, invocations, stream content and the
//! process handle contract shared by the fakeproc crates.

pub mod macros;

pub mod error;
pub mod invocation;
pub mod options;
pub mod pattern;
pub mod process;
pub mod stream;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::{BoxError, PatternError, ProcessError, SpawnError};
pub use invocation::Invocation;
pub use options::{Redirect, SpawnOptions, StderrRedirect};
pub use pattern::{Any, CommandPattern, Matcher};
pub use process::{Communication, Process, Signal, Spawner};
pub use stream::{normalize_newlines, Content, StreamData, LINE_SEPARATOR};
