// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fakeproc-adapters: real process execution behind the core
//! [`Spawner`](fakeproc_core::Spawner) seam.

pub mod env;
pub mod system;

pub use system::{SystemProcess, SystemSpawner};

#[cfg(any(test, feature = "test-support"))]
pub use system::{FakeSpawner, SpawnCall, StubProcess};
