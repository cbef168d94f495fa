// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for invocations and patterns.
pub mod strategies {
    use crate::{CommandPattern, Invocation};
    use proptest::prelude::*;

    /// A single command-line token without spaces.
    pub fn arb_token() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_./-]{1,10}"
    }

    pub fn arb_invocation() -> impl Strategy<Value = Invocation> {
        prop::collection::vec(arb_token(), 1..6).prop_map(Invocation::new)
    }

    /// An invocation together with the literal pattern that matches it.
    pub fn arb_literal_registration() -> impl Strategy<Value = (CommandPattern, Invocation)> {
        arb_invocation().prop_map(|inv| (CommandPattern::literal(&inv), inv))
    }
}
