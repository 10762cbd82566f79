// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for subprocess execution — the single piece of external I/O
//! the orchestration core delegates rather than designs itself.

pub mod env;
pub mod subprocess;

pub use subprocess::{run_with_timeout, CommandOutcome, DEFAULT_GRACE_PERIOD};
