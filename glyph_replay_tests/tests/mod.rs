// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! This crate contains the integration test suite for `glyph_replay`.
//!
//! - The `util` module holds an in-memory test font and shared helpers.
//! - We do not use the default Rust test harness, but instead use this `mod.rs` file as the
//!   entry point to run all other tests, so that the helpers are shared.
//! - Tests are grouped by topic, and test names start with their topic
//!   (`stack_extra_pops_are_ignored` rather than `extra_pops_are_ignored_stack`).

#![allow(missing_docs, reason = "we don't need docs for testing")]
#![allow(clippy::cast_possible_truncation, reason = "not critical for testing")]

mod image;
mod outline;
mod util;
