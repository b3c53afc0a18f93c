// Copyright (c) The playrecap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process exit codes.

/// Documented exit codes for `playrecap` failures.
///
/// `playrecap` runs may fail for a variety of reasons. This structure documents the exit codes
/// that may occur in case of expected failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum PlayRecapExitCode {}

impl PlayRecapExitCode {
    /// No errors occurred and every test passed.
    pub const OK: i32 = 0;

    /// One or more tests failed.
    pub const TEST_RUN_FAILED: i32 = 100;

    /// A user issue happened while setting up a playrecap invocation.
    pub const SETUP_ERROR: i32 = 96;

    /// The event stream could not be read, or was malformed in strict mode.
    pub const EVENT_STREAM_INVALID: i32 = 97;

    /// Writing data to stdout or stderr produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}
