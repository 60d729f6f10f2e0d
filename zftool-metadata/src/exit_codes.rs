// Copyright (c) The zftool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `zftool` failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum ZfToolExitCode {}

impl ZfToolExitCode {
    /// No errors occurred and zftool exited normally.
    pub const OK: i32 = 0;

    /// One or more diagnostic tests produced a failure result.
    ///
    /// Warnings and unknown results do not produce this exit code.
    pub const DIAGNOSTICS_FAILED: i32 = 1;

    /// A user issue happened while setting up a zftool invocation: the configuration could not be
    /// read, or a test definition could not be resolved.
    pub const SETUP_ERROR: i32 = 96;

    /// Writing data to stdout or stderr produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}
