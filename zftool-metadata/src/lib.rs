// Copyright (c) The zftool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Machine-readable output for `zftool diag`.
//!
//! `zftool diag --message-format json` writes a [`DiagnosticsSummary`] to standard output. The
//! process exit codes are documented in [`ZfToolExitCode`].

mod exit_codes;
mod summary;

pub use exit_codes::*;
pub use summary::*;
