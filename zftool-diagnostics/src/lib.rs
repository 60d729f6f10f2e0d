// Copyright (c) The zftool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for `zftool diag`: a small, sequential diagnostics runner.
//!
//! The basic flow is:
//!
//! 1. Load a [`DiagnosticsConfig`](config::DiagnosticsConfig) and resolve its test definitions
//!    into [`DiagnosticTest`](check::DiagnosticTest) instances with a
//!    [`TestResolver`](config::TestResolver).
//! 2. Register the tests and any [`Reporter`](reporter::Reporter)s with a
//!    [`DiagnosticsRunner`](runner::DiagnosticsRunner).
//! 3. Call [`run`](runner::DiagnosticsRunner::run), which returns a
//!    [`ResultCollection`](collection::ResultCollection).

pub mod check;
pub mod collection;
pub mod config;
pub mod errors;
pub mod reporter;
pub mod result;
pub mod runner;
mod stopwatch;
#[cfg(test)]
mod test_helpers;
