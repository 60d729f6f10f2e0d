// Copyright (c) The zftool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line tool for framework projects.
//!
//! The `diag` subcommand runs the project's diagnostic tests, as configured in
//! `.config/zftool.toml` and module config files. For the underlying runner, see
//! [`zftool_diagnostics`].

mod dispatch;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::{LOG_ENV, OutputContext, OutputWriter, StderrStyles};
