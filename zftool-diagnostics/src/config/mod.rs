// Copyright (c) The zftool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Diagnostics configuration.
//!
//! Tests are described in TOML, grouped by name under `[diagnostics]`. A
//! [`DiagnosticsConfig`] is layered from the default config, a main config file and any number of
//! module config files, and a [`TestResolver`] turns its definitions into runnable tests.

mod definition;
mod imp;
mod resolve;

pub use definition::*;
pub use imp::*;
pub use resolve::*;
