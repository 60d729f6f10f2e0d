// Copyright (c) The zftool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Report the progress and results of a diagnostics run.
//!
//! Reporters implement [`Reporter`] and are notified with a [`RunEvent`] at each stage of a run.
//! Two human-readable reporters are provided: [`BasicReporter`] prints one character per test,
//! and [`VerboseReporter`] prints a status line per test.

mod basic;
mod events;
mod helpers;
mod verbose;

pub use basic::BasicReporter;
pub use events::*;
pub use verbose::VerboseReporter;

use crate::errors::WriteEventError;
use std::io::{self, Write};

/// Where a reporter writes its output.
#[derive(Debug)]
pub enum ReporterOutput<'a> {
    /// Write to standard output, flushing after every event.
    Terminal,

    /// Write to a string buffer. Used for testing.
    Buffer(&'a mut String),
}

impl ReporterOutput<'_> {
    fn write_str(&mut self, s: &str) -> Result<(), WriteEventError> {
        match self {
            ReporterOutput::Terminal => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(s.as_bytes())?;
                stdout.flush()?;
            }
            ReporterOutput::Buffer(buf) => buf.push_str(s),
        }
        Ok(())
    }
}
