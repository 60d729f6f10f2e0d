// Copyright (c) The zftool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use owo_colors::OwoColorize;
use std::{error::Error, io};
use thiserror::Error;
use tracing::error;
use zftool_diagnostics::errors::{ConfigParseError, TestDefinitionError, WriteEventError};
use zftool_metadata::ZfToolExitCode;

/// An error that zftool expects to encounter, displayed without a backtrace.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("test definition error")]
    TestDefinitionError {
        #[from]
        err: TestDefinitionError,
    },
    #[error("error reporting diagnostics")]
    WriteEventError {
        #[from]
        err: WriteEventError,
    },
    #[error("error writing output")]
    WriteOutputError {
        #[source]
        err: io::Error,
    },
    #[error("error serializing summary")]
    SerializeSummaryError {
        #[source]
        err: serde_json::Error,
    },
    #[error("diagnostics failed")]
    DiagnosticsFailed {
        /// The number of failed diagnostics.
        failures: usize,
    },
}

impl ExpectedError {
    pub(crate) fn write_output(err: io::Error) -> Self {
        Self::WriteOutputError { err }
    }

    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::ConfigParseError { .. } | Self::TestDefinitionError { .. } => {
                ZfToolExitCode::SETUP_ERROR
            }
            Self::WriteEventError { .. }
            | Self::WriteOutputError { .. }
            | Self::SerializeSummaryError { .. } => ZfToolExitCode::WRITE_OUTPUT_ERROR,
            Self::DiagnosticsFailed { .. } => ZfToolExitCode::DIAGNOSTICS_FAILED,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match self {
            Self::ConfigParseError { err } => {
                error!(
                    "failed to parse diagnostics config at `{}`",
                    err.config_file().style(styles.bold)
                );
                err.source()
            }
            Self::TestDefinitionError { err } => {
                error!("{err}");
                err.source()
            }
            Self::WriteEventError { err } => {
                error!("{err}");
                err.source()
            }
            Self::WriteOutputError { err } => {
                error!("error writing output");
                Some(err as &dyn Error)
            }
            Self::SerializeSummaryError { err } => {
                error!("error serializing diagnostics summary");
                Some(err as &dyn Error)
            }
            Self::DiagnosticsFailed { failures } => {
                let noun = if *failures == 1 {
                    "diagnostic"
                } else {
                    "diagnostics"
                };
                error!("{} {noun} failed", failures.style(styles.bold));
                None
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(
            ExpectedError::DiagnosticsFailed { failures: 2 }.process_exit_code(),
            1
        );
        assert_eq!(
            ExpectedError::write_output(io::Error::other("broken pipe")).process_exit_code(),
            110
        );
    }
}
