// Copyright (c) The zftool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by zftool diagnostics.

use camino::Utf8PathBuf;
use config::ConfigError;
use std::{borrow::Cow, error::Error, io};
use thiserror::Error;

/// An error that occurred while parsing a diagnostics config file.
#[derive(Debug, Error)]
#[error("failed to parse diagnostics config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    err: ConfigError,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, err: ConfigError) -> Self {
        Self {
            config_file: config_file.into(),
            err,
        }
    }

    /// Returns the config file that failed to parse.
    pub fn config_file(&self) -> &Utf8PathBuf {
        &self.config_file
    }
}

/// An error that escaped a diagnostic test while it ran.
///
/// The runner never propagates these: each one is converted into a failure result that carries
/// the error as data.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CheckError {
    /// A command needed by the check could not be executed.
    #[error("failed to execute `{command}`")]
    CommandExec {
        /// The command line.
        command: String,
        /// The underlying error.
        #[source]
        err: io::Error,
    },

    /// An I/O error occurred while inspecting a path.
    #[error("I/O error accessing `{path}`")]
    Io {
        /// The path being inspected.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        err: io::Error,
    },

    /// The test finished without producing a result.
    #[error("test returned no result (this is a bug in the test implementation)")]
    NoResult,

    /// The test panicked.
    #[error("test panicked: {message}")]
    Panicked {
        /// The panic payload, if it was a string.
        message: String,
    },

    /// An error returned by a callback test.
    #[error(transparent)]
    Other(Box<dyn Error + Send + Sync>),
}

impl CheckError {
    /// Returns a short, stable identifier for the kind of error.
    pub fn kind(&self) -> &'static str {
        match self {
            CheckError::CommandExec { .. } => "command-exec",
            CheckError::Io { .. } => "io",
            CheckError::NoResult => "no-result",
            CheckError::Panicked { .. } => "panic",
            CheckError::Other(_) => "other",
        }
    }
}

/// An error that occurred while a reporter handled a run event.
///
/// Reporter errors are not recovered by the runner: they abort the run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteEventError {
    /// An error occurred while writing to the output.
    #[error("error writing to output")]
    Io(#[from] io::Error),

    /// A custom reporter failed.
    #[error("reporter failed: {message}")]
    Reporter {
        /// A description of the failure.
        message: String,
    },
}

/// An error in the arguments passed to a built-in or registered test.
#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub struct TestArgsError {
    message: Cow<'static, str>,
}

impl TestArgsError {
    /// Creates a new error with the given message.
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// An error that occurred while resolving test definitions into tests.
///
/// These errors happen before any test runs, and are not turned into results.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TestDefinitionError {
    /// A test was defined as an empty array.
    #[error("cannot use an empty array as test definition in `{group}`")]
    EmptyDefinition {
        /// The test group.
        group: String,
    },

    /// The first element of an array definition was not a string.
    #[error("test name `{name}` in `{group}` is not a string")]
    InvalidTestName {
        /// The test group.
        group: String,
        /// The offending value.
        name: String,
    },

    /// No registered or built-in test has this name.
    #[error("cannot find a registered or built-in test named `{name}` (in `{group}`)")]
    UnknownTest {
        /// The test group.
        group: String,
        /// The test name.
        name: String,
    },

    /// The test was found, but rejected its arguments.
    #[error("invalid arguments for test `{name}` in `{group}`")]
    InvalidArguments {
        /// The test group.
        group: String,
        /// The test name.
        name: String,
        /// The underlying error.
        #[source]
        err: TestArgsError,
    },
}
