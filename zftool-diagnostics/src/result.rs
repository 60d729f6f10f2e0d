// Copyright (c) The zftool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Results produced by diagnostic tests.
//!
//! A [`DiagResult`] is an immutable value produced by exactly one test execution. Its
//! [`ResultKind`] is fixed at construction.

use crate::errors::CheckError;
use std::{error::Error, fmt};
use zftool_metadata::{ResultDataSummary, ResultKindSummary};

/// The kind of outcome of a diagnostic test.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum ResultKind {
    /// The check passed.
    Success,

    /// The check passed, but something needs attention.
    Warning,

    /// The check failed.
    Failure,

    /// The check ran, but its outcome could not be determined.
    Unknown,
}

impl ResultKind {
    /// All result kinds, in display order.
    pub const ALL: [ResultKind; 4] = [
        ResultKind::Success,
        ResultKind::Warning,
        ResultKind::Failure,
        ResultKind::Unknown,
    ];

    /// Returns true if this is a failure.
    pub fn is_failure(self) -> bool {
        matches!(self, ResultKind::Failure)
    }

    pub(crate) fn to_summary(self) -> ResultKindSummary {
        match self {
            ResultKind::Success => ResultKindSummary::Success,
            ResultKind::Warning => ResultKindSummary::Warning,
            ResultKind::Failure => ResultKindSummary::Failure,
            ResultKind::Unknown => ResultKindSummary::Unknown,
        }
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_summary().fmt(f)
    }
}

/// The outcome of running one diagnostic test.
#[derive(Clone, Debug, PartialEq)]
pub struct DiagResult {
    kind: ResultKind,
    message: String,
    data: Option<ResultData>,
}

impl DiagResult {
    /// Creates a new result of the given kind.
    pub fn new(kind: ResultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            data: None,
        }
    }

    /// Creates a successful result.
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ResultKind::Success, message)
    }

    /// Creates a warning.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(ResultKind::Warning, message)
    }

    /// Creates a failure.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(ResultKind::Failure, message)
    }

    /// Creates a result whose outcome is unknown.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ResultKind::Unknown, message)
    }

    /// Attaches structured data to this result.
    pub fn with_data(mut self, data: impl Into<ResultData>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Converts an error that escaped a test into a failure carrying the error as data.
    pub(crate) fn from_check_error(error: &CheckError) -> Self {
        Self::failure(error.to_string()).with_data(CaughtError::new(error.kind(), error))
    }

    /// Returns the kind of this result.
    pub fn kind(&self) -> ResultKind {
        self.kind
    }

    /// Returns the message. May be empty.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the structured data attached to this result, if any.
    pub fn data(&self) -> Option<&ResultData> {
        self.data.as_ref()
    }
}

/// Structured data attached to a [`DiagResult`].
#[derive(Clone, Debug, PartialEq)]
pub enum ResultData {
    /// An error caught while the test ran.
    Error(CaughtError),

    /// An arbitrary value, for diagnostic inspection.
    Value(serde_json::Value),
}

impl ResultData {
    pub(crate) fn to_summary(&self) -> ResultDataSummary {
        match self {
            ResultData::Error(error) => ResultDataSummary::Error {
                kind: error.kind.clone(),
                message: error.message.clone(),
                causes: error.causes.clone(),
            },
            ResultData::Value(value) => ResultDataSummary::Value {
                value: value.clone(),
            },
        }
    }
}

impl From<CaughtError> for ResultData {
    fn from(error: CaughtError) -> Self {
        ResultData::Error(error)
    }
}

impl From<serde_json::Value> for ResultData {
    fn from(value: serde_json::Value) -> Self {
        ResultData::Value(value)
    }
}

/// A snapshot of an error caught while running a test.
///
/// Errors are captured as strings so that results stay cloneable and can be reported after the
/// run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaughtError {
    kind: String,
    message: String,
    causes: Vec<String>,
}

impl CaughtError {
    /// Captures `error` and its chain of sources.
    pub fn new(kind: impl Into<String>, error: &(dyn Error + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut next = error.source();
        while let Some(err) = next {
            causes.push(err.to_string());
            next = err.source();
        }
        Self {
            kind: kind.into(),
            message: error.to_string(),
            causes,
        }
    }

    /// Returns the kind of error.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the chain of errors that caused this one, outermost first.
    pub fn causes(&self) -> &[String] {
        &self.causes
    }
}
