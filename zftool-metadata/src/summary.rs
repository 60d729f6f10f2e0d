// Copyright (c) The zftool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};

/// A serializable summary of a diagnostics run.
///
/// This is the view model produced when zftool runs non-interactively.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub struct DiagnosticsSummary {
    /// The number of tests that were scheduled to run.
    pub planned: usize,

    /// The number of tests that actually ran.
    pub run: usize,

    /// The number of tests that were not run because the run stopped early.
    pub skipped: usize,

    /// True if the run stopped after a failure because break-on-failure was enabled.
    pub stopped: bool,

    /// Result counts, by kind.
    pub counts: ResultCountsSummary,

    /// Results in execution order.
    pub results: Vec<DiagnosticResultSummary>,
}

impl DiagnosticsSummary {
    /// Creates a new summary from its parts.
    pub fn new(
        planned: usize,
        stopped: bool,
        counts: ResultCountsSummary,
        results: Vec<DiagnosticResultSummary>,
    ) -> Self {
        let run = results.len();
        Self {
            planned,
            run,
            skipped: planned.saturating_sub(run),
            stopped,
            counts,
            results,
        }
    }

    /// Returns true if any result in this summary is a failure.
    pub fn has_failures(&self) -> bool {
        self.counts.failure > 0
    }
}

/// Counts of results by kind.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResultCountsSummary {
    /// The number of successful results.
    pub success: usize,
    /// The number of warnings.
    pub warning: usize,
    /// The number of failures.
    pub failure: usize,
    /// The number of results of unknown kind.
    pub unknown: usize,
}

/// The outcome of a single diagnostic test.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DiagnosticResultSummary {
    /// The label of the test.
    pub label: String,

    /// The test's description, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The kind of result.
    pub kind: ResultKindSummary,

    /// The result message. May be empty.
    pub message: String,

    /// Structured data attached to the result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResultDataSummary>,

    /// How long the test took to run.
    #[serde(with = "humantime_serde")]
    pub time_taken: Duration,
}

/// The kind of a diagnostic result.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultKindSummary {
    /// The check passed.
    Success,
    /// The check passed with a warning.
    Warning,
    /// The check failed.
    Failure,
    /// The outcome of the check could not be determined.
    Unknown,
}

impl ResultKindSummary {
    /// Returns the string representation of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Failure => "failure",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ResultKindSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured data attached to a result.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ResultDataSummary {
    /// An error was caught while running the test.
    Error {
        /// The kind of error.
        kind: String,
        /// The error message.
        message: String,
        /// The chain of errors that caused this one, outermost first.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        causes: Vec<String>,
    },

    /// An arbitrary value produced by the test.
    Value {
        /// The value.
        value: serde_json::Value,
    },
}
