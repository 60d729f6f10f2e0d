// Copyright (c) The zftool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    check::DiagnosticTest, collection::ResultCollection, errors::WriteEventError,
    result::DiagResult,
};
use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

/// An event emitted during a diagnostics run.
///
/// Events are produced by a [`DiagnosticsRunner`](crate::runner::DiagnosticsRunner) right before
/// each notification and borrow from it, so reporters cannot retain them.
#[derive(Clone, Debug)]
pub enum RunEvent<'a> {
    /// The run started.
    RunStarted {
        /// The tests that will be run, in order.
        tests: &'a [Arc<dyn DiagnosticTest>],
    },

    /// A test finished running.
    TestFinished {
        /// The test that ran.
        test: &'a dyn DiagnosticTest,

        /// The zero-based position of the test in the run.
        index: usize,

        /// The result it produced.
        result: &'a DiagResult,

        /// All results so far, including this one.
        results: &'a ResultCollection,
    },

    /// The run stopped early because a test failed and break-on-failure is enabled.
    ///
    /// Always emitted right after the [`TestFinished`](Self::TestFinished) event of the failing
    /// test.
    RunStopped {
        /// The failing test.
        test: &'a dyn DiagnosticTest,

        /// Its result.
        result: &'a DiagResult,

        /// The number of tests that will not run.
        remaining: usize,
    },

    /// The run finished. This is always the last event.
    RunFinished {
        /// All results, in execution order.
        results: &'a ResultCollection,

        /// True if the run stopped early.
        stopped: bool,

        /// The time at which the run started.
        start_time: SystemTime,

        /// The amount of time the run took.
        elapsed: Duration,
    },
}

/// Receives events from a diagnostics run.
pub trait Reporter {
    /// Handles a single event.
    ///
    /// Returning an error aborts the run.
    fn report_event(&mut self, event: &RunEvent<'_>) -> Result<(), WriteEventError>;
}
