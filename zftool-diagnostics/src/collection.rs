// Copyright (c) The zftool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The ordered collection of results produced by a run.

use crate::{
    check::DiagnosticTest,
    result::{DiagResult, ResultKind},
};
use std::{sync::Arc, time::Duration};
use zftool_metadata::{DiagnosticResultSummary, DiagnosticsSummary, ResultCountsSummary};

/// A test together with the result it produced.
#[derive(Clone, Debug)]
pub struct TestOutcome {
    /// The test that ran.
    pub test: Arc<dyn DiagnosticTest>,

    /// The result it produced.
    pub result: DiagResult,

    /// How long the test took.
    pub time_taken: Duration,
}

/// Results of a diagnostics run, in execution order.
///
/// Per-kind counts are maintained on every [`push`](Self::push), so they always add up to
/// [`len`](Self::len).
#[derive(Clone, Debug, Default)]
pub struct ResultCollection {
    outcomes: Vec<TestOutcome>,
    counts: ResultCounts,
    planned: usize,
    stopped: bool,
}

impl ResultCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty collection for a run of `planned` tests.
    pub fn with_planned(planned: usize) -> Self {
        Self {
            outcomes: Vec::with_capacity(planned),
            planned,
            ..Self::default()
        }
    }

    /// Appends an outcome.
    pub fn push(&mut self, test: Arc<dyn DiagnosticTest>, result: DiagResult, time_taken: Duration) {
        self.counts.add(result.kind());
        self.outcomes.push(TestOutcome {
            test,
            result,
            time_taken,
        });
        // Pushing past the plan (or without one) extends it.
        self.planned = self.planned.max(self.outcomes.len());
    }

    pub(crate) fn mark_stopped(&mut self) {
        self.stopped = true;
    }

    /// Returns the number of results.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns true if there are no results.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Returns the outcome at `index`.
    pub fn get(&self, index: usize) -> Option<&TestOutcome> {
        self.outcomes.get(index)
    }

    /// Iterates over outcomes in execution order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TestOutcome> + '_ {
        self.outcomes.iter()
    }

    /// Returns the number of results of the given kind.
    pub fn count(&self, kind: ResultKind) -> usize {
        self.counts.get(kind)
    }

    /// Returns the number of successes.
    pub fn success_count(&self) -> usize {
        self.counts.success
    }

    /// Returns the number of warnings.
    pub fn warning_count(&self) -> usize {
        self.counts.warning
    }

    /// Returns the number of failures.
    pub fn failure_count(&self) -> usize {
        self.counts.failure
    }

    /// Returns the number of results of unknown kind.
    pub fn unknown_count(&self) -> usize {
        self.counts.unknown
    }

    /// Returns true if at least one result is a failure.
    pub fn has_failures(&self) -> bool {
        self.counts.failure > 0
    }

    /// Returns the number of tests the run was planned with.
    pub fn planned(&self) -> usize {
        self.planned
    }

    /// Returns the number of planned tests that did not run.
    pub fn skipped_count(&self) -> usize {
        self.planned - self.outcomes.len()
    }

    /// Returns true if the run stopped early because of a failure.
    pub fn stopped(&self) -> bool {
        self.stopped
    }

    /// Produces a serializable summary of this collection.
    pub fn to_summary(&self) -> DiagnosticsSummary {
        let results = self
            .outcomes
            .iter()
            .map(|outcome| DiagnosticResultSummary {
                label: outcome.test.label().into_owned(),
                description: outcome.test.description().map(ToOwned::to_owned),
                kind: outcome.result.kind().to_summary(),
                message: outcome.result.message().to_owned(),
                data: outcome.result.data().map(|data| data.to_summary()),
                time_taken: outcome.time_taken,
            })
            .collect();
        DiagnosticsSummary::new(
            self.planned,
            self.stopped,
            self.counts.to_summary(),
            results,
        )
    }
}

impl<'a> IntoIterator for &'a ResultCollection {
    type Item = &'a TestOutcome;
    type IntoIter = std::slice::Iter<'a, TestOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
struct ResultCounts {
    success: usize,
    warning: usize,
    failure: usize,
    unknown: usize,
}

impl ResultCounts {
    fn add(&mut self, kind: ResultKind) {
        match kind {
            ResultKind::Success => self.success += 1,
            ResultKind::Warning => self.warning += 1,
            ResultKind::Failure => self.failure += 1,
            ResultKind::Unknown => self.unknown += 1,
        }
    }

    fn get(&self, kind: ResultKind) -> usize {
        match kind {
            ResultKind::Success => self.success,
            ResultKind::Warning => self.warning,
            ResultKind::Failure => self.failure,
            ResultKind::Unknown => self.unknown,
        }
    }

    fn to_summary(self) -> ResultCountsSummary {
        ResultCountsSummary {
            success: self.success,
            warning: self.warning,
            failure: self.failure,
            unknown: self.unknown,
        }
    }
}
