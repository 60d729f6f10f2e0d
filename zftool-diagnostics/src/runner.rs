// Copyright (c) The zftool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The diagnostics runner.
//!
//! [`DiagnosticsRunner`] executes tests one at a time, in registration order, and notifies every
//! registered [`Reporter`] as it goes.

use crate::{
    check::{CheckResult, DiagnosticTest},
    collection::ResultCollection,
    errors::{CheckError, WriteEventError},
    reporter::{Reporter, RunEvent},
    result::DiagResult,
    stopwatch::StopwatchStart,
};
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};
use tracing::{debug, info};

/// Configuration for a [`DiagnosticsRunner`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct RunnerConfig {
    /// Stop running tests after the first failure.
    pub break_on_failure: bool,
}

/// Runs diagnostic tests and reports on their progress.
#[derive(Default)]
pub struct DiagnosticsRunner<'a> {
    tests: Vec<Arc<dyn DiagnosticTest>>,
    reporters: Vec<Box<dyn Reporter + 'a>>,
    config: RunnerConfig,
}

impl<'a> DiagnosticsRunner<'a> {
    /// Creates a runner with no tests and no reporters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends tests to the run, preserving their order.
    pub fn add_tests(&mut self, tests: impl IntoIterator<Item = Arc<dyn DiagnosticTest>>) {
        self.tests.extend(tests);
    }

    /// Appends a single test to the run.
    ///
    /// The same test may be added more than once, in which case it runs more than once.
    pub fn add_test(&mut self, test: Arc<dyn DiagnosticTest>) {
        self.tests.push(test);
    }

    /// Registers a reporter. Reporters are notified in registration order.
    pub fn add_reporter(&mut self, reporter: impl Reporter + 'a) {
        self.reporters.push(Box::new(reporter));
    }

    /// Sets whether the run stops after the first failure.
    pub fn set_break_on_failure(&mut self, break_on_failure: bool) {
        self.config.break_on_failure = break_on_failure;
    }

    /// Returns the tests that will be run.
    pub fn tests(&self) -> &[Arc<dyn DiagnosticTest>] {
        &self.tests
    }

    /// Returns the runner configuration.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Returns the runner configuration for modification.
    pub fn config_mut(&mut self) -> &mut RunnerConfig {
        &mut self.config
    }

    /// Runs all tests and returns their results.
    ///
    /// Errors and panics from tests are turned into failures and never abort the run. An error
    /// from a reporter does: it is returned immediately, and no further events are emitted.
    pub fn run(&mut self) -> Result<ResultCollection, WriteEventError> {
        let stopwatch = StopwatchStart::now();
        let mut results = ResultCollection::with_planned(self.tests.len());
        let mut stopped = false;

        notify_all(
            &mut self.reporters,
            &RunEvent::RunStarted { tests: &self.tests },
        )?;

        for (index, test) in self.tests.iter().enumerate() {
            let test_stopwatch = StopwatchStart::now();
            let result = execute(test.as_ref());
            let time_taken = test_stopwatch.end().duration;
            debug!(
                test = %test.label(),
                kind = %result.kind(),
                ?time_taken,
                "test finished",
            );

            let is_failure = result.kind().is_failure();
            results.push(test.clone(), result, time_taken);
            let Some(outcome) = results.get(index) else {
                unreachable!("outcome was just pushed");
            };
            notify_all(
                &mut self.reporters,
                &RunEvent::TestFinished {
                    test: outcome.test.as_ref(),
                    index,
                    result: &outcome.result,
                    results: &results,
                },
            )?;

            if is_failure && self.config.break_on_failure {
                let remaining = self.tests.len() - index - 1;
                info!(
                    test = %test.label(),
                    remaining,
                    "stopping diagnostics after failure",
                );
                stopped = true;
                results.mark_stopped();
                let Some(outcome) = results.get(index) else {
                    unreachable!("outcome was just pushed");
                };
                notify_all(
                    &mut self.reporters,
                    &RunEvent::RunStopped {
                        test: outcome.test.as_ref(),
                        result: &outcome.result,
                        remaining,
                    },
                )?;
                break;
            }
        }

        let end = stopwatch.end();
        notify_all(
            &mut self.reporters,
            &RunEvent::RunFinished {
                results: &results,
                stopped,
                start_time: end.start_time,
                elapsed: end.duration,
            },
        )?;

        Ok(results)
    }
}

fn notify_all(
    reporters: &mut [Box<dyn Reporter + '_>],
    event: &RunEvent<'_>,
) -> Result<(), WriteEventError> {
    for reporter in reporters {
        reporter.report_event(event)?;
    }
    Ok(())
}

/// Runs a single test, turning errors and panics into failures.
fn execute(test: &dyn DiagnosticTest) -> DiagResult {
    let outcome: std::thread::Result<CheckResult> =
        panic::catch_unwind(AssertUnwindSafe(|| test.check()));
    let err = match outcome {
        Ok(Ok(result)) => return result,
        Ok(Err(err)) => err,
        Err(payload) => CheckError::Panicked {
            message: panic_message(payload.as_ref()),
        },
    };
    debug!(test = %test.label(), error = %err, "test raised an error");
    DiagResult::from_check_error(&err)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "(non-string panic payload)".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        check::Callback,
        result::{ResultData, ResultKind},
        test_helpers::{ErroringTest, FixedTest, PanickingTest, RecordingReporter},
    };
    use pretty_assertions::assert_eq;
    use std::convert::Infallible;
    use test_strategy::proptest;

    fn result_kinds(results: &ResultCollection) -> Vec<ResultKind> {
        results.iter().map(|o| o.result.kind()).collect()
    }

    fn run_with(
        kinds: &[ResultKind],
        break_on_failure: bool,
    ) -> (ResultCollection, Vec<String>) {
        let reporter = RecordingReporter::new();
        let mut runner = DiagnosticsRunner::new();
        runner.set_break_on_failure(break_on_failure);
        runner.add_tests(FixedTest::shared(kinds));
        runner.add_reporter(reporter.clone());
        let results = runner.run().expect("recording reporter does not fail");
        (results, reporter.events())
    }

    #[proptest]
    fn runs_every_test_in_order(kinds: Vec<ResultKind>) {
        let (results, events) = run_with(&kinds, false);
        proptest::prop_assert_eq!(result_kinds(&results), kinds.clone());
        proptest::prop_assert!(!results.stopped());
        proptest::prop_assert_eq!(results.skipped_count(), 0);
        // Start, one event per test, finish.
        proptest::prop_assert_eq!(events.len(), kinds.len() + 2);
        proptest::prop_assert!(events.iter().all(|e| !e.starts_with("stopped")));
    }

    #[proptest]
    fn stops_after_first_failure(kinds: Vec<ResultKind>) {
        let (results, events) = run_with(&kinds, true);
        match kinds.iter().position(|k| k.is_failure()) {
            Some(first_failure) => {
                let ran = first_failure + 1;
                proptest::prop_assert_eq!(result_kinds(&results), kinds[..ran].to_vec());
                proptest::prop_assert!(results.stopped());
                proptest::prop_assert_eq!(results.skipped_count(), kinds.len() - ran);
                // Start, k test events, stop, finish.
                proptest::prop_assert_eq!(events.len(), ran + 3);
                proptest::prop_assert!(events[ran].starts_with("finished"));
                proptest::prop_assert!(events[ran + 1].starts_with("stopped"));
                proptest::prop_assert!(events[ran + 2].starts_with("finish "));
            }
            None => {
                proptest::prop_assert_eq!(result_kinds(&results), kinds.clone());
                proptest::prop_assert!(!results.stopped());
                proptest::prop_assert!(events.iter().all(|e| !e.starts_with("stopped")));
            }
        }
    }

    #[proptest]
    fn runs_are_repeatable(kinds: Vec<ResultKind>, break_on_failure: bool) {
        let (first, _) = run_with(&kinds, break_on_failure);
        let (second, _) = run_with(&kinds, break_on_failure);
        proptest::prop_assert_eq!(result_kinds(&first), result_kinds(&second));
    }

    #[test]
    fn warning_does_not_stop() {
        use ResultKind::*;

        let (results, events) = run_with(&[Success, Warning, Success], true);
        assert_eq!(result_kinds(&results), [Success, Warning, Success]);
        assert_eq!(results.warning_count(), 1);
        assert_eq!(results.success_count(), 2);
        assert_eq!(
            events,
            [
                "start 3",
                "finished 0 test 0 success (1 so far)",
                "finished 1 test 1 warning (2 so far)",
                "finished 2 test 2 success (3 so far)",
                "finish 3 stopped=false",
            ]
        );
    }

    #[test]
    fn failure_stops_with_break() {
        use ResultKind::*;

        let (results, events) = run_with(&[Success, Failure, Success], true);
        assert_eq!(result_kinds(&results), [Success, Failure]);
        assert_eq!(results.skipped_count(), 1);
        assert_eq!(
            events,
            [
                "start 3",
                "finished 0 test 0 success (1 so far)",
                "finished 1 test 1 failure (2 so far)",
                "stopped test 1 (1 remaining)",
                "finish 2 stopped=true",
            ]
        );

        let (results, _) = run_with(&[Success, Failure, Success], false);
        assert_eq!(result_kinds(&results), [Success, Failure, Success]);
    }

    #[test]
    fn empty_run() {
        let (results, events) = run_with(&[], true);
        assert!(results.is_empty());
        assert_eq!(events, ["start 0", "finish 0 stopped=false"]);
    }

    #[test]
    fn errors_and_panics_become_failures() {
        let mut runner = DiagnosticsRunner::new();
        runner.add_test(Arc::new(ErroringTest));
        runner.add_test(Arc::new(PanickingTest));
        runner.add_test(Arc::new(Callback::new(|_| Ok::<_, Infallible>(()))));
        let results = runner.run().expect("no reporters");

        assert_eq!(results.failure_count(), 3);
        let data_kinds: Vec<_> = results
            .iter()
            .map(|outcome| match outcome.result.data() {
                Some(ResultData::Error(error)) => error.kind().to_owned(),
                other => panic!("expected error data, found {other:?}"),
            })
            .collect();
        assert_eq!(data_kinds, ["io", "panic", "no-result"]);
        assert_eq!(
            results.get(1).map(|o| o.result.message()),
            Some("test panicked: test exploded")
        );
    }

    #[test]
    fn same_test_can_run_twice() {
        let test = Arc::new(FixedTest::success());
        let mut runner = DiagnosticsRunner::new();
        runner.add_test(test.clone());
        runner.add_test(test.clone());
        let results = runner.run().expect("no reporters");
        assert_eq!(results.len(), 2);
        assert_eq!(test.calls(), 2);

        // Tests are reusable across runs.
        runner.run().expect("no reporters");
        assert_eq!(test.calls(), 4);
    }

    #[test]
    fn reporter_errors_abort_the_run() {
        let test = Arc::new(FixedTest::success());
        let recorder = RecordingReporter::new();
        let mut runner = DiagnosticsRunner::new();
        runner.add_tests([test.clone() as Arc<dyn DiagnosticTest>, test.clone()]);
        runner.add_reporter(RecordingReporter::failing_on("finished 0"));
        runner.add_reporter(recorder.clone());

        let err = runner.run().expect_err("first reporter fails");
        assert_eq!(
            err.to_string(),
            "reporter failed: refusing to report `finished 0 FixedTest success (1 so far)`"
        );
        assert_eq!(test.calls(), 1, "no test runs after a reporter error");
        assert_eq!(recorder.events(), ["start 2"], "later reporters are skipped");
    }

    #[test]
    fn config_accessors() {
        let mut runner = DiagnosticsRunner::new();
        assert_eq!(runner.config(), &RunnerConfig::default());
        runner.config_mut().break_on_failure = true;
        assert!(runner.config().break_on_failure);
        assert!(runner.tests().is_empty());
    }
}
