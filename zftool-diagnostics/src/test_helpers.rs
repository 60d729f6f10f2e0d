// Copyright (c) The zftool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles shared across unit tests.

use crate::{
    check::{CheckResult, DiagnosticTest},
    errors::{CheckError, WriteEventError},
    reporter::{Reporter, RunEvent},
    result::{DiagResult, ResultKind},
};
use std::{
    borrow::Cow,
    io,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

/// A test that always produces the same result and counts how often it ran.
#[derive(Debug)]
pub(crate) struct FixedTest {
    label: Option<String>,
    result: DiagResult,
    calls: AtomicUsize,
}

impl FixedTest {
    pub(crate) fn new(kind: ResultKind) -> Self {
        Self {
            label: None,
            result: DiagResult::new(kind, format!("fixed {kind}")),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn success() -> Self {
        Self::new(ResultKind::Success)
    }

    pub(crate) fn warning() -> Self {
        Self::new(ResultKind::Warning)
    }

    pub(crate) fn failure() -> Self {
        Self::new(ResultKind::Failure)
    }

    pub(crate) fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_owned());
        self
    }

    pub(crate) fn with_result(mut self, result: DiagResult) -> Self {
        self.result = result;
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn shared(kinds: &[ResultKind]) -> Vec<Arc<dyn DiagnosticTest>> {
        kinds
            .iter()
            .enumerate()
            .map(|(idx, kind)| {
                Arc::new(FixedTest::new(*kind).with_label(&format!("test {idx}")))
                    as Arc<dyn DiagnosticTest>
            })
            .collect()
    }
}

impl DiagnosticTest for FixedTest {
    fn check(&self) -> CheckResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.result.clone())
    }

    fn label(&self) -> Cow<'_, str> {
        match &self.label {
            Some(label) => Cow::Borrowed(label),
            None => Cow::Borrowed("FixedTest"),
        }
    }
}

/// A test that panics.
#[derive(Debug)]
pub(crate) struct PanickingTest;

impl DiagnosticTest for PanickingTest {
    fn check(&self) -> CheckResult {
        panic!("test exploded")
    }
}

/// A test that returns an I/O error.
#[derive(Debug)]
pub(crate) struct ErroringTest;

impl DiagnosticTest for ErroringTest {
    fn check(&self) -> CheckResult {
        Err(CheckError::Io {
            path: "config/autoload".into(),
            err: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        })
    }
}

/// A reporter that records a one-line description of every event it sees.
#[derive(Clone, Debug, Default)]
pub(crate) struct RecordingReporter {
    events: Arc<Mutex<Vec<String>>>,
    fail_on: Option<&'static str>,
}

impl RecordingReporter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fails when asked to report an event whose description starts with `prefix`.
    pub(crate) fn failing_on(prefix: &'static str) -> Self {
        Self {
            fail_on: Some(prefix),
            ..Self::default()
        }
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn report_event(&mut self, event: &RunEvent<'_>) -> Result<(), WriteEventError> {
        let line = match event {
            RunEvent::RunStarted { tests } => format!("start {}", tests.len()),
            RunEvent::TestFinished {
                test,
                index,
                result,
                results,
            } => format!(
                "finished {index} {} {} ({} so far)",
                test.label(),
                result.kind(),
                results.len()
            ),
            RunEvent::RunStopped {
                test, remaining, ..
            } => format!("stopped {} ({remaining} remaining)", test.label()),
            RunEvent::RunFinished {
                results, stopped, ..
            } => format!("finish {} stopped={stopped}", results.len()),
        };
        if let Some(prefix) = self.fail_on {
            if line.starts_with(prefix) {
                return Err(WriteEventError::Reporter {
                    message: format!("refusing to report `{line}`"),
                });
            }
        }
        self.events.lock().unwrap().push(line);
        Ok(())
    }
}
