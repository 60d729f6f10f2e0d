// Copyright (c) The zftool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    Reporter, ReporterOutput, RunEvent,
    helpers::{Styles, overall_kind, wrap_with_indent, write_summary_str},
};
use crate::{
    check::DiagnosticTest,
    errors::WriteEventError,
    result::{DiagResult, ResultData, ResultKind},
};
use owo_colors::OwoColorize;
use swrite::{SWrite, swrite};

/// Columns taken up by the status badge and its margins.
const BADGE_GUTTER: usize = 15;
const CONTINUATION_INDENT: &str = "              ";

/// A reporter that prints one status line per test.
///
/// Each line has a badge (`OK`, `WARN`, `FAIL` or `????`) followed by the test label and the
/// result message, word-wrapped to the output width. With
/// [`set_display_data`](Self::set_display_data), data attached to results is printed as well.
#[derive(Debug)]
pub struct VerboseReporter<'a> {
    output: ReporterOutput<'a>,
    width: usize,
    display_data: bool,
    styles: Box<Styles>,
}

impl<'a> VerboseReporter<'a> {
    /// Creates a new verbose reporter that wraps output at `width` columns.
    pub fn new(output: ReporterOutput<'a>, width: usize) -> Self {
        Self {
            output,
            width,
            display_data: false,
            styles: Box::default(),
        }
    }

    /// Sets whether data attached to results is displayed.
    pub fn set_display_data(&mut self, display_data: bool) -> &mut Self {
        self.display_data = display_data;
        self
    }

    /// Enables colored output.
    pub fn colorize(&mut self) -> &mut Self {
        self.styles.colorize();
        self
    }

    fn text_width(&self) -> usize {
        self.width.saturating_sub(BADGE_GUTTER).max(1)
    }

    fn write_test_finished(
        &mut self,
        test: &dyn DiagnosticTest,
        result: &DiagResult,
    ) -> Result<(), WriteEventError> {
        let text_width = self.text_width();
        let mut descr = format!(" {}", test.label());
        if !result.message().is_empty() {
            swrite!(descr, ": {}", result.message());
        }
        if self.display_data {
            if let Some(data) = result.data() {
                let rule = "-".repeat(text_width);
                swrite!(descr, "\n{rule}\n");
                write_data(data, &mut descr);
                swrite!(descr, "\n{rule}");
            }
        }

        let kind = result.kind();
        let text = wrap_with_indent(&descr, text_width, CONTINUATION_INDENT);
        let line = format!(
            "       {}{}\n\n",
            badge(kind).style(self.styles.badge_for_kind(kind)),
            text.style(self.styles.for_kind(kind)),
        );
        self.output.write_str(&line)
    }
}

impl Reporter for VerboseReporter<'_> {
    fn report_event(&mut self, event: &RunEvent<'_>) -> Result<(), WriteEventError> {
        match event {
            RunEvent::RunStarted { .. } => self.output.write_str("Running diagnostics:\n\n"),
            RunEvent::TestFinished { test, result, .. } => self.write_test_finished(*test, result),
            RunEvent::RunStopped { .. } => Ok(()),
            RunEvent::RunFinished {
                results, stopped, ..
            } => {
                let mut out = String::new();
                if *stopped {
                    swrite!(
                        out,
                        "{}\n",
                        "Diagnostics aborted because of a failure.".style(self.styles.failure)
                    );
                }
                let kind = overall_kind(results);
                swrite!(out, "{}  ", badge(kind).style(self.styles.badge_for_kind(kind)));
                write_summary_str(results, &self.styles, &mut out);
                out.push_str("\n\n");
                self.output.write_str(&out)
            }
        }
    }
}

fn badge(kind: ResultKind) -> &'static str {
    match kind {
        ResultKind::Success => "  OK  ",
        ResultKind::Warning => " WARN ",
        ResultKind::Failure => " FAIL ",
        ResultKind::Unknown => " ???? ",
    }
}

fn write_data(data: &ResultData, out: &mut String) {
    match data {
        ResultData::Error(error) => {
            swrite!(out, "{}: {}", error.kind(), error.message());
            for cause in error.causes() {
                swrite!(out, "\n  caused by: {cause}");
            }
        }
        ResultData::Value(value) => swrite!(out, "{value:#}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        runner::DiagnosticsRunner,
        test_helpers::{ErroringTest, FixedTest},
    };
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn status_lines_are_wrapped() {
        let mut out = String::new();
        let mut runner = DiagnosticsRunner::new();
        runner.add_tests([
            Arc::new(
                FixedTest::success()
                    .with_label("core: php")
                    .with_result(DiagResult::success("8.2.4 satisfies >=8.1")),
            ) as Arc<dyn DiagnosticTest>,
            Arc::new(
                FixedTest::warning()
                    .with_label("cache")
                    .with_result(DiagResult::warning("low disk")),
            ),
            Arc::new(
                FixedTest::failure()
                    .with_label("env")
                    .with_result(DiagResult::failure("")),
            ),
        ]);
        runner.add_reporter(VerboseReporter::new(ReporterOutput::Buffer(&mut out), 40));
        runner.run().expect("writing to a buffer succeeds");
        drop(runner);

        assert_eq!(
            out,
            indoc! {"
                Running diagnostics:

                         OK   core: php: 8.2.4
                              satisfies >=8.1

                        WARN  cache: low disk

                        FAIL  env

                 FAIL   (1 failure, 1 warning, 1 successful test)

            "}
        );
    }

    #[test]
    fn narrow_output_stays_within_width() {
        let mut out = String::new();
        let mut runner = DiagnosticsRunner::new();
        runner.add_test(Arc::new(
            FixedTest::warning()
                .with_label("narrow")
                .with_result(DiagResult::warning("aaaa bbbb cccc dddd eeee")),
        ));
        runner.add_reporter(VerboseReporter::new(ReporterOutput::Buffer(&mut out), 30));
        runner.run().expect("writing to a buffer succeeds");
        drop(runner);

        // Status lines start with the badge margin; the summary line is not wrapped.
        let status_lines: Vec<_> = out
            .lines()
            .filter(|line| line.starts_with("       "))
            .collect();
        assert_eq!(
            status_lines,
            [
                "        WARN  narrow: aaaa",
                "              bbbb cccc dddd",
                "              eeee",
            ]
        );
        for line in status_lines {
            assert!(line.len() <= 30, "`{line}` is wider than 30 columns");
        }
    }

    #[test]
    fn data_is_displayed_in_debug_mode() {
        let mut out = String::new();
        let mut runner = DiagnosticsRunner::new();
        runner.set_break_on_failure(true);
        runner.add_test(Arc::new(ErroringTest));
        runner.add_test(Arc::new(FixedTest::success()));
        let mut reporter = VerboseReporter::new(ReporterOutput::Buffer(&mut out), 60);
        reporter.set_display_data(true);
        runner.add_reporter(reporter);
        runner.run().expect("writing to a buffer succeeds");
        drop(runner);

        let rule = "-".repeat(45);
        let expected = [
            "Running diagnostics:".to_owned(),
            String::new(),
            "        FAIL  ErroringTest: I/O error accessing".to_owned(),
            format!("{CONTINUATION_INDENT}`config/autoload`"),
            format!("{CONTINUATION_INDENT}{rule}"),
            format!("{CONTINUATION_INDENT}io: I/O error accessing `config/autoload`"),
            format!("{CONTINUATION_INDENT}  caused by: permission denied"),
            format!("{CONTINUATION_INDENT}{rule}"),
            String::new(),
            "Diagnostics aborted because of a failure.".to_owned(),
            " FAIL   (1 failure, 0 warnings, 0 successful tests, 1 skipped)".to_owned(),
            String::new(),
            String::new(),
        ]
        .join("\n");
        assert_eq!(out, expected);
    }

    #[test]
    fn value_data_is_pretty_printed() {
        let mut out = String::new();
        write_data(
            &ResultData::Value(serde_json::json!({ "free": 12 })),
            &mut out,
        );
        assert_eq!(out, "{\n  \"free\": 12\n}");
    }
}
