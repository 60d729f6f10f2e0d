// Copyright (c) The zftool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    Reporter, ReporterOutput, RunEvent,
    helpers::{Styles, overall_kind, write_summary_str},
};
use crate::{errors::WriteEventError, result::ResultKind};
use owo_colors::OwoColorize;
use swrite::{SWrite, swrite};

/// A reporter that prints one character per test, followed by a summary line.
///
/// Progress characters are `.` for a success, `!` for a warning, `F` for a failure and `?` for an
/// unknown result. Each line of progress ends with a `done / total (pct%)` gutter.
#[derive(Debug)]
pub struct BasicReporter<'a> {
    output: ReporterOutput<'a>,
    width: usize,
    styles: Box<Styles>,
    progress: Progress,
}

#[derive(Debug, Default)]
struct Progress {
    total: usize,
    done: usize,
    count_width: usize,
    line_width: usize,
    line_open: bool,
}

impl Progress {
    fn new(total: usize, width: usize) -> Self {
        let count_width = total.to_string().len();
        // " {done} / {total} ({pct}%)", with pct padded to 3 columns.
        let gutter = count_width * 2 + 11;
        Self {
            total,
            done: 0,
            count_width,
            line_width: width.saturating_sub(gutter).max(1),
            line_open: false,
        }
    }

    fn gutter(&self) -> String {
        let pct = (self.done * 100).checked_div(self.total).unwrap_or(100);
        format!(
            " {:>width$} / {} ({pct:>3}%)",
            self.done,
            self.total,
            width = self.count_width
        )
    }

    /// Pads the current line and closes it with the gutter.
    fn close_line(&mut self, out: &mut String) {
        if !self.line_open {
            return;
        }
        let filled = match self.done % self.line_width {
            0 => self.line_width,
            n => n,
        };
        swrite!(
            out,
            "{}{}\n",
            " ".repeat(self.line_width - filled),
            self.gutter()
        );
        self.line_open = false;
    }
}

impl<'a> BasicReporter<'a> {
    /// Creates a new basic reporter that wraps progress at `width` columns.
    pub fn new(output: ReporterOutput<'a>, width: usize) -> Self {
        Self {
            output,
            width,
            styles: Box::default(),
            progress: Progress::default(),
        }
    }

    /// Enables colored output.
    pub fn colorize(&mut self) -> &mut Self {
        self.styles.colorize();
        self
    }
}

impl Reporter for BasicReporter<'_> {
    fn report_event(&mut self, event: &RunEvent<'_>) -> Result<(), WriteEventError> {
        match event {
            RunEvent::RunStarted { tests } => {
                self.progress = Progress::new(tests.len(), self.width);
                Ok(())
            }
            RunEvent::TestFinished { result, .. } => {
                let kind = result.kind();
                let c = match kind {
                    ResultKind::Success => ".",
                    ResultKind::Warning => "!",
                    ResultKind::Failure => "F",
                    ResultKind::Unknown => "?",
                };
                let mut out = c.style(self.styles.for_kind(kind)).to_string();
                self.progress.done += 1;
                self.progress.line_open = true;
                if self.progress.done % self.progress.line_width == 0
                    || self.progress.done == self.progress.total
                {
                    self.progress.close_line(&mut out);
                }
                self.output.write_str(&out)
            }
            RunEvent::RunStopped { .. } => Ok(()),
            RunEvent::RunFinished {
                results, stopped, ..
            } => {
                let mut out = String::new();
                self.progress.close_line(&mut out);
                if !results.is_empty() {
                    out.push('\n');
                }
                if *stopped {
                    swrite!(
                        out,
                        "{}\n",
                        "Diagnostics aborted because of a failure.".style(self.styles.failure)
                    );
                }
                let kind = overall_kind(results);
                let label = match kind {
                    ResultKind::Success => "OK",
                    ResultKind::Warning | ResultKind::Unknown => "WARN",
                    ResultKind::Failure => "FAIL",
                };
                swrite!(out, "{} ", label.style(self.styles.for_kind(kind)));
                write_summary_str(results, &self.styles, &mut out);
                out.push('\n');
                self.output.write_str(&out)
            }
        }
    }
}
