// Copyright (c) The zftool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{collection::ResultCollection, result::ResultKind};
use owo_colors::{OwoColorize, Style};
use swrite::{SWrite, swrite};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

#[derive(Debug, Default, Clone)]
pub(super) struct Styles {
    pub(super) is_colorized: bool,
    pub(super) count: Style,
    pub(super) success: Style,
    pub(super) warning: Style,
    pub(super) failure: Style,
    pub(super) success_badge: Style,
    pub(super) warning_badge: Style,
    pub(super) failure_badge: Style,
}

impl Styles {
    pub(super) fn colorize(&mut self) {
        self.is_colorized = true;
        self.count = Style::new().bold();
        self.success = Style::new().green();
        self.warning = Style::new().yellow();
        self.failure = Style::new().red();
        self.success_badge = Style::new().black().on_green();
        self.warning_badge = Style::new().black().on_yellow();
        self.failure_badge = Style::new().white().on_red();
    }

    /// The style for text describing a result of this kind.
    pub(super) fn for_kind(&self, kind: ResultKind) -> Style {
        match kind {
            ResultKind::Success => self.success,
            ResultKind::Warning | ResultKind::Unknown => self.warning,
            ResultKind::Failure => self.failure,
        }
    }

    /// The style for the badge of a result of this kind.
    pub(super) fn badge_for_kind(&self, kind: ResultKind) -> Style {
        match kind {
            ResultKind::Success => self.success_badge,
            ResultKind::Warning | ResultKind::Unknown => self.warning_badge,
            ResultKind::Failure => self.failure_badge,
        }
    }
}

/// The kind that best describes a whole run.
pub(super) fn overall_kind(results: &ResultCollection) -> ResultKind {
    if results.has_failures() {
        ResultKind::Failure
    } else if results.warning_count() > 0 || results.unknown_count() > 0 {
        ResultKind::Warning
    } else {
        ResultKind::Success
    }
}

/// Writes the parenthesized summary of a run, for example `(1 failure, 0 warnings, 3 successful
/// tests)`.
pub(super) fn write_summary_str(results: &ResultCollection, styles: &Styles, out: &mut String) {
    let count = |n: usize| n.style(styles.count).to_string();

    swrite!(out, "(");
    match overall_kind(results) {
        ResultKind::Success => {
            swrite!(
                out,
                "{} {}",
                count(results.len()),
                plural(results.len(), "diagnostic test", "diagnostic tests"),
            );
        }
        kind => {
            if kind.is_failure() {
                swrite!(
                    out,
                    "{} {}, ",
                    count(results.failure_count()),
                    plural(results.failure_count(), "failure", "failures"),
                );
            }
            swrite!(
                out,
                "{} {}, {} {}",
                count(results.warning_count()),
                plural(results.warning_count(), "warning", "warnings"),
                count(results.success_count()),
                plural(results.success_count(), "successful test", "successful tests"),
            );
            if results.unknown_count() > 0 {
                swrite!(
                    out,
                    ", {} {}",
                    count(results.unknown_count()),
                    plural(
                        results.unknown_count(),
                        "unknown test result",
                        "unknown test results"
                    ),
                );
            }
        }
    }
    if results.skipped_count() > 0 {
        swrite!(out, ", {} skipped", count(results.skipped_count()));
    }
    swrite!(out, ")");
}

fn plural<'a>(n: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if n == 1 { singular } else { plural }
}

/// Word-wraps `text` to `width` columns, breaking words longer than a line.
///
/// Every line after the first (including lines that were already separate in `text`) is
/// prefixed with `indent`. Spaces at the start of a line are kept.
pub(super) fn wrap_with_indent(text: &str, width: usize, indent: &str) -> String {
    let width = width.max(1);
    let mut lines = Vec::new();
    for line in text.split('\n') {
        wrap_line(line, width, &mut lines);
    }

    let mut out = String::with_capacity(text.len());
    for (idx, line) in lines.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
            out.push_str(indent);
        }
        out.push_str(line);
    }
    out
}

fn wrap_line(line: &str, width: usize, lines: &mut Vec<String>) {
    let mut current = String::new();
    let mut current_width = 0;
    let mut started = false;

    for word in line.split(' ') {
        let word_width = word.width();
        if started && current_width + 1 + word_width <= width {
            current.push(' ');
            current.push_str(word);
            current_width += 1 + word_width;
            continue;
        }
        if started {
            lines.push(std::mem::take(&mut current));
        }
        started = true;
        current_width = 0;

        // Cut words that don't fit on a line of their own.
        for c in word.chars() {
            let c_width = c.width().unwrap_or(0);
            if current_width + c_width > width && current_width > 0 {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            current.push(c);
            current_width += c_width;
        }
    }
    lines.push(current);
}
