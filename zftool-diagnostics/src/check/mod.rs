// Copyright (c) The zftool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Diagnostic tests.
//!
//! A diagnostic test is anything that implements [`DiagnosticTest`]. This module also provides
//! [`Callback`], which wraps a closure, and a set of built-in checks that can be referred to by
//! name from configuration.

mod builtin;
mod callback;

pub use builtin::*;
pub use callback::*;

use crate::{errors::CheckError, result::DiagResult};
use serde::Deserialize;
use std::{borrow::Cow, fmt, sync::Arc};

/// The return type of [`DiagnosticTest::check`].
pub type CheckResult = Result<DiagResult, CheckError>;

/// A single diagnostic check.
///
/// Tests are constructed once before a run and are immutable while it executes; the same test may
/// be run any number of times.
pub trait DiagnosticTest: Send + Sync {
    /// Performs the check.
    ///
    /// Expected failure conditions should be reported as a [`DiagResult::failure`]. Returning an
    /// error (or panicking) is also recovered by the runner, which turns it into a failure.
    fn check(&self) -> CheckResult;

    /// A human-readable label for this test.
    ///
    /// Defaults to the name of the implementing type.
    fn label(&self) -> Cow<'_, str> {
        Cow::Borrowed(short_type_name::<Self>())
    }

    /// An optional description of what this test checks.
    fn description(&self) -> Option<&str> {
        None
    }
}

impl fmt::Debug for dyn DiagnosticTest + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticTest")
            .field("label", &self.label())
            .finish_non_exhaustive()
    }
}

/// A parameter passed to a test from its definition.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TestParam {
    /// A boolean.
    Bool(bool),
    /// An integer.
    Integer(i64),
    /// A floating-point number.
    Float(f64),
    /// A string.
    String(String),
}

impl TestParam {
    /// Returns the string value, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TestParam::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for TestParam {
    fn from(s: &str) -> Self {
        TestParam::String(s.to_owned())
    }
}

impl fmt::Display for TestParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestParam::Bool(b) => write!(f, "{b}"),
            TestParam::Integer(i) => write!(f, "{i}"),
            TestParam::Float(x) => write!(f, "{x}"),
            TestParam::String(s) => f.write_str(s),
        }
    }
}

/// A test with a label (and possibly a description) assigned by configuration.
#[derive(Debug)]
pub struct LabeledTest {
    label: String,
    description: Option<String>,
    inner: Arc<dyn DiagnosticTest>,
}

impl LabeledTest {
    /// Wraps `inner`, overriding its label.
    pub fn new(label: impl Into<String>, inner: Arc<dyn DiagnosticTest>) -> Self {
        Self {
            label: label.into(),
            description: None,
            inner,
        }
    }

    /// Overrides the description of the wrapped test.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl DiagnosticTest for LabeledTest {
    fn check(&self) -> CheckResult {
        self.inner.check()
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.label)
    }

    fn description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .or_else(|| self.inner.description())
    }
}

/// Returns the last path segment of a type name, without generic parameters.
fn short_type_name<T: ?Sized>() -> &'static str {
    let name = std::any::type_name::<T>();
    let name = name.split('<').next().unwrap_or(name);
    name.rsplit("::").next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::FixedTest;

    struct DiskSpace;

    impl DiagnosticTest for DiskSpace {
        fn check(&self) -> CheckResult {
            Ok(DiagResult::success(""))
        }
    }

    #[test]
    fn default_label_is_type_name() {
        assert_eq!(DiskSpace.label(), "DiskSpace");
        assert_eq!(DiskSpace.description(), None);
    }

    #[test]
    fn labeled_test_overrides_label() {
        let inner: Arc<dyn DiagnosticTest> = Arc::new(FixedTest::success());
        let labeled = LabeledTest::new("core: fixed", inner.clone()).with_description("always ok");
        assert_eq!(labeled.label(), "core: fixed");
        assert_eq!(labeled.description(), Some("always ok"));
        assert_eq!(
            labeled.check().expect("fixed test succeeds"),
            inner.check().expect("fixed test succeeds")
        );
    }
}
