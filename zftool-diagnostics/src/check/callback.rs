// Copyright (c) The zftool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{CheckResult, DiagnosticTest, TestParam};
use crate::{errors::CheckError, result::DiagResult};
use debug_ignore::DebugIgnore;
use std::{error::Error, sync::Arc};

type CallbackFn = dyn Fn(&[TestParam]) -> Result<CallbackReturn, Box<dyn Error + Send + Sync>>
    + Send
    + Sync;

/// A diagnostic test that calls a closure with a fixed set of parameters.
#[derive(Clone, Debug)]
pub struct Callback {
    callback: DebugIgnore<Arc<CallbackFn>>,
    params: Vec<TestParam>,
}

impl Callback {
    /// Creates a new callback test.
    ///
    /// The closure's return value is interpreted through [`CallbackReturn`].
    pub fn new<F, R, E>(callback: F) -> Self
    where
        F: Fn(&[TestParam]) -> Result<R, E> + Send + Sync + 'static,
        R: Into<CallbackReturn>,
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        let callback: Arc<CallbackFn> = Arc::new(move |params: &[TestParam]| {
            callback(params).map(Into::into).map_err(Into::into)
        });
        Self {
            callback: DebugIgnore(callback),
            params: Vec::new(),
        }
    }

    /// Sets the parameters passed to the closure.
    pub fn with_params(mut self, params: Vec<TestParam>) -> Self {
        self.params = params;
        self
    }

    /// Returns the parameters passed to the closure.
    pub fn params(&self) -> &[TestParam] {
        &self.params
    }
}

impl DiagnosticTest for Callback {
    fn check(&self) -> CheckResult {
        match (self.callback)(&self.params).map_err(CheckError::Other)? {
            CallbackReturn::Result(result) => Ok(result),
            CallbackReturn::Bool(true) => Ok(DiagResult::success("")),
            CallbackReturn::Bool(false) => Ok(DiagResult::failure("")),
            CallbackReturn::Message(message) => Ok(DiagResult::warning(message)),
            CallbackReturn::Nothing => Err(CheckError::NoResult),
        }
    }
}

/// The value returned by a [`Callback`] closure.
#[derive(Clone, Debug, PartialEq)]
pub enum CallbackReturn {
    /// A complete result, used as-is.
    Result(DiagResult),

    /// `true` is a success and `false` a failure, both with an empty message.
    Bool(bool),

    /// A warning with this message.
    Message(String),

    /// No result at all. This is a bug in the callback, and is reported as a failure.
    Nothing,
}

impl From<DiagResult> for CallbackReturn {
    fn from(result: DiagResult) -> Self {
        CallbackReturn::Result(result)
    }
}

impl From<bool> for CallbackReturn {
    fn from(value: bool) -> Self {
        CallbackReturn::Bool(value)
    }
}

impl From<String> for CallbackReturn {
    fn from(message: String) -> Self {
        CallbackReturn::Message(message)
    }
}

impl From<&str> for CallbackReturn {
    fn from(message: &str) -> Self {
        CallbackReturn::Message(message.to_owned())
    }
}

impl From<()> for CallbackReturn {
    fn from((): ()) -> Self {
        CallbackReturn::Nothing
    }
}

impl<T: Into<CallbackReturn>> From<Option<T>> for CallbackReturn {
    fn from(value: Option<T>) -> Self {
        value.map_or(CallbackReturn::Nothing, Into::into)
    }
}
