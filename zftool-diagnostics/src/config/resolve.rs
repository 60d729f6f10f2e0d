// Copyright (c) The zftool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{DiagnosticsConfig, TestDescriptor};
use crate::{
    check::{DiagnosticTest, LabeledTest, TestParam, builtin_test},
    errors::{TestArgsError, TestDefinitionError},
};
use indexmap::IndexMap;
use std::{fmt, sync::Arc};
use tracing::{debug, warn};

type TestFactory =
    dyn Fn(&[TestParam]) -> Result<Arc<dyn DiagnosticTest>, TestArgsError> + Send + Sync;

/// Named test factories that configuration can refer to.
///
/// Registered names take precedence over built-in checks of the same name.
#[derive(Clone, Default)]
pub struct TestRegistry {
    factories: IndexMap<String, Arc<TestFactory>>,
}

impl TestRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under `name`, replacing any previous factory with that name.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&[TestParam]) -> Result<Arc<dyn DiagnosticTest>, TestArgsError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    /// Returns true if a factory is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Iterates over registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.factories.keys().map(String::as_str)
    }

    fn create(
        &self,
        name: &str,
        params: &[TestParam],
    ) -> Option<Result<Arc<dyn DiagnosticTest>, TestArgsError>> {
        self.factories.get(name).map(|factory| factory(params))
    }
}

impl fmt::Debug for TestRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestRegistry")
            .field("names", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Turns test definitions into runnable tests.
#[derive(Clone, Debug, Default)]
pub struct TestResolver {
    registry: TestRegistry,
}

impl TestResolver {
    /// Creates a resolver that looks up names in `registry`, then among built-in checks.
    pub fn new(registry: TestRegistry) -> Self {
        Self { registry }
    }

    /// Resolves the tests in `config`, in group and definition order.
    ///
    /// With a `group_filter`, only that group is resolved. A group that doesn't exist produces
    /// an empty list.
    pub fn resolve(
        &self,
        config: &DiagnosticsConfig,
        group_filter: Option<&str>,
    ) -> Result<Vec<Arc<dyn DiagnosticTest>>, TestDefinitionError> {
        let mut tests = Vec::new();
        match group_filter {
            Some(name) => match config.group(name) {
                Some(group) => {
                    for (label, definition) in group.entries() {
                        let descriptor = definition.to_descriptor(name)?;
                        tests.push(self.resolve_descriptor(name, label, descriptor)?);
                    }
                }
                None => {
                    warn!("unknown diagnostics group `{name}`, no tests will run");
                }
            },
            None => {
                for (name, group) in config.groups() {
                    for (label, definition) in group.entries() {
                        let descriptor = definition.to_descriptor(name)?;
                        tests.push(self.resolve_descriptor(name, label, descriptor)?);
                    }
                }
            }
        }
        debug!("resolved {} diagnostic tests", tests.len());
        Ok(tests)
    }

    /// Resolves a single descriptor belonging to `group`.
    ///
    /// A non-empty, non-numeric `label` replaces the test's own label with `"<group>: <label>"`.
    pub fn resolve_descriptor(
        &self,
        group: &str,
        label: Option<&str>,
        descriptor: TestDescriptor,
    ) -> Result<Arc<dyn DiagnosticTest>, TestDefinitionError> {
        let (test, description) = match descriptor {
            TestDescriptor::Instance(test) => (test, None),
            TestDescriptor::Callback(callback) => {
                (Arc::new(callback) as Arc<dyn DiagnosticTest>, None)
            }
            TestDescriptor::Named {
                name,
                params,
                description,
            } => (self.resolve_named(group, &name, &params)?, description),
        };

        let label = label.filter(|label| is_display_label(label));
        match (label, description) {
            (None, None) => Ok(test),
            (Some(label), description) => {
                let mut labeled = LabeledTest::new(format!("{group}: {label}"), test);
                if let Some(description) = description {
                    labeled = labeled.with_description(description);
                }
                Ok(Arc::new(labeled))
            }
            (None, Some(description)) => {
                let own_label = test.label().into_owned();
                Ok(Arc::new(
                    LabeledTest::new(own_label, test).with_description(description),
                ))
            }
        }
    }

    /// Constructs the test called `name`, looking in the registry first and built-in checks
    /// second.
    pub fn resolve_named(
        &self,
        group: &str,
        name: &str,
        params: &[TestParam],
    ) -> Result<Arc<dyn DiagnosticTest>, TestDefinitionError> {
        let created = self
            .registry
            .create(name, params)
            .or_else(|| builtin_test(name, params))
            .ok_or_else(|| TestDefinitionError::UnknownTest {
                group: group.to_owned(),
                name: name.to_owned(),
            })?;
        let test = created.map_err(|err| TestDefinitionError::InvalidArguments {
            group: group.to_owned(),
            name: name.to_owned(),
            err,
        })?;
        debug!("resolved test `{name}` in group `{group}`");
        Ok(test)
    }
}

/// Labels that are empty or numeric are positional, and don't replace the test's label.
fn is_display_label(label: &str) -> bool {
    !label.is_empty() && !is_numeric(label)
}

/// Returns true for integers and decimals with an optional sign and exponent, surrounded by
/// optional whitespace (`7`, `-2`, `1.5`, `.5`, `1e3`).
fn is_numeric(s: &str) -> bool {
    let s = s.trim();
    s.bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
        && s.parse::<f64>().is_ok()
}
