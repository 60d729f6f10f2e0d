// Copyright (c) The zftool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    check::{Callback, DiagnosticTest, TestParam},
    errors::TestDefinitionError,
};
use indexmap::IndexMap;
use serde::Deserialize;
use std::sync::Arc;

/// A group of test definitions, as written in configuration.
///
/// A group is either a table mapping labels to definitions, or an array of unlabeled
/// definitions.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum GroupDefinition {
    /// `label = definition` pairs.
    Labeled(IndexMap<String, TestDefinition>),

    /// Unlabeled definitions.
    List(Vec<TestDefinition>),
}

impl GroupDefinition {
    /// Iterates over the definitions in this group along with their labels, in order.
    pub fn entries(&self) -> Box<dyn Iterator<Item = (Option<&str>, &TestDefinition)> + '_> {
        match self {
            GroupDefinition::Labeled(map) => {
                Box::new(map.iter().map(|(label, def)| (Some(label.as_str()), def)))
            }
            GroupDefinition::List(list) => Box::new(list.iter().map(|def| (None, def))),
        }
    }

    /// Returns the number of definitions in this group.
    pub fn len(&self) -> usize {
        match self {
            GroupDefinition::Labeled(map) => map.len(),
            GroupDefinition::List(list) => list.len(),
        }
    }

    /// Returns true if this group has no definitions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single test definition, as written in configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TestDefinition {
    /// The name of a registered or built-in test, with no parameters.
    Name(String),

    /// `[name, params...]`.
    List(Vec<TestParam>),

    /// `{ test = "name", args = [...], description = "..." }`.
    Table(TestTable),
}

/// The table form of a [`TestDefinition`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestTable {
    /// The test name.
    pub test: String,

    /// Parameters passed to the test.
    #[serde(default)]
    pub args: Vec<TestParam>,

    /// A description of what the test checks.
    #[serde(default)]
    pub description: Option<String>,
}

impl TestDefinition {
    /// Converts this definition into a [`TestDescriptor`].
    ///
    /// Fails if this is an empty array, or an array whose first element is not a string.
    pub fn to_descriptor(&self, group: &str) -> Result<TestDescriptor, TestDefinitionError> {
        match self {
            TestDefinition::Name(name) => Ok(TestDescriptor::named(name.clone(), Vec::new())),
            TestDefinition::List(list) => match list.split_first() {
                None => Err(TestDefinitionError::EmptyDefinition {
                    group: group.to_owned(),
                }),
                Some((TestParam::String(name), params)) => {
                    Ok(TestDescriptor::named(name.clone(), params.to_vec()))
                }
                Some((other, _)) => Err(TestDefinitionError::InvalidTestName {
                    group: group.to_owned(),
                    name: other.to_string(),
                }),
            },
            TestDefinition::Table(table) => Ok(TestDescriptor::Named {
                name: table.test.clone(),
                params: table.args.clone(),
                description: table.description.clone(),
            }),
        }
    }
}

/// Any of the ways a test can be supplied to a [`TestResolver`](super::TestResolver).
#[derive(Clone, Debug)]
pub enum TestDescriptor {
    /// A ready-made test.
    Instance(Arc<dyn DiagnosticTest>),

    /// A closure, wrapped as a [`Callback`] test.
    Callback(Callback),

    /// A registered or built-in test, referred to by name.
    Named {
        /// The test name.
        name: String,
        /// Parameters passed to the test.
        params: Vec<TestParam>,
        /// A description overriding the test's own.
        description: Option<String>,
    },
}

impl TestDescriptor {
    /// Creates a [`TestDescriptor::Named`] with no description.
    pub fn named(name: impl Into<String>, params: Vec<TestParam>) -> Self {
        TestDescriptor::Named {
            name: name.into(),
            params,
            description: None,
        }
    }
}

impl From<Arc<dyn DiagnosticTest>> for TestDescriptor {
    fn from(test: Arc<dyn DiagnosticTest>) -> Self {
        TestDescriptor::Instance(test)
    }
}

impl From<Callback> for TestDescriptor {
    fn from(callback: Callback) -> Self {
        TestDescriptor::Callback(callback)
    }
}
