// Copyright (c) The zftool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in checks that can be referred to by name from configuration.

use super::{CheckResult, DiagnosticTest, TestParam};
use crate::{
    errors::{CheckError, TestArgsError},
    result::{CaughtError, DiagResult},
};
use camino::{Utf8Path, Utf8PathBuf};
use itertools::Itertools;
use regex::Regex;
use semver::{Version, VersionReq};
use std::{
    borrow::Cow,
    sync::{Arc, LazyLock},
};

/// The names of all built-in checks.
pub const BUILTIN_TEST_NAMES: &[&str] = &[
    CommandVersion::NAME,
    DirReadable::NAME,
    DirWritable::NAME,
    EnvVarSet::NAME,
];

/// Constructs the built-in check called `name` from its parameters.
///
/// Returns `None` if there is no built-in check with this name.
pub fn builtin_test(
    name: &str,
    params: &[TestParam],
) -> Option<Result<Arc<dyn DiagnosticTest>, TestArgsError>> {
    let test = match name {
        CommandVersion::NAME => CommandVersion::from_params(params).map(shared),
        DirReadable::NAME => DirReadable::from_params(params).map(shared),
        DirWritable::NAME => DirWritable::from_params(params).map(shared),
        EnvVarSet::NAME => EnvVarSet::from_params(params).map(shared),
        _ => return None,
    };
    Some(test)
}

fn shared<T: DiagnosticTest + 'static>(test: T) -> Arc<dyn DiagnosticTest> {
    Arc::new(test)
}

/// Compares an observed version against a requirement.
///
/// The observed version is free-form text such as `PHP 8.2.4 (cli)`: the first
/// `MAJOR.MINOR[.PATCH]` token in it is used.
///
/// Not available by name from configuration: construct it directly, or from a
/// [`TestRegistry`](crate::config::TestRegistry) factory that obtains the observed version.
#[derive(Clone, Debug)]
pub struct VersionCheck {
    subject: String,
    observed: String,
    required: VersionReq,
}

impl VersionCheck {
    /// Creates a new version check.
    pub fn new(subject: impl Into<String>, observed: impl Into<String>, required: VersionReq) -> Self {
        Self {
            subject: subject.into(),
            observed: observed.into(),
            required,
        }
    }
}

impl DiagnosticTest for VersionCheck {
    fn check(&self) -> CheckResult {
        Ok(compare_versions(&self.subject, &self.observed, &self.required))
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("{} {}", self.subject, self.required))
    }
}

/// Runs a command (by default `<command> --version`) and checks the version it reports.
#[derive(Clone, Debug)]
pub struct CommandVersion {
    command: String,
    args: Vec<String>,
    required: VersionReq,
}

impl CommandVersion {
    const NAME: &'static str = "command-version";

    /// Creates a new check that runs `<command> --version`.
    pub fn new(command: impl Into<String>, required: VersionReq) -> Self {
        Self {
            command: command.into(),
            args: vec!["--version".to_owned()],
            required,
        }
    }

    /// Replaces the arguments passed to the command.
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    fn from_params(params: &[TestParam]) -> Result<Self, TestArgsError> {
        match params {
            [command, required] => Ok(Self::new(command.to_string(), parse_requirement(required)?)),
            _ => Err(TestArgsError::new("expected a command and a version requirement")),
        }
    }

    fn command_line(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .join(" ")
    }
}

impl DiagnosticTest for CommandVersion {
    fn check(&self) -> CheckResult {
        let output = duct::cmd(&self.command, &self.args)
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()
            .map_err(|err| CheckError::CommandExec {
                command: self.command_line(),
                err,
            })?;

        if !output.status.success() {
            return Ok(DiagResult::failure(format!(
                "`{}` exited with {}",
                self.command_line(),
                output.status
            )));
        }

        // Some tools print their version to stderr.
        let text = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr)
        } else {
            String::from_utf8_lossy(&output.stdout)
        };
        Ok(compare_versions(&self.command, &text, &self.required))
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("{} {}", self.command, self.required))
    }
}

/// Checks that directories exist and can be listed.
#[derive(Clone, Debug)]
pub struct DirReadable {
    paths: Vec<Utf8PathBuf>,
}

impl DirReadable {
    const NAME: &'static str = "dir-readable";

    /// Creates a new check over the given directories.
    pub fn new(paths: impl IntoIterator<Item = impl Into<Utf8PathBuf>>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    fn from_params(params: &[TestParam]) -> Result<Self, TestArgsError> {
        Ok(Self::new(path_params(params)?))
    }
}

impl DiagnosticTest for DirReadable {
    fn check(&self) -> CheckResult {
        check_dirs(&self.paths, "readable", |path| {
            fs_err::read_dir(path).map(|_| ())
        })
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("readable: {}", self.paths.iter().join(", ")))
    }
}

/// Checks that directories exist and new files can be created in them.
#[derive(Clone, Debug)]
pub struct DirWritable {
    paths: Vec<Utf8PathBuf>,
}

impl DirWritable {
    const NAME: &'static str = "dir-writable";

    /// Creates a new check over the given directories.
    pub fn new(paths: impl IntoIterator<Item = impl Into<Utf8PathBuf>>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    fn from_params(params: &[TestParam]) -> Result<Self, TestArgsError> {
        Ok(Self::new(path_params(params)?))
    }
}

impl DiagnosticTest for DirWritable {
    fn check(&self) -> CheckResult {
        check_dirs(&self.paths, "writable", |path| {
            // The file is removed as soon as it's dropped.
            camino_tempfile::Builder::new()
                .prefix(".zftool-diag")
                .tempfile_in(path)
                .map(|_| ())
        })
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("writable: {}", self.paths.iter().join(", ")))
    }
}

/// Checks that environment variables are set to non-empty values.
#[derive(Clone, Debug)]
pub struct EnvVarSet {
    names: Vec<String>,
}

impl EnvVarSet {
    const NAME: &'static str = "env-var";

    /// Creates a new check over the given variable names.
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    fn from_params(params: &[TestParam]) -> Result<Self, TestArgsError> {
        if params.is_empty() {
            return Err(TestArgsError::new("expected at least one variable name"));
        }
        Ok(Self::new(params.iter().map(|p| p.to_string())))
    }
}

impl DiagnosticTest for EnvVarSet {
    fn check(&self) -> CheckResult {
        let missing: Vec<_> = self
            .names
            .iter()
            .filter(|name| std::env::var_os(name).is_none_or(|value| value.is_empty()))
            .collect();
        if missing.is_empty() {
            Ok(DiagResult::success(format!(
                "{} set",
                plural(self.names.len(), "variable is", "variables are")
            )))
        } else {
            Ok(DiagResult::failure(format!(
                "not set: {}",
                missing.iter().join(", ")
            )))
        }
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("env: {}", self.names.join(", ")))
    }
}

// ---
// Helpers
// ---

static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").expect("version regex is valid")
});

/// Extracts the first `MAJOR.MINOR[.PATCH]` version from free-form text.
pub(crate) fn extract_version(text: &str) -> Option<Version> {
    let captures = VERSION_REGEX.captures(text)?;
    let part = |idx: usize| -> Option<u64> {
        captures.get(idx).map_or(Some(0), |m| m.as_str().parse().ok())
    };
    Some(Version::new(part(1)?, part(2)?, part(3)?))
}

fn compare_versions(subject: &str, observed: &str, required: &VersionReq) -> DiagResult {
    match extract_version(observed) {
        Some(version) if required.matches(&version) => {
            DiagResult::success(format!("{subject} {version} satisfies {required}"))
        }
        Some(version) => {
            DiagResult::failure(format!("{subject} {version} does not satisfy {required}"))
        }
        None => DiagResult::warning(format!(
            "unable to determine {subject} version from `{}`",
            observed.trim()
        )),
    }
}

fn parse_requirement(param: &TestParam) -> Result<VersionReq, TestArgsError> {
    let input = param.to_string();
    VersionReq::parse(&input).map_err(|err| {
        TestArgsError::new(format!("invalid version requirement `{input}`: {err}"))
    })
}

fn path_params(params: &[TestParam]) -> Result<Vec<Utf8PathBuf>, TestArgsError> {
    if params.is_empty() {
        return Err(TestArgsError::new("expected at least one directory"));
    }
    Ok(params.iter().map(|p| Utf8PathBuf::from(p.to_string())).collect())
}

fn check_dirs(
    paths: &[Utf8PathBuf],
    what: &str,
    probe: impl Fn(&Utf8Path) -> std::io::Result<()>,
) -> CheckResult {
    for path in paths {
        let metadata = match fs_err::metadata(path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(DiagResult::failure(format!("`{path}` does not exist")));
            }
            Err(err) => {
                return Err(CheckError::Io {
                    path: path.clone(),
                    err,
                });
            }
        };
        if !metadata.is_dir() {
            return Ok(DiagResult::failure(format!("`{path}` is not a directory")));
        }
        if let Err(err) = probe(path) {
            return Ok(DiagResult::failure(format!("`{path}` is not {what}"))
                .with_data(CaughtError::new("io", &err)));
        }
    }
    Ok(DiagResult::success(format!(
        "{} {what}",
        plural(paths.len(), "directory is", "directories are")
    )))
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}
