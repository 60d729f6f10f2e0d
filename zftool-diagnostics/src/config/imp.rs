// Copyright (c) The zftool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::GroupDefinition;
use crate::errors::ConfigParseError;
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, ConfigError, File, FileFormat, Source};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Receives warnings produced while reading config files.
pub trait ConfigWarnings {
    /// Called with the keys in `config_file` that were not recognized.
    fn unknown_config_keys(&mut self, config_file: &Utf8Path, unknown: &BTreeSet<String>);
}

/// Logs config warnings with `tracing`.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultConfigWarnings;

impl ConfigWarnings for DefaultConfigWarnings {
    fn unknown_config_keys(&mut self, config_file: &Utf8Path, unknown: &BTreeSet<String>) {
        let mut unknown_str = String::new();
        if unknown.len() == 1 {
            // Print this on the same line.
            unknown_str.push_str("key: ");
            unknown_str.extend(unknown.iter().map(String::as_str));
        } else {
            unknown_str.push_str("keys:\n");
            for ignored_key in unknown {
                unknown_str.push('\n');
                unknown_str.push_str("  - ");
                unknown_str.push_str(ignored_key);
            }
        }

        warn!("in config file {config_file}, ignoring unknown configuration {unknown_str}");
    }
}

/// Settings that control a diagnostics run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Settings {
    /// Stop after the first failure.
    pub break_on_failure: bool,

    /// The output width, overriding the terminal width.
    pub width: Option<usize>,
}

/// Diagnostics configuration: settings plus named groups of test definitions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DiagnosticsConfig {
    settings: Settings,
    groups: IndexMap<String, GroupDefinition>,
}

impl DiagnosticsConfig {
    /// The default location of the config file, relative to the project directory.
    pub const CONFIG_PATH: &'static str = ".config/zftool.toml";

    /// Contains the default config as a TOML file.
    ///
    /// Project and module configuration is layered on top of the default config.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../../default-config.toml");

    /// The name reported for the default config in errors and warnings.
    const DEFAULT_CONFIG_NAME: &'static str = "<default config>";

    /// Reads configuration from the main config file and module config files, logging warnings.
    ///
    /// The [default config](Self::DEFAULT_CONFIG) is read first. If `config_file` is `None`, [`CONFIG_PATH`](Self::CONFIG_PATH) under `project_dir` is used
    /// if it exists. Module config files are read in order after the main file, and their groups
    /// replace groups of the same name defined earlier.
    pub fn from_sources(
        project_dir: &Utf8Path,
        config_file: Option<&Utf8Path>,
        module_files: &[Utf8PathBuf],
    ) -> Result<Self, ConfigParseError> {
        Self::from_sources_with_warnings(
            project_dir,
            config_file,
            module_files,
            &mut DefaultConfigWarnings,
        )
    }

    /// Like [`from_sources`](Self::from_sources), but reports warnings to `warnings`.
    pub fn from_sources_with_warnings(
        project_dir: &Utf8Path,
        config_file: Option<&Utf8Path>,
        module_files: &[Utf8PathBuf],
        warnings: &mut impl ConfigWarnings,
    ) -> Result<Self, ConfigParseError> {
        let mut config = Self::default();
        config.merge_source(
            Utf8Path::new(Self::DEFAULT_CONFIG_NAME),
            File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml),
            warnings,
        )?;

        let (main_file, required) = match config_file {
            Some(file) => (file.to_owned(), true),
            None => (project_dir.join(Self::CONFIG_PATH), false),
        };
        config.merge_file(&main_file, required, warnings)?;

        for module_file in module_files {
            config.merge_file(module_file, true, warnings)?;
        }

        Ok(config)
    }

    /// Returns the run settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the group with the given name.
    pub fn group(&self, name: &str) -> Option<&GroupDefinition> {
        self.groups.get(name)
    }

    /// Iterates over groups in definition order.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &GroupDefinition)> + '_ {
        self.groups.iter().map(|(name, group)| (name.as_str(), group))
    }

    /// Adds a group, replacing any existing group with the same name.
    pub fn add_group(&mut self, name: impl Into<String>, group: GroupDefinition) {
        let name = name.into();
        if self.groups.insert(name.clone(), group).is_some() {
            debug!("diagnostics group `{name}` replaced");
        }
    }

    fn merge_file(
        &mut self,
        config_file: &Utf8Path,
        required: bool,
        warnings: &mut impl ConfigWarnings,
    ) -> Result<(), ConfigParseError> {
        if !required && !config_file.exists() {
            debug!("config file {config_file} not found, skipping");
            return Ok(());
        }

        let source = File::new(config_file.as_str(), FileFormat::Toml).required(required);
        self.merge_source(config_file, source, warnings)
    }

    fn merge_source(
        &mut self,
        config_file: &Utf8Path,
        source: impl Source + Send + Sync + 'static,
        warnings: &mut impl ConfigWarnings,
    ) -> Result<(), ConfigParseError> {
        let (deserialized, unknown) = deserialize_config(source)
            .map_err(|err| ConfigParseError::new(config_file, err))?;
        if !unknown.is_empty() {
            warnings.unknown_config_keys(config_file, &unknown);
        }
        debug!(
            "read {} diagnostics groups from {config_file}",
            deserialized.diagnostics.len()
        );

        let DiagnosticsConfigDeserialize {
            settings,
            diagnostics,
        } = deserialized;
        if let Some(break_on_failure) = settings.break_on_failure {
            self.settings.break_on_failure = break_on_failure;
        }
        if let Some(width) = settings.width {
            self.settings.width = Some(width);
        }
        for (name, group) in diagnostics {
            self.add_group(name, group);
        }
        Ok(())
    }
}

fn deserialize_config(
    source: impl Source + Send + Sync + 'static,
) -> Result<(DiagnosticsConfigDeserialize, BTreeSet<String>), ConfigError> {
    let config = Config::builder().add_source(source).build()?;

    let mut ignored = BTreeSet::new();
    let deserialized = serde_ignored::deserialize(config, |path: serde_ignored::Path| {
        ignored.insert(path.to_string());
    })?;
    Ok((deserialized, ignored))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DiagnosticsConfigDeserialize {
    #[serde(default)]
    settings: SettingsDeserialize,
    #[serde(default)]
    diagnostics: IndexMap<String, GroupDefinition>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SettingsDeserialize {
    #[serde(default)]
    break_on_failure: Option<bool>,
    #[serde(default)]
    width: Option<usize>,
}
