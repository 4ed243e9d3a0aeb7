// Copyright (c) The junit-crew Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration support for junit-crew.

use crate::errors::ConfigParseError;
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, builder::DefaultState};
use junit_crew_events::ArtifactKind;
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::warn;

/// Overall configuration for junit-crew.
///
/// User configuration is layered on top of [`Self::DEFAULT_CONFIG`].
#[derive(Clone, Debug)]
pub struct CrewConfig {
    report: ReportConfig,
    archive: ArchiveConfig,
    unknown_keys: BTreeSet<String>,
}

impl CrewConfig {
    /// Contains the default config as a TOML file.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the config, layering the given file (if any) on top of the default config.
    ///
    /// Unknown keys are not an error: they are logged, and available through
    /// [`Self::unknown_keys`].
    pub fn from_sources(config_file: Option<&Utf8Path>) -> Result<Self, ConfigParseError> {
        let mut builder = Self::make_default_config();
        if let Some(config_file) = config_file {
            builder = builder.add_source(File::new(config_file.as_str(), FileFormat::Toml));
        }

        let (inner, unknown_keys) = Self::build_and_deserialize_config(builder)
            .map_err(|err| ConfigParseError::new(config_file.map(|f| f.to_owned()), err))?;

        if !unknown_keys.is_empty() {
            warn!(
                "ignoring unknown config keys: {}",
                unknown_keys.iter().cloned().collect::<Vec<_>>().join(", "),
            );
        }

        Ok(Self::from_impl(inner, unknown_keys))
    }

    /// Reads the config from a TOML string layered on top of the default config.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigParseError> {
        let builder = Self::make_default_config().add_source(File::from_str(toml, FileFormat::Toml));
        let (inner, unknown_keys) = Self::build_and_deserialize_config(builder)
            .map_err(|err| ConfigParseError::new(None, err))?;
        Ok(Self::from_impl(inner, unknown_keys))
    }

    /// Returns the default config.
    pub fn default_config() -> Self {
        let (inner, unknown_keys) = Self::build_and_deserialize_config(Self::make_default_config())
            .expect("default config is always valid");
        Self::from_impl(inner, unknown_keys)
    }

    /// Returns the report configuration.
    pub fn report(&self) -> &ReportConfig {
        &self.report
    }

    /// Returns the archive configuration.
    pub fn archive(&self) -> &ArchiveConfig {
        &self.archive
    }

    /// Returns the dotted paths of config keys that were not recognized.
    pub fn unknown_keys(&self) -> &BTreeSet<String> {
        &self.unknown_keys
    }

    // ---
    // Helper methods
    // ---

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn build_and_deserialize_config(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<(CrewConfigImpl, BTreeSet<String>), ConfigError> {
        let config = builder.build()?;

        let mut unknown = BTreeSet::new();
        let mut cb = |path: serde_ignored::Path| {
            unknown.insert(path.to_string());
        };
        let ignored_de = serde_ignored::Deserializer::new(config, &mut cb);
        let config = CrewConfigImpl::deserialize(ignored_de)?;

        Ok((config, unknown))
    }

    fn from_impl(inner: CrewConfigImpl, unknown_keys: BTreeSet<String>) -> Self {
        let CrewConfigImpl { report, archive } = inner;
        Self {
            report,
            archive,
            unknown_keys,
        }
    }
}

/// What happens when a suite starts while another suite is still open.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuitePolicy {
    /// Keep using the open suite. This guards against duplicate start notifications.
    #[default]
    Coalescing,

    /// Always open a new suite, leaving the previous one unfinished.
    Strict,
}

/// Configuration for the report.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReportConfig {
    name: String,
    suite_policy: SuitePolicy,
    implicit_suite_name: String,
}

impl ReportConfig {
    /// Returns the name the rendered report is announced as.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the suite-opening policy.
    pub fn suite_policy(&self) -> SuitePolicy {
        self.suite_policy
    }

    /// Returns the name of the suite that test cases started outside any suite are placed in.
    pub fn implicit_suite_name(&self) -> &str {
        &self.implicit_suite_name
    }
}

/// Configuration for the artifact archive.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArchiveConfig {
    dir: Utf8PathBuf,
    kinds: BTreeSet<ArtifactKind>,
    #[serde(default)]
    prefix: Option<String>,
}

impl ArchiveConfig {
    /// Returns the directory artifacts are written to.
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Returns true if artifacts of this kind should be archived.
    pub fn should_archive(&self, kind: ArtifactKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Returns the file name prefix for artifacts of this kind.
    pub fn prefix_for(&self, kind: ArtifactKind) -> &str {
        self.prefix.as_deref().unwrap_or(kind.default_prefix())
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct CrewConfigImpl {
    report: ReportConfig,
    archive: ArchiveConfig,
}
