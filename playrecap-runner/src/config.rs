// Copyright (c) The playrecap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for playrecap.
//!
//! Configuration is layered: the embedded default config comes first, then either a file passed
//! in explicitly or the optional `.config/playrecap.toml` in the working directory.

use crate::{errors::ConfigParseError, reporter::DisplayLayout, resolver::TestBoundaryResolver};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, builder::DefaultState};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Overall configuration for a report run.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RecapConfig {
    role_prefix: String,
    cleanup_tag: String,
    footer_width: usize,
    banner_width: usize,
    recap_id_width: usize,
    #[serde(skip)]
    unknown_keys: BTreeSet<String>,
}

impl RecapConfig {
    /// The default location of the config within the working directory:
    /// `.config/playrecap.toml`.
    pub const CONFIG_PATH: &'static str = ".config/playrecap.toml";

    /// Contains the default config as a TOML file.
    ///
    /// Repository-specific configuration is layered on top of the default config.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the config from `config_file` if given, otherwise from [`Self::CONFIG_PATH`] under
    /// `dir` if that file exists, layered over the default config.
    ///
    /// An explicitly specified file must exist. Unknown keys are reported as warnings, and are
    /// available through [`Self::unknown_keys`].
    pub fn from_sources(
        dir: &Utf8Path,
        config_file: Option<&Utf8Path>,
    ) -> Result<Self, ConfigParseError> {
        let (config_file, source) = match config_file {
            Some(file) => (file.to_owned(), File::new(file.as_str(), FileFormat::Toml)),
            None => {
                let config_file = dir.join(Self::CONFIG_PATH);
                let source = File::new(config_file.as_str(), FileFormat::Toml).required(false);
                (config_file, source)
            }
        };
        debug!(%config_file, "loading config");

        let builder = Self::make_default_config().add_source(source);
        let config = Self::build_and_deserialize_config(&builder)
            .map_err(|err| ConfigParseError::new(config_file.clone(), err))?;

        for key in &config.unknown_keys {
            warn!("in config file {config_file}, ignoring unknown configuration key `{key}`");
        }
        Ok(config)
    }

    /// Returns the default configuration.
    pub fn default_config() -> Self {
        let config = Self::make_default_config()
            .build()
            .expect("default config is always valid");
        config
            .try_deserialize()
            .expect("default config is always valid")
    }

    /// Returns the prefix stripped from task names.
    pub fn role_prefix(&self) -> &str {
        &self.role_prefix
    }

    /// Returns the tag that marks cleanup tasks.
    pub fn cleanup_tag(&self) -> &str {
        &self.cleanup_tag
    }

    /// Returns the layout used by the reporter.
    pub fn layout(&self) -> DisplayLayout {
        DisplayLayout {
            footer_width: self.footer_width,
            banner_width: self.banner_width,
            recap_id_width: self.recap_id_width,
        }
    }

    /// Returns a test boundary resolver built from this config.
    pub fn resolver(&self) -> TestBoundaryResolver {
        TestBoundaryResolver::new(self.role_prefix.clone())
    }

    /// Returns the keys that were present in config files but not recognized.
    pub fn unknown_keys(&self) -> &BTreeSet<String> {
        &self.unknown_keys
    }

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn build_and_deserialize_config(
        builder: &ConfigBuilder<DefaultState>,
    ) -> Result<Self, ConfigError> {
        let config = builder.build_cloned()?;

        let mut unknown_keys = BTreeSet::new();
        let mut cb = |path: serde_ignored::Path| {
            unknown_keys.insert(path.to_string());
        };
        let ignored_de = serde_ignored::Deserializer::new(config, &mut cb);
        let mut config = Self::deserialize(ignored_de)?;
        config.unknown_keys = unknown_keys;
        Ok(config)
    }
}

/// Returns the path of the config file that [`RecapConfig::from_sources`] reads by default.
pub fn default_config_path(dir: &Utf8Path) -> Utf8PathBuf {
    dir.join(RecapConfig::CONFIG_PATH)
}
