// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for report generation.
//!
//! The config is layered: the defaults in [`ReportConfig::DEFAULT_CONFIG`] are read first, and a
//! user-provided TOML file is layered on top of them.

use crate::errors::{ConfigParseError, ConfigParseErrorKind};
use camino::Utf8Path;
use config::{Config, ConfigBuilder, File, FileFormat, builder::DefaultState};
use itertools::Itertools;
use serde::Deserialize;
use std::{cmp::Ordering, collections::BTreeSet, fmt, sync::LazyLock};
use tracing::warn;

/// Report generation settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReportConfig {
    render_threads: RenderThreads,
    generated_at_footer: bool,
    title_prefix: String,
    #[serde(skip)]
    unknown_keys: BTreeSet<String>,
}

impl ReportConfig {
    /// The location of the config file relative to the workspace root.
    pub const CONFIG_PATH: &'static str = ".config/testreport.toml";

    /// The default config, as a TOML file:
    ///
    /// ```toml
    #[doc = include_str!("../default-config.toml")]
    /// ```
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the config from `config_file` if specified, or from [`Self::CONFIG_PATH`] under
    /// `workspace_root` if that file exists.
    ///
    /// Unknown keys are logged as warnings and otherwise ignored.
    pub fn from_sources(
        config_file: Option<&Utf8Path>,
        workspace_root: &Utf8Path,
    ) -> Result<Self, ConfigParseError> {
        let (config_file, source) = match config_file {
            Some(file) => (file.to_owned(), File::new(file.as_str(), FileFormat::Toml)),
            None => {
                let config_file = workspace_root.join(Self::CONFIG_PATH);
                let source = File::new(config_file.as_str(), FileFormat::Toml).required(false);
                (config_file, source)
            }
        };

        let builder = Self::make_default_config().add_source(source);
        let (mut config, unknown) = Self::build_and_deserialize_config(&builder)
            .map_err(|kind| ConfigParseError::new(&config_file, kind))?;

        if !unknown.is_empty() {
            warn!(
                "ignoring unknown configuration keys in {config_file}: {}",
                unknown.iter().join(", ")
            );
        }
        config.unknown_keys = unknown;
        Ok(config)
    }

    /// Returns the default config.
    pub fn default_config() -> Self {
        let (config, unknown) = Self::build_and_deserialize_config(&Self::make_default_config())
            .expect("default config is always valid");
        debug_assert!(
            unknown.is_empty(),
            "found unknown keys in default config: {}",
            unknown.iter().join(", ")
        );
        config
    }

    /// Returns the number of rendering threads.
    pub fn render_threads(&self) -> RenderThreads {
        self.render_threads
    }

    /// Returns true if pages should show when the report was generated.
    pub fn generated_at_footer(&self) -> bool {
        self.generated_at_footer
    }

    /// Returns the prefix of every page's title.
    pub fn title_prefix(&self) -> &str {
        &self.title_prefix
    }

    /// Returns keys that were present in the config file but not recognized.
    pub fn unknown_keys(&self) -> &BTreeSet<String> {
        &self.unknown_keys
    }

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn build_and_deserialize_config(
        builder: &ConfigBuilder<DefaultState>,
    ) -> Result<(Self, BTreeSet<String>), ConfigParseErrorKind> {
        let config = builder
            .build_cloned()
            .map_err(|error| ConfigParseErrorKind::BuildError(Box::new(error)))?;

        let mut ignored = BTreeSet::new();
        let mut cb = |path: serde_ignored::Path| {
            ignored.insert(path.to_string());
        };
        let ignored_de = serde_ignored::Deserializer::new(config, &mut cb);
        let config = Self::deserialize(ignored_de)
            .map_err(|error| ConfigParseErrorKind::DeserializeError(Box::new(error)))?;

        Ok((config, ignored))
    }
}

/// Type for the `render-threads` config key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RenderThreads {
    /// Render with a specified number of threads.
    Count(usize),

    /// Render with a number of threads equal to the logical CPU count.
    NumCpus,
}

impl RenderThreads {
    /// Returns the actual number of threads to use.
    pub fn compute(self) -> usize {
        match self {
            Self::Count(threads) => threads,
            Self::NumCpus => get_num_cpus(),
        }
    }
}

impl fmt::Display for RenderThreads {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(threads) => write!(f, "{threads}"),
            Self::NumCpus => write!(f, "num-cpus"),
        }
    }
}

impl<'de> Deserialize<'de> for RenderThreads {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;

        impl serde::de::Visitor<'_> for V {
            type Value = RenderThreads;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "a positive integer or the string \"num-cpus\"")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                if v == "num-cpus" {
                    Ok(RenderThreads::NumCpus)
                } else {
                    Err(serde::de::Error::invalid_value(
                        serde::de::Unexpected::Str(v),
                        &self,
                    ))
                }
            }

            // TOML integers are i64.
            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                match v.cmp(&0) {
                    Ordering::Greater => Ok(RenderThreads::Count(
                        usize::try_from(v).unwrap_or(usize::MAX),
                    )),
                    Ordering::Less | Ordering::Equal => Err(serde::de::Error::invalid_value(
                        serde::de::Unexpected::Signed(v),
                        &self,
                    )),
                }
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                if v == 0 {
                    Err(serde::de::Error::invalid_value(
                        serde::de::Unexpected::Unsigned(v),
                        &self,
                    ))
                } else {
                    Ok(RenderThreads::Count(
                        usize::try_from(v).unwrap_or(usize::MAX),
                    ))
                }
            }
        }

        deserializer.deserialize_any(V)
    }
}

/// Returns the number of logical CPUs, or 1 if it can't be determined.
pub fn get_num_cpus() -> usize {
    static NUM_CPUS: LazyLock<usize> =
        LazyLock::new(|| match std::thread::available_parallelism() {
            Ok(count) => count.into(),
            Err(err) => {
                warn!("unable to determine num-cpus ({err}), assuming 1 logical CPU");
                1
            }
        });

    *NUM_CPUS
}
