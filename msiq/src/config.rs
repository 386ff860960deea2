// SPDX-FileCopyrightText: 2026 msiq contributors
// SPDX-License-Identifier: MIT

use std::path::{Path, PathBuf};

use msiq_engine::TransformFlags;
use serde::Deserialize;

use crate::error::{IoContext, Result};
use crate::output::Format;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "MSIQ_CONFIG";

/// Configuration file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "msiq.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Output format when `--format` is not given
    pub format: Format,

    /// Summary flags for generated transforms
    pub transform: TransformFlags,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .io_context(|| format!("Failed to read config file at {}", path.display()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

/// Load the configuration named by `MSIQ_CONFIG`, else `msiq.toml` if it
/// exists, else defaults.
pub fn load() -> Result<Config> {
    load_from(
        std::env::var_os(CONFIG_ENV).map(PathBuf::from),
        Path::new(DEFAULT_CONFIG_FILE),
    )
}

/// An `explicit` file must exist; the `fallback` file is optional.
pub fn load_from(explicit: Option<PathBuf>, fallback: &Path) -> Result<Config> {
    match explicit {
        Some(path) => Config::from_file(&path),
        None if fallback.exists() => Config::from_file(fallback),
        None => Ok(Config::default()),
    }
}
