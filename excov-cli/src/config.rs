use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use thiserror::Error;

use excov_annotate::{AnnotatorOptions, DEFAULT_BP_THRESHOLD, DEFAULT_CUTOFF};
use excov_store::SqliteStore;

pub const DEFAULT_CONFIG_FILE: &str = "excov.toml";
pub const DEFAULT_DATABASE: &str = "excov.sqlite3";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

///
/// Settings shared by the subcommands, read from `excov.toml`.
///
/// Every field is optional. A flag given on the command line always wins over the file,
/// and the file wins over the built-in defaults.
///
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub database: Option<PathBuf>,
    pub cutoff: Option<u32>,
    pub thresholds: Option<Vec<u32>>,
    pub extension: Option<u32>,
    pub bp_threshold: Option<u32>,
    pub contig_prefix: Option<String>,
}

impl TryFrom<&Path> for Config {
    type Error = ConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&toml_str).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Config {
    ///
    /// Load the config given with `--config`, else `./excov.toml` if it exists, else
    /// fall back to the defaults.
    ///
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        match explicit {
            Some(path) => Config::try_from(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Config::try_from(path)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
    }

    pub fn open_store(&self) -> anyhow::Result<SqliteStore> {
        let path = self.database_path();
        tracing::debug!("opening database {}", path.display());
        SqliteStore::open(&path)
            .with_context(|| format!("Failed to open database {}", path.display()))
    }

    pub fn contig_prefix(&self, flag: Option<&String>) -> String {
        flag.cloned()
            .or_else(|| self.contig_prefix.clone())
            .unwrap_or_default()
    }

    ///
    /// Annotator options from command line flags, falling back to this config.
    ///
    pub fn annotator_options(
        &self,
        cutoff: Option<u32>,
        extension: Option<u32>,
        bp_threshold: Option<u32>,
        thresholds: Option<Vec<u32>>,
    ) -> AnnotatorOptions {
        AnnotatorOptions::default()
            .with_cutoff(cutoff.or(self.cutoff).unwrap_or(DEFAULT_CUTOFF))
            .with_extension(extension.or(self.extension).unwrap_or(0))
            .with_bp_threshold(
                bp_threshold
                    .or(self.bp_threshold)
                    .unwrap_or(DEFAULT_BP_THRESHOLD),
            )
            .with_thresholds(
                thresholds
                    .or_else(|| self.thresholds.clone())
                    .unwrap_or_default(),
            )
    }
}
