#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for crumbs
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/crumbs/config.toml)
//! - Environment variables

use crumbs_errors::{ConfigError, Error};
use crumbs_hash::HashAlgorithm;
use crumbs_types::refs::DEFAULT_REGISTRY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use url::Url;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub matching: MatchingConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub registry: RegistryConfig,
}

/// How targets are matched against sources
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchingConfig {
    /// File name of the manifest that declares the package name
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,
    /// Root used when no manifest declares the package
    #[serde(default = "default_root")]
    pub default_root: String,
    /// Fail with `RootNotFound` instead of falling back to `default_root`
    #[serde(default)]
    pub strict_root: bool,
    /// Report every byte-identical source path, not just the first one
    #[serde(default)]
    pub all_exact_matches: bool,
    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,
}

/// Execution of the per-file loop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Minimum number of targets before work is spread over threads
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

/// Registry the package is published on
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryConfig {
    #[serde(default = "default_registry_url")]
    pub url: String,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            manifest_file: default_manifest_file(),
            default_root: default_root(),
            strict_root: false,
            all_exact_matches: false,
            hash_algorithm: HashAlgorithm::default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: default_registry_url(),
        }
    }
}

// Default value functions for serde
fn default_manifest_file() -> String {
    "package.json".to_string()
}

fn default_root() -> String {
    ".".to_string()
}

fn default_parallel() -> bool {
    true
}

fn default_parallel_threshold() -> usize {
    64
}

fn default_registry_url() -> String {
    DEFAULT_REGISTRY.to_string()
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("crumbs").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this structure.
    pub fn from_toml(contents: &str) -> Result<Self, Error> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with process environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable holds an invalid value.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        self.merge_env_from(|key| std::env::var(key).ok())
    }

    /// Merge overrides supplied by `lookup`
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an invalid value.
    pub fn merge_env_from<F>(&mut self, lookup: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        // CRUMBS_MANIFEST_FILE
        if let Some(manifest) = lookup("CRUMBS_MANIFEST_FILE") {
            if manifest.is_empty() || manifest.contains('/') {
                return Err(ConfigError::InvalidValue {
                    field: "CRUMBS_MANIFEST_FILE".to_string(),
                    value: manifest,
                }
                .into());
            }
            self.matching.manifest_file = manifest;
        }

        // CRUMBS_STRICT_ROOT
        if let Some(strict) = lookup("CRUMBS_STRICT_ROOT") {
            self.matching.strict_root = parse_bool("CRUMBS_STRICT_ROOT", strict)?;
        }

        // CRUMBS_ALL_EXACT_MATCHES
        if let Some(all) = lookup("CRUMBS_ALL_EXACT_MATCHES") {
            self.matching.all_exact_matches = parse_bool("CRUMBS_ALL_EXACT_MATCHES", all)?;
        }

        // CRUMBS_HASH_ALGORITHM
        if let Some(algorithm) = lookup("CRUMBS_HASH_ALGORITHM") {
            self.matching.hash_algorithm =
                algorithm.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "CRUMBS_HASH_ALGORITHM".to_string(),
                    value: algorithm,
                })?;
        }

        // CRUMBS_PARALLEL
        if let Some(parallel) = lookup("CRUMBS_PARALLEL") {
            self.engine.parallel = parse_bool("CRUMBS_PARALLEL", parallel)?;
        }

        // CRUMBS_REGISTRY
        if let Some(registry) = lookup("CRUMBS_REGISTRY") {
            let valid = Url::parse(&registry).is_ok_and(|url| {
                matches!(url.scheme(), "http" | "https") && url.host_str().is_some()
            });
            if !valid {
                return Err(ConfigError::InvalidValue {
                    field: "CRUMBS_REGISTRY".to_string(),
                    value: registry,
                }
                .into());
            }
            self.registry.url = registry.trim_end_matches('/').to_string();
        }

        Ok(())
    }
}

fn parse_bool(field: &str, value: String) -> Result<bool, Error> {
    match value.as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value,
        }
        .into()),
    }
}
