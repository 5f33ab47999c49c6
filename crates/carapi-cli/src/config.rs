//! Configuration file handling for carapi-cli

use anyhow::{Context, Result};
use carapi_client::{ApiVersion, CarApiConfig, Encoding};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the CLI tool
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// API token
    pub token: Option<String>,
    /// API secret
    pub secret: Option<String>,
    /// Host override, e.g. a staging server
    pub host: Option<String>,
    /// API version selector
    pub api_version: Option<ApiVersion>,
    /// Accepted response encodings
    pub encoding: Option<Vec<Encoding>>,
    /// Request timeout in milliseconds
    pub timeout_ms: Option<u64>,
    /// Print JSON on a single line
    pub compact: Option<bool>,
    /// Disable colored output
    pub no_color: Option<bool>,
}

/// Values given on the command line (or through the environment)
#[derive(Debug, Clone, Default)]
pub struct ArgOverrides<'a> {
    pub token: Option<&'a str>,
    pub secret: Option<&'a str>,
    pub host: Option<&'a str>,
    pub api_version: Option<ApiVersion>,
    pub encoding: &'a [Encoding],
    pub compact: bool,
    pub no_color: bool,
}

impl Config {
    /// Load configuration from the default config file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("carapi-cli");

        Ok(config_dir.join("config.toml"))
    }

    /// Merge CLI arguments over config file values
    pub fn merge_with_args(&self, args: &ArgOverrides<'_>) -> MergedConfig {
        MergedConfig {
            token: args
                .token
                .map(String::from)
                .or_else(|| self.token.clone())
                .unwrap_or_default(),
            secret: args
                .secret
                .map(String::from)
                .or_else(|| self.secret.clone())
                .unwrap_or_default(),
            host: args.host.map(String::from).or_else(|| self.host.clone()),
            api_version: args
                .api_version
                .or(self.api_version)
                .unwrap_or_default(),
            encoding: if args.encoding.is_empty() {
                self.encoding.clone().unwrap_or_default()
            } else {
                args.encoding.to_vec()
            },
            timeout_ms: self.timeout_ms,
            compact: args.compact || self.compact.unwrap_or(false),
            no_color: args.no_color || self.no_color.unwrap_or(false),
        }
    }
}

/// Fully resolved configuration after merging CLI args
#[derive(Debug, Clone, PartialEq)]
pub struct MergedConfig {
    pub token: String,
    pub secret: String,
    pub host: Option<String>,
    pub api_version: ApiVersion,
    pub encoding: Vec<Encoding>,
    pub timeout_ms: Option<u64>,
    pub compact: bool,
    pub no_color: bool,
}

impl MergedConfig {
    /// Build the client configuration; fails when credentials are missing
    pub fn client_config(&self) -> Result<CarApiConfig> {
        let mut builder = CarApiConfig::builder(&self.token, &self.secret)
            .api_version(self.api_version);
        if let Some(host) = &self.host {
            builder = builder.host(host);
        }
        for encoding in &self.encoding {
            builder = builder.encoding(*encoding);
        }
        if let Some(ms) = self.timeout_ms {
            builder = builder.timeout_ms(ms);
        }
        builder.build().context(
            "Missing credentials: set --token/--secret, CARAPI_TOKEN/CARAPI_SECRET, \
             or token/secret in the config file",
        )
    }
}
