//! Client configuration with YAML/JSON/TOML support

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CarApiError, Result};

/// CarAPI client configuration
///
/// Can be loaded from YAML, JSON, TOML, or constructed programmatically.
/// Every construction path validates before handing the value out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarApiConfig {
    /// API token
    pub token: String,

    /// API secret
    pub secret: String,

    /// Host override (e.g. `http://localhost:8080`); each client family
    /// falls back to its own production host when unset
    #[serde(default)]
    pub host: Option<String>,

    /// HTTP protocol version used for every request
    #[serde(default)]
    pub http_version: HttpVersion,

    /// Accepted response encodings; empty disables compression
    #[serde(default)]
    pub encoding: Vec<Encoding>,

    /// API version selector
    #[serde(default)]
    pub api_version: ApiVersion,

    /// Request timeout in milliseconds (default: 30s)
    #[serde(default = "default_request_timeout")]
    pub timeout_ms: u64,

    /// Connect timeout in milliseconds (default: 10s)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
}

fn default_request_timeout() -> u64 {
    30_000 // 30 seconds
}

fn default_connect_timeout() -> u64 {
    10_000 // 10 seconds
}

impl CarApiConfig {
    /// Create a configuration with defaults for everything but the credentials
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Result<Self> {
        Self::builder(token, secret).build()
    }

    /// Create a builder for programmatic configuration
    pub fn builder(token: impl Into<String>, secret: impl Into<String>) -> CarApiConfigBuilder {
        CarApiConfigBuilder::new(token, secret)
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CarApiError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| CarApiError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| CarApiError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| CarApiError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| CarApiError::Config(e.to_string()))
    }

    /// Check the invariants every client relies on
    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(CarApiError::Config("token is required".into()));
        }
        if self.secret.trim().is_empty() {
            return Err(CarApiError::Config("secret is required".into()));
        }
        if let Some(host) = &self.host {
            url::Url::parse(host)
                .map_err(|e| CarApiError::Config(format!("invalid host {}: {}", host, e)))?;
        }
        Ok(())
    }

    /// True when at least one response encoding is accepted
    pub fn compression_enabled(&self) -> bool {
        !self.encoding.is_empty()
    }
}

/// Builder for CarApiConfig
pub struct CarApiConfigBuilder {
    config: CarApiConfig,
}

impl CarApiConfigBuilder {
    /// Create a new builder with the given credentials
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            config: CarApiConfig {
                token: token.into(),
                secret: secret.into(),
                host: None,
                http_version: HttpVersion::default(),
                encoding: Vec::new(),
                api_version: ApiVersion::default(),
                timeout_ms: default_request_timeout(),
                connect_timeout_ms: default_connect_timeout(),
            },
        }
    }

    /// Override the host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = Some(host.into());
        self
    }

    /// Set the HTTP protocol version
    pub fn http_version(mut self, version: HttpVersion) -> Self {
        self.config.http_version = version;
        self
    }

    /// Accept an additional response encoding
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        if !self.config.encoding.contains(&encoding) {
            self.config.encoding.push(encoding);
        }
        self
    }

    /// Select the API version
    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.config.api_version = version;
        self
    }

    /// Set request timeout in milliseconds
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeout_ms = ms;
        self
    }

    /// Set connect timeout in milliseconds
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<CarApiConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// HTTP protocol version preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpVersion {
    #[serde(rename = "1.0")]
    Http10,
    #[default]
    #[serde(rename = "1.1")]
    Http11,
    #[serde(rename = "2", alias = "2.0")]
    Http2,
}

impl HttpVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVersion::Http10 => "1.0",
            HttpVersion::Http11 => "1.1",
            HttpVersion::Http2 => "2",
        }
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Version {
        match self {
            HttpVersion::Http10 => reqwest::Version::HTTP_10,
            HttpVersion::Http11 => reqwest::Version::HTTP_11,
            HttpVersion::Http2 => reqwest::Version::HTTP_2,
        }
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpVersion {
    type Err = CarApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "1.0" => Ok(HttpVersion::Http10),
            "1.1" => Ok(HttpVersion::Http11),
            "2" | "2.0" => Ok(HttpVersion::Http2),
            other => Err(CarApiError::Config(format!(
                "unsupported http version: {}",
                other
            ))),
        }
    }
}

/// Response content encoding the client can undo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Gzip,
    Deflate,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Gzip => "gzip",
            Encoding::Deflate => "deflate",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = CarApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gzip" => Ok(Encoding::Gzip),
            "deflate" => Ok(Encoding::Deflate),
            other => Err(CarApiError::Config(format!(
                "unsupported encoding: {}",
                other
            ))),
        }
    }
}

/// API version selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    #[default]
    V1,
    V2,
}

impl ApiVersion {
    /// Path segment inserted between the base URL and the resource path
    pub fn path_prefix(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "",
            ApiVersion::V2 => "/v2",
        }
    }
}

impl FromStr for ApiVersion {
    type Err = CarApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" => Ok(ApiVersion::V1),
            "v2" => Ok(ApiVersion::V2),
            other => Err(CarApiError::Config(format!(
                "unsupported api version: {}",
                other
            ))),
        }
    }
}
