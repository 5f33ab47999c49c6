//! Error types for CarAPI client operations

use thiserror::Error;

/// Result type alias for CarAPI client operations
pub type Result<T> = std::result::Result<T, CarApiError>;

/// Errors that can occur during CarAPI client operations
#[derive(Error, Debug)]
pub enum CarApiError {
    /// Missing or invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Login endpoint answered with something other than 200
    #[error("HTTP {status} - CarAPI authentication failed: {body}")]
    AuthFailed { status: u16, body: String },

    /// Login endpoint returned a body that is not a three-segment JWT
    #[error("Invalid JWT")]
    InvalidJwt,

    /// Held JWT does not have three segments
    #[error("JWT is invalid")]
    MalformedJwt,

    /// Held JWT payload could not be decoded
    #[error("Error decoding JWT: {0}")]
    JwtDecode(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Response body was not the expected JSON
    #[error("Error decoding response: {0}")]
    Decode(String),

    /// Server returned an error envelope
    #[error("{message}")]
    Remote { status: u16, message: String },

    /// Declared content encoding could not be undone
    #[error("Unable to decompress response. Maybe try without compression. ({0})")]
    Decompress(String),
}

impl CarApiError {
    /// Create a remote error from status code and message
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    /// Numeric code mirroring the HTTP status, where one is known
    pub fn code(&self) -> Option<u16> {
        match self {
            CarApiError::AuthFailed { status, .. } => Some(*status),
            CarApiError::Remote { status, .. } => Some(*status),
            CarApiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True for failures raised while obtaining a JWT
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            CarApiError::AuthFailed { .. } | CarApiError::InvalidJwt
        )
    }

    /// True for failures raised while inspecting the held JWT
    pub fn is_credential(&self) -> bool {
        matches!(self, CarApiError::MalformedJwt | CarApiError::JwtDecode(_))
    }
}
