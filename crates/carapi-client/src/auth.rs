//! Login payload and JWT handling
//!
//! The login endpoint answers with a bare `header.payload.signature` string.
//! The client never verifies the signature; it only reads the payload to
//! find out when the token stops being accepted.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::config::CarApiConfig;
use crate::error::{CarApiError, Result};

/// Default leeway applied by expiry checks, in seconds
pub const DEFAULT_EXPIRY_BUFFER_SECS: i64 = 60;

/// Body of `POST /auth/login`
#[derive(Clone, Serialize)]
pub struct AuthPayload {
    api_token: String,
    api_secret: String,
}

impl AuthPayload {
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            api_token: token.into(),
            api_secret: secret.into(),
        }
    }

    pub fn from_config(config: &CarApiConfig) -> Self {
        Self::new(config.token.clone(), config.secret.clone())
    }
}

impl fmt::Debug for AuthPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthPayload")
            .field("api_token", &self.api_token)
            .field("api_secret", &"***")
            .finish()
    }
}

/// Claims read from the JWT payload segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Expiration time, seconds since the Unix epoch; fractional seconds are dropped
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub exp: i64,

    /// Every other claim, in payload order
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JwtClaims {
    /// Issued-at time, when present
    pub fn iat(&self) -> Option<i64> {
        self.extra.get("iat").and_then(Value::as_i64)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Number::deserialize(deserializer)?;
    number
        .as_i64()
        .or_else(|| number.as_f64().map(|secs| secs.trunc() as i64))
        .ok_or_else(|| de::Error::custom(format!("invalid timestamp {}", number)))
}

/// A bearer token as handed out by the login endpoint
///
/// Holding a `Jwt` says nothing about its shape: [`Jwt::new`] accepts any
/// string so a caller can load a stored token, and problems surface when
/// the payload is read.
#[derive(Clone, PartialEq, Eq)]
pub struct Jwt(String);

impl Jwt {
    /// Wrap a token without checking it
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Wrap a token returned by the login endpoint, which must have three segments
    pub fn parse(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.split('.').count() != 3 {
            return Err(CarApiError::InvalidJwt);
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Authorization` header value
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// Decode the payload segment
    pub fn claims(&self) -> Result<JwtClaims> {
        let segments: Vec<&str> = self.0.split('.').collect();
        if segments.len() != 3 {
            return Err(CarApiError::MalformedJwt);
        }

        let payload = decode_segment(segments[1])?;
        serde_json::from_slice(&payload).map_err(|e| CarApiError::JwtDecode(e.to_string()))
    }

    /// Whether `now` is past `exp + buffer_secs`
    pub fn is_expired_at(&self, buffer_secs: i64, now: DateTime<Utc>) -> Result<bool> {
        let claims = self.claims()?;
        Ok(now.timestamp() > claims.exp.saturating_add(buffer_secs))
    }

    /// Whether the current time is past `exp + buffer_secs`
    pub fn is_expired(&self, buffer_secs: i64) -> Result<bool> {
        self.is_expired_at(buffer_secs, Utc::now())
    }
}

impl fmt::Debug for Jwt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Signature stays out of logs
        let head = self.0.rsplit_once('.').map_or("", |(head, _)| head);
        write!(f, "Jwt({}.***)", head)
    }
}

impl From<String> for Jwt {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for Jwt {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

/// Decode a base64 segment, accepting both the URL-safe and standard
/// alphabets with or without padding.
fn decode_segment(segment: &str) -> Result<Vec<u8>> {
    let normalized: String = segment
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect();

    URL_SAFE_NO_PAD
        .decode(normalized)
        .map_err(|e| CarApiError::JwtDecode(e.to_string()))
}
