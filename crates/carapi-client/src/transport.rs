//! Request decoration and response decoding shared by every client family

use std::io::Read;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use flate2::read::{GzDecoder, ZlibDecoder};
use reqwest::header::{HeaderMap, ACCEPT, ACCEPT_ENCODING, AUTHORIZATION, CONTENT_ENCODING};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::auth::{AuthPayload, Jwt};
use crate::config::{ApiVersion, CarApiConfig, Encoding, HttpVersion};
use crate::error::{CarApiError, Result};
use crate::types::JsonObject;

pub(crate) const ACCEPT_JSON: &str = "application/json";
pub(crate) const ACCEPT_TEXT: &str = "text/plain";

/// Where a client family lives: production host and path below it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiBase {
    pub default_host: &'static str,
    pub path: &'static str,
}

/// Vehicle and powersports data
pub const VEHICLE_API: ApiBase = ApiBase {
    default_host: "https://carapi.app",
    path: "/api",
};

/// OEM data
pub const OEM_API: ApiBase = ApiBase {
    default_host: "https://api.carapi.app",
    path: "/oem",
};

/// HTTP plumbing for one client instance
///
/// Builds URLs, attaches headers, and turns responses into values or
/// [`CarApiError`]s. Holds no credential: the JWT is passed in per request.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    base_url: String,
    api_version: ApiVersion,
    http_version: HttpVersion,
    encoding: Vec<Encoding>,
}

impl Transport {
    /// Create a transport with its own HTTP client
    pub fn new(config: &CarApiConfig, base: ApiBase) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()?;
        Self::with_client(config, base, client)
    }

    /// Create a transport around an existing HTTP client
    pub fn with_client(config: &CarApiConfig, base: ApiBase, client: Client) -> Result<Self> {
        config.validate()?;

        let host = config.host.as_deref().unwrap_or(base.default_host);
        let base_url = format!("{}{}", host.trim_end_matches('/'), base.path);
        Url::parse(&base_url)?;

        Ok(Self {
            client,
            base_url,
            api_version: config.api_version,
            http_version: config.http_version,
            encoding: config.encoding.clone(),
        })
    }

    /// Base URL, without the API version prefix
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of a resource path, with the encoded query applied
    pub fn resource_url(&self, path: &str, query: &crate::Query) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}{}{}",
            self.base_url,
            self.api_version.path_prefix(),
            path
        ))?;
        query.apply_to(&mut url);
        Ok(url)
    }

    pub fn login_url(&self) -> Result<Url> {
        Ok(Url::parse(&format!("{}/auth/login", self.base_url))?)
    }

    /// POST the login payload
    pub async fn send_login(&self, payload: &AuthPayload) -> Result<Response> {
        let url = self.login_url()?;
        debug!("POST {}", url);

        let request = self
            .client
            .post(url)
            .header(ACCEPT, ACCEPT_TEXT)
            .json(payload);
        self.send(request).await
    }

    /// GET a resource, authorized with `jwt` when one is held
    pub async fn send_get(
        &self,
        path: &str,
        query: &crate::Query,
        jwt: Option<&Jwt>,
        accept: &str,
    ) -> Result<Response> {
        let url = self.resource_url(path, query)?;
        debug!("GET {}", url);

        let mut request = self.client.get(url).header(ACCEPT, accept);
        if let Some(jwt) = jwt.filter(|j| !j.is_empty()) {
            request = request.header(AUTHORIZATION, jwt.bearer());
        }
        self.send(request).await
    }

    /// Apply protocol version and compression headers, then dispatch
    async fn send(&self, mut request: RequestBuilder) -> Result<Response> {
        if let Some(accept_encoding) = self.accept_encoding() {
            request = request.header(ACCEPT_ENCODING, accept_encoding);
        }

        let response = request
            .version(self.http_version.to_reqwest())
            .send()
            .await?;
        Ok(response)
    }

    /// `accept-encoding` header value, `None` when compression is disabled
    pub fn accept_encoding(&self) -> Option<String> {
        if self.encoding.is_empty() {
            return None;
        }
        Some(
            self.encoding
                .iter()
                .map(Encoding::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        )
    }

    /// First declared response encoding that this transport accepts
    fn response_encoding(&self, headers: &HeaderMap) -> Option<Encoding> {
        headers
            .get_all(CONTENT_ENCODING)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .filter_map(|name| name.trim().parse::<Encoding>().ok())
            .find(|e| self.encoding.contains(e))
    }

    /// Read the body, undoing an accepted content encoding
    pub async fn read_body(&self, response: Response) -> Result<(StatusCode, Bytes)> {
        let status = response.status();
        let encoding = self.response_encoding(response.headers());
        let body = response.bytes().await?;

        match encoding {
            Some(encoding) => {
                debug!(%encoding, "decompressing response body");
                Ok((status, Bytes::from(decompress(encoding, &body)?)))
            }
            None => Ok((status, body)),
        }
    }

    /// Decode a response into `T`, mapping non-200 envelopes to errors
    pub async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let (status, body) = self.read_body(response).await?;

        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| CarApiError::Decode(e.to_string()))?;

        if status != StatusCode::OK {
            let err = remote_error(status, &value);
            warn!(status = status.as_u16(), "{}", err);
            return Err(err);
        }

        serde_json::from_value(value).map_err(|e| CarApiError::Decode(e.to_string()))
    }

    /// Decode an endpoint that answers with a bare JSON array or mapping,
    /// keeping the server's key order
    pub async fn decode_list(&self, response: Response) -> Result<Value> {
        let value: Value = self.decode(response).await?;
        ensure_collection(value)
    }

    /// Decode an endpoint that answers with a single JSON object
    pub async fn decode_object(&self, response: Response) -> Result<JsonObject> {
        self.decode(response).await
    }
}

/// Accept a JSON array or object, rejecting scalars
pub(crate) fn ensure_collection(value: Value) -> Result<Value> {
    match value {
        Value::Array(_) | Value::Object(_) => Ok(value),
        other => Err(CarApiError::Decode(format!(
            "expected an array or object, got {}",
            other
        ))),
    }
}

/// Build the error for a non-200 JSON body
///
/// The envelope carries optional `exception`, `message` and `url` fields.
pub(crate) fn remote_error(status: StatusCode, body: &Value) -> CarApiError {
    let field = |name: &str, fallback: &str| -> String {
        match body.get(name) {
            None | Some(Value::Null) => fallback.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    };

    let exception = field("exception", "Unknown Error");
    let message = field("message", "Unknown Message");
    let url = field("url", "Unknown URL");

    CarApiError::remote(
        status.as_u16(),
        format!("{}: {} while requesting {}", exception, message, url),
    )
}

/// Undo a content encoding
///
/// CarAPI base64-wraps compressed bodies; a body that is not valid base64
/// is treated as raw compressed bytes.
pub(crate) fn decompress(encoding: Encoding, body: &[u8]) -> Result<Vec<u8>> {
    let compressed = STANDARD
        .decode(body.trim_ascii())
        .unwrap_or_else(|_| body.to_vec());
    if compressed.is_empty() {
        return Err(CarApiError::Decompress("empty body".into()));
    }

    let mut out = Vec::new();
    let read = match encoding {
        Encoding::Gzip => GzDecoder::new(compressed.as_slice()).read_to_end(&mut out),
        Encoding::Deflate => ZlibDecoder::new(compressed.as_slice()).read_to_end(&mut out),
    };
    read.map_err(|e| CarApiError::Decompress(e.to_string()))?;
    Ok(out)
}
