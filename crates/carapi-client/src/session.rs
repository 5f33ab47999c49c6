//! JWT lifecycle on top of a [`Transport`]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Response, StatusCode};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::auth::{AuthPayload, Jwt, JwtClaims};
use crate::config::CarApiConfig;
use crate::error::{CarApiError, Result};
use crate::query::Query;
use crate::transport::{ApiBase, Transport, ACCEPT_JSON, ACCEPT_TEXT};
use crate::types::JsonObject;

/// Transport plus the JWT currently held by one client
///
/// The JWT starts unset. It changes only through [`Session::authenticate`]
/// and [`Session::load_jwt`]; there is no automatic refresh.
#[derive(Debug, Clone)]
pub struct Session {
    transport: Transport,
    payload: AuthPayload,
    jwt: Option<Jwt>,
}

impl Session {
    pub fn new(config: &CarApiConfig, base: ApiBase) -> Result<Self> {
        let transport = Transport::new(config, base)?;
        info!("CarAPI session created for {}", transport.base_url());
        Ok(Self::from_transport(config, transport))
    }

    /// Session over a caller-supplied HTTP client
    pub fn with_client(config: &CarApiConfig, base: ApiBase, client: reqwest::Client) -> Result<Self> {
        let transport = Transport::with_client(config, base, client)?;
        Ok(Self::from_transport(config, transport))
    }

    fn from_transport(config: &CarApiConfig, transport: Transport) -> Self {
        Self {
            transport,
            payload: AuthPayload::from_config(config),
            jwt: None,
        }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    // =========================================================================
    // Credential Lifecycle
    // =========================================================================

    /// Log in and hold the returned JWT
    #[instrument(skip(self))]
    pub async fn authenticate(&mut self) -> Result<String> {
        let response = self.transport.send_login(&self.payload).await?;
        let status = response.status();

        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "authentication failed");
            return Err(CarApiError::AuthFailed {
                status: status.as_u16(),
                body,
            });
        }

        let (_, body) = self.transport.read_body(response).await?;
        let body = String::from_utf8(body.to_vec()).map_err(|_| CarApiError::InvalidJwt)?;
        let jwt = Jwt::parse(body.trim())?;

        info!("authenticated");
        let token = jwt.as_str().to_string();
        self.jwt = Some(jwt);
        Ok(token)
    }

    /// Replace the held JWT without validating it
    pub fn load_jwt(&mut self, jwt: impl Into<Jwt>) -> &mut Self {
        self.jwt = Some(jwt.into());
        self
    }

    /// The held JWT, `None` when unset
    pub fn jwt(&self) -> Option<&str> {
        self.held().map(Jwt::as_str)
    }

    fn held(&self) -> Option<&Jwt> {
        self.jwt.as_ref().filter(|j| !j.is_empty())
    }

    /// `Ok(None)` when no JWT is held, otherwise whether it is past
    /// `exp + buffer_secs`
    pub fn is_jwt_expired(&self, buffer_secs: i64) -> Result<Option<bool>> {
        self.is_jwt_expired_at(buffer_secs, Utc::now())
    }

    /// [`Session::is_jwt_expired`] against an explicit clock
    pub fn is_jwt_expired_at(&self, buffer_secs: i64, now: DateTime<Utc>) -> Result<Option<bool>> {
        self.held()
            .map(|jwt| jwt.is_expired_at(buffer_secs, now))
            .transpose()
    }

    /// Decoded payload of the held JWT
    pub fn jwt_claims(&self) -> Result<Option<JwtClaims>> {
        self.held().map(Jwt::claims).transpose()
    }

    /// Expiry of the held JWT
    pub fn jwt_expires_at(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.jwt_claims()?.and_then(|c| c.expires_at()))
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// GET an endpoint answering with a bare JSON array or mapping
    pub async fn get_list(&self, path: &str, query: &Query) -> Result<Value> {
        let response = self
            .transport
            .send_get(path, query, self.held(), ACCEPT_JSON)
            .await?;
        let list = self.transport.decode_list(response).await?;
        debug!(array = list.is_array(), "decoded list");
        Ok(list)
    }

    /// GET an endpoint answering with a JSON object
    pub async fn get_object(&self, path: &str, query: &Query) -> Result<JsonObject> {
        let response = self
            .transport
            .send_get(path, query, self.held(), ACCEPT_JSON)
            .await?;
        let object = self.transport.decode_object(response).await?;
        debug!(keys = object.len(), "decoded object");
        Ok(object)
    }

    /// GET a plain-text resource and hand back the undecoded response
    pub async fn get_text(&self, path: &str, query: &Query) -> Result<Response> {
        self.transport
            .send_get(path, query, self.held(), ACCEPT_TEXT)
            .await
    }
}

/// JWT lifecycle shared by every resource client
#[async_trait]
pub trait ApiClient: Send + Sync {
    fn session(&self) -> &Session;

    fn session_mut(&mut self) -> &mut Session;

    /// Log in with the configured token and secret; the JWT is kept for
    /// subsequent requests and returned
    async fn authenticate(&mut self) -> Result<String> {
        self.session_mut().authenticate().await
    }

    /// `Ok(None)` when no JWT is held
    fn is_jwt_expired(&self, buffer_secs: i64) -> Result<Option<bool>> {
        self.session().is_jwt_expired(buffer_secs)
    }

    /// Use a JWT obtained earlier instead of logging in
    fn load_jwt(&mut self, jwt: impl Into<Jwt>) -> &mut Self
    where
        Self: Sized,
    {
        self.session_mut().load_jwt(jwt);
        self
    }

    fn jwt(&self) -> Option<&str> {
        self.session().jwt()
    }

    fn jwt_claims(&self) -> Result<Option<JwtClaims>> {
        self.session().jwt_claims()
    }
}
