//! Powersports data client

use serde_json::Value;
use tracing::instrument;

use crate::config::CarApiConfig;
use crate::error::Result;
use crate::query::Query;
use crate::session::{ApiClient, Session};
use crate::transport::VEHICLE_API;
use crate::types::JsonObject;

/// CarAPI powersports client (motorcycles, ATVs, watercraft...)
///
/// Shares the vehicle API host; resources live under a `/powersports` suffix.
/// Most queries take a `type` parameter such as `street_motorcycle`.
#[derive(Debug, Clone)]
pub struct Powersports {
    session: Session,
}

impl Powersports {
    pub fn new(config: CarApiConfig) -> Result<Self> {
        Ok(Self {
            session: Session::new(&config, VEHICLE_API)?,
        })
    }

    /// Create a client around an existing HTTP client
    pub fn with_client(config: CarApiConfig, client: reqwest::Client) -> Result<Self> {
        Ok(Self {
            session: Session::with_client(&config, VEHICLE_API, client)?,
        })
    }

    /// Powersports years
    #[instrument(skip(self))]
    pub async fn years(&self, query: Query) -> Result<Value> {
        self.session.get_list("/years/powersports", &query).await
    }

    /// Powersports makes
    #[instrument(skip(self))]
    pub async fn makes(&self, query: Query) -> Result<JsonObject> {
        self.session.get_object("/makes/powersports", &query).await
    }

    /// Powersports models
    #[instrument(skip(self))]
    pub async fn models(&self, query: Query) -> Result<JsonObject> {
        self.session.get_object("/models/powersports", &query).await
    }
}

impl ApiClient for Powersports {
    fn session(&self) -> &Session {
        &self.session
    }

    fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }
}
