//! OEM data client

use reqwest::Response;
use serde_json::Value;
use tracing::instrument;

use super::encode_path_segment;
use crate::config::CarApiConfig;
use crate::error::Result;
use crate::query::Query;
use crate::session::{ApiClient, Session};
use crate::transport::OEM_API;
use crate::types::JsonObject;

/// CarAPI OEM data client
///
/// Served from its own host (`https://api.carapi.app/oem`), with its own login.
#[derive(Debug, Clone)]
pub struct CarApiOem {
    session: Session,
}

impl CarApiOem {
    pub fn new(config: CarApiConfig) -> Result<Self> {
        Ok(Self {
            session: Session::new(&config, OEM_API)?,
        })
    }

    /// Create a client around an existing HTTP client
    pub fn with_client(config: CarApiConfig, client: reqwest::Client) -> Result<Self> {
        Ok(Self {
            session: Session::with_client(&config, OEM_API, client)?,
        })
    }

    /// OEM years
    #[instrument(skip(self))]
    pub async fn years(&self, query: Query) -> Result<Value> {
        self.session.get_list("/years", &query).await
    }

    /// OEM makes
    #[instrument(skip(self))]
    pub async fn makes(&self, query: Query) -> Result<JsonObject> {
        self.session.get_object("/makes", &query).await
    }

    /// OEM models
    #[instrument(skip(self))]
    pub async fn models(&self, query: Query) -> Result<JsonObject> {
        self.session.get_object("/models", &query).await
    }

    /// OEM sub-models
    #[instrument(skip(self))]
    pub async fn submodels(&self, query: Query) -> Result<JsonObject> {
        self.session.get_object("/submodels", &query).await
    }

    /// A single OEM sub-model
    #[instrument(skip(self))]
    pub async fn submodel_item(&self, id: u64) -> Result<JsonObject> {
        self.session
            .get_object(&format!("/submodels/{}", id), &Query::new())
            .await
    }

    /// OEM trims
    #[instrument(skip(self))]
    pub async fn trims(&self, query: Query) -> Result<JsonObject> {
        self.session.get_object("/trims", &query).await
    }

    /// A single OEM trim
    #[instrument(skip(self))]
    pub async fn trim_item(&self, id: u64) -> Result<JsonObject> {
        self.session
            .get_object(&format!("/trims/{}", id), &Query::new())
            .await
    }

    /// Decode a Vehicle Identification Number
    #[instrument(skip(self))]
    pub async fn vin(&self, vin: &str, query: Query) -> Result<JsonObject> {
        self.session
            .get_object(&format!("/vin/{}", encode_path_segment(vin)), &query)
            .await
    }

    /// Possible values of a vehicle attribute (sent as `?attribute=`)
    #[instrument(skip(self))]
    pub async fn vehicle_attributes(&self, attribute: &str) -> Result<Value> {
        self.session
            .get_list(
                "/vehicle-attributes",
                &Query::new().param("attribute", attribute),
            )
            .await
    }

    /// History of requests made by the account
    #[instrument(skip(self))]
    pub async fn account_requests(&self) -> Result<JsonObject> {
        self.session
            .get_object("/account/requests", &Query::new())
            .await
    }

    /// Requests made by the account today
    #[instrument(skip(self))]
    pub async fn account_requests_today(&self) -> Result<JsonObject> {
        self.session
            .get_object("/account/requests-today", &Query::new())
            .await
    }

    /// The CSV data feed, undecoded; stream it with `bytes_stream()`
    #[instrument(skip(self))]
    pub async fn csv_data_feed(&self) -> Result<Response> {
        self.session
            .get_text("/data-feeds/download", &Query::new())
            .await
    }

    /// When the CSV data feed was last updated
    #[instrument(skip(self))]
    pub async fn csv_data_feed_last_updated(&self) -> Result<JsonObject> {
        self.session
            .get_object("/data-feeds/last-updated", &Query::new())
            .await
    }
}

impl ApiClient for CarApiOem {
    fn session(&self) -> &Session {
        &self.session
    }

    fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }
}
