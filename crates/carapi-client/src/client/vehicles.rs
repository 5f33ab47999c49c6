//! Vehicle data client

use reqwest::Response;
use serde_json::Value;
use tracing::instrument;

use super::encode_path_segment;
use crate::config::CarApiConfig;
use crate::error::Result;
use crate::query::Query;
use crate::session::{ApiClient, Session};
use crate::transport::VEHICLE_API;
use crate::types::JsonObject;

/// CarAPI vehicle data client
///
/// ```rust,no_run
/// use carapi_client::{ApiClient, CarApi, CarApiConfig, JsonSearch, JsonSearchItem, Query};
///
/// # async fn run() -> carapi_client::Result<()> {
/// let mut sdk = CarApi::new(CarApiConfig::new("token", "secret")?)?;
/// sdk.authenticate().await?;
///
/// let search = JsonSearch::new().item(JsonSearchItem::new("make", "like", "Tesla"));
/// let trims = sdk.trims(Query::new().search("json", &search).limit(1)).await?;
/// println!("{:?}", trims.get("data"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CarApi {
    session: Session,
}

impl CarApi {
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

    // =========================================================================
    // Vehicle Data
    // =========================================================================

    /// Vehicle years: a bare array, or a mapping when the server wraps it
    #[instrument(skip(self))]
    pub async fn years(&self, query: Query) -> Result<Value> {
        self.session.get_list("/years", &query).await
    }

    /// Vehicle makes
    #[instrument(skip(self))]
    pub async fn makes(&self, query: Query) -> Result<JsonObject> {
        self.session.get_object("/makes", &query).await
    }

    /// Vehicle models
    #[instrument(skip(self))]
    pub async fn models(&self, query: Query) -> Result<JsonObject> {
        self.session.get_object("/models", &query).await
    }

    /// Vehicle trims
    #[instrument(skip(self))]
    pub async fn trims(&self, query: Query) -> Result<JsonObject> {
        self.session.get_object("/trims", &query).await
    }

    /// A single trim
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

    /// Look up a vehicle by license plate
    ///
    /// `country_code`, `lookup` and `region` override the same keys in `query`.
    #[instrument(skip(self))]
    pub async fn license_plate(
        &self,
        country_code: &str,
        lookup: &str,
        region: Option<&str>,
        query: Query,
    ) -> Result<JsonObject> {
        let mut pinned = Query::new()
            .param("country_code", country_code)
            .param("lookup", lookup);
        if let Some(region) = region {
            pinned = pinned.param("region", region);
        }
        self.session
            .get_object("/license-plate", &query.merge(pinned))
            .await
    }

    /// OBD-II diagnostic codes
    #[instrument(skip(self))]
    pub async fn obd_codes(&self, query: Query) -> Result<JsonObject> {
        self.session.get_object("/obd-codes", &query).await
    }

    /// A single OBD-II code
    #[instrument(skip(self))]
    pub async fn obd_code_item(&self, code: &str) -> Result<JsonObject> {
        self.session
            .get_object(
                &format!("/obd-codes/{}", encode_path_segment(code)),
                &Query::new(),
            )
            .await
    }

    /// Vehicle bodies
    #[instrument(skip(self))]
    pub async fn bodies(&self, query: Query) -> Result<JsonObject> {
        self.session.get_object("/bodies", &query).await
    }

    /// Vehicle engines
    #[instrument(skip(self))]
    pub async fn engines(&self, query: Query) -> Result<JsonObject> {
        self.session.get_object("/engines", &query).await
    }

    /// Vehicle mileages
    #[instrument(skip(self))]
    pub async fn mileages(&self, query: Query) -> Result<JsonObject> {
        self.session.get_object("/mileages", &query).await
    }

    /// Interior colors
    #[instrument(skip(self))]
    pub async fn interior_colors(&self, query: Query) -> Result<JsonObject> {
        self.session.get_object("/interior-colors", &query).await
    }

    /// Exterior colors
    #[instrument(skip(self))]
    pub async fn exterior_colors(&self, query: Query) -> Result<JsonObject> {
        self.session.get_object("/exterior-colors", &query).await
    }

    /// Possible values of a vehicle attribute, e.g. `bodies.type`
    #[instrument(skip(self))]
    pub async fn vehicle_attributes(&self, attribute: &str) -> Result<Value> {
        self.session
            .get_list(
                &format!("/vehicle-attributes/{}", encode_path_segment(attribute)),
                &Query::new(),
            )
            .await
    }

    // =========================================================================
    // Account
    // =========================================================================

    /// History of requests made by the account
    #[instrument(skip(self))]
    pub async fn account_requests(&self, query: Query) -> Result<JsonObject> {
        self.session.get_object("/account/requests", &query).await
    }

    /// Requests made by the account today
    #[instrument(skip(self))]
    pub async fn account_requests_today(&self, query: Query) -> Result<JsonObject> {
        self.session
            .get_object("/account/requests-today", &query)
            .await
    }

    // =========================================================================
    // Data Feeds
    // =========================================================================

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

impl ApiClient for CarApi {
    fn session(&self) -> &Session {
        &self.session
    }

    fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }
}
