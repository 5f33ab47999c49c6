//! CarAPI Client Library
//!
//! Typed async client for the CarAPI vehicle data REST API.
//!
//! # Example
//!
//! ```rust,no_run
//! use carapi_client::{ApiClient, CarApi, CarApiConfig, Encoding, Query};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = CarApiConfig::builder("token", "secret")
//!         .encoding(Encoding::Gzip)
//!         .build()?;
//!     let mut sdk = CarApi::new(config)?;
//!
//!     // Obtain a JWT; it is attached to every following request
//!     sdk.authenticate().await?;
//!
//!     let years = sdk.years(Query::new().make("Tesla")).await?;
//!     let makes = sdk.makes(Query::new().limit(10)).await?;
//!
//!     // Re-authenticate when the token is about to lapse
//!     if sdk.is_jwt_expired(60)? == Some(true) {
//!         sdk.authenticate().await?;
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Reusing a JWT
//!
//! A JWT is valid for a while; store it and load it into new clients
//! instead of logging in every time:
//!
//! ```rust,ignore
//! let mut sdk = CarApi::new(config)?;
//! sdk.load_jwt(stored_jwt);
//! match sdk.is_jwt_expired(60)? {
//!     Some(false) => {}
//!     _ => { sdk.authenticate().await?; }
//! }
//! ```
//!
//! # Filtering
//!
//! Server-side filters are built with [`JsonSearch`] and passed as the `json`
//! query parameter:
//!
//! ```rust,ignore
//! let search = JsonSearch::new()
//!     .item(JsonSearchItem::new("make", SearchOp::In, vec!["Tesla"]));
//! let models = sdk.models(Query::new().search("json", &search).year(2020)).await?;
//! ```
//!
//! # Testing
//!
//! The `testing` module provides an in-process server for integration tests:
//!
//! ```rust,ignore
//! use carapi_client::testing::TestServer;
//!
//! let server = TestServer::canned(200, r#"{"data": []}"#, &[]).await?;
//! let sdk = CarApi::new(server.config().build()?)?;
//! ```

pub mod auth;
mod client;
mod config;
mod error;
mod query;
mod search;
mod session;
pub mod testing;
pub mod transport;
mod types;

pub use auth::{Jwt, JwtClaims, DEFAULT_EXPIRY_BUFFER_SECS};
pub use client::{CarApi, CarApiOem, Powersports};
pub use config::{ApiVersion, CarApiConfig, CarApiConfigBuilder, Encoding, HttpVersion};
pub use error::{CarApiError, Result};
pub use query::{Query, QueryValue};
pub use search::{JsonSearch, JsonSearchItem, SearchOp};
pub use session::{ApiClient, Session};
pub use types::*;
