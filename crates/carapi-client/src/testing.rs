//! Test utilities for carapi-client
//!
//! Runs an in-process HTTP server that clients can be pointed at, and
//! records every request it receives.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use tokio::net::TcpListener;

use crate::config::CarApiConfigBuilder;
use crate::{CarApiConfig, CarApiError, Result};

/// A request as seen by the test server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    /// Header value as a string, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Decoded query pairs, in order
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .as_deref()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

type RequestLog = Arc<Mutex<Vec<RecordedRequest>>>;

/// A test server that automatically shuts down when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    requests: RequestLog,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Create a new test server from an axum Router
    ///
    /// # Example
    ///
    /// ```ignore
    /// use axum::{routing::get, Json, Router};
    /// use carapi_client::testing::TestServer;
    ///
    /// let router = Router::new().route("/api/years", get(|| async { Json(vec![2020]) }));
    /// let server = TestServer::start(router).await?;
    /// let sdk = CarApi::new(server.config().build()?)?;
    /// ```
    pub async fn start<S>(router: axum::Router<S>) -> Result<Self>
    where
        S: Clone + Send + Sync + 'static,
        axum::Router<S>: Into<axum::Router>,
    {
        let requests: RequestLog = Arc::default();

        // Bind to any available port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let router: axum::Router = router.into();
        let router = router.layer(middleware::from_fn_with_state(requests.clone(), record));

        // Spawn the server
        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        // Give server a moment to start
        tokio::time::sleep(Duration::from_millis(10)).await;

        Ok(Self {
            addr,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// A server answering every request with the same status, body and headers
    pub async fn canned(
        status: u16,
        body: impl Into<Bytes>,
        headers: &[(&str, &str)],
    ) -> Result<Self> {
        let status = StatusCode::from_u16(status)
            .map_err(|e| CarApiError::Config(format!("invalid status: {}", e)))?;

        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| CarApiError::Config(format!("invalid header name: {}", e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| CarApiError::Config(format!("invalid header value: {}", e)))?;
            header_map.append(name, value);
        }

        let canned = Arc::new(CannedResponse {
            status,
            headers: header_map,
            body: body.into(),
        });
        let router = axum::Router::new()
            .fallback(respond_canned)
            .with_state(canned);

        Self::start(router).await
    }

    /// Get the base URL of the test server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Configuration pointing at this server, with throwaway credentials
    pub fn config(&self) -> CarApiConfigBuilder {
        CarApiConfig::builder("1", "1")
            .host(self.base_url())
            .timeout_ms(5_000)
            .connect_timeout_ms(2_000)
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// The most recent request, if any
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests().pop()
    }

    /// Shutdown the server gracefully
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal if not already done
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        // Abort the task if still running
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

struct CannedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

async fn respond_canned(State(canned): State<Arc<CannedResponse>>) -> Response {
    (canned.status, canned.headers.clone(), canned.body.clone()).into_response()
}

async fn record(State(log): State<RequestLog>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(body) => body,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };

    log.lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .push(RecordedRequest {
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
            query: parts.uri.query().map(String::from),
            headers: parts.headers.clone(),
            body: body.clone(),
        });

    next.run(Request::from_parts(parts, Body::from(body))).await
}
