//! Integration tests for carapi-client
//!
//! These tests point the clients at an in-process server and check both the
//! decoded results and the requests that went over the wire.

use std::io::Write;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::write::GzEncoder;
use flate2::Compression;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use carapi_client::testing::TestServer;
use carapi_client::{
    ApiClient, ApiVersion, CarApi, CarApiError, CarApiOem, Encoding, JsonSearch, JsonSearchItem,
    Page, Powersports, Query, SearchOp,
};

// =============================================================================
// Test Helpers
// =============================================================================

async fn canned(status: u16, body: &'static str) -> TestServer {
    TestServer::canned(status, body, &[])
        .await
        .expect("Failed to start test server")
}

fn vehicles(server: &TestServer) -> CarApi {
    CarApi::new(server.config().build().unwrap()).unwrap()
}

fn gzip_base64(data: &str) -> String {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data.as_bytes()).unwrap();
    STANDARD.encode(encoder.finish().unwrap())
}

fn jwt_with_exp(exp: i64) -> String {
    format!(
        "{}.{}.sig",
        STANDARD.encode(r#"{"typ": "JWT", "alg": "HS256"}"#),
        STANDARD.encode(format!(r#"{{"exp": {}}}"#, exp))
    )
}

// =============================================================================
// Authentication Tests
// =============================================================================

#[tokio::test]
async fn test_authenticate() {
    let server = canned(200, "1.2.3").await;
    let mut sdk = vehicles(&server);

    let jwt = sdk.authenticate().await.unwrap();
    assert_eq!(jwt, "1.2.3");
    assert_eq!(sdk.jwt(), Some("1.2.3"));

    let request = server.last_request().unwrap();
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/api/auth/login");
    assert_eq!(request.header("accept"), Some("text/plain"));
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(request.header("accept-encoding"), None);

    let body: Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body, json!({"api_token": "1", "api_secret": "1"}));
}

#[tokio::test]
async fn test_authenticate_with_gzip() {
    let server = TestServer::canned(200, gzip_base64("1.2.3"), &[("Content-Encoding", "gzip")])
        .await
        .unwrap();
    let config = server.config().encoding(Encoding::Gzip).build().unwrap();
    let mut sdk = CarApi::new(config).unwrap();

    assert_eq!(sdk.authenticate().await.unwrap(), "1.2.3");

    let request = server.last_request().unwrap();
    assert_eq!(request.header("accept-encoding"), Some("gzip"));
}

#[tokio::test]
async fn test_authenticate_fails() {
    let server = canned(401, "auth failed message").await;
    let mut sdk = vehicles(&server);

    let err = sdk.authenticate().await.unwrap_err();
    assert!(err.is_auth());
    assert_eq!(err.code(), Some(401));
    assert!(err.to_string().contains("auth failed message"));
    assert_eq!(sdk.jwt(), None);
}

#[tokio::test]
async fn test_authenticate_returns_bad_jwt() {
    let server = canned(200, "1.2").await;
    let mut sdk = vehicles(&server);

    let err = sdk.authenticate().await.unwrap_err();
    assert!(matches!(err, CarApiError::InvalidJwt));
    assert_eq!(err.to_string(), "Invalid JWT");
    assert_eq!(sdk.jwt(), None);
}

#[tokio::test]
async fn test_authenticate_with_undecodable_gzip() {
    let server = TestServer::canned(200, "not gzip at all", &[("Content-Encoding", "gzip")])
        .await
        .unwrap();
    let config = server.config().encoding(Encoding::Gzip).build().unwrap();
    let mut sdk = CarApi::new(config).unwrap();

    let err = sdk.authenticate().await.unwrap_err();
    assert!(matches!(err, CarApiError::Decompress(_)));
}

#[tokio::test]
async fn test_bearer_header_follows_authentication() {
    let jwt = jwt_with_exp(chrono::Utc::now().timestamp() + 3600);
    let login_jwt = jwt.clone();
    let router = Router::new()
        .route(
            "/api/auth/login",
            post(move || {
                let jwt = login_jwt.clone();
                async move { jwt }
            }),
        )
        .route("/api/makes", get(|| async { Json(json!({"data": []})) }));
    let server = TestServer::start(router).await.unwrap();
    let mut sdk = vehicles(&server);

    // Unauthenticated requests go out without the header
    sdk.makes(Query::new()).await.unwrap();
    assert_eq!(server.last_request().unwrap().header("authorization"), None);
    assert_eq!(sdk.is_jwt_expired(60).unwrap(), None);

    sdk.authenticate().await.unwrap();
    assert_eq!(sdk.is_jwt_expired(60).unwrap(), Some(false));

    sdk.makes(Query::new()).await.unwrap();
    let request = server.last_request().unwrap();
    assert_eq!(
        request.header("authorization"),
        Some(format!("Bearer {}", jwt).as_str())
    );
    assert_eq!(request.header("accept"), Some("application/json"));
}

#[tokio::test]
async fn test_loaded_jwt_is_sent_and_checked() {
    let server = canned(200, r#"{"data": []}"#).await;
    let mut sdk = vehicles(&server);

    let stale = jwt_with_exp(chrono::Utc::now().timestamp() - 86400);
    assert_eq!(sdk.load_jwt(stale.as_str()).is_jwt_expired(60).unwrap(), Some(true));

    sdk.bodies(Query::new()).await.unwrap();
    assert_eq!(
        server.last_request().unwrap().header("authorization"),
        Some(format!("Bearer {}", stale).as_str())
    );
}

#[tokio::test]
async fn test_clients_do_not_share_credentials() {
    let server = canned(200, "1.2.3").await;
    let mut cars = vehicles(&server);
    let bikes = Powersports::new(server.config().build().unwrap()).unwrap();

    cars.authenticate().await.unwrap();
    assert_eq!(cars.jwt(), Some("1.2.3"));
    assert_eq!(bikes.jwt(), None);
}

// =============================================================================
// Vehicle Resource Tests
// =============================================================================

#[tokio::test]
async fn test_object_methods_work() {
    let server = canned(200, r#"{"data": []}"#).await;
    let sdk = vehicles(&server);

    let results = vec![
        ("/api/makes", sdk.makes(Query::new()).await),
        ("/api/models", sdk.models(Query::new()).await),
        ("/api/trims", sdk.trims(Query::new()).await),
        ("/api/bodies", sdk.bodies(Query::new()).await),
        ("/api/mileages", sdk.mileages(Query::new()).await),
        ("/api/engines", sdk.engines(Query::new()).await),
        ("/api/interior-colors", sdk.interior_colors(Query::new()).await),
        ("/api/exterior-colors", sdk.exterior_colors(Query::new()).await),
        ("/api/account/requests", sdk.account_requests(Query::new()).await),
        (
            "/api/account/requests-today",
            sdk.account_requests_today(Query::new()).await,
        ),
        (
            "/api/data-feeds/last-updated",
            sdk.csv_data_feed_last_updated().await,
        ),
        ("/api/obd-codes", sdk.obd_codes(Query::new()).await),
    ];

    let paths: Vec<String> = server.requests().into_iter().map(|r| r.path).collect();
    for (i, (expected_path, result)) in results.into_iter().enumerate() {
        let obj = result.unwrap();
        assert_eq!(obj["data"], json!([]), "{}", expected_path);
        assert_eq!(paths[i], expected_path);
    }
}

#[tokio::test]
async fn test_years() {
    let server = canned(200, "[2020, 2021]").await;
    let sdk = vehicles(&server);

    let years = sdk.years(Query::new().make("Tesla")).await.unwrap();
    assert_eq!(years, json!([2020, 2021]));

    let request = server.last_request().unwrap();
    assert_eq!(request.path, "/api/years");
    assert_eq!(request.query.as_deref(), Some("make=Tesla"));
}

#[tokio::test]
async fn test_list_endpoints_accept_mappings() {
    let server = canned(200, r#"{"data": []}"#).await;
    let sdk = vehicles(&server);

    let years = sdk.years(Query::new()).await.unwrap();
    assert_eq!(years["data"], json!([]));
    let attributes = sdk.vehicle_attributes("bodies.type").await.unwrap();
    assert_eq!(attributes["data"], json!([]));

    let oem = CarApiOem::new(server.config().build().unwrap()).unwrap();
    assert_eq!(oem.years(Query::new()).await.unwrap()["data"], json!([]));
    assert_eq!(
        oem.vehicle_attributes("bodies.type").await.unwrap()["data"],
        json!([])
    );

    let bikes = Powersports::new(server.config().build().unwrap()).unwrap();
    assert_eq!(bikes.years(Query::new()).await.unwrap()["data"], json!([]));
}

#[tokio::test]
async fn test_list_endpoint_rejects_scalar() {
    let server = canned(200, r#""data""#).await;
    let sdk = vehicles(&server);

    let err = sdk.years(Query::new()).await.unwrap_err();
    assert!(matches!(err, CarApiError::Decode(_)));
}

#[tokio::test]
async fn test_trim_item() {
    let server = canned(200, r#"{"id": 1, "data": []}"#).await;
    let sdk = vehicles(&server);

    let obj = sdk.trim_item(1).await.unwrap();
    assert_eq!(obj["id"], 1);
    assert_eq!(server.last_request().unwrap().path, "/api/trims/1");
}

#[tokio::test]
async fn test_vin() {
    let server = canned(200, r#"{"data": []}"#).await;
    let sdk = vehicles(&server);

    let obj = sdk
        .vin("1GTG6CEN0L1139305", Query::new().verbose(true))
        .await
        .unwrap();
    assert!(obj.contains_key("data"));

    let request = server.last_request().unwrap();
    assert_eq!(request.path, "/api/vin/1GTG6CEN0L1139305");
    assert_eq!(request.query.as_deref(), Some("verbose=yes"));
}

#[tokio::test]
async fn test_license_plate() {
    let server = canned(200, r#"{"data": []}"#).await;
    let sdk = vehicles(&server);

    let obj = sdk
        .license_plate(
            "US",
            "LNP8460#TEST",
            Some("NY"),
            Query::new().param("country_code", "CA").limit(1),
        )
        .await
        .unwrap();
    assert!(obj.contains_key("data"));

    let request = server.last_request().unwrap();
    assert_eq!(request.path, "/api/license-plate");
    assert_eq!(
        request.query_pairs(),
        vec![
            ("country_code".to_string(), "US".to_string()),
            ("limit".to_string(), "1".to_string()),
            ("lookup".to_string(), "LNP8460#TEST".to_string()),
            ("region".to_string(), "NY".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_single_obd_code() {
    let server = canned(200, r#"{"data": []}"#).await;
    let sdk = vehicles(&server);

    let obj = sdk.obd_code_item("B1200").await.unwrap();
    assert!(obj.contains_key("data"));
    assert_eq!(server.last_request().unwrap().path, "/api/obd-codes/B1200");
}

#[tokio::test]
async fn test_vehicle_attributes() {
    let server = canned(200, r#"["data"]"#).await;
    let sdk = vehicles(&server);

    let attributes = sdk.vehicle_attributes("bodies.type").await.unwrap();
    assert_eq!(attributes, json!(["data"]));
    assert_eq!(
        server.last_request().unwrap().path,
        "/api/vehicle-attributes/bodies.type"
    );
}

#[tokio::test]
async fn test_csv_datafeed() {
    let server = TestServer::canned(200, "id,make\n1,Acura\n", &[("Content-Type", "text/csv")])
        .await
        .unwrap();
    let sdk = vehicles(&server);

    let response = sdk.csv_data_feed().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "id,make\n1,Acura\n");

    let request = server.last_request().unwrap();
    assert_eq!(request.path, "/api/data-feeds/download");
    assert_eq!(request.header("accept"), Some("text/plain"));
}

#[tokio::test]
async fn test_api_version_prefix() {
    let server = canned(200, r#"{"data": []}"#).await;
    let config = server.config().api_version(ApiVersion::V2).build().unwrap();
    let sdk = CarApi::new(config).unwrap();

    sdk.models(Query::new()).await.unwrap();
    assert_eq!(server.last_request().unwrap().path, "/api/v2/models");
}

// =============================================================================
// Query Encoding Tests
// =============================================================================

#[tokio::test]
async fn test_query_params() {
    let server = canned(200, r#"{"data": []}"#).await;
    let sdk = vehicles(&server);

    let search = JsonSearch::new()
        .item(JsonSearchItem::new("make", SearchOp::In, vec!["Tesla"]))
        .item(JsonSearchItem::without_value("trim", SearchOp::NotNull));

    let obj = sdk
        .models(Query::new().search("json", &search).year(2020))
        .await
        .unwrap();
    assert!(!obj.is_empty());

    let pairs = server.last_request().unwrap().query_pairs();
    assert_eq!(pairs[0].0, "json");
    let sent: Value = serde_json::from_str(&pairs[0].1).unwrap();
    assert_eq!(
        sent,
        json!([
            {"field": "make", "op": "in", "val": ["Tesla"]},
            {"field": "trim", "op": "not null"}
        ])
    );
    assert_eq!(pairs[1], ("year".to_string(), "2020".to_string()));
}

#[tokio::test]
async fn test_paginated_response() {
    let server = canned(
        200,
        r#"{"collection": {"url": "/api/makes", "count": 2, "pages": 1, "total": 2}, "data": [{"id": 1}, {"id": 2}]}"#,
    )
    .await;
    let sdk = vehicles(&server);

    let page: Page = Page::from_object(sdk.makes(Query::new().page(1)).await.unwrap()).unwrap();
    assert_eq!(page.total(), Some(2));
    assert_eq!(page.data.len(), 2);

    // Key order of the decoded object follows the response
    let obj = sdk.makes(Query::new()).await.unwrap();
    let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["collection", "data"]);
}

// =============================================================================
// Error Mapping Tests
// =============================================================================

#[tokio::test]
async fn test_exception_response() {
    let server = canned(
        401,
        r#"{
          "exception": "ExceptionName",
          "code": 500,
          "url": "/url/path",
          "message": "Internal Error"
        }"#,
    )
    .await;
    let sdk = vehicles(&server);

    let err = sdk.years(Query::new()).await.unwrap_err();
    assert!(matches!(err, CarApiError::Remote { status: 401, .. }));
    assert_eq!(
        err.to_string(),
        "ExceptionName: Internal Error while requesting /url/path"
    );
    assert_eq!(err.code(), Some(401));
}

#[tokio::test]
async fn test_exception_response_defaults() {
    let server = canned(500, "{}").await;
    let sdk = vehicles(&server);

    let err = sdk.makes(Query::new()).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unknown Error: Unknown Message while requesting Unknown URL"
    );
    assert_eq!(err.code(), Some(500));
}

#[tokio::test]
async fn test_malformed_json_response() {
    let server = canned(200, "bad json").await;
    let sdk = vehicles(&server);

    let err = sdk.years(Query::new()).await.unwrap_err();
    assert!(matches!(err, CarApiError::Decode(_)));
    assert!(err.to_string().contains("Error decoding response"));
}

#[tokio::test]
async fn test_malformed_json_error_response() {
    let server = canned(502, "<html>Bad Gateway</html>").await;
    let sdk = vehicles(&server);

    let err = sdk.makes(Query::new()).await.unwrap_err();
    assert!(matches!(err, CarApiError::Decode(_)));
}

#[tokio::test]
async fn test_transport_failure() {
    // Nothing listens on port 1
    let config = carapi_client::CarApiConfig::builder("1", "1")
        .host("http://127.0.0.1:1")
        .connect_timeout_ms(500)
        .build()
        .unwrap();
    let sdk = CarApi::new(config).unwrap();

    let err = sdk.makes(Query::new()).await.unwrap_err();
    assert!(matches!(err, CarApiError::Http(_)));
}

// =============================================================================
// Compression Tests
// =============================================================================

#[tokio::test]
async fn test_gzip_encoding() {
    let body = r#"{"collection": {"total": 1}, "data": [{"name": "Tesla"}]}"#;

    let plain_server = canned(200, body).await;
    let plain = vehicles(&plain_server).makes(Query::new()).await.unwrap();

    let gzip_server =
        TestServer::canned(200, gzip_base64(body), &[("Content-Encoding", "gzip")])
            .await
            .unwrap();
    let config = gzip_server.config().encoding(Encoding::Gzip).build().unwrap();
    let compressed = CarApi::new(config).unwrap().makes(Query::new()).await.unwrap();

    assert_eq!(compressed, plain);
    assert_eq!(
        gzip_server.last_request().unwrap().header("accept-encoding"),
        Some("gzip")
    );
}

#[tokio::test]
async fn test_gzip_years() {
    let server = TestServer::canned(200, gzip_base64(r#"["data"]"#), &[("Content-Encoding", "gzip")])
        .await
        .unwrap();
    let config = server.config().encoding(Encoding::Gzip).build().unwrap();
    let sdk = CarApi::new(config).unwrap();

    let years = sdk.years(Query::new()).await.unwrap();
    assert_eq!(years, json!(["data"]));
}

#[tokio::test]
async fn test_undeclared_encoding_is_left_alone() {
    // Compression disabled: the header is ignored and the body parsed as is
    let server = TestServer::canned(200, r#"{"data": []}"#, &[("Content-Encoding", "gzip")])
        .await
        .unwrap();
    let sdk = vehicles(&server);

    let obj = sdk.makes(Query::new()).await.unwrap();
    assert_eq!(obj["data"], json!([]));
}

// =============================================================================
// OEM Tests
// =============================================================================

#[tokio::test]
async fn test_oem_endpoints() {
    let server = canned(200, r#"{"data": []}"#).await;
    let sdk = CarApiOem::new(server.config().build().unwrap()).unwrap();

    sdk.submodels(Query::new()).await.unwrap();
    sdk.submodel_item(7).await.unwrap();
    sdk.trim_item(3).await.unwrap();
    sdk.makes(Query::new()).await.unwrap();
    sdk.models(Query::new()).await.unwrap();
    sdk.trims(Query::new()).await.unwrap();
    sdk.vin("123", Query::new()).await.unwrap();
    sdk.account_requests().await.unwrap();
    sdk.account_requests_today().await.unwrap();
    sdk.csv_data_feed_last_updated().await.unwrap();

    let paths: Vec<String> = server.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(
        paths,
        vec![
            "/oem/submodels",
            "/oem/submodels/7",
            "/oem/trims/3",
            "/oem/makes",
            "/oem/models",
            "/oem/trims",
            "/oem/vin/123",
            "/oem/account/requests",
            "/oem/account/requests-today",
            "/oem/data-feeds/last-updated",
        ]
    );
}

#[tokio::test]
async fn test_oem_attributes_and_login() {
    let router = Router::new()
        .route("/oem/auth/login", post(|| async { "a.b.c" }))
        .route(
            "/oem/vehicle-attributes",
            get(|| async { Json(json!(["sedan", "coupe"])) }),
        )
        .route("/oem/years", get(|| async { Json(json!([2024])) }));
    let server = TestServer::start(router).await.unwrap();
    let mut sdk = CarApiOem::new(server.config().build().unwrap()).unwrap();

    assert_eq!(sdk.authenticate().await.unwrap(), "a.b.c");

    let attributes = sdk.vehicle_attributes("bodies.type").await.unwrap();
    assert_eq!(attributes, json!(["sedan", "coupe"]));
    let request = server.last_request().unwrap();
    assert_eq!(request.path, "/oem/vehicle-attributes");
    assert_eq!(request.query.as_deref(), Some("attribute=bodies.type"));
    assert_eq!(request.header("authorization"), Some("Bearer a.b.c"));

    assert_eq!(sdk.years(Query::new()).await.unwrap(), json!([2024]));
}

#[tokio::test]
async fn test_oem_csv_datafeed() {
    let server = canned(200, "").await;
    let sdk = CarApiOem::new(server.config().build().unwrap()).unwrap();

    let response = sdk.csv_data_feed().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(server.last_request().unwrap().path, "/oem/data-feeds/download");
}

// =============================================================================
// Powersports Tests
// =============================================================================

#[tokio::test]
async fn test_powersports_methods_work() {
    let server = canned(200, r#"{"data": []}"#).await;
    let sdk = Powersports::new(server.config().build().unwrap()).unwrap();

    let makes = sdk
        .makes(Query::new().param("type", "street_motorcycle"))
        .await
        .unwrap();
    assert_eq!(makes["data"], json!([]));
    let models = sdk.models(Query::new()).await.unwrap();
    assert_eq!(models["data"], json!([]));

    let paths: Vec<String> = server.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["/api/makes/powersports", "/api/models/powersports"]);
}

#[tokio::test]
async fn test_powersports_years() {
    let server = canned(200, r#"[2019]"#).await;
    let sdk = Powersports::new(server.config().build().unwrap()).unwrap();

    let years = sdk.years(Query::new().make("Honda")).await.unwrap();
    assert_eq!(years, json!([2019]));
    assert_eq!(server.last_request().unwrap().path, "/api/years/powersports");
}
