//! Response shapes shared by the resource clients

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A decoded JSON object, keys in response order
pub type JsonObject = serde_json::Map<String, Value>;

// =============================================================================
// Paginated Collections
// =============================================================================

/// Pagination block returned alongside `data` by list endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub pages: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
    #[serde(default)]
    pub first: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
}

/// A page of results: `{"collection": {...}, "data": [...]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T = Value> {
    #[serde(default)]
    pub collection: Option<CollectionInfo>,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T: serde::de::DeserializeOwned> Page<T> {
    /// Reinterpret an object returned by a list-style endpoint
    pub fn from_object(object: JsonObject) -> crate::Result<Self> {
        serde_json::from_value(Value::Object(object))
            .map_err(|e| crate::CarApiError::Decode(e.to_string()))
    }
}

impl<T> Page<T> {
    /// Total number of matching records, when the server reported it
    pub fn total(&self) -> Option<u64> {
        self.collection.as_ref().and_then(|c| c.total)
    }
}
