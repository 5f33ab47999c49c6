//! JSON search filters
//!
//! CarAPI accepts server-side filters as a JSON array of
//! `{"field", "op", "val"}` objects passed in a single query parameter,
//! conventionally `json`:
//!
//! ```
//! use carapi_client::{JsonSearch, JsonSearchItem, SearchOp};
//!
//! let search = JsonSearch::new()
//!     .item(JsonSearchItem::new("make", SearchOp::In, vec!["Tesla", "Ford"]))
//!     .item(JsonSearchItem::without_value("trim", SearchOp::NotNull));
//!
//! assert_eq!(
//!     search.to_value().to_string(),
//!     r#"[{"field":"make","op":"in","val":["Tesla","Ford"]},{"field":"trim","op":"not null"}]"#
//! );
//! ```

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Filter operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOp {
    Eq,
    NotEq,
    Gt,
    Lt,
    Gte,
    Lte,
    In,
    NotIn,
    Like,
    NotLike,
    IsNull,
    NotNull,
    /// Operator not known to this client, sent verbatim
    Other(String),
}

impl SearchOp {
    pub fn as_str(&self) -> &str {
        match self {
            SearchOp::Eq => "=",
            SearchOp::NotEq => "!=",
            SearchOp::Gt => ">",
            SearchOp::Lt => "<",
            SearchOp::Gte => ">=",
            SearchOp::Lte => "<=",
            SearchOp::In => "in",
            SearchOp::NotIn => "not in",
            SearchOp::Like => "like",
            SearchOp::NotLike => "not like",
            SearchOp::IsNull => "is null",
            SearchOp::NotNull => "not null",
            SearchOp::Other(op) => op,
        }
    }

    /// Operators that are meaningful without a value
    pub fn is_unary(&self) -> bool {
        matches!(self, SearchOp::IsNull | SearchOp::NotNull)
    }
}

impl From<&str> for SearchOp {
    fn from(op: &str) -> Self {
        match op.trim().to_ascii_lowercase().as_str() {
            "=" => SearchOp::Eq,
            "!=" => SearchOp::NotEq,
            ">" => SearchOp::Gt,
            "<" => SearchOp::Lt,
            ">=" => SearchOp::Gte,
            "<=" => SearchOp::Lte,
            "in" => SearchOp::In,
            "not in" => SearchOp::NotIn,
            "like" => SearchOp::Like,
            "not like" => SearchOp::NotLike,
            "is null" => SearchOp::IsNull,
            "not null" => SearchOp::NotNull,
            _ => SearchOp::Other(op.to_string()),
        }
    }
}

impl fmt::Display for SearchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SearchOp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single `field op value` filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonSearchItem {
    field: String,
    op: SearchOp,
    #[serde(rename = "val", skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
}

impl JsonSearchItem {
    /// Filter with a scalar or sequence value; a null value (including a
    /// `None` option) is left out of the serialized item
    pub fn new(field: impl Into<String>, op: impl Into<SearchOp>, value: impl Into<Value>) -> Self {
        let value = match value.into() {
            Value::Null => None,
            value => Some(value),
        };
        Self {
            field: field.into(),
            op: op.into(),
            value,
        }
    }

    /// Filter without a value (`is null`, `not null`)
    pub fn without_value(field: impl Into<String>, op: impl Into<SearchOp>) -> Self {
        Self {
            field: field.into(),
            op: op.into(),
            value: None,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn op(&self) -> &SearchOp {
        &self.op
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// JSON object form; `val` is left out when there is no value
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("field".into(), Value::String(self.field.clone()));
        obj.insert("op".into(), Value::String(self.op.as_str().to_string()));
        if let Some(value) = &self.value {
            obj.insert("val".into(), value.clone());
        }
        Value::Object(obj)
    }
}

/// Ordered collection of filters, serialized as a JSON array
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct JsonSearch {
    items: Vec<JsonSearchItem>,
}

impl JsonSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter
    pub fn item(mut self, item: JsonSearchItem) -> Self {
        self.items.push(item);
        self
    }

    /// Append a filter in place
    pub fn add_item(&mut self, item: JsonSearchItem) -> &mut Self {
        self.items.push(item);
        self
    }

    pub fn items(&self) -> &[JsonSearchItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// JSON array form, in insertion order
    pub fn to_value(&self) -> Value {
        Value::Array(self.items.iter().map(JsonSearchItem::to_value).collect())
    }
}

impl FromIterator<JsonSearchItem> for JsonSearch {
    fn from_iter<I: IntoIterator<Item = JsonSearchItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl From<&JsonSearch> for Value {
    fn from(search: &JsonSearch) -> Self {
        search.to_value()
    }
}

impl From<JsonSearch> for Value {
    fn from(search: JsonSearch) -> Self {
        search.to_value()
    }
}
