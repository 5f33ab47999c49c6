//! Query string encoding
//!
//! A [`Query`] is an ordered set of parameters. Plain values are sent as
//! text; JSON values (such as a [`JsonSearch`]) are serialized to their
//! compact JSON form before URL encoding.

use std::borrow::Cow;
use std::fmt::Display;

use serde_json::Value;
use url::{form_urlencoded, Url};

use crate::search::JsonSearch;

/// A single query parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Text(String),
    Json(Value),
}

impl QueryValue {
    /// The string placed in the query string before URL encoding
    pub fn encode(&self) -> Cow<'_, str> {
        match self {
            QueryValue::Text(s) => Cow::Borrowed(s),
            QueryValue::Json(v) => Cow::Owned(v.to_string()),
        }
    }
}

impl From<&JsonSearch> for QueryValue {
    fn from(search: &JsonSearch) -> Self {
        QueryValue::Json(search.to_value())
    }
}

impl From<JsonSearch> for QueryValue {
    fn from(search: JsonSearch) -> Self {
        QueryValue::Json(search.to_value())
    }
}

/// Ordered query parameters for a resource request
///
/// Setting a key that is already present replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    params: Vec<(String, QueryValue)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.set(key, QueryValue::Text(value.to_string()));
        self
    }

    /// Add a parameter sent as JSON text
    pub fn json(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, QueryValue::Json(value.into()));
        self
    }

    /// Add a search filter
    pub fn search(mut self, key: impl Into<String>, search: &JsonSearch) -> Self {
        self.set(key, search.into());
        self
    }

    pub fn limit(self, limit: u32) -> Self {
        self.param("limit", limit)
    }

    pub fn page(self, page: u32) -> Self {
        self.param("page", page)
    }

    pub fn year(self, year: u16) -> Self {
        self.param("year", year)
    }

    pub fn make(self, make: &str) -> Self {
        self.param("make", make)
    }

    pub fn model(self, model: &str) -> Self {
        self.param("model", model)
    }

    pub fn verbose(self, verbose: bool) -> Self {
        self.param("verbose", if verbose { "yes" } else { "no" })
    }

    /// Insert or replace a parameter
    pub fn set(&mut self, key: impl Into<String>, value: QueryValue) {
        let key = key.into();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.params.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.params.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Overlay `other` on top of these parameters; `other` wins on conflicts
    pub fn merge(mut self, other: Query) -> Self {
        for (key, value) in other.params {
            self.set(key, value);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// `application/x-www-form-urlencoded` form, empty when there are no parameters
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.params {
            serializer.append_pair(key, &value.encode());
        }
        serializer.finish()
    }

    /// Set the query string of `url`, leaving it untouched when empty
    pub fn apply_to(&self, url: &mut Url) {
        if !self.is_empty() {
            url.set_query(Some(&self.encode()));
        }
    }
}

impl<K: Into<String>, V: Display> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Query::new(), |query, (k, v)| query.param(k, v))
    }
}
