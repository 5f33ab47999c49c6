//! Query arguments - `--param key=value` and `--filter field,op[,value]`

use carapi_client::{JsonSearch, JsonSearchItem, Query, SearchOp};
use serde_json::Value;

/// Parse a `key=value` query parameter
pub fn parse_param(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got `{}`", arg)),
    }
}

/// Parse a `field,op[,value]` filter item
///
/// The value is read as JSON when it parses (numbers, arrays for `in`),
/// otherwise it is sent as a string.
pub fn parse_filter(arg: &str) -> Result<JsonSearchItem, String> {
    let mut parts = arg.splitn(3, ',');
    let field = parts.next().map(str::trim).unwrap_or_default();
    let op = parts.next().map(str::trim).unwrap_or_default();
    if field.is_empty() || op.is_empty() {
        return Err(format!("expected field,op[,value], got `{}`", arg));
    }

    let op = SearchOp::from(op);
    match (parts.next(), op.is_unary()) {
        (None, true) => Ok(JsonSearchItem::without_value(field, op)),
        (Some(_), true) => Err(format!("operator `{}` takes no value", op)),
        (None, false) => Err(format!("operator `{}` needs a value", op)),
        (Some(raw), false) => {
            let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
            Ok(JsonSearchItem::new(field, op, value))
        }
    }
}

/// Assemble the request query; filters travel as the `json` parameter
pub fn build_query(params: &[(String, String)], filters: &[JsonSearchItem]) -> Query {
    let query: Query = params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    if filters.is_empty() {
        return query;
    }
    let search: JsonSearch = filters.iter().cloned().collect();
    query.search("json", &search)
}
