//! Response decoding and error translation shared by every service.
//!
//! # Design
//! Services never inspect status codes themselves. They call `decode` for
//! endpoints where any non-2xx is an error, or `decode_or_not_found` for
//! list/query endpoints where a 404 means "no matching data". Both read the
//! vendor's `errorMessage` field into `PrismError::Api`.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{PrismError, PrismResult};
use crate::http::HttpResponse;

/// Parses a successful response body as JSON; non-2xx becomes `Api`.
pub fn decode(response: &HttpResponse) -> PrismResult<Value> {
    check_status(response)?;
    parse_body(&response.body)
}

/// Like `decode`, but a 404 yields `Ok(None)` instead of an error.
pub fn decode_or_not_found(response: &HttpResponse) -> PrismResult<Option<Value>> {
    if response.status == 404 {
        debug!("404 from list endpoint, treating as empty result");
        return Ok(None);
    }
    decode(response).map(Some)
}

/// Deserializes a JSON value into a typed record.
pub fn from_value<T: DeserializeOwned>(value: Value) -> PrismResult<T> {
    serde_json::from_value(value).map_err(|e| PrismError::Deserialization(e.to_string()))
}

/// Map non-success status codes to `PrismError::Api`.
pub(crate) fn check_status(response: &HttpResponse) -> PrismResult<()> {
    if response.is_success() {
        return Ok(());
    }
    Err(PrismError::Api {
        status: response.status,
        message: error_message(&response.body),
    })
}

/// The `errorMessage` field of an error body, or the raw body.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("errorMessage").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

fn parse_body(body: &str) -> PrismResult<Value> {
    // Some vendor endpoints answer 200 with an empty body.
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| PrismError::Deserialization(e.to_string()))
}

/// The vendor collapses one-element lists into a bare object. Normalizes
/// absent/null to empty, an array to its items, anything else to one item.
pub fn one_or_many(value: Option<&Value>) -> Vec<Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(other) => vec![other.clone()],
    }
}

/// A scalar rendered as a string; numbers are accepted where IDs are
/// expected because the vendor is not consistent about quoting them.
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Follows `path` through nested objects.
pub fn pointer<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}
