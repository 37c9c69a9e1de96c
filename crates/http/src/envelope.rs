//! Normalization of collection-shaped responses.
//!
//! The backend has answered list requests both as a bare JSON array and as
//! an envelope `{"data": [...]}`. Every caller goes through
//! [`normalize_collection`] so pages consume a single `Vec<T>` contract.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Key under which enveloped responses carry their items.
const ENVELOPE_KEY: &str = "data";

/// Turn a raw response body into a typed collection.
///
/// An empty body, a body that is not JSON, `null`, or an object without a
/// `data` array all yield an empty collection. Items that do not match `T`
/// are a [`ApiError::Decode`].
pub fn normalize_collection<T: DeserializeOwned>(
    path: &str,
    body: &[u8],
) -> Result<Vec<T>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(
                path,
                error = %err,
                "response body is not JSON; treating it as an empty collection"
            );
            return Ok(Vec::new());
        }
    };

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(ENVELOPE_KEY) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item).map_err(|source| ApiError::Decode {
                path: path.to_string(),
                source,
            })
        })
        .collect()
}
