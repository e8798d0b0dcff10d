//! Records API response envelopes
//!
//! The backend wraps every payload as `{ "data": ..., "pagination": ... }`.
//! `data` is either the list itself or an object carrying the list under
//! `records`, `timeline` or `appointments`, depending on the endpoint.

use crate::domain::{ApiError, Result};
use serde::Deserialize;
use serde_json::Value;

/// Keys under which an object-shaped `data` may hold the list
const LIST_KEYS: [&str; 4] = ["records", "timeline", "appointments", "items"];

/// Pagination block returned next to list payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
}

/// `{ data, pagination, message }` response body
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiEnvelope {
    /// Pull the list of raw items out of `data`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidResponse`] when `data` holds no list.
    pub fn into_items(self) -> Result<Vec<Value>> {
        extract_items(self.data)
    }
}

/// Find the item list in an array, a wrapped object, or an export envelope
pub fn extract_items(data: Value) -> Result<Vec<Value>> {
    match data {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => {
            if let Some(inner) = map.remove("data") {
                return extract_items(inner);
            }
            for key in LIST_KEYS {
                if let Some(Value::Array(items)) = map.remove(key) {
                    return Ok(items);
                }
            }
            Err(ApiError::InvalidResponse(format!(
                "expected a list under one of: {}",
                LIST_KEYS.join(", ")
            ))
            .into())
        }
        Value::Null => Ok(Vec::new()),
        other => Err(ApiError::InvalidResponse(format!(
            "expected a list, got {}",
            json_kind(&other)
        ))
        .into()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_data() {
        let envelope: ApiEnvelope =
            serde_json::from_value(json!({ "data": [{ "id": 1 }, { "id": 2 }] })).unwrap();
        assert_eq!(envelope.into_items().unwrap().len(), 2);
    }

    #[test]
    fn test_wrapped_data() {
        let envelope: ApiEnvelope = serde_json::from_value(json!({
            "data": { "timeline": [{ "id": 1 }], "patient": { "id": 9 } },
            "pagination": { "page": 1, "limit": 100, "total": 1, "totalPages": 1 }
        }))
        .unwrap();
        assert_eq!(envelope.pagination.map(|p| p.total_pages), Some(1));
        assert_eq!(envelope.into_items().unwrap(), vec![json!({ "id": 1 })]);
    }

    #[test]
    fn test_null_data_is_empty() {
        let envelope: ApiEnvelope =
            serde_json::from_value(json!({ "message": "no records" })).unwrap();
        assert_eq!(envelope.message.as_deref(), Some("no records"));
        assert!(envelope.into_items().unwrap().is_empty());
    }

    #[test]
    fn test_export_envelope_records() {
        let items = extract_items(json!({
            "exportDate": "2024-05-02T14:30:00Z",
            "totalRecords": 1,
            "records": [{ "id": 3 }]
        }))
        .unwrap();
        assert_eq!(items, vec![json!({ "id": 3 })]);
    }

    #[test]
    fn test_unexpected_shape_rejected() {
        let err = extract_items(json!("oops")).unwrap_err();
        assert!(err.to_string().contains("a string"));
        let err = extract_items(json!({ "patient": {} })).unwrap_err();
        assert!(err.to_string().contains("Invalid response"));
    }
}
