//! Invocation wire types.
//!
//! These structs are the compatibility boundary with the backend. Field names
//! are fixed by the gateway-style event contract; renaming or nesting them
//! differently breaks every deployed function.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event handed to the backend for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationEvent {
    /// Request path without its leading separator.
    pub path: String,

    /// Flattened query parameters (last occurrence wins).
    pub query_string_parameters: BTreeMap<String, String>,

    /// Flattened request headers, multi-values joined with `,`.
    pub headers: BTreeMap<String, String>,

    /// Backend-specific metadata. Always empty.
    pub request_context: Map<String, Value>,
}

/// Result returned by the backend, or synthesized by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResult {
    /// HTTP status. Falls back to 500 when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    /// Response headers. Only string values are written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// When true, `body` carries base64-encoded bytes.
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl InvocationResult {
    /// Build a plain result with a single `Content-Type` header.
    pub fn with_body(status: u16, content_type: &str, body: impl Into<String>) -> Self {
        let mut headers = Map::new();
        headers.insert("Content-Type".to_string(), Value::String(content_type.to_string()));
        Self {
            status_code: Some(status),
            headers: Some(headers),
            body: Some(body.into()),
            is_base64_encoded: false,
        }
    }

    /// 500 written when the deadline elapses before the backend settles.
    pub fn timeout(timeout_ms: u64) -> Self {
        let body = serde_json::json!({
            "message": "Gateway Timeout",
            "timeoutMs": timeout_ms,
        });
        Self::with_body(500, "application/json", body.to_string())
    }

    /// 500 written when the backend fails. Never carries the failure detail.
    pub fn internal_error() -> Self {
        let body = serde_json::json!({ "message": "Internal Server Error" });
        Self::with_body(500, "application/json", body.to_string())
    }

    /// 400 written when the request cannot be translated.
    pub fn bad_request() -> Self {
        Self::with_body(400, "text/plain", "Bad Request")
    }

    /// 200 answered to liveness and readiness probes.
    pub fn probe_ok() -> Self {
        Self::with_body(200, "text/plain", "ok")
    }
}
