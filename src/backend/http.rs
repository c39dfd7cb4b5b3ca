//! Backend reached over an HTTP invoke endpoint.
//!
//! Speaks the Lambda Runtime Interface Emulator contract: the event is POSTed
//! as JSON and the response body is the function's return value. A function
//! error is signalled by the `X-Amz-Function-Error` header and an error
//! document (`errorMessage`, `errorType`, `stackTrace`).

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde_json::Value;

use crate::adapter::event::{InvocationEvent, InvocationResult};
use crate::backend::{Backend, BackendError};
use crate::config::BackendConfig;

/// Response header set by the invoke endpoint when the function failed.
pub const FUNCTION_ERROR_HEADER: &str = "x-amz-function-error";

/// Backend that forwards events to an HTTP invoke endpoint.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client<HttpConnector, Body>,
    invoke_url: Uri,
    max_response_bytes: usize,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let invoke_url: Uri = config
            .invoke_url
            .parse()
            .map_err(|e| BackendError::Transport(format!("invalid invoke URL: {}", e)))?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_millis(config.connect_timeout_ms)));

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            client,
            invoke_url,
            max_response_bytes: config.max_response_bytes,
        })
    }

    pub fn invoke_url(&self) -> &Uri {
        &self.invoke_url
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn handle(&self, event: InvocationEvent) -> Result<InvocationResult, BackendError> {
        let payload = serde_json::to_vec(&event)?;

        let request = Request::builder()
            .method(Method::POST)
            .uri(self.invoke_url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload))
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        let function_error = response.headers().contains_key(FUNCTION_ERROR_HEADER);

        let bytes = axum::body::to_bytes(Body::new(response.into_body()), self.max_response_bytes)
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        if !status.is_success() {
            tracing::debug!(
                status = %status,
                body_len = bytes.len(),
                "Invoke endpoint returned non-success status"
            );
            return Err(BackendError::Status {
                status: status.as_u16(),
            });
        }

        decode_result(&bytes, function_error)
    }
}

/// Decode an invoke response body.
fn decode_result(bytes: &[u8], function_error: bool) -> Result<InvocationResult, BackendError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(InvocationResult::default());
    }

    let value: Value = serde_json::from_slice(bytes)?;

    if function_error || value.get("errorMessage").is_some() {
        return Err(function_error_from(&value));
    }

    if value.is_null() {
        return Ok(InvocationResult::default());
    }

    Ok(serde_json::from_value(value)?)
}

fn function_error_from(value: &Value) -> BackendError {
    let message = value
        .get("errorMessage")
        .and_then(Value::as_str)
        .unwrap_or("function error")
        .to_string();

    let name = value
        .get("errorType")
        .and_then(Value::as_str)
        .unwrap_or("Error")
        .to_string();

    let stack = match value.get("stackTrace") {
        Some(Value::Array(frames)) => Some(
            frames
                .iter()
                .map(|f| f.as_str().map(str::to_string).unwrap_or_else(|| f.to_string()))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    };

    BackendError::Function {
        name,
        message,
        stack,
    }
}
