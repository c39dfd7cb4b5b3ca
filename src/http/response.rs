//! Response writing.
//!
//! # Responsibilities
//! - Abstract the host response behind `ResponseSink`
//! - Write an `InvocationResult` onto a sink (status, headers, body)
//! - Decode base64 bodies into raw bytes (whitespace and URL-safe input tolerated)
//!
//! # Design Decisions
//! - Permissive: non-string and invalid header values are skipped, never fatal
//! - Framing headers (`Content-Length`, `Transfer-Encoding`, `Connection`) are
//!   owned by the transport and never copied from the result
//! - A body that cannot be decoded still ends the response with a 500

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Response, StatusCode};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::oneshot;

use crate::adapter::event::InvocationResult;

/// Standard alphabet, padding optional.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const FRAMING_HEADERS: [&str; 3] = ["content-length", "transfer-encoding", "connection"];

/// Errors raised while writing a result.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("result body is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Writable host response. `end` is called exactly once per response.
pub trait ResponseSink: Send + 'static {
    fn set_status(&mut self, status: StatusCode);

    /// Set a header, replacing any previous value under the same name.
    fn set_header(&mut self, name: HeaderName, value: HeaderValue);

    fn end(&mut self, body: Option<Bytes>);
}

/// Write `result` onto `sink` and end it.
///
/// Status falls back to 500 when absent or invalid. On a body decode failure
/// the sink still receives a 500 and is ended without a body.
pub fn write_result<S>(sink: &mut S, result: &InvocationResult) -> Result<(), WriteError>
where
    S: ResponseSink + ?Sized,
{
    let body = match result_body(result) {
        Ok(body) => body,
        Err(e) => {
            sink.set_status(StatusCode::INTERNAL_SERVER_ERROR);
            sink.end(None);
            return Err(e);
        }
    };

    let status = result
        .status_code
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    sink.set_status(status);

    if let Some(headers) = &result.headers {
        for (name, value) in headers {
            let Value::String(value) = value else {
                continue;
            };
            if FRAMING_HEADERS.iter().any(|h| name.eq_ignore_ascii_case(h)) {
                tracing::debug!(header = %name, "Ignoring framing header from result");
                continue;
            }
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => sink.set_header(name, value),
                _ => tracing::warn!(header = %name, "Skipping invalid response header"),
            }
        }
    }

    sink.end(body);
    Ok(())
}

fn result_body(result: &InvocationResult) -> Result<Option<Bytes>, WriteError> {
    match result.body.as_deref() {
        None | Some("") => Ok(None),
        Some(body) if result.is_base64_encoded => Ok(Some(Bytes::from(decode_base64(body)?))),
        Some(body) => Ok(Some(Bytes::copy_from_slice(body.as_bytes()))),
    }
}

/// Decode a base64 body. ASCII whitespace is ignored and the URL-safe
/// alphabet (`-`, `_`) is accepted alongside the standard one.
fn decode_base64(body: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let normalized: String = body
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();
    BASE64.decode(normalized)
}

/// Sink that assembles an axum `Response` and hands it back over a channel.
#[derive(Debug)]
pub struct HttpResponseSink {
    status: StatusCode,
    headers: HeaderMap,
    tx: Option<oneshot::Sender<Response<Body>>>,
}

impl HttpResponseSink {
    /// Create a sink and the receiver its finished response arrives on.
    pub fn channel() -> (Self, oneshot::Receiver<Response<Body>>) {
        let (tx, rx) = oneshot::channel();
        let sink = Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            tx: Some(tx),
        };
        (sink, rx)
    }
}

impl ResponseSink for HttpResponseSink {
    fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    fn end(&mut self, body: Option<Bytes>) {
        let Some(tx) = self.tx.take() else {
            tracing::debug!("Response already ended");
            return;
        };

        let mut response = Response::new(body.map(Body::from).unwrap_or_else(Body::empty));
        *response.status_mut() = self.status;
        *response.headers_mut() = std::mem::take(&mut self.headers);

        if tx.send(response).is_err() {
            tracing::debug!("Client went away before the response was ready");
        }
    }
}
