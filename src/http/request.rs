//! Request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) unless the client sent one
//! - Capture the transport-level request (`HostRequest`)
//! - Parse it into an immutable `InboundRequest` or reject it as malformed
//!
//! # Design Decisions
//! - URLs are resolved against a fixed base so relative and absolute
//!   request targets both work
//! - Header repeats are kept as lists here; flattening belongs to the
//!   translator
//! - Non-UTF-8 header values are converted lossily, never rejected
//! - The request body is never read, so a stalled upload cannot delay the
//!   response

use axum::http::{HeaderMap, Method, Request};
use thiserror::Error;
use tower_http::request_id::{MakeRequestId, RequestId};
use url::Url;
use uuid::Uuid;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Base every request target is resolved against.
const BASE_URL: &str = "http://localhost/";

/// Errors raised while turning a host request into an `InboundRequest`.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request has no URL")]
    MissingUrl,

    #[error("invalid request URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Request as the transport hands it over.
#[derive(Debug, Clone)]
pub struct HostRequest {
    pub method: Method,
    /// Raw request target (path and query), if the transport supplied one.
    pub url: Option<String>,
    /// Header name with every value seen for it. An empty list means the
    /// header was present without a value.
    pub headers: Vec<(String, Vec<String>)>,
}

impl HostRequest {
    /// Create a request with no headers.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: Some(url.into()),
            headers: Vec::new(),
        }
    }

    /// Append a header with one or more values.
    pub fn header<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.headers
            .push((name.into(), values.into_iter().map(Into::into).collect()));
        self
    }

    /// Capture method, target and headers of an axum request.
    pub fn from_http<B>(request: &Request<B>) -> Self {
        let url = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string());

        Self {
            method: request.method().clone(),
            url,
            headers: collect_headers(request.headers()),
        }
    }

    /// Request ID assigned by the middleware, or `"unknown"`.
    pub fn request_id(&self) -> &str {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(X_REQUEST_ID))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
            .unwrap_or("unknown")
    }
}

fn collect_headers(headers: &HeaderMap) -> Vec<(String, Vec<String>)> {
    headers
        .keys()
        .map(|name| {
            let values = headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect();
            (name.as_str().to_string(), values)
        })
        .collect()
}

/// A validated request. Immutable once parsed.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    method: Method,
    url: Url,
    headers: Vec<(String, Vec<String>)>,
}

impl InboundRequest {
    /// Validate a host request. Fails when the URL is absent or unresolvable.
    pub fn parse(request: HostRequest) -> Result<Self, RequestError> {
        let raw = request.url.ok_or(RequestError::MissingUrl)?;
        if raw.is_empty() {
            return Err(RequestError::MissingUrl);
        }

        let base = Url::parse(BASE_URL).map_err(|source| RequestError::InvalidUrl {
            url: BASE_URL.to_string(),
            source,
        })?;
        let url = base
            .join(&raw)
            .map_err(|source| RequestError::InvalidUrl { url: raw.clone(), source })?;

        Ok(Self {
            method: request.method,
            url,
            headers: request.headers,
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path as resolved against the base, leading separator included.
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Decoded query pairs in the order the client sent them.
    pub fn query_pairs(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
    }

    pub fn headers(&self) -> &[(String, Vec<String>)] {
        &self.headers
    }
}

/// Generates UUID v4 request IDs for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}
