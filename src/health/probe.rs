//! Liveness and readiness probes.

use axum::http::Method;

/// Liveness probe target.
pub const LIVENESS_PATH: &str = "/healthz";

/// Readiness probe target.
pub const READINESS_PATH: &str = "/readyz";

/// True when the request is a probe the gateway answers itself.
///
/// `target` is the raw request target, query string included, so
/// `/healthz?x=1` is not a probe.
pub fn is_probe(method: &Method, target: Option<&str>) -> bool {
    *method == Method::GET && matches!(target, Some(LIVENESS_PATH) | Some(READINESS_PATH))
}
