//! Host request → invocation event.
//!
//! Pure and total. Malformed requests are rejected by `InboundRequest::parse`
//! before translation is attempted.

use crate::adapter::event::InvocationEvent;
use crate::http::request::InboundRequest;

/// Build the backend event for a request.
///
/// - Exactly one leading `/` is stripped from the path.
/// - Repeated query parameters resolve last-wins.
/// - Repeated headers are joined with `,`; a header without a value maps to `""`.
/// - Header names keep the casing the transport supplied.
pub fn translate(request: &InboundRequest) -> InvocationEvent {
    let path = request.path();
    let path = path.strip_prefix('/').unwrap_or(path).to_string();

    // Later pairs overwrite earlier ones.
    let query_string_parameters = request.query_pairs().collect();

    let headers = request
        .headers()
        .iter()
        .map(|(name, values)| (name.clone(), values.join(",")))
        .collect();

    InvocationEvent {
        path,
        query_string_parameters,
        headers,
        request_context: Default::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::HostRequest;
    use axum::http::Method;
    use std::collections::BTreeMap;

    fn inbound(request: HostRequest) -> InboundRequest {
        InboundRequest::parse(request).unwrap()
    }

    #[test]
    fn translates_path_query_and_headers() {
        let request = inbound(
            HostRequest::new(Method::GET, "/foo/bar?a=1&a=2&b=x").header("H", ["v1", "v2"]),
        );

        let event = translate(&request);

        assert_eq!(event.path, "foo/bar");
        assert_eq!(
            event.query_string_parameters,
            BTreeMap::from([("a".to_string(), "2".to_string()), ("b".to_string(), "x".to_string())])
        );
        assert_eq!(
            event.headers,
            BTreeMap::from([("H".to_string(), "v1,v2".to_string())])
        );
        assert!(event.request_context.is_empty());
    }

    #[test]
    fn repeated_query_parameter_takes_last_value() {
        let event = translate(&inbound(HostRequest::new(Method::GET, "/x?w=100&w=200&w=300")));
        assert_eq!(event.query_string_parameters["w"], "300");
    }

    #[test]
    fn query_values_are_decoded() {
        let event = translate(&inbound(HostRequest::new(Method::GET, "/x?text=a%20b&plus=c+d")));
        assert_eq!(event.query_string_parameters["text"], "a b");
        assert_eq!(event.query_string_parameters["plus"], "c d");
    }

    #[test]
    fn strips_only_one_leading_separator() {
        let event = translate(&inbound(HostRequest::new(
            Method::GET,
            "http://localhost//double/slash",
        )));
        assert_eq!(event.path, "/double/slash");
    }

    #[test]
    fn root_path_becomes_empty() {
        let event = translate(&inbound(HostRequest::new(Method::GET, "/")));
        assert_eq!(event.path, "");
        assert!(event.query_string_parameters.is_empty());
    }

    #[test]
    fn valueless_header_becomes_empty_string() {
        let event = translate(&inbound(
            HostRequest::new(Method::GET, "/").header("x-empty", Vec::<String>::new()),
        ));
        assert_eq!(event.headers["x-empty"], "");
    }

    #[test]
    fn absent_header_is_absent() {
        let event = translate(&inbound(HostRequest::new(Method::GET, "/")));
        assert!(!event.headers.contains_key("accept"));
    }

    #[test]
    fn header_values_containing_commas_are_kept() {
        let event = translate(&inbound(
            HostRequest::new(Method::GET, "/").header("Accept", ["image/webp,image/*", "*/*"]),
        ));
        assert_eq!(event.headers["Accept"], "image/webp,image/*,*/*");
    }
}
