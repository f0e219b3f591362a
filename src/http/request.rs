//! Request inspection helpers.
//!
//! Request IDs are assigned by `SetRequestIdLayer` before any handler runs;
//! handlers only read them back for log correlation.

use axum::http::HeaderMap;

use crate::hub::resolver::HubRequest;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Opt-in header for diagnostic response headers.
pub const X_HUB_DIAG: &str = "x-hub-diag";

pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

pub fn diagnostics_requested(headers: &HeaderMap) -> bool {
    headers
        .get(X_HUB_DIAG)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| matches!(v.trim(), "1" | "true"))
}

/// Rebuild the full hub path from the prefix and the wildcard capture.
pub fn hub_request(prefix: &str, captured: &str, query: Option<String>) -> HubRequest {
    HubRequest::new(format!("{}/{}", prefix, captured.trim_start_matches('/')), query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_diagnostics_flag() {
        let mut headers = HeaderMap::new();
        assert!(!diagnostics_requested(&headers));
        headers.insert(X_HUB_DIAG, HeaderValue::from_static("1"));
        assert!(diagnostics_requested(&headers));
        headers.insert(X_HUB_DIAG, HeaderValue::from_static("0"));
        assert!(!diagnostics_requested(&headers));
    }

    #[test]
    fn test_hub_request_keeps_trailing_slash() {
        let request = hub_request("/hub", "line/x3000/", Some(String::new()));
        assert_eq!(request.path, "/hub/line/x3000/");
        assert!(request.query.is_none());
        assert_eq!(request_id(&HeaderMap::new()), "unknown");
    }
}
