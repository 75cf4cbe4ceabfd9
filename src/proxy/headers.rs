use axum::http::{header, HeaderMap, HeaderValue};

use crate::proxy::config::HeaderPolicy;

/// Build the upstream header set from the inbound headers and the
/// resolved credential.
///
/// `AllowList` sends only `authorization` and `content-type`
/// (defaulted to `application/json` when the caller sent none).
/// `ForwardAll` sends the full inbound set with `authorization`
/// replaced; `host` and `content-length` are owned by the HTTP client
/// and are never copied.
pub fn outbound_headers(
    policy: HeaderPolicy,
    inbound: &HeaderMap,
    credential: HeaderValue,
) -> HeaderMap {
    match policy {
        HeaderPolicy::AllowList => {
            let mut headers = HeaderMap::new();
            headers.insert(header::AUTHORIZATION, credential);
            let content_type = inbound
                .get(header::CONTENT_TYPE)
                .cloned()
                .unwrap_or_else(|| HeaderValue::from_static("application/json"));
            headers.insert(header::CONTENT_TYPE, content_type);
            headers
        }
        HeaderPolicy::ForwardAll => {
            let mut headers = inbound.clone();
            headers.remove(header::HOST);
            headers.remove(header::CONTENT_LENGTH);
            headers.insert(header::AUTHORIZATION, credential);
            headers
        }
    }
}
