// Response translation - backend response to caller response

use axum::body::Body;
use axum::http::{header, HeaderValue, Response};
use serde_json::Value;

use crate::error::{ProxyError, ProxyResult};

/// Headers that describe the original message framing; the body is
/// re-encoded below, so copying these would corrupt the response.
const FRAMING_HEADERS: [header::HeaderName; 3] = [
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
    header::CONNECTION,
];

/// Translate the backend response for the caller.
///
/// The body is always re-emitted JSON-encoded: a JSON backend body is
/// parsed and re-serialized, a text body becomes a JSON string. The
/// double encoding of non-JSON bodies is a compatibility requirement;
/// it is kept in this one step so a corrected passthrough can replace
/// it without touching the rest of the proxy. Status and remaining
/// headers are copied through.
pub async fn translate_response(upstream: reqwest::Response) -> ProxyResult<Response<Body>> {
    let status = upstream.status();
    let headers = upstream.headers().clone();

    let payload: Value = if is_json(&headers) {
        upstream.json().await?
    } else {
        Value::String(upstream.text().await?)
    };

    let body = serde_json::to_vec(&payload).map_err(ProxyError::InvalidBody)?;

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;

    let out_headers = response.headers_mut();
    for (name, value) in headers.iter() {
        if FRAMING_HEADERS.contains(name) || name == &header::CONTENT_TYPE {
            continue;
        }
        out_headers.append(name, value.clone());
    }
    out_headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    Ok(response)
}

fn is_json(headers: &axum::http::HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false)
}
