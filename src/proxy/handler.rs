// The catch-all forwarding handler

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::http::{header, HeaderValue, Method};
use axum::response::Response;

use crate::error::{ProxyError, ProxyResult};
use crate::proxy::config::HeaderPolicy;
use crate::proxy::credentials::CredentialResolver;
use crate::proxy::headers::outbound_headers;
use crate::proxy::response::translate_response;
use crate::proxy::upstream::{ForwardBody, UpstreamClient};

/// Shared request-handling state, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
    pub resolver: Arc<CredentialResolver>,
    pub header_policy: HeaderPolicy,
}

/// Forward one inbound request to the backend.
///
/// The caller must be authenticated before anything leaves this
/// process; the credential resolution (and token exchange, when
/// configured) strictly precedes the backend forward.
pub async fn proxy_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
    request: Request,
) -> ProxyResult<Response<Body>> {
    let method = request.method().clone();
    let query = request.uri().query().map(str::to_owned);
    let inbound_headers = request.headers().clone();

    let credential = inbound_headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ProxyError::AuthMissing)?;

    let resolved = state.resolver.resolve(credential).await?;
    let credential = HeaderValue::from_str(&resolved)
        .map_err(|e| ProxyError::InvalidCredential(e.to_string()))?;

    let body = read_body(&method, &inbound_headers, request).await?;
    let headers = outbound_headers(state.header_policy, &inbound_headers, credential);

    let upstream_response = state
        .upstream
        .forward(method, &path, query.as_deref(), headers, body)
        .await?;

    translate_response(upstream_response).await
}

/// Read and translate the request body. GET and HEAD never carry one;
/// their bodies are left unread.
async fn read_body(
    method: &Method,
    headers: &axum::http::HeaderMap,
    request: Request,
) -> ProxyResult<Option<ForwardBody>> {
    if method == Method::GET || method == Method::HEAD {
        return Ok(None);
    }

    let bytes = axum::body::to_bytes(request.into_body(), usize::MAX)
        .await
        .map_err(|e| ProxyError::BodyRead(e.to_string()))?;

    if bytes.is_empty() {
        return Ok(None);
    }

    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false);

    if is_json {
        let value = serde_json::from_slice(&bytes)?;
        Ok(Some(ForwardBody::Json(value)))
    } else {
        Ok(Some(ForwardBody::Text(
            String::from_utf8_lossy(&bytes).into_owned(),
        )))
    }
}
