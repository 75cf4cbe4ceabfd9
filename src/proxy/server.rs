use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{DefaultBodyLimit, Request},
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::{get, on, MethodFilter},
    Router,
};
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use crate::proxy::config::ProxyConfig;
use crate::proxy::credentials::CredentialResolver;
use crate::proxy::handler::{proxy_handler, AppState};
use crate::proxy::upstream::UpstreamClient;

/// The five methods the proxy accepts; all dispatch to the same handler.
const PROXY_METHODS: MethodFilter = MethodFilter::GET
    .or(MethodFilter::POST)
    .or(MethodFilter::PUT)
    .or(MethodFilter::DELETE)
    .or(MethodFilter::PATCH);

/// Axum server instance
pub struct AxumServer {
    shutdown_tx: Option<oneshot::Sender<()>>,
    local_addr: SocketAddr,
}

impl AxumServer {
    /// Start the proxy server with the given configuration.
    pub async fn start(
        config: ProxyConfig,
    ) -> anyhow::Result<(Self, tokio::task::JoinHandle<()>)> {
        let upstream = Arc::new(
            UpstreamClient::new(config.backend_base_url.clone(), config.request_timeout)
                .context("Failed to create upstream client")?,
        );
        let resolver = Arc::new(CredentialResolver::from_config(
            &config,
            upstream.http_client(),
        ));

        let state = AppState {
            upstream,
            resolver,
            header_policy: config.effective_header_policy(),
        };

        // Build routes
        let proxy_routes = Router::new().route("/*path", on(PROXY_METHODS, proxy_handler));
        let app = Router::new()
            .nest(&config.proxy_prefix, proxy_routes)
            .route("/healthz", get(health_check_handler))
            .layer(DefaultBodyLimit::max(16 * 1024 * 1024))
            .layer(TraceLayer::new_for_http())
            .layer(axum::middleware::from_fn(log_request))
            .layer(cors_layer())
            .with_state(state);

        // Bind address
        let addr = config.bind_address();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind address {}", addr))?;
        let local_addr = listener.local_addr().context("Failed to read bound address")?;

        tracing::info!("Reverse proxy server started at http://{}", local_addr);

        // Create shutdown channel
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let server_instance = Self {
            shutdown_tx: Some(shutdown_tx),
            local_addr,
        };

        // Start server in new task
        let handle = tokio::spawn(async move {
            use hyper::server::conn::http1;
            use hyper_util::rt::TokioIo;
            use hyper_util::service::TowerToHyperService;

            loop {
                tokio::select! {
                    res = listener.accept() => {
                        match res {
                            Ok((stream, _)) => {
                                let io = TokioIo::new(stream);
                                let service = TowerToHyperService::new(app.clone());

                                tokio::task::spawn(async move {
                                    if let Err(err) = http1::Builder::new()
                                        .serve_connection(io, service)
                                        .await
                                    {
                                        debug!("Connection handling finished or errored: {:?}", err);
                                    }
                                });
                            }
                            Err(e) => {
                                error!("Failed to accept connection: {:?}", e);
                            }
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::info!("Reverse proxy server stopped listening");
                        break;
                    }
                }
            }
        });

        Ok((server_instance, handle))
    }

    /// Address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop server
    pub fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Log every inbound request before it reaches the auth check.
async fn log_request(request: Request, next: Next) -> Response {
    tracing::info!("Request: {} {}", request.method(), request.uri());
    next.run(request).await
}

/// Health check handler
async fn health_check_handler() -> Response {
    Json(serde_json::json!({
        "status": "ok"
    }))
    .into_response()
}
