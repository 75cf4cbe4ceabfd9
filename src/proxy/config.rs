use serde::{Deserialize, Serialize};

use crate::error::ProxyError;

/// Backend origin used when `environment` is `dev`.
const DEV_BACKEND_URL: &str = "http://localhost:8080";
/// Backend origin used for in-cluster deployments.
const CLUSTER_BACKEND_URL: &str = "http://navdata-backend";

/// Deployment environment, selects the default backend origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Cluster,
}

/// How the caller's credential is turned into the upstream credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialMode {
    /// Forward the inbound `authorization` header unchanged.
    Passthrough,
    /// Exchange the inbound bearer token for a downstream-audience token.
    TokenExchange,
}

/// Which inbound headers reach the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeaderPolicy {
    /// Only `authorization` and `content-type` go upstream.
    AllowList,
    /// The full inbound header set goes upstream, with `authorization`
    /// replaced by the resolved credential.
    ForwardAll,
}

/// Proxy service configuration.
///
/// Built once at startup and handed to the server; nothing reads
/// process-wide state per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub environment: Environment,

    /// Backend origin. Defaults per environment, overridable.
    pub backend_base_url: String,

    /// Path prefix stripped from inbound requests.
    #[serde(default = "default_proxy_prefix")]
    pub proxy_prefix: String,

    pub credential_mode: CredentialMode,

    /// Explicit header policy; `None` follows the credential mode.
    #[serde(default)]
    pub header_policy: Option<HeaderPolicy>,

    /// Downstream audience for token exchange.
    #[serde(default)]
    pub exchange_target: Option<String>,

    /// Token-exchange endpoint URL.
    #[serde(default)]
    pub exchange_endpoint: Option<String>,

    /// Listen address
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Outbound request timeout (seconds), covers both the token
    /// exchange and the backend forward.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Dev,
            backend_base_url: DEV_BACKEND_URL.to_string(),
            proxy_prefix: default_proxy_prefix(),
            credential_mode: CredentialMode::Passthrough,
            header_policy: None,
            exchange_target: None,
            exchange_endpoint: None,
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
        }
    }
}

fn default_proxy_prefix() -> String {
    "/api/proxy".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8070
}

fn default_request_timeout() -> u64 {
    120
}

impl ProxyConfig {
    /// Load configuration from `NAVDATA_*` environment variables.
    pub fn from_env() -> Result<Self, ProxyError> {
        let environment = match std::env::var("NAVDATA_ENV").as_deref() {
            Ok("dev") | Err(_) => Environment::Dev,
            Ok(_) => Environment::Cluster,
        };

        let backend_base_url = std::env::var("NAVDATA_BACKEND_URL").unwrap_or_else(|_| {
            match environment {
                Environment::Dev => DEV_BACKEND_URL.to_string(),
                Environment::Cluster => CLUSTER_BACKEND_URL.to_string(),
            }
        });

        let credential_mode = match std::env::var("NAVDATA_CREDENTIAL_MODE").as_deref() {
            Ok("token-exchange") => CredentialMode::TokenExchange,
            Ok("passthrough") | Err(_) => CredentialMode::Passthrough,
            Ok(other) => {
                return Err(ProxyError::Config(format!(
                    "unknown NAVDATA_CREDENTIAL_MODE: {}",
                    other
                )))
            }
        };

        let header_policy = match std::env::var("NAVDATA_HEADER_POLICY").as_deref() {
            Ok("allow-list") => Some(HeaderPolicy::AllowList),
            Ok("forward-all") => Some(HeaderPolicy::ForwardAll),
            Err(_) => None,
            Ok(other) => {
                return Err(ProxyError::Config(format!(
                    "unknown NAVDATA_HEADER_POLICY: {}",
                    other
                )))
            }
        };

        let port = match std::env::var("NAVDATA_PORT") {
            Ok(v) => v
                .parse::<u16>()
                .map_err(|e| ProxyError::Config(format!("invalid NAVDATA_PORT: {}", e)))?,
            Err(_) => default_port(),
        };

        let request_timeout = match std::env::var("NAVDATA_REQUEST_TIMEOUT") {
            Ok(v) => v.parse::<u64>().map_err(|e| {
                ProxyError::Config(format!("invalid NAVDATA_REQUEST_TIMEOUT: {}", e))
            })?,
            Err(_) => default_request_timeout(),
        };

        Ok(Self {
            environment,
            backend_base_url,
            proxy_prefix: std::env::var("NAVDATA_PROXY_PREFIX")
                .unwrap_or_else(|_| default_proxy_prefix()),
            credential_mode,
            header_policy,
            exchange_target: std::env::var("NAVDATA_EXCHANGE_TARGET").ok(),
            exchange_endpoint: std::env::var("NAVDATA_EXCHANGE_ENDPOINT").ok(),
            host: std::env::var("NAVDATA_HOST").unwrap_or_else(|_| default_host()),
            port,
            request_timeout,
        })
    }

    /// Effective header policy: explicit setting wins, otherwise the
    /// historical per-mode default (allow-list for passthrough,
    /// forward-all for token exchange).
    pub fn effective_header_policy(&self) -> HeaderPolicy {
        self.header_policy.unwrap_or(match self.credential_mode {
            CredentialMode::Passthrough => HeaderPolicy::AllowList,
            CredentialMode::TokenExchange => HeaderPolicy::ForwardAll,
        })
    }

    /// Get the actual bind address for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
