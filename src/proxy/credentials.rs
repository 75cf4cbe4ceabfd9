// Credential resolution - passthrough or on-behalf-of token exchange

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::ProxyError;
use crate::proxy::config::{CredentialMode, ProxyConfig};

/// Request body sent to the token-exchange endpoint.
#[derive(Debug, Serialize)]
struct ExchangeRequest<'a> {
    identity_provider: &'static str,
    target: &'a str,
    user_token: &'a str,
}

/// Successful exchange response.
#[derive(Debug, Deserialize)]
struct ExchangeResponse {
    token_type: String,
    access_token: String,
}

/// Turns the caller's `authorization` value into the credential sent
/// upstream. Selected once at startup from configuration.
pub enum CredentialResolver {
    /// Forward the inbound credential unchanged.
    Passthrough,
    /// Exchange the inbound bearer token for a downstream-audience token.
    TokenExchange {
        /// Downstream audience; request fails when absent.
        target: Option<String>,
        /// Exchange endpoint URL; request fails when absent.
        endpoint: Option<String>,
        client: Client,
    },
}

impl CredentialResolver {
    pub fn from_config(config: &ProxyConfig, client: Client) -> Self {
        match config.credential_mode {
            CredentialMode::Passthrough => Self::Passthrough,
            CredentialMode::TokenExchange => Self::TokenExchange {
                target: config.exchange_target.clone(),
                endpoint: config.exchange_endpoint.clone(),
                client,
            },
        }
    }

    /// Resolve the upstream credential from the inbound one.
    ///
    /// Fails closed: on any exchange failure the original token is
    /// never used as a fallback.
    pub async fn resolve(&self, inbound: &str) -> Result<String, ProxyError> {
        match self {
            Self::Passthrough => Ok(inbound.to_string()),
            Self::TokenExchange {
                target,
                endpoint,
                client,
            } => {
                let (target, endpoint) = match (target, endpoint) {
                    (Some(t), Some(e)) => (t, e),
                    (target, endpoint) => {
                        let mut missing = Vec::new();
                        if target.is_none() {
                            missing.push("NAVDATA_EXCHANGE_TARGET");
                        }
                        if endpoint.is_none() {
                            missing.push("NAVDATA_EXCHANGE_ENDPOINT");
                        }
                        let missing = missing.join(", ");
                        tracing::error!("Token exchange not configured, missing: {}", missing);
                        return Err(ProxyError::ExchangeConfigMissing(missing));
                    }
                };

                exchange_token(client, endpoint, target, inbound).await
            }
        }
    }
}

/// POST the exchange request and assemble the new `<scheme> <token>`
/// credential. The token is fetched fresh per request, never cached.
async fn exchange_token(
    client: &Client,
    endpoint: &str,
    target: &str,
    inbound: &str,
) -> Result<String, ProxyError> {
    let user_token = inbound.strip_prefix("Bearer ").unwrap_or(inbound);

    let response = client
        .post(endpoint)
        .json(&ExchangeRequest {
            identity_provider: "azuread",
            target,
            user_token,
        })
        .send()
        .await
        .map_err(|e| ProxyError::ExchangeRejected(format!("exchange request failed: {}", e)))?;

    if response.status() != StatusCode::OK {
        return Err(ProxyError::ExchangeRejected(format!(
            "exchange endpoint returned {}",
            response.status()
        )));
    }

    let exchanged: ExchangeResponse = response
        .json()
        .await
        .map_err(|e| ProxyError::ExchangeRejected(format!("invalid exchange response: {}", e)))?;

    Ok(format!(
        "{} {}",
        exchanged.token_type, exchanged.access_token
    ))
}
