use anyhow::Result;
use tracing::info;

use navdata_proxy::logger;
use navdata_proxy::{AxumServer, ProxyConfig};

#[tokio::main]
async fn main() -> Result<()> {
    logger::init_logger();

    let config = ProxyConfig::from_env()?;
    info!(
        "Starting navdata-proxy: backend={}, mode={:?}, prefix={}",
        config.backend_base_url, config.credential_mode, config.proxy_prefix
    );

    let (server, handle) = AxumServer::start(config).await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    server.stop();
    handle.await?;

    Ok(())
}
