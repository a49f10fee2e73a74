use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wallet_dashboard::aggregator::AddrInfoService;
use wallet_dashboard::api::{AppState, build_router};
use wallet_dashboard::config::Config;
use wallet_dashboard::gateway::EtherscanClient;
use wallet_dashboard::repository::SqliteBalanceStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting wallet dashboard server");

    let config = Config::from_env()?;
    info!("Configuration loaded, chain id {}", config.chain_id);

    let gateway = Arc::new(EtherscanClient::new(
        &config.etherscan_api_url,
        &config.etherscan_api_key,
        config.chain_id,
        config.request_timeout,
    )?);

    let mut service = AddrInfoService::new(gateway);
    if let Some(database_url) = &config.database_url {
        service = service.with_store(Arc::new(SqliteBalanceStore::open(database_url)?));
        info!("Balance cache enabled");
    }

    let app = build_router(AppState {
        addr_info: Arc::new(service),
    });

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
