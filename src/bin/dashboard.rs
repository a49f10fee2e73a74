use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use wallet_dashboard::aggregator::AddrInfoService;
use wallet_dashboard::config::Config;
use wallet_dashboard::contract::rpc::AlloyNftContract;
use wallet_dashboard::gateway::{ChainGateway, EtherscanClient};
use wallet_dashboard::query::commands::{
    cmd_cached_balance, cmd_info, cmd_mint, cmd_nfts, cmd_transactions, cmd_transfer,
};
use wallet_dashboard::query::formatters::OutputFormat;
use wallet_dashboard::repository::SqliteBalanceStore;
use wallet_dashboard::session::WalletSession;

#[derive(Parser)]
#[command(name = "dashboard")]
#[command(about = "Inspect an Ethereum account and manage dashboard NFTs", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "table")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Info {
        address: String,
    },
    Transactions {
        address: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    Nfts {
        address: String,
    },
    CachedBalance {
        address: String,
    },
    Mint,
    Transfer {
        token_id: String,
        recipient: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::from(cli.format.as_str());

    let config = Config::from_env()?;

    let gateway: Arc<dyn ChainGateway> = Arc::new(EtherscanClient::new(
        &config.etherscan_api_url,
        &config.etherscan_api_key,
        config.chain_id,
        config.request_timeout,
    )?);

    let mut service = AddrInfoService::new(gateway.clone());
    if let Some(database_url) = &config.database_url {
        service = service.with_store(Arc::new(SqliteBalanceStore::open(database_url)?));
    }
    let service = Arc::new(service);

    match cli.command {
        Commands::Info { address } => {
            cmd_info(&service, &address, &format).await?;
        }
        Commands::Transactions { address, limit } => {
            let limit = limit.unwrap_or(config.transaction_limit);
            cmd_transactions(gateway.as_ref(), &address, limit, &format).await?;
        }
        Commands::Nfts { address } => {
            cmd_nfts(
                gateway.as_ref(),
                config.nft_contract_address,
                &address,
                &format,
            )
            .await?;
        }
        Commands::CachedBalance { address } => {
            cmd_cached_balance(&service, &address, &format).await?;
        }
        Commands::Mint => {
            let session = connect_session(&config, gateway, service).await?;
            cmd_mint(&session, &format).await?;
        }
        Commands::Transfer {
            token_id,
            recipient,
        } => {
            let session = connect_session(&config, gateway, service).await?;
            cmd_transfer(&session, &token_id, &recipient, &format).await?;
        }
    }

    Ok(())
}

async fn connect_session(
    config: &Config,
    gateway: Arc<dyn ChainGateway>,
    service: Arc<AddrInfoService>,
) -> Result<WalletSession> {
    let rpc_url = config
        .json_rpc_url
        .as_deref()
        .context("JSON_RPC_URL must be set to send transactions")?;
    let private_key = config
        .private_key
        .as_deref()
        .context("PRIVATE_KEY must be set to send transactions")?;

    let contract = AlloyNftContract::connect(rpc_url, private_key, config.nft_contract_address)?;
    let account = contract.signer_address();

    let mut session = WalletSession::new(
        gateway,
        service,
        Arc::new(contract),
        config.nft_contract_address,
    )
    .with_transaction_limit(config.transaction_limit);
    session.connect(account).await;

    Ok(session)
}
