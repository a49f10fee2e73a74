use crate::aggregator::AddrInfoService;
use crate::gateway::{ChainGateway, ListQuery};
use crate::query::formatters::{
    OutputFormat, format_addr_info, format_cached_balance, format_owned_tokens,
    format_transactions,
};
use crate::session::{WalletSession, fetch_owned_tokens};
use alloy_primitives::Address;
use anyhow::Result;
use std::str::FromStr;
use tracing::warn;

fn parse_address(address: &str) -> Result<Address> {
    Address::from_str(address.trim())
        .map_err(|_| anyhow::anyhow!("Invalid address format: {}", address))
}

pub async fn cmd_info(service: &AddrInfoService, address: &str, format: &OutputFormat) -> Result<()> {
    let address = parse_address(address)?;

    let info = service.get_addr_info(address).await?;
    println!("{}", format_addr_info(&info, format));

    Ok(())
}

pub async fn cmd_transactions(
    gateway: &dyn ChainGateway,
    address: &str,
    limit: u32,
    format: &OutputFormat,
) -> Result<()> {
    let address = parse_address(address)?;

    let listing = gateway
        .list_transactions(address, ListQuery::latest(limit))
        .await?;
    if let Some(notice) = &listing.notice {
        warn!("{}", notice);
    }
    println!("{}", format_transactions(&listing.items, format));

    Ok(())
}

pub async fn cmd_nfts(
    gateway: &dyn ChainGateway,
    nft_contract_address: Address,
    address: &str,
    format: &OutputFormat,
) -> Result<()> {
    let address = parse_address(address)?;

    let (tokens, notice) = fetch_owned_tokens(gateway, address, nft_contract_address).await?;
    if let Some(notice) = notice {
        warn!("{}", notice);
    }
    println!("{}", format_owned_tokens(&tokens, format));

    Ok(())
}

pub async fn cmd_cached_balance(
    service: &AddrInfoService,
    address: &str,
    format: &OutputFormat,
) -> Result<()> {
    let address = parse_address(address)?;

    if !service.has_store() {
        anyhow::bail!("DATABASE_URL is not set, no balance cache configured");
    }

    let record = service.cached_balance(address).await?;
    println!("{}", format_cached_balance(record.as_ref(), format));

    Ok(())
}

pub async fn cmd_mint(session: &WalletSession, format: &OutputFormat) -> Result<()> {
    let outcome = session.mint().await?;
    println!(
        "NFT minted successfully! Token {} in {}",
        outcome.token_id, outcome.receipt.transaction_hash
    );
    println!("{}", format_owned_tokens(&outcome.view.owned_tokens, format));

    Ok(())
}

pub async fn cmd_transfer(
    session: &WalletSession,
    token_id: &str,
    recipient: &str,
    format: &OutputFormat,
) -> Result<()> {
    let outcome = session.transfer(token_id, recipient).await?;
    println!(
        "NFT {} transferred successfully to {:#} in {}",
        outcome.token_id, outcome.recipient, outcome.receipt.transaction_hash
    );
    println!("{}", format_owned_tokens(&outcome.view.owned_tokens, format));

    Ok(())
}
