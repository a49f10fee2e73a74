use alloy_primitives::Address;
use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_ETHERSCAN_API_URL: &str = "https://api.etherscan.io/v2/api";
pub const DEFAULT_NFT_CONTRACT_ADDRESS: &str = "0x3263925Cb57481aF41e397e875E51b58897F953E";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub etherscan_api_url: String,
    pub etherscan_api_key: String,
    pub chain_id: u64,
    pub nft_contract_address: Address,
    /// Enables the latest-balance cache when set.
    pub database_url: Option<String>,
    pub json_rpc_url: Option<String>,
    pub private_key: Option<String>,
    pub bind_addr: String,
    pub transaction_limit: u32,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let etherscan_api_key =
            var("ETHERSCAN_API_KEY").context("ETHERSCAN_API_KEY must be set in .env")?;

        let etherscan_api_url =
            var("ETHERSCAN_API_URL").unwrap_or_else(|| DEFAULT_ETHERSCAN_API_URL.to_string());

        let chain_id = var("CHAIN_ID")
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("Invalid CHAIN_ID")?
            .unwrap_or(1);

        let contract_address_str = var("NFT_CONTRACT_ADDRESS")
            .unwrap_or_else(|| DEFAULT_NFT_CONTRACT_ADDRESS.to_string());
        let nft_contract_address = Address::from_str(&contract_address_str)
            .context("Invalid NFT_CONTRACT_ADDRESS format")?;

        let transaction_limit = var("TRANSACTION_LIMIT")
            .map(|v| v.parse::<u32>())
            .transpose()
            .context("Invalid TRANSACTION_LIMIT")?
            .unwrap_or(10);

        let request_timeout_secs = var("REQUEST_TIMEOUT_SECS")
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("Invalid REQUEST_TIMEOUT_SECS")?
            .unwrap_or(30);

        Ok(Config {
            etherscan_api_url,
            etherscan_api_key,
            chain_id,
            nft_contract_address,
            database_url: var("DATABASE_URL"),
            json_rpc_url: var("JSON_RPC_URL"),
            private_key: var("PRIVATE_KEY"),
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            transaction_limit,
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = config_from(&[("ETHERSCAN_API_KEY", "KEY")]).unwrap();

        assert_eq!(config.etherscan_api_url, DEFAULT_ETHERSCAN_API_URL);
        assert_eq!(config.chain_id, 1);
        assert_eq!(
            config.nft_contract_address,
            Address::from_str(DEFAULT_NFT_CONTRACT_ADDRESS).unwrap()
        );
        assert_eq!(config.database_url, None);
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.transaction_limit, 10);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn api_key_is_required() {
        assert!(config_from(&[]).is_err());
        assert!(config_from(&[("ETHERSCAN_API_KEY", "  ")]).is_err());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config_from(&[
            ("ETHERSCAN_API_KEY", "KEY"),
            ("CHAIN_ID", "11155111"),
            ("DATABASE_URL", "sqlite:./dashboard.db"),
            ("TRANSACTION_LIMIT", "25"),
        ])
        .unwrap();

        assert_eq!(config.chain_id, 11155111);
        assert_eq!(config.database_url.as_deref(), Some("sqlite:./dashboard.db"));
        assert_eq!(config.transaction_limit, 25);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(config_from(&[("ETHERSCAN_API_KEY", "KEY"), ("CHAIN_ID", "mainnet")]).is_err());
        assert!(
            config_from(&[("ETHERSCAN_API_KEY", "KEY"), ("NFT_CONTRACT_ADDRESS", "0x123")]).is_err()
        );
    }
}
