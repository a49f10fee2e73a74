use alloy_primitives::Address;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

use super::ChainGateway;
use super::models::{Balance, BlockNumber, GasPrice, ListQuery, Listing, Transaction, TransferEvent};
use super::response::{ExplorerResponse, RawTokenTransfer, RawTransaction};
use crate::error::GatewayError;

/// HTTP client for an Etherscan-compatible API (v2, multichain).
#[derive(Clone)]
pub struct EtherscanClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    chain_id: u64,
}

impl EtherscanClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        chain_id: u64,
        request_timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| GatewayError::Transport(format!("HTTP client init failed: {e}")))?;

        Ok(EtherscanClient {
            http,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            chain_id,
        })
    }

    fn base_params(&self, module: &str, action: &str) -> Vec<(&'static str, String)> {
        vec![
            ("chainid", self.chain_id.to_string()),
            ("module", module.to_string()),
            ("action", action.to_string()),
        ]
    }

    fn listing_params(params: &mut Vec<(&'static str, String)>, query: &ListQuery) {
        params.push(("startblock", query.start_block.to_string()));
        params.push(("endblock", query.end_block.to_string()));
        if let Some(limit) = query.limit {
            params.push(("page", "1".to_string()));
            params.push(("offset", limit.to_string()));
        }
        params.push(("sort", query.sort.as_param().to_string()));
    }

    async fn fetch(
        &self,
        mut params: Vec<(&'static str, String)>,
    ) -> Result<ExplorerResponse, GatewayError> {
        let action = params
            .iter()
            .find(|(key, _)| *key == "action")
            .map(|(_, value)| value.clone())
            .unwrap_or_default();
        debug!("Block explorer request: action={}", action);

        params.push(("apikey", self.api_key.clone()));

        let response = self
            .http
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                warn!("Block explorer {} request failed: {}", action, e);
                GatewayError::Transport(e.without_url().to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Block explorer {} answered HTTP {}", action, status);
            let detail = format!("HTTP {status}");
            return Err(if status == StatusCode::TOO_MANY_REQUESTS {
                GatewayError::RateLimited(detail)
            } else if status == StatusCode::NOT_FOUND {
                GatewayError::NotFound(detail)
            } else {
                GatewayError::Transport(detail)
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.without_url().to_string()))?;

        ExplorerResponse::from_body(&body)
    }
}

#[async_trait]
impl ChainGateway for EtherscanClient {
    async fn block_number(&self) -> Result<BlockNumber, GatewayError> {
        self.fetch(self.base_params("proxy", "eth_blockNumber"))
            .await?
            .into_block_number()
    }

    async fn gas_price(&self) -> Result<GasPrice, GatewayError> {
        self.fetch(self.base_params("proxy", "eth_gasPrice"))
            .await?
            .into_gas_price()
    }

    async fn balance(&self, address: Address) -> Result<Balance, GatewayError> {
        let mut params = self.base_params("account", "balance");
        params.push(("address", format!("{address:?}")));
        params.push(("tag", "latest".to_string()));
        self.fetch(params).await?.into_balance()
    }

    async fn list_transactions(
        &self,
        address: Address,
        query: ListQuery,
    ) -> Result<Listing<Transaction>, GatewayError> {
        let mut params = self.base_params("account", "txlist");
        params.push(("address", format!("{address:?}")));
        Self::listing_params(&mut params, &query);

        let listing = self
            .fetch(params)
            .await?
            .into_listing::<RawTransaction, Transaction>()?;
        debug!(
            "Fetched {} transactions for {:?}",
            listing.items.len(),
            address
        );
        Ok(listing)
    }

    async fn list_token_transfers(
        &self,
        address: Address,
        contract_address: Address,
        query: ListQuery,
    ) -> Result<Listing<TransferEvent>, GatewayError> {
        let mut params = self.base_params("account", "tokennfttx");
        params.push(("address", format!("{address:?}")));
        params.push(("contractaddress", format!("{contract_address:?}")));
        Self::listing_params(&mut params, &query);

        let listing = self
            .fetch(params)
            .await?
            .into_listing::<RawTokenTransfer, TransferEvent>()?;
        debug!(
            "Fetched {} token transfers for {:?} on {:?}",
            listing.items.len(),
            address,
            contract_address
        );
        Ok(listing)
    }
}
