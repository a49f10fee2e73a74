use alloy_primitives::Address;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{AggregationError, PersistenceError};
use crate::gateway::ChainGateway;
use crate::repository::{BalanceRecord, BalanceStore};
use crate::units::{EthAmount, hex_to_gwei, hex_to_u64, wei_decimal_to_eth};

#[derive(Debug, Clone, PartialEq)]
pub struct BlockInfo {
    pub id: u64,
    pub block_number_hex: String,
    pub block_number: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GasPriceInfo {
    pub id: u64,
    pub gas_price_hex: String,
    pub gas_price_gwei: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BalanceInfo {
    pub balance_wei: String,
    pub balance_eth: EthAmount,
}

/// Block, gas and balance snapshot for one address.
#[derive(Debug, Clone, PartialEq)]
pub struct AddrInfo {
    pub address: Address,
    pub block: BlockInfo,
    pub gas_price: GasPriceInfo,
    pub balance: BalanceInfo,
}

/// Builds `AddrInfo` from three gateway reads, optionally caching the
/// balance afterwards.
pub struct AddrInfoService {
    gateway: Arc<dyn ChainGateway>,
    store: Option<Arc<dyn BalanceStore>>,
}

impl AddrInfoService {
    pub fn new(gateway: Arc<dyn ChainGateway>) -> Self {
        Self {
            gateway,
            store: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn BalanceStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    /// All-or-nothing: any failing gateway call, conversion or cache write
    /// fails the whole call.
    pub async fn get_addr_info(&self, address: Address) -> Result<AddrInfo, AggregationError> {
        let (block, gas_price, balance) = futures::try_join!(
            self.gateway.block_number(),
            self.gateway.gas_price(),
            self.gateway.balance(address),
        )
        .inspect_err(|e| warn!("Address info for {:?} failed: {}", address, e))?;

        let info = AddrInfo {
            address,
            block: BlockInfo {
                id: block.id,
                block_number: hex_to_u64(&block.block_number_hex)?,
                block_number_hex: block.block_number_hex,
            },
            gas_price: GasPriceInfo {
                id: gas_price.id,
                gas_price_gwei: hex_to_gwei(&gas_price.gas_price_hex)?,
                gas_price_hex: gas_price.gas_price_hex,
            },
            balance: BalanceInfo {
                balance_eth: wei_decimal_to_eth(&balance.balance_wei)?,
                balance_wei: balance.balance_wei,
            },
        };

        if let Some(store) = &self.store {
            store
                .upsert_balance(BalanceRecord {
                    address,
                    balance_eth: info.balance.balance_eth.display,
                    balance_wei: info.balance.balance_wei.clone(),
                })
                .await?;
        }

        info!(
            "Address info for {:?}: block {}, gas {} gwei, balance {} ETH",
            address,
            info.block.block_number,
            info.gas_price.gas_price_gwei,
            info.balance.balance_eth.exact
        );

        Ok(info)
    }

    /// Last balance written by `get_addr_info`; `None` without a store.
    pub async fn cached_balance(
        &self,
        address: Address,
    ) -> Result<Option<BalanceRecord>, PersistenceError> {
        match &self.store {
            Some(store) => store.find_balance(address).await,
            None => Ok(None),
        }
    }
}
