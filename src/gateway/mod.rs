pub mod etherscan;
pub mod models;
pub mod response;

use alloy_primitives::Address;
use async_trait::async_trait;

use crate::error::GatewayError;

pub use etherscan::EtherscanClient;
pub use models::{
    Balance, BlockNumber, BlockOrder, GasPrice, ListQuery, Listing, SortOrder, Transaction,
    TransferEvent,
};

/// Read-only access to a block-explorer style API.
///
/// Implementations perform no retries; a caller that wants them wraps the
/// call site.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    async fn block_number(&self) -> Result<BlockNumber, GatewayError>;

    async fn gas_price(&self) -> Result<GasPrice, GatewayError>;

    async fn balance(&self, address: Address) -> Result<Balance, GatewayError>;

    /// Normal transactions of `address`, most recent first with `ListQuery::latest`.
    async fn list_transactions(
        &self,
        address: Address,
        query: ListQuery,
    ) -> Result<Listing<Transaction>, GatewayError>;

    /// ERC-721 transfers of `address` on one contract, in the order `query` asks for.
    async fn list_token_transfers(
        &self,
        address: Address,
        contract_address: Address,
        query: ListQuery,
    ) -> Result<Listing<TransferEvent>, GatewayError>;
}
