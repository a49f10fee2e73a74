pub mod abi;
pub mod rpc;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;

use crate::error::ContractError;

pub use rpc::AlloyNftContract;

/// A `Transfer` log found in a receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptTransfer {
    pub from: Address,
    pub to: Address,
    pub token_id: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub transaction_hash: String,
    pub block_number: Option<u64>,
    pub success: bool,
    pub transfers: Vec<ReceiptTransfer>,
}

/// Calls into the deployed ERC-721. Encoding and signing belong to the
/// implementation; callers only decide when to call.
#[async_trait]
pub trait NftContract: Send + Sync {
    async fn mint(&self) -> Result<TxReceipt, ContractError>;

    async fn next_token_id(&self) -> Result<U256, ContractError>;

    async fn safe_transfer_from(
        &self,
        from: Address,
        to: Address,
        token_id: U256,
    ) -> Result<TxReceipt, ContractError>;

    async fn owner_of(&self, token_id: U256) -> Result<Address, ContractError>;
}
