use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionReceipt;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolEvent;
use alloy_primitives::{Address, U256};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

use super::abi::IDashboardNft::{self, IDashboardNftInstance};
use super::{NftContract, ReceiptTransfer, TxReceipt};
use crate::error::ContractError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
// Writes wait for inclusion
const RECEIPT_TIMEOUT: Duration = Duration::from_secs(300);

type Contract = IDashboardNftInstance<DynProvider>;

/// `NftContract` over JSON-RPC with a local signing key.
///
/// Reads are retried with exponential backoff; writes are sent exactly once.
#[derive(Clone)]
pub struct AlloyNftContract {
    contract: Contract,
    signer_address: Address,
    max_retries: usize,
}

impl AlloyNftContract {
    pub fn connect(rpc_url: &str, private_key: &str, contract_address: Address) -> Result<Self> {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .context("Invalid PRIVATE_KEY format")?;
        let signer_address = signer.address();

        let parsed_url = rpc_url
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid RPC URL: {}", rpc_url))?;
        let provider = ProviderBuilder::new()
            .wallet(signer)
            .connect_http(parsed_url)
            .erased();

        info!(
            "Contract client for {:?} ready, signing as {:?}",
            contract_address, signer_address
        );

        Ok(AlloyNftContract {
            contract: IDashboardNft::new(contract_address, provider),
            signer_address,
            max_retries: 5,
        })
    }

    pub fn signer_address(&self) -> Address {
        self.signer_address
    }

    fn get_retry_strategy(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(100)
            .factor(2)
            .max_delay(Duration::from_secs(10))
            .map(jitter)
            .take(self.max_retries)
    }

    async fn read<T, F, Fut>(&self, what: &'static str, call: F) -> Result<T, ContractError>
    where
        F: Fn(Contract) -> Fut,
        Fut: Future<Output = Result<T, alloy::contract::Error>>,
    {
        Retry::spawn(self.get_retry_strategy(), || {
            let fut = call(self.contract.clone());
            async move {
                match timeout(REQUEST_TIMEOUT, fut).await {
                    Ok(Ok(value)) => Ok(Ok(value)),
                    Ok(Err(e)) => {
                        let error = classify(e.to_string());
                        if let ContractError::Rejected(_) = error {
                            // reverts are final, no point retrying
                            Ok(Err(error))
                        } else {
                            warn!("{} call failed: {}, retrying", what, error);
                            Err(error)
                        }
                    }
                    Err(_) => {
                        warn!(
                            "{} call timed out after {} seconds",
                            what,
                            REQUEST_TIMEOUT.as_secs()
                        );
                        Err(ContractError::Timeout(REQUEST_TIMEOUT.as_secs()))
                    }
                }
            }
        })
        .await
        .and_then(|r| r)
    }

    async fn wait_for_receipt<Fut>(&self, what: &str, pending: Fut) -> Result<TxReceipt, ContractError>
    where
        Fut: Future<Output = Result<TransactionReceipt, ContractError>>,
    {
        let receipt = timeout(RECEIPT_TIMEOUT, pending)
            .await
            .map_err(|_| ContractError::Timeout(RECEIPT_TIMEOUT.as_secs()))??;

        let tx = to_tx_receipt(&receipt);
        info!(
            "{} included in block {:?}: {} (success: {})",
            what, tx.block_number, tx.transaction_hash, tx.success
        );
        if !tx.success {
            return Err(ContractError::Rejected(format!(
                "{what} transaction {} reverted",
                tx.transaction_hash
            )));
        }
        Ok(tx)
    }
}

#[async_trait]
impl NftContract for AlloyNftContract {
    async fn mint(&self) -> Result<TxReceipt, ContractError> {
        debug!("Sending mint()");
        let pending = async {
            self.contract
                .mint()
                .send()
                .await
                .map_err(|e| classify(e.to_string()))?
                .get_receipt()
                .await
                .map_err(|e| ContractError::Transport(e.to_string()))
        };
        self.wait_for_receipt("mint", pending).await
    }

    async fn next_token_id(&self) -> Result<U256, ContractError> {
        self.read("nextTokenId", |contract| async move {
            contract.nextTokenId().call().await
        })
        .await
    }

    async fn safe_transfer_from(
        &self,
        from: Address,
        to: Address,
        token_id: U256,
    ) -> Result<TxReceipt, ContractError> {
        debug!(
            "Sending safeTransferFrom({:?}, {:?}, {})",
            from, to, token_id
        );
        let pending = async {
            self.contract
                .safeTransferFrom(from, to, token_id)
                .send()
                .await
                .map_err(|e| classify(e.to_string()))?
                .get_receipt()
                .await
                .map_err(|e| ContractError::Transport(e.to_string()))
        };
        self.wait_for_receipt("safeTransferFrom", pending).await
    }

    async fn owner_of(&self, token_id: U256) -> Result<Address, ContractError> {
        self.read("ownerOf", move |contract| async move {
            contract.ownerOf(token_id).call().await
        })
        .await
    }
}

fn classify(error: String) -> ContractError {
    let lower = error.to_ascii_lowercase();
    if lower.contains("revert") || lower.contains("denied") || lower.contains("insufficient funds")
    {
        ContractError::Rejected(error)
    } else {
        ContractError::Transport(error)
    }
}

fn to_tx_receipt(receipt: &TransactionReceipt) -> TxReceipt {
    let transfers = receipt
        .inner
        .logs()
        .iter()
        .filter_map(|log| {
            IDashboardNft::Transfer::decode_raw_log(log.topics(), &log.data().data).ok()
        })
        .map(|event| ReceiptTransfer {
            from: event.from,
            to: event.to,
            token_id: event.tokenId,
        })
        .collect();

    TxReceipt {
        transaction_hash: format!("{:?}", receipt.transaction_hash),
        block_number: receipt.block_number,
        success: receipt.status(),
        transfers,
    }
}
