//! Hand-written test doubles for the gateway and contract seams.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::contract::{NftContract, TxReceipt};
use crate::error::{ContractError, GatewayError};
use crate::gateway::{
    Balance, BlockNumber, ChainGateway, GasPrice, ListQuery, Listing, Transaction, TransferEvent,
};

pub struct StubGateway {
    pub block_number: Result<BlockNumber, GatewayError>,
    pub gas_price: Result<GasPrice, GatewayError>,
    pub balance: Result<Balance, GatewayError>,
    pub transactions: Result<Listing<Transaction>, GatewayError>,
    pub transfers: Result<Listing<TransferEvent>, GatewayError>,
    pub queries: Mutex<Vec<ListQuery>>,
}

impl StubGateway {
    /// Block 0x10, 1 gwei gas, 2 ETH balance, no history.
    pub fn healthy() -> Self {
        Self {
            block_number: Ok(BlockNumber {
                id: 83,
                block_number_hex: "0x10".to_string(),
            }),
            gas_price: Ok(GasPrice {
                id: 73,
                gas_price_hex: "0x3b9aca00".to_string(),
            }),
            balance: Ok(Balance {
                balance_wei: "2000000000000000000".to_string(),
            }),
            transactions: Ok(Listing::empty("No transactions found")),
            transfers: Ok(Listing::empty("No transactions found")),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_gas_price_hex(mut self, hex: &str) -> Self {
        self.gas_price = Ok(GasPrice {
            id: 73,
            gas_price_hex: hex.to_string(),
        });
        self
    }

    pub fn with_balance_wei(mut self, wei: &str) -> Self {
        self.balance = Ok(Balance {
            balance_wei: wei.to_string(),
        });
        self
    }

    pub fn with_transfers(mut self, events: Vec<TransferEvent>) -> Self {
        self.transfers = Ok(Listing::found(events));
        self
    }

    pub fn with_transactions(mut self, transactions: Vec<Transaction>) -> Self {
        self.transactions = Ok(Listing::found(transactions));
        self
    }

    pub fn recorded_queries(&self) -> Vec<ListQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainGateway for StubGateway {
    async fn block_number(&self) -> Result<BlockNumber, GatewayError> {
        self.block_number.clone()
    }

    async fn gas_price(&self) -> Result<GasPrice, GatewayError> {
        self.gas_price.clone()
    }

    async fn balance(&self, _address: Address) -> Result<Balance, GatewayError> {
        self.balance.clone()
    }

    async fn list_transactions(
        &self,
        _address: Address,
        query: ListQuery,
    ) -> Result<Listing<Transaction>, GatewayError> {
        self.queries.lock().unwrap().push(query);
        self.transactions.clone()
    }

    async fn list_token_transfers(
        &self,
        _address: Address,
        _contract_address: Address,
        query: ListQuery,
    ) -> Result<Listing<TransferEvent>, GatewayError> {
        self.queries.lock().unwrap().push(query);
        self.transfers.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractCall {
    Mint,
    NextTokenId,
    SafeTransferFrom(Address, Address, U256),
    OwnerOf(U256),
}

/// In-memory ERC-721 that mints to `minter`.
pub struct StubContract {
    pub minter: Address,
    pub next_id: Mutex<U256>,
    pub owners: Mutex<HashMap<U256, Address>>,
    pub calls: Mutex<Vec<ContractCall>>,
    pub reject_writes: bool,
}

impl StubContract {
    pub fn new(minter: Address) -> Self {
        Self {
            minter,
            next_id: Mutex::new(U256::ZERO),
            owners: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            reject_writes: false,
        }
    }

    pub fn with_owner(self, token_id: u64, owner: Address) -> Self {
        self.owners
            .lock()
            .unwrap()
            .insert(U256::from(token_id), owner);
        self
    }

    pub fn calls(&self) -> Vec<ContractCall> {
        self.calls.lock().unwrap().clone()
    }

    fn receipt(&self) -> TxReceipt {
        let n = self.calls.lock().unwrap().len();
        TxReceipt {
            transaction_hash: format!("0x{n:064x}"),
            block_number: Some(100 + n as u64),
            success: true,
            transfers: Vec::new(),
        }
    }
}

#[async_trait]
impl NftContract for StubContract {
    async fn mint(&self) -> Result<TxReceipt, ContractError> {
        self.calls.lock().unwrap().push(ContractCall::Mint);
        if self.reject_writes {
            return Err(ContractError::Rejected("user denied transaction".into()));
        }
        let mut next_id = self.next_id.lock().unwrap();
        self.owners.lock().unwrap().insert(*next_id, self.minter);
        *next_id += U256::from(1);
        Ok(self.receipt())
    }

    async fn next_token_id(&self) -> Result<U256, ContractError> {
        self.calls.lock().unwrap().push(ContractCall::NextTokenId);
        Ok(*self.next_id.lock().unwrap())
    }

    async fn safe_transfer_from(
        &self,
        from: Address,
        to: Address,
        token_id: U256,
    ) -> Result<TxReceipt, ContractError> {
        self.calls
            .lock()
            .unwrap()
            .push(ContractCall::SafeTransferFrom(from, to, token_id));
        if self.reject_writes {
            return Err(ContractError::Rejected("user denied transaction".into()));
        }
        self.owners.lock().unwrap().insert(token_id, to);
        Ok(self.receipt())
    }

    async fn owner_of(&self, token_id: U256) -> Result<Address, ContractError> {
        self.calls.lock().unwrap().push(ContractCall::OwnerOf(token_id));
        self.owners
            .lock()
            .unwrap()
            .get(&token_id)
            .copied()
            .ok_or_else(|| ContractError::Rejected("ERC721NonexistentToken".into()))
    }
}
