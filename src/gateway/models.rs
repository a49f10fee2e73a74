use alloy_primitives::{Address, U256};

pub const DEFAULT_START_BLOCK: u64 = 0;
pub const DEFAULT_END_BLOCK: u64 = 99_999_999;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockNumber {
    pub id: u64,
    pub block_number_hex: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasPrice {
    pub id: u64,
    pub gas_price_hex: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    /// Decimal wei, arbitrary precision.
    pub balance_wei: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub sort: SortOrder,
    /// `None` leaves paging to the explorer's default.
    pub limit: Option<u32>,
    pub start_block: u64,
    pub end_block: u64,
}

impl ListQuery {
    /// First page of `limit` entries, most recent first.
    pub fn latest(limit: u32) -> Self {
        Self {
            sort: SortOrder::Desc,
            limit: Some(limit),
            start_block: DEFAULT_START_BLOCK,
            end_block: DEFAULT_END_BLOCK,
        }
    }

    /// Full history in chronological order.
    pub fn ascending() -> Self {
        Self {
            sort: SortOrder::Asc,
            limit: None,
            start_block: DEFAULT_START_BLOCK,
            end_block: DEFAULT_END_BLOCK,
        }
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::latest(10)
    }
}

/// Result of a listing call. The explorer answers "no results" and similar
/// soft failures with `status = "0"`; those arrive here as empty `items`
/// with the explorer's message in `notice`.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub notice: Option<String>,
}

impl<T> Listing<T> {
    pub fn found(items: Vec<T>) -> Self {
        Self {
            items,
            notice: None,
        }
    }

    pub fn empty(notice: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            notice: Some(notice.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub hash: String,
    pub block_number: u64,
    pub timestamp: u64,
    pub from: Address,
    /// `None` for contract creation.
    pub to: Option<Address>,
    pub value_wei: U256,
    pub is_error: bool,
}

/// Position of an event in chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockOrder {
    pub block_number: u64,
    pub transaction_index: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    /// Decimal token id as reported by the explorer.
    pub token_id: String,
    pub from: Address,
    pub to: Address,
    pub contract_address: Address,
    pub block_number: u64,
    pub transaction_index: u64,
    pub hash: String,
    pub timestamp: u64,
    pub token_name: String,
    pub token_symbol: String,
}

impl TransferEvent {
    pub fn block_order(&self) -> BlockOrder {
        BlockOrder {
            block_number: self.block_number,
            transaction_index: self.transaction_index,
        }
    }
}
