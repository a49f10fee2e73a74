use alloy_primitives::Address;

#[derive(Debug, Clone, PartialEq)]
pub struct BalanceRecord {
    pub address: Address,
    pub balance_eth: f64,
    pub balance_wei: String,
}
