pub mod aggregator;
pub mod api;
pub mod config;
pub mod contract;
pub mod error;
pub mod gateway;
pub mod ownership;
pub mod query;
pub mod repository;
pub mod session;
pub mod units;

#[cfg(test)]
pub(crate) mod testing;
