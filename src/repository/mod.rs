pub mod balance_repository;
pub mod database;
pub mod models;
pub mod store;

pub use balance_repository::BalanceRepository;
pub use database::Database;
pub use models::BalanceRecord;
pub use store::{BalanceStore, SqliteBalanceStore};
