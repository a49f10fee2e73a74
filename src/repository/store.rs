use alloy_primitives::Address;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::{BalanceRecord, BalanceRepository, Database};
use crate::error::PersistenceError;

/// Latest-known-balance cache keyed by address.
#[async_trait]
pub trait BalanceStore: Send + Sync {
    async fn upsert_balance(&self, record: BalanceRecord) -> Result<(), PersistenceError>;

    async fn find_balance(&self, address: Address)
    -> Result<Option<BalanceRecord>, PersistenceError>;
}

/// `BalanceStore` over SQLite. Queries run on the blocking pool; concurrent
/// upserts for one address serialize on the mutex and the last one wins.
#[derive(Clone)]
pub struct SqliteBalanceStore {
    db: Arc<Mutex<Database>>,
}

impl SqliteBalanceStore {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    pub fn open(database_url: &str) -> anyhow::Result<Self> {
        Ok(Self::new(Database::new(database_url)?))
    }

    async fn with_repo<T, F>(&self, f: F) -> Result<T, PersistenceError>
    where
        T: Send + 'static,
        F: FnOnce(&BalanceRepository) -> Result<T, PersistenceError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let db = db
                .lock()
                .map_err(|_| PersistenceError::Unavailable("database lock poisoned".to_string()))?;
            f(&BalanceRepository::new(&db.conn))
        })
        .await
        .map_err(|e| PersistenceError::Unavailable(format!("database task failed: {e}")))?
    }
}

#[async_trait]
impl BalanceStore for SqliteBalanceStore {
    async fn upsert_balance(&self, record: BalanceRecord) -> Result<(), PersistenceError> {
        debug!(
            "Caching balance {} ETH for {:?}",
            record.balance_eth, record.address
        );
        self.with_repo(move |repo| repo.upsert(&record)).await
    }

    async fn find_balance(
        &self,
        address: Address,
    ) -> Result<Option<BalanceRecord>, PersistenceError> {
        self.with_repo(move |repo| repo.find_by_address(&address))
            .await
    }
}
