use alloy_primitives::Address;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::str::FromStr;

use super::models::BalanceRecord;
use crate::error::PersistenceError;

type Result<T> = std::result::Result<T, PersistenceError>;

pub struct BalanceRepository<'a> {
    conn: &'a Connection,
}

impl<'a> BalanceRepository<'a> {
    const SELECT_BY_ADDRESS: &'static str =
        "SELECT address, balance_eth, balance_wei FROM balances WHERE address = ?1";

    const INSERT_BALANCE: &'static str =
        "INSERT INTO balances (address, balance_eth, balance_wei) VALUES (?1, ?2, ?3)";

    const UPDATE_BY_ADDRESS: &'static str =
        "UPDATE balances SET balance_eth = ?1, balance_wei = ?2 WHERE address = ?3";

    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Storage key: lower-case 0x-prefixed hex.
    pub fn address_key(address: &Address) -> String {
        format!("{address:?}")
    }

    pub fn find_by_address(&self, address: &Address) -> Result<Option<BalanceRecord>> {
        let record = self
            .conn
            .query_row(
                Self::SELECT_BY_ADDRESS,
                params![Self::address_key(address)],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    pub fn insert(&self, record: &BalanceRecord) -> Result<()> {
        self.conn.execute(
            Self::INSERT_BALANCE,
            params![
                Self::address_key(&record.address),
                record.balance_eth,
                record.balance_wei
            ],
        )?;
        Ok(())
    }

    /// Returns the number of rows touched (0 when the address is unknown).
    pub fn update_by_address(&self, record: &BalanceRecord) -> Result<usize> {
        let updated = self.conn.execute(
            Self::UPDATE_BY_ADDRESS,
            params![
                record.balance_eth,
                record.balance_wei,
                Self::address_key(&record.address)
            ],
        )?;
        Ok(updated)
    }

    /// Insert the record if the address is new, otherwise overwrite its balance.
    pub fn upsert(&self, record: &BalanceRecord) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        {
            let repo = BalanceRepository::new(&tx);
            if repo.find_by_address(&record.address)?.is_some() {
                repo.update_by_address(record)?;
            } else {
                repo.insert(record)?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn row_to_record(row: &Row) -> rusqlite::Result<BalanceRecord> {
        let address = Address::from_str(&row.get::<_, String>(0)?).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(BalanceRecord {
            address,
            balance_eth: row.get(1)?,
            balance_wei: row.get(2)?,
        })
    }
}
