use anyhow::{Context, Result};
use rusqlite::Connection;

pub struct Database {
    pub conn: Connection,
}

impl Database {
    pub fn new(db_path: &str) -> Result<Self> {
        let db_path = db_path.strip_prefix("sqlite:").unwrap_or(db_path);
        let conn = Connection::open(db_path).context("Failed to open database")?;

        let db = Database { conn };
        db.create_tables()?;
        Ok(db)
    }

    pub fn in_memory() -> Result<Self> {
        Self::new(":memory:")
    }

    fn create_tables(&self) -> Result<()> {
        // Latest known balance per address, no history
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS balances (
                address TEXT PRIMARY KEY,
                balance_eth REAL NOT NULL,
                balance_wei TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }
}
