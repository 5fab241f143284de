//! redb-backed cart storage
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `carts` | session key | `Vec<CartLine>` (JSON) | Cart snapshot per session |
//!
//! redb commits with `Durability::Immediate`, so a snapshot survives
//! process restarts as soon as `save` returns.

use super::storage::{CartEvent, CartStorage, EVENT_CHANNEL_CAPACITY};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use shared::models::CartLine;
use shared::{AppError, AppResult};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

/// Cart snapshots: key = session key, value = JSON-serialized Vec<CartLine>
const CARTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("carts");

#[derive(Debug, Error)]
pub enum CartStorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<CartStorageError> for AppError {
    fn from(err: CartStorageError) -> Self {
        AppError::storage(err.to_string())
    }
}

/// Durable cart storage backed by redb
#[derive(Clone)]
pub struct RedbCartStorage {
    db: Arc<Database>,
    events: broadcast::Sender<CartEvent>,
}

impl RedbCartStorage {
    /// Open or create the cart database at the given path
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let db = Self::init(Database::create(path).map_err(CartStorageError::from)?)?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> AppResult<Self> {
        let db = Database::builder()
            .create_with_backend(redb::backends::InMemoryBackend::new())
            .map_err(CartStorageError::from)?;
        Self::init(db)
    }

    fn init(db: Database) -> AppResult<Self> {
        let result: Result<(), CartStorageError> = (|| {
            let txn = db.begin_write()?;
            {
                let _ = txn.open_table(CARTS_TABLE)?;
            }
            txn.commit()?;
            Ok(())
        })();
        result?;

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            db: Arc::new(db),
            events,
        })
    }

    fn read_snapshot(&self, key: &str) -> Result<Vec<CartLine>, CartStorageError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CARTS_TABLE)?;

        match table.get(key)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Ok(Vec::new()),
        }
    }

    fn write_snapshot(&self, key: &str, lines: &[CartLine]) -> Result<(), CartStorageError> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(CARTS_TABLE)?;
            let value = serde_json::to_vec(lines)?;
            table.insert(key, value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }
}

impl CartStorage for RedbCartStorage {
    fn load(&self, key: &str) -> AppResult<Vec<CartLine>> {
        Ok(self.read_snapshot(key)?)
    }

    fn save(&self, key: &str, lines: &[CartLine]) -> AppResult<()> {
        self.write_snapshot(key, lines)?;

        let _ = self.events.send(CartEvent {
            key: key.to_string(),
            lines: lines.to_vec(),
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_roundtrip() {
        let storage = RedbCartStorage::open_in_memory().unwrap();

        let mut line = CartLine::new("p1", "Tote Bag", 100.0);
        line.quantity = 3;
        storage.save("s1", &[line]).unwrap();

        let loaded = storage.load("s1").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].quantity, 3);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let storage = RedbCartStorage::open_in_memory().unwrap();

        storage
            .save("s1", &[CartLine::new("p1", "Tote Bag", 100.0)])
            .unwrap();

        assert!(storage.load("s2").unwrap().is_empty());
    }

    #[test]
    fn test_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carts.redb");

        {
            let storage = RedbCartStorage::open(&path).unwrap();
            storage
                .save("s1", &[CartLine::new("p1", "Tote Bag", 100.0)])
                .unwrap();
        }

        let storage = RedbCartStorage::open(&path).unwrap();
        let loaded = storage.load("s1").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].product_id, "p1");
    }
}
