//! Storage layer for one pack's codes.
//!
//! Wraps a redb database holding a single table, `Code -> KeyStatus`.

use crate::core::key_store::error::KeyStoreError;
use crate::types::config::layout;
use crate::types::{Code, KeyRecord, KeyStatus};
use redb::{ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;

pub mod error {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum KeyStoreError {
        #[error("Database error: {0}")]
        Redb(#[from] redb::DatabaseError),

        #[error("Table error: {0}")]
        TableError(#[from] redb::TableError),

        #[error("Storage error: {0}")]
        StorageError(#[from] redb::StorageError),

        #[error("Transaction error: {0}")]
        TransactionError(#[from] redb::TransactionError),

        #[error("Commit error: {0}")]
        CommitError(#[from] redb::CommitError),

        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),

        #[error("Key store already exists")]
        AlreadyExists,
    }
}

/// Code table: Code → KeyStatus
const KEYS_TABLE: TableDefinition<Code, KeyStatus> = TableDefinition::new("keys");

/// Result of a redemption attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redemption {
    /// The code was Ready and is now Used.
    Redeemed,
    AlreadyUsed,
    NotFound,
}

#[derive(Debug)]
pub struct KeyStore {
    db: redb::Database,
}

impl KeyStore {
    /// Creates a new, empty key store in `dir`.
    ///
    /// Fails with [`KeyStoreError::AlreadyExists`] if `dir` already holds one.
    pub fn create(dir: &Path) -> Result<Self, KeyStoreError> {
        let path = layout::key_store_path(dir);
        if path.exists() {
            return Err(KeyStoreError::AlreadyExists);
        }
        Self::open_at(&path)
    }

    /// Opens the key store in `dir`, creating the table if it is missing.
    pub fn open(dir: &Path) -> Result<Self, KeyStoreError> {
        let path = layout::key_store_path(dir);
        if !path.is_file() {
            return Err(KeyStoreError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )));
        }
        Self::open_at(&path)
    }

    fn open_at(path: &Path) -> Result<Self, KeyStoreError> {
        let db = redb::Database::create(path)?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(KEYS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }
}

/// Read operations.
impl KeyStore {
    pub fn get(&self, code: &Code) -> Result<Option<KeyStatus>, KeyStoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(KEYS_TABLE)?;
        let status = table.get(code)?.map(|guard| guard.value());
        Ok(status)
    }

    /// Returns every code with its status, in code order.
    pub fn records(&self) -> Result<Vec<KeyRecord>, KeyStoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(KEYS_TABLE)?;

        let mut records = Vec::new();
        for entry in table.iter()? {
            let (code, status) = entry?;
            records.push(KeyRecord {
                key: code.value(),
                status: status.value(),
            });
        }

        Ok(records)
    }

    /// Number of codes in the store.
    pub fn len(&self) -> Result<u64, KeyStoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(KEYS_TABLE)?;
        let len = table.len()?;
        Ok(len)
    }
}

/// Write operations.
impl KeyStore {
    /// Stores every code as Ready in a single transaction.
    pub fn write_batch<'a>(
        &self,
        codes: impl IntoIterator<Item = &'a Code>,
    ) -> Result<(), KeyStoreError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(KEYS_TABLE)?;
            for code in codes {
                table.insert(code, KeyStatus::Ready)?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Marks `code` as Used if it is Ready.
    ///
    /// The lookup and the update run in one write transaction. redb admits a
    /// single writer at a time, so two redemptions of the same code cannot
    /// both observe it as Ready.
    pub fn redeem(&self, code: &Code) -> Result<Redemption, KeyStoreError> {
        let write_txn = self.db.begin_write()?;
        let outcome = {
            let mut table = write_txn.open_table(KEYS_TABLE)?;
            let status = table.get(code)?.map(|guard| guard.value());
            match status {
                None => Redemption::NotFound,
                Some(KeyStatus::Used) => Redemption::AlreadyUsed,
                Some(KeyStatus::Ready) => {
                    table.insert(code, KeyStatus::Used)?;
                    Redemption::Redeemed
                }
            }
        };

        if outcome == Redemption::Redeemed {
            write_txn.commit()?;
        } else {
            write_txn.abort()?;
        }
        Ok(outcome)
    }
}
