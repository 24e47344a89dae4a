//! Row storage for the four logical tables: items, pending_requests,
//! history, users.
//!
//! The core treats storage as synchronous row access with no transaction
//! guarantees assumed; atomicity of the approve sequence comes from the
//! per-item lock registry, not from the store.

use thiserror::Error;

use gudang_auth::User;
use gudang_catalog::Item;
use gudang_core::{ItemCode, RequestId, StockError};
use gudang_ledger::LedgerEntry;
use gudang_requests::PendingRequest;

mod in_memory;
mod postgres;

pub use in_memory::{InMemoryCatalog, InMemoryLedger, InMemoryPending, InMemoryUsers};
pub use postgres::PostgresTables;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Insert with a key that already exists.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// The backend failed (connectivity, serialization, poisoned lock, ...).
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

impl From<StoreError> for StockError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::DuplicateKey(key) => StockError::DuplicateCode(key),
            StoreError::Backend(msg) => StockError::Storage(msg),
        }
    }
}

/// Master catalog rows, keyed by item code.
pub trait CatalogStore: Send + Sync {
    fn get(&self, code: &ItemCode) -> Result<Option<Item>, StoreError>;
    /// All items, ordered by code.
    fn list(&self) -> Result<Vec<Item>, StoreError>;
    /// Fails with `DuplicateKey` when the code exists.
    fn insert(&self, item: Item) -> Result<(), StoreError>;
    /// Overwrite the denormalized balance of an existing row.
    fn set_balance(&self, code: &ItemCode, balance: i64) -> Result<(), StoreError>;
}

/// Not-yet-decided movement requests, in submission order.
pub trait PendingStore: Send + Sync {
    fn insert(&self, request: PendingRequest) -> Result<(), StoreError>;
    fn get(&self, id: RequestId) -> Result<Option<PendingRequest>, StoreError>;
    fn list(&self) -> Result<Vec<PendingRequest>, StoreError>;
    /// Returns `false` when the id was already gone; deliberately not an
    /// error, so a doubly-submitted approval batch stays idempotent.
    fn remove(&self, id: RequestId) -> Result<bool, StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// Append-only history rows, in append order.
pub trait LedgerStore: Send + Sync {
    fn append(&self, entry: LedgerEntry) -> Result<(), StoreError>;
    fn all(&self) -> Result<Vec<LedgerEntry>, StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// Provisioned login users, keyed by username.
pub trait UserStore: Send + Sync {
    fn get(&self, username: &str) -> Result<Option<User>, StoreError>;
    fn list(&self) -> Result<Vec<User>, StoreError>;
    fn insert(&self, user: User) -> Result<(), StoreError>;
}
