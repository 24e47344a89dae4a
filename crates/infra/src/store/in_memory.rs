use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use gudang_auth::User;
use gudang_catalog::Item;
use gudang_core::{ItemCode, RequestId};
use gudang_ledger::LedgerEntry;
use gudang_requests::PendingRequest;

use super::{CatalogStore, LedgerStore, PendingStore, StoreError, UserStore};

/// In-memory catalog table.
///
/// Intended for tests/dev. A `BTreeMap` keeps listings ordered by code.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    rows: RwLock<BTreeMap<ItemCode, Item>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CatalogStore for InMemoryCatalog {
    fn get(&self, code: &ItemCode) -> Result<Option<Item>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        Ok(rows.get(code).cloned())
    }

    fn list(&self) -> Result<Vec<Item>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        Ok(rows.values().cloned().collect())
    }

    fn insert(&self, item: Item) -> Result<(), StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        if rows.contains_key(&item.code) {
            return Err(StoreError::DuplicateKey(item.code.to_string()));
        }
        rows.insert(item.code.clone(), item);
        Ok(())
    }

    fn set_balance(&self, code: &ItemCode, balance: i64) -> Result<(), StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        match rows.get_mut(code) {
            Some(item) => {
                item.balance = balance;
                Ok(())
            }
            None => Err(StoreError::backend(format!("no catalog row for {code}"))),
        }
    }
}

/// In-memory pending queue, preserving submission order.
#[derive(Debug, Default)]
pub struct InMemoryPending {
    rows: RwLock<Vec<PendingRequest>>,
}

impl InMemoryPending {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PendingStore for InMemoryPending {
    fn insert(&self, request: PendingRequest) -> Result<(), StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        rows.push(request);
        Ok(())
    }

    fn get(&self, id: RequestId) -> Result<Option<PendingRequest>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        Ok(rows.iter().find(|r| r.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<PendingRequest>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        Ok(rows.clone())
    }

    fn remove(&self, id: RequestId) -> Result<bool, StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() != before)
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        rows.clear();
        Ok(())
    }
}

/// In-memory append-only history.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    rows: RwLock<Vec<LedgerEntry>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for InMemoryLedger {
    fn append(&self, entry: LedgerEntry) -> Result<(), StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        rows.push(entry);
        Ok(())
    }

    fn all(&self) -> Result<Vec<LedgerEntry>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        Ok(rows.clone())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        rows.clear();
        Ok(())
    }
}

/// In-memory users table.
#[derive(Debug, Default)]
pub struct InMemoryUsers {
    rows: RwLock<HashMap<String, User>>,
}

impl InMemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for InMemoryUsers {
    fn get(&self, username: &str) -> Result<Option<User>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        Ok(rows.get(username).cloned())
    }

    fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        Ok(rows.values().cloned().collect())
    }

    fn insert(&self, user: User) -> Result<(), StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        if rows.contains_key(&user.username) {
            return Err(StoreError::DuplicateKey(user.username));
        }
        rows.insert(user.username.clone(), user);
        Ok(())
    }
}
