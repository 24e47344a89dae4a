//! `gudang-ledger` — append-only movement history.

pub mod entry;

pub use entry::{LedgerAction, LedgerEntry};
