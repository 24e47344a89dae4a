//! `gudang-requests` — pending movement request domain.

pub mod request;

pub use request::{MovementKind, PendingRequest, RequestDetails, TransactionType};
