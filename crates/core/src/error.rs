//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type StockResult<T> = Result<T, StockError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures. Nothing in
/// this taxonomy is fatal to the process: the worst failure mode anywhere in
/// the system is an individual rejected request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockError {
    /// A required field is missing or a value failed validation. Returned to
    /// the submission boundary for the caller to correct and resubmit.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Catalog add with an item code that already exists.
    #[error("item code already exists: {0}")]
    DuplicateCode(String),

    /// A referenced item or request vanished. Benign during batch
    /// processing; logged and skipped.
    #[error("not found")]
    NotFound,

    /// An OUT movement would drive the balance negative. Converted into an
    /// automatic rejection during approval, never surfaced as a crash.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    /// Orphaned request, or a ledger/balance mismatch detected on replay.
    /// Reported, not fatal.
    #[error("data integrity: {0}")]
    DataIntegrity(String),

    /// The backing store failed (connectivity, serialization, ...).
    #[error("storage error: {0}")]
    Storage(String),

    /// The session is not allowed to perform the operation.
    #[error("unauthorized")]
    Unauthorized,
}

impl StockError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn duplicate_code(code: impl Into<String>) -> Self {
        Self::DuplicateCode(code.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn insufficient(requested: i64, available: i64) -> Self {
        Self::InsufficientStock {
            requested,
            available,
        }
    }

    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::DataIntegrity(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}
