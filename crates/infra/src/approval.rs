//! Batch approval/rejection: the state machine that turns a pending request
//! into a durable balance change plus a history row.
//!
//! States per request: `PENDING -> {APPROVED, REJECTED}`, both terminal.
//!
//! ## Execution model
//!
//! A batch is a *sequence of independent atomic steps*, not one transaction.
//! Each id's lookup-validate-mutate-append-remove sequence runs under that
//! item's lock from the registry, which serializes balance mutations per
//! item across concurrent approvers. The batch itself never aborts on a
//! per-id condition: missing requests, orphaned requests, and insufficient
//! stock all become per-id outcomes, and processing continues with the next
//! id. Only a storage failure stops a batch early.
//!
//! ## Idempotency
//!
//! A request that is gone by the time its id is processed was decided by a
//! concurrent (or retried) batch. That is reported as `AlreadyProcessed` and
//! treated as success: re-submitting the same approval batch changes each
//! balance exactly once.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use gudang_core::{ItemCode, RequestId, SessionContext, StockError, StockResult};
use gudang_ledger::LedgerEntry;

use crate::service::StockService;

/// Terminal outcome of one id within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchStatus {
    /// Balance mutated, APPROVE_* row appended.
    Approved {
        item_code: ItemCode,
        resulting_balance: i64,
    },
    /// REJECT_* row appended by an explicit reject batch.
    Rejected { item_code: ItemCode },
    /// OUT quantity exceeded the balance at approval time; converted into an
    /// automatic rejection.
    RejectedInsufficientStock {
        item_code: ItemCode,
        requested: i64,
        available: i64,
    },
    /// The request was already decided by a concurrent or retried batch.
    AlreadyProcessed,
    /// The request references an item the catalog no longer knows.
    /// Reported as a data-integrity warning and skipped.
    Orphaned { item_code: ItemCode },
}

/// Per-id result, returned in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub request_id: RequestId,
    #[serde(flatten)]
    pub status: BatchStatus,
}

impl StockService {
    /// Approve a batch of pending requests.
    pub fn approve_batch(
        &self,
        session: &SessionContext,
        ids: &[RequestId],
        now: DateTime<Utc>,
    ) -> StockResult<Vec<BatchResult>> {
        session.require_admin()?;

        let mut results = Vec::with_capacity(ids.len());
        for &id in ids {
            let status = self.approve_one(session, id, now)?;
            results.push(BatchResult {
                request_id: id,
                status,
            });
        }
        Ok(results)
    }

    fn approve_one(
        &self,
        session: &SessionContext,
        id: RequestId,
        now: DateTime<Utc>,
    ) -> StockResult<BatchStatus> {
        // First read is only to learn which item lock to take.
        let Some(request) = self.pending.get(id)? else {
            return Ok(BatchStatus::AlreadyProcessed);
        };

        let item_lock = self.locks.lock_for(&request.item_code);
        let _held = item_lock.lock().unwrap_or_else(|e| e.into_inner());

        // Re-read under the lock: a concurrent batch may have decided this
        // request between the first read and lock acquisition.
        let Some(request) = self.pending.get(id)? else {
            return Ok(BatchStatus::AlreadyProcessed);
        };

        let Some(item) = self.catalog.get(&request.item_code)? else {
            warn!(
                request = %id,
                item = %request.item_code,
                "pending request references a missing catalog item"
            );
            return Ok(BatchStatus::Orphaned {
                item_code: request.item_code,
            });
        };

        match item.adjusted(request.signed_quantity()) {
            Ok(resulting_balance) => {
                self.catalog.set_balance(&item.code, resulting_balance)?;
                self.ledger
                    .append(LedgerEntry::approved(&request, resulting_balance, now))?;
                self.pending.remove(id)?;

                info!(
                    request = %id,
                    kind = request.kind().as_str(),
                    item = %item.code,
                    qty = request.quantity,
                    balance = resulting_balance,
                    approver = session.username(),
                    "request approved"
                );
                Ok(BatchStatus::Approved {
                    item_code: item.code,
                    resulting_balance,
                })
            }
            Err(StockError::InsufficientStock {
                requested,
                available,
            }) => {
                // Partial failure never aborts the batch: this id becomes an
                // automatic rejection and the loop moves on.
                self.ledger.append(LedgerEntry::rejected(&request, now))?;
                self.pending.remove(id)?;

                info!(
                    request = %id,
                    item = %item.code,
                    requested,
                    available,
                    "request auto-rejected for insufficient stock"
                );
                Ok(BatchStatus::RejectedInsufficientStock {
                    item_code: item.code,
                    requested,
                    available,
                })
            }
            Err(other) => Err(other),
        }
    }

    /// Reject a batch of pending requests.
    ///
    /// Rejection is idempotent and always terminal: any selected row that
    /// still exists is rejected, and a row that is already gone reports
    /// `AlreadyProcessed`. Nothing here validates balances.
    pub fn reject_batch(
        &self,
        session: &SessionContext,
        ids: &[RequestId],
        now: DateTime<Utc>,
    ) -> StockResult<Vec<BatchResult>> {
        session.require_admin()?;

        let mut results = Vec::with_capacity(ids.len());
        for &id in ids {
            let status = self.reject_one(session, id, now)?;
            results.push(BatchResult {
                request_id: id,
                status,
            });
        }
        Ok(results)
    }

    fn reject_one(
        &self,
        session: &SessionContext,
        id: RequestId,
        now: DateTime<Utc>,
    ) -> StockResult<BatchStatus> {
        let Some(request) = self.pending.get(id)? else {
            return Ok(BatchStatus::AlreadyProcessed);
        };

        // Rejection touches no balance, but runs under the item lock anyway
        // so an approve and a reject of the same id cannot interleave and
        // write two terminal rows.
        let item_lock = self.locks.lock_for(&request.item_code);
        let _held = item_lock.lock().unwrap_or_else(|e| e.into_inner());

        let Some(request) = self.pending.get(id)? else {
            return Ok(BatchStatus::AlreadyProcessed);
        };

        self.ledger.append(LedgerEntry::rejected(&request, now))?;
        self.pending.remove(id)?;

        info!(
            request = %id,
            kind = request.kind().as_str(),
            item = %request.item_code,
            approver = session.username(),
            "request rejected"
        );
        Ok(BatchStatus::Rejected {
            item_code: request.item_code,
        })
    }
}
