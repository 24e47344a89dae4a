//! Application service over the four tables: catalog management, request
//! submission, pending queue access, history, reset.
//!
//! Batch approval/rejection lives in [`crate::approval`]; it is implemented
//! on this same service so every balance mutation goes through one lock
//! registry.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use gudang_catalog::Item;
use gudang_core::{
    AttachmentRef, ItemCode, RequestId, SessionContext, StockError, StockResult,
};
use gudang_ledger::LedgerEntry;
use gudang_requests::{PendingRequest, TransactionType};

use crate::export::CatalogRow;
use crate::locks::ItemLockRegistry;
use crate::store::{
    CatalogStore, InMemoryCatalog, InMemoryLedger, InMemoryPending, LedgerStore, PendingStore,
};

/// Draft of an IN receipt, as collected by the intake boundary.
#[derive(Debug, Clone)]
pub struct StockInDraft {
    pub item_code: ItemCode,
    pub quantity: i64,
    pub delivery_reference: String,
    pub attachment: AttachmentRef,
}

/// Draft of an OUT issue.
#[derive(Debug, Clone)]
pub struct StockOutDraft {
    pub item_code: ItemCode,
    pub quantity: i64,
    pub transaction_type: TransactionType,
    pub event: String,
}

/// Draft of a RETURN give-back.
#[derive(Debug, Clone)]
pub struct StockReturnDraft {
    pub item_code: ItemCode,
    pub quantity: i64,
    pub event: String,
}

/// Outcome of a bulk catalog upload: applied rows and per-row skip reasons.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct BulkReport {
    pub added: usize,
    pub skipped: Vec<String>,
}

/// The stock application service.
pub struct StockService {
    pub(crate) catalog: Arc<dyn CatalogStore>,
    pub(crate) pending: Arc<dyn PendingStore>,
    pub(crate) ledger: Arc<dyn LedgerStore>,
    pub(crate) locks: ItemLockRegistry,
}

impl StockService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        pending: Arc<dyn PendingStore>,
        ledger: Arc<dyn LedgerStore>,
    ) -> Self {
        Self {
            catalog,
            pending,
            ledger,
            locks: ItemLockRegistry::new(),
        }
    }

    /// Service backed entirely by in-memory tables (tests/dev).
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryCatalog::new()),
            Arc::new(InMemoryPending::new()),
            Arc::new(InMemoryLedger::new()),
        )
    }

    // ── Master catalog ──────────────────────────────────────────────────

    /// Create a master item and its ADD_ITEM ledger row.
    ///
    /// Creation and the ledger append run under the item lock, so the row
    /// and its opening history entry appear together.
    pub fn add_item(
        &self,
        session: &SessionContext,
        code: &str,
        name: &str,
        unit: &str,
        category: &str,
        initial_qty: i64,
        now: DateTime<Utc>,
    ) -> StockResult<Item> {
        session.require_admin()?;

        let code = ItemCode::from_str(code)?;
        let item = Item::new(code.clone(), name, unit, category, initial_qty)?;

        let item_lock = self.locks.lock_for(&code);
        let _held = item_lock.lock().unwrap_or_else(|e| e.into_inner());

        if self.catalog.get(&code)?.is_some() {
            return Err(StockError::duplicate_code(code.to_string()));
        }
        self.catalog.insert(item.clone())?;
        self.ledger
            .append(LedgerEntry::add_item(&item, session.username(), now))?;

        info!(code = %item.code, initial_qty, "catalog item added");
        Ok(item)
    }

    /// Apply a bulk upload row-by-row with the same rules as a manual add.
    /// Bad rows are reported and skipped; good rows are applied.
    pub fn bulk_add_items(
        &self,
        session: &SessionContext,
        rows: Vec<CatalogRow>,
        now: DateTime<Utc>,
    ) -> StockResult<BulkReport> {
        session.require_admin()?;

        let mut report = BulkReport::default();
        for row in rows {
            match self.add_item(
                session,
                &row.code,
                &row.name,
                &row.unit,
                &row.category,
                row.quantity,
                now,
            ) {
                Ok(_) => report.added += 1,
                // Unauthorized cannot happen past the check above; anything
                // else is a per-row condition worth reporting.
                Err(err) => report.skipped.push(format!("row {}: {err}", row.line)),
            }
        }
        Ok(report)
    }

    pub fn item(&self, code: &ItemCode) -> StockResult<Item> {
        self.catalog.get(code)?.ok_or(StockError::NotFound)
    }

    /// Catalog listing with the category filter and name/code search the
    /// stock screens offer.
    pub fn list_items(
        &self,
        category: Option<&str>,
        query: Option<&str>,
    ) -> StockResult<Vec<Item>> {
        let mut items = self.catalog.list()?;
        if let Some(category) = category {
            items.retain(|i| i.category.eq_ignore_ascii_case(category));
        }
        if let Some(query) = query {
            let query = query.trim();
            if !query.is_empty() {
                items.retain(|i| i.matches_query(query));
            }
        }
        Ok(items)
    }

    // ── Pending queue ───────────────────────────────────────────────────

    /// Submit an IN receipt request.
    pub fn submit_in(
        &self,
        session: &SessionContext,
        draft: StockInDraft,
        now: DateTime<Utc>,
    ) -> StockResult<RequestId> {
        let item = self.item(&draft.item_code)?;
        let request = PendingRequest::stock_in(
            item.code.clone(),
            item.name.clone(),
            draft.quantity,
            item.unit.clone(),
            draft.delivery_reference,
            draft.attachment,
            session,
            now,
        )?;
        self.enqueue(request)
    }

    /// Submit an OUT issue request.
    ///
    /// An item with nothing on hand cannot be requested out; the
    /// authoritative balance check still happens at approval time.
    pub fn submit_out(
        &self,
        session: &SessionContext,
        draft: StockOutDraft,
        now: DateTime<Utc>,
    ) -> StockResult<RequestId> {
        let item = self.item(&draft.item_code)?;
        if item.balance == 0 {
            return Err(StockError::insufficient(draft.quantity, 0));
        }
        let request = PendingRequest::stock_out(
            item.code.clone(),
            item.name.clone(),
            draft.quantity,
            item.unit.clone(),
            draft.transaction_type,
            draft.event,
            session,
            now,
        )?;
        self.enqueue(request)
    }

    /// Submit a RETURN request.
    pub fn submit_return(
        &self,
        session: &SessionContext,
        draft: StockReturnDraft,
        now: DateTime<Utc>,
    ) -> StockResult<RequestId> {
        let item = self.item(&draft.item_code)?;
        let request = PendingRequest::stock_return(
            item.code.clone(),
            item.name.clone(),
            draft.quantity,
            item.unit.clone(),
            draft.event,
            session,
            now,
        )?;
        self.enqueue(request)
    }

    fn enqueue(&self, request: PendingRequest) -> StockResult<RequestId> {
        let id = request.id;
        info!(
            request = %id,
            kind = request.kind().as_str(),
            item = %request.item_code,
            qty = request.quantity,
            "movement request submitted"
        );
        self.pending.insert(request)?;
        Ok(id)
    }

    /// Current pending queue, in submission order.
    ///
    /// The sequence is finite and restartable: every call re-reads the store,
    /// so iterating again after approvals reflects the new state.
    pub fn list_pending(&self) -> StockResult<impl Iterator<Item = PendingRequest> + use<>> {
        Ok(self.pending.list()?.into_iter())
    }

    // ── History & reset ─────────────────────────────────────────────────

    /// Full history in append order.
    pub fn history(&self) -> StockResult<Vec<LedgerEntry>> {
        Ok(self.ledger.all()?)
    }

    /// Clear movement data (pending queue + history). Master items and users
    /// survive a reset.
    pub fn reset_movements(&self, session: &SessionContext) -> StockResult<()> {
        session.require_admin()?;
        self.pending.clear()?;
        self.ledger.clear()?;
        warn!(actor = session.username(), "movement data reset");
        Ok(())
    }
}
