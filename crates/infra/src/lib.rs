//! `gudang-infra` — storage backends, the per-item lock registry, and the
//! application services (catalog management + the approval engine).

pub mod approval;
pub mod attachments;
pub mod export;
pub mod locks;
pub mod service;
pub mod store;


pub use approval::{BatchResult, BatchStatus};
pub use attachments::{AttachmentStore, FsAttachmentStore};
pub use locks::ItemLockRegistry;
pub use service::{BulkReport, StockInDraft, StockOutDraft, StockReturnDraft, StockService};
pub use store::{
    CatalogStore, InMemoryCatalog, InMemoryLedger, InMemoryPending, InMemoryUsers, LedgerStore,
    PendingStore, PostgresTables, StoreError, UserStore,
};
