use std::sync::Arc;

use gudang_auth::User;
use gudang_core::Role;
use gudang_infra::{
    AttachmentStore, FsAttachmentStore, InMemoryCatalog, InMemoryLedger, InMemoryPending,
    InMemoryUsers, PostgresTables, StockService, UserStore,
};

/// Shared handles behind every handler.
pub struct AppServices {
    pub stock: Arc<StockService>,
    pub users: Arc<dyn UserStore>,
    pub attachments: Arc<dyn AttachmentStore>,
    pub sessions: Arc<crate::sessions::SessionRegistry>,
}

/// Wire storage from the environment.
///
/// With `DATABASE_URL` set, all four tables live in Postgres; otherwise
/// everything is in-memory (dev mode — data dies with the process).
/// Attachments go under `GUDANG_UPLOAD_DIR` (default `uploads`).
pub async fn build_services() -> anyhow::Result<AppServices> {
    let upload_dir =
        std::env::var("GUDANG_UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
    let attachments: Arc<dyn AttachmentStore> = Arc::new(FsAttachmentStore::new(upload_dir)?);

    let (stock, users): (StockService, Arc<dyn UserStore>) = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let tables = PostgresTables::connect(&url).await?;
            tracing::info!("using postgres-backed tables");
            (
                StockService::new(
                    Arc::new(tables.clone()),
                    Arc::new(tables.clone()),
                    Arc::new(tables.clone()),
                ),
                Arc::new(tables),
            )
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; using in-memory tables");
            (
                StockService::new(
                    Arc::new(InMemoryCatalog::new()),
                    Arc::new(InMemoryPending::new()),
                    Arc::new(InMemoryLedger::new()),
                ),
                Arc::new(InMemoryUsers::new()),
            )
        }
    };

    seed_default_admin(users.as_ref())?;

    Ok(AppServices {
        stock: Arc::new(stock),
        users,
        attachments,
        sessions: Arc::new(crate::sessions::SessionRegistry::new()),
    })
}

/// A fresh deployment has no users and would be unusable; provision the
/// documented dev credential and warn loudly.
fn seed_default_admin(users: &dyn UserStore) -> anyhow::Result<()> {
    if users.list()?.is_empty() {
        tracing::warn!("users table is empty; seeding default admin/admin credential");
        users.insert(User::new("admin", "admin", Role::Admin))?;
    }
    Ok(())
}
