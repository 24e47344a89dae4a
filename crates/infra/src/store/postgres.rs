//! Postgres-backed implementation of the four logical tables.
//!
//! Items and users are typed columns; pending requests and history rows are
//! stored as JSONB payloads next to their key columns, since the core only
//! ever reads them back whole. The store traits are synchronous, so each
//! call bridges onto the ambient tokio runtime the same way the rest of the
//! workspace does when it needs async IO behind a sync seam.

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use sqlx::{PgPool, Row};

use gudang_auth::User;
use gudang_catalog::Item;
use gudang_core::{ItemCode, RequestId, Role};
use gudang_ledger::LedgerEntry;
use gudang_requests::PendingRequest;

use super::{CatalogStore, LedgerStore, PendingStore, StoreError, UserStore};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS items (
    code     TEXT PRIMARY KEY,
    name     TEXT NOT NULL,
    unit     TEXT NOT NULL,
    category TEXT NOT NULL,
    balance  BIGINT NOT NULL CHECK (balance >= 0)
);

CREATE TABLE IF NOT EXISTS pending_requests (
    id         UUID PRIMARY KEY,
    created_at TIMESTAMPTZ NOT NULL,
    payload    JSONB NOT NULL
);

CREATE TABLE IF NOT EXISTS history (
    seq         BIGSERIAL PRIMARY KEY,
    recorded_at TIMESTAMPTZ NOT NULL,
    payload     JSONB NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    username TEXT PRIMARY KEY,
    password TEXT NOT NULL,
    role     TEXT NOT NULL
);
"#;

/// One connection pool serving all four tables.
#[derive(Debug, Clone)]
pub struct PostgresTables {
    pool: Arc<PgPool>,
}

impl PostgresTables {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect and create any missing tables.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| StoreError::backend(format!("connect: {e}")))?;
        let tables = Self::new(pool);
        tables.ensure_schema().await?;
        Ok(tables)
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA.split(';').filter(|s| !s.trim().is_empty()) {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| StoreError::backend(format!("schema: {e}")))?;
        }
        Ok(())
    }

    /// Run an async store operation from the synchronous trait surface.
    ///
    /// Requires an ambient tokio runtime (the API binary provides one).
    fn bridge<T>(
        &self,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| {
            StoreError::backend("PostgresTables requires a tokio runtime context")
        })?;
        handle.block_on(fut)
    }
}

fn map_sqlx(context: &str, err: sqlx::Error, key: &str) -> StoreError {
    if err
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation())
    {
        return StoreError::DuplicateKey(key.to_string());
    }
    StoreError::backend(format!("{context}: {err}"))
}

impl CatalogStore for PostgresTables {
    fn get(&self, code: &ItemCode) -> Result<Option<Item>, StoreError> {
        self.bridge(async {
            let row = sqlx::query(
                "SELECT code, name, unit, category, balance FROM items WHERE code = $1",
            )
            .bind(code.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| StoreError::backend(format!("items.get: {e}")))?;

            row.map(item_from_row).transpose()
        })
    }

    fn list(&self) -> Result<Vec<Item>, StoreError> {
        self.bridge(async {
            let rows = sqlx::query(
                "SELECT code, name, unit, category, balance FROM items ORDER BY code",
            )
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| StoreError::backend(format!("items.list: {e}")))?;

            rows.into_iter().map(item_from_row).collect()
        })
    }

    fn insert(&self, item: Item) -> Result<(), StoreError> {
        self.bridge(async {
            sqlx::query(
                "INSERT INTO items (code, name, unit, category, balance) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(item.code.as_str())
            .bind(&item.name)
            .bind(&item.unit)
            .bind(&item.category)
            .bind(item.balance)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx("items.insert", e, item.code.as_str()))?;
            Ok(())
        })
    }

    fn set_balance(&self, code: &ItemCode, balance: i64) -> Result<(), StoreError> {
        self.bridge(async {
            let result = sqlx::query("UPDATE items SET balance = $2 WHERE code = $1")
                .bind(code.as_str())
                .bind(balance)
                .execute(&*self.pool)
                .await
                .map_err(|e| StoreError::backend(format!("items.set_balance: {e}")))?;

            if result.rows_affected() == 0 {
                return Err(StoreError::backend(format!("no catalog row for {code}")));
            }
            Ok(())
        })
    }
}

fn item_from_row(row: sqlx::postgres::PgRow) -> Result<Item, StoreError> {
    let code: String = row
        .try_get("code")
        .map_err(|e| StoreError::backend(format!("items.code: {e}")))?;
    let code = ItemCode::from_str(&code)
        .map_err(|e| StoreError::backend(format!("items.code: {e}")))?;

    Ok(Item {
        code,
        name: row
            .try_get("name")
            .map_err(|e| StoreError::backend(format!("items.name: {e}")))?,
        unit: row
            .try_get("unit")
            .map_err(|e| StoreError::backend(format!("items.unit: {e}")))?,
        category: row
            .try_get("category")
            .map_err(|e| StoreError::backend(format!("items.category: {e}")))?,
        balance: row
            .try_get("balance")
            .map_err(|e| StoreError::backend(format!("items.balance: {e}")))?,
    })
}

impl PendingStore for PostgresTables {
    fn insert(&self, request: PendingRequest) -> Result<(), StoreError> {
        self.bridge(async {
            let payload = serde_json::to_value(&request)
                .map_err(|e| StoreError::backend(format!("pending.encode: {e}")))?;
            sqlx::query(
                "INSERT INTO pending_requests (id, created_at, payload) VALUES ($1, $2, $3)",
            )
            .bind(*request.id.as_uuid())
            .bind(request.created_at)
            .bind(payload)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx("pending.insert", e, &request.id.to_string()))?;
            Ok(())
        })
    }

    fn get(&self, id: RequestId) -> Result<Option<PendingRequest>, StoreError> {
        self.bridge(async {
            let row = sqlx::query("SELECT payload FROM pending_requests WHERE id = $1")
                .bind(*id.as_uuid())
                .fetch_optional(&*self.pool)
                .await
                .map_err(|e| StoreError::backend(format!("pending.get: {e}")))?;

            row.map(|r| pending_from_row(&r)).transpose()
        })
    }

    fn list(&self) -> Result<Vec<PendingRequest>, StoreError> {
        self.bridge(async {
            let rows =
                sqlx::query("SELECT payload FROM pending_requests ORDER BY created_at, id")
                    .fetch_all(&*self.pool)
                    .await
                    .map_err(|e| StoreError::backend(format!("pending.list: {e}")))?;

            rows.iter().map(pending_from_row).collect()
        })
    }

    fn remove(&self, id: RequestId) -> Result<bool, StoreError> {
        self.bridge(async {
            let result = sqlx::query("DELETE FROM pending_requests WHERE id = $1")
                .bind(*id.as_uuid())
                .execute(&*self.pool)
                .await
                .map_err(|e| StoreError::backend(format!("pending.remove: {e}")))?;
            Ok(result.rows_affected() > 0)
        })
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.bridge(async {
            sqlx::query("DELETE FROM pending_requests")
                .execute(&*self.pool)
                .await
                .map_err(|e| StoreError::backend(format!("pending.clear: {e}")))?;
            Ok(())
        })
    }
}

fn pending_from_row(row: &sqlx::postgres::PgRow) -> Result<PendingRequest, StoreError> {
    let payload: serde_json::Value = row
        .try_get("payload")
        .map_err(|e| StoreError::backend(format!("pending.payload: {e}")))?;
    serde_json::from_value(payload)
        .map_err(|e| StoreError::backend(format!("pending.decode: {e}")))
}

impl LedgerStore for PostgresTables {
    fn append(&self, entry: LedgerEntry) -> Result<(), StoreError> {
        self.bridge(async {
            let payload = serde_json::to_value(&entry)
                .map_err(|e| StoreError::backend(format!("history.encode: {e}")))?;
            sqlx::query("INSERT INTO history (recorded_at, payload) VALUES ($1, $2)")
                .bind(entry.recorded_at)
                .bind(payload)
                .execute(&*self.pool)
                .await
                .map_err(|e| StoreError::backend(format!("history.append: {e}")))?;
            Ok(())
        })
    }

    fn all(&self) -> Result<Vec<LedgerEntry>, StoreError> {
        self.bridge(async {
            let rows = sqlx::query("SELECT payload FROM history ORDER BY seq")
                .fetch_all(&*self.pool)
                .await
                .map_err(|e| StoreError::backend(format!("history.all: {e}")))?;

            rows.iter()
                .map(|r| {
                    let payload: serde_json::Value = r
                        .try_get("payload")
                        .map_err(|e| StoreError::backend(format!("history.payload: {e}")))?;
                    serde_json::from_value(payload)
                        .map_err(|e| StoreError::backend(format!("history.decode: {e}")))
                })
                .collect()
        })
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.bridge(async {
            sqlx::query("DELETE FROM history")
                .execute(&*self.pool)
                .await
                .map_err(|e| StoreError::backend(format!("history.clear: {e}")))?;
            Ok(())
        })
    }
}

impl UserStore for PostgresTables {
    fn get(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.bridge(async {
            let row = sqlx::query("SELECT username, password, role FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&*self.pool)
                .await
                .map_err(|e| StoreError::backend(format!("users.get: {e}")))?;

            row.map(user_from_row).transpose()
        })
    }

    fn list(&self) -> Result<Vec<User>, StoreError> {
        self.bridge(async {
            let rows = sqlx::query("SELECT username, password, role FROM users ORDER BY username")
                .fetch_all(&*self.pool)
                .await
                .map_err(|e| StoreError::backend(format!("users.list: {e}")))?;

            rows.into_iter().map(user_from_row).collect()
        })
    }

    fn insert(&self, user: User) -> Result<(), StoreError> {
        self.bridge(async {
            sqlx::query("INSERT INTO users (username, password, role) VALUES ($1, $2, $3)")
                .bind(&user.username)
                .bind(&user.password)
                .bind(user.role.as_str())
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx("users.insert", e, &user.username))?;
            Ok(())
        })
    }
}

fn user_from_row(row: sqlx::postgres::PgRow) -> Result<User, StoreError> {
    let role: String = row
        .try_get("role")
        .map_err(|e| StoreError::backend(format!("users.role: {e}")))?;
    let role = Role::from_str(&role)
        .map_err(|e| StoreError::backend(format!("users.role: {e}")))?;

    Ok(User {
        username: row
            .try_get("username")
            .map_err(|e| StoreError::backend(format!("users.username: {e}")))?,
        password: row
            .try_get("password")
            .map_err(|e| StoreError::backend(format!("users.password: {e}")))?,
        role,
    })
}
