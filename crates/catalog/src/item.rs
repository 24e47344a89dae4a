use serde::{Deserialize, Serialize};

use gudang_core::{ItemCode, StockError, StockResult};

/// One master catalog row.
///
/// Items are never deleted; a movement-data reset clears pending requests and
/// history but leaves the catalog intact. The balance is denormalized state:
/// it is mutated only by the approval engine and must always equal the signed
/// sum of the item's approved ledger quantities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub code: ItemCode,
    pub name: String,
    pub unit: String,
    pub category: String,
    pub balance: i64,
}

impl Item {
    /// Validate and build a new catalog item.
    ///
    /// Blank unit/category fall back to the same placeholders the intake
    /// screens use, so exported rows always have a value in every column.
    pub fn new(
        code: ItemCode,
        name: impl Into<String>,
        unit: impl Into<String>,
        category: impl Into<String>,
        initial_qty: i64,
    ) -> StockResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(StockError::validation("item name cannot be empty"));
        }
        if initial_qty < 0 {
            return Err(StockError::validation("initial quantity cannot be negative"));
        }

        let unit = non_blank_or(unit.into(), "-");
        let category = non_blank_or(category.into(), "Uncategorized");

        Ok(Self {
            code,
            name: name.trim().to_string(),
            unit,
            category,
            balance: initial_qty,
        })
    }

    /// Compute the balance after applying a signed delta.
    ///
    /// Fails with `InsufficientStock` when the result would be negative; the
    /// caller decides whether that converts into a rejection.
    pub fn adjusted(&self, delta: i64) -> StockResult<i64> {
        let next = self.balance + delta;
        if next < 0 {
            return Err(StockError::insufficient(-delta, self.balance));
        }
        Ok(next)
    }

    /// Case-insensitive match against name or code, for the search box.
    pub fn matches_query(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        self.name.to_lowercase().contains(&q) || self.code.as_str().to_lowercase().contains(&q)
    }
}

fn non_blank_or(value: String, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
