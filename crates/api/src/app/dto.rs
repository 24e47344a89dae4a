use serde::Deserialize;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub initial_qty: i64,
}

#[derive(Debug, Deserialize)]
pub struct SubmitInRequest {
    pub item_code: String,
    pub quantity: i64,
    pub delivery_reference: String,
    /// Reference returned by `POST /requests/attachments`.
    pub attachment: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitOutRequest {
    pub item_code: String,
    pub quantity: i64,
    /// "Support" or "Sale".
    pub transaction_type: String,
    pub event: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitReturnRequest {
    pub item_code: String,
    pub quantity: i64,
    #[serde(default)]
    pub event: String,
}

/// Ids selected for one approval/rejection batch.
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    pub category: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    /// Inclusive, `YYYY-MM-DD`.
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub actor: Option<String>,
    /// Exact action label, e.g. `APPROVE_OUT`.
    pub action: Option<String>,
    /// Substring match on the item name.
    pub item: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MonthlyQuery {
    /// "IN", "OUT" or "RETURN".
    pub kind: String,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AttachmentUploadQuery {
    pub filename: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DaysOfCoverQuery {
    /// Trailing window length in days.
    pub window: Option<u32>,
}
