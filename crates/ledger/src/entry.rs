use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use gudang_catalog::Item;
use gudang_core::{AttachmentRef, ItemCode};
use gudang_requests::{MovementKind, PendingRequest, RequestDetails, TransactionType};

/// What a ledger row records.
///
/// The action is fixed at construction; nothing downstream re-derives it
/// from label text.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerAction {
    AddItem,
    ApproveIn,
    ApproveOut,
    ApproveReturn,
    RejectIn,
    RejectOut,
    RejectReturn,
}

impl LedgerAction {
    pub fn approval_of(kind: MovementKind) -> Self {
        match kind {
            MovementKind::In => LedgerAction::ApproveIn,
            MovementKind::Out => LedgerAction::ApproveOut,
            MovementKind::Return => LedgerAction::ApproveReturn,
        }
    }

    pub fn rejection_of(kind: MovementKind) -> Self {
        match kind {
            MovementKind::In => LedgerAction::RejectIn,
            MovementKind::Out => LedgerAction::RejectOut,
            MovementKind::Return => LedgerAction::RejectReturn,
        }
    }

    /// The movement this action decided, if any.
    pub fn movement_kind(self) -> Option<MovementKind> {
        match self {
            LedgerAction::AddItem => None,
            LedgerAction::ApproveIn | LedgerAction::RejectIn => Some(MovementKind::In),
            LedgerAction::ApproveOut | LedgerAction::RejectOut => Some(MovementKind::Out),
            LedgerAction::ApproveReturn | LedgerAction::RejectReturn => Some(MovementKind::Return),
        }
    }

    /// True for actions that changed a balance (ADD_ITEM and APPROVE_*).
    pub fn affects_balance(self) -> bool {
        matches!(
            self,
            LedgerAction::AddItem
                | LedgerAction::ApproveIn
                | LedgerAction::ApproveOut
                | LedgerAction::ApproveReturn
        )
    }

    pub fn is_approval(self) -> bool {
        matches!(
            self,
            LedgerAction::ApproveIn | LedgerAction::ApproveOut | LedgerAction::ApproveReturn
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LedgerAction::AddItem => "ADD_ITEM",
            LedgerAction::ApproveIn => "APPROVE_IN",
            LedgerAction::ApproveOut => "APPROVE_OUT",
            LedgerAction::ApproveReturn => "APPROVE_RETURN",
            LedgerAction::RejectIn => "REJECT_IN",
            LedgerAction::RejectOut => "REJECT_OUT",
            LedgerAction::RejectReturn => "REJECT_RETURN",
        }
    }
}

/// One append-only history row.
///
/// Rows are immutable facts. They are never updated or deleted except by an
/// explicit full movement-data reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub action: LedgerAction,
    pub item_code: ItemCode,
    pub item_name: String,
    pub quantity: i64,
    pub unit: String,
    /// Balance snapshot after the mutation; present for ADD_ITEM and
    /// APPROVE_* rows only.
    pub resulting_balance: Option<i64>,
    pub actor: String,
    pub event: Option<String>,
    pub transaction_type: Option<TransactionType>,
    pub delivery_reference: Option<String>,
    pub attachment: Option<AttachmentRef>,
    /// Business date supplied on the request, when one was given.
    pub effective_date: Option<NaiveDate>,
    pub recorded_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Row appended atomically with a catalog add.
    pub fn add_item(item: &Item, actor: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            action: LedgerAction::AddItem,
            item_code: item.code.clone(),
            item_name: item.name.clone(),
            quantity: item.balance,
            unit: item.unit.clone(),
            resulting_balance: Some(item.balance),
            actor: actor.into(),
            event: None,
            transaction_type: None,
            delivery_reference: None,
            attachment: None,
            effective_date: Some(now.date_naive()),
            recorded_at: now,
        }
    }

    /// Terminal row for an approved request, carrying the balance snapshot.
    pub fn approved(request: &PendingRequest, resulting_balance: i64, now: DateTime<Utc>) -> Self {
        Self::from_request(
            LedgerAction::approval_of(request.kind()),
            request,
            Some(resulting_balance),
            now,
        )
    }

    /// Terminal row for a rejected request. No balance field: nothing moved.
    pub fn rejected(request: &PendingRequest, now: DateTime<Utc>) -> Self {
        Self::from_request(
            LedgerAction::rejection_of(request.kind()),
            request,
            None,
            now,
        )
    }

    fn from_request(
        action: LedgerAction,
        request: &PendingRequest,
        resulting_balance: Option<i64>,
        now: DateTime<Utc>,
    ) -> Self {
        let (event, transaction_type, delivery_reference, attachment) = match &request.details {
            RequestDetails::In {
                delivery_reference,
                attachment,
            } => (
                None,
                None,
                Some(delivery_reference.clone()),
                Some(attachment.clone()),
            ),
            RequestDetails::Out {
                transaction_type,
                event,
            } => (Some(event.clone()), Some(*transaction_type), None, None),
            RequestDetails::Return { event } => (Some(event.clone()), None, None, None),
        };

        Self {
            action,
            item_code: request.item_code.clone(),
            item_name: request.item_name.clone(),
            quantity: request.quantity,
            unit: request.unit.clone(),
            resulting_balance,
            actor: request.requester.clone(),
            event,
            transaction_type,
            delivery_reference,
            attachment,
            effective_date: Some(request.requested_date),
            recorded_at: now,
        }
    }

    /// Signed contribution of this row to the item balance. Zero for
    /// rejections.
    pub fn signed_quantity(&self) -> i64 {
        match self.action {
            LedgerAction::AddItem | LedgerAction::ApproveIn | LedgerAction::ApproveReturn => {
                self.quantity
            }
            LedgerAction::ApproveOut => -self.quantity,
            LedgerAction::RejectIn | LedgerAction::RejectOut | LedgerAction::RejectReturn => 0,
        }
    }

    /// Business date for bucketing: the explicit date when present, else the
    /// date part of the record timestamp.
    pub fn effective_date(&self) -> NaiveDate {
        self.effective_date
            .unwrap_or_else(|| self.recorded_at.date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gudang_core::{Role, SessionContext};

    fn session() -> SessionContext {
        SessionContext::new("budi", Role::User)
    }

    fn out_request(qty: i64) -> PendingRequest {
        PendingRequest::stock_out(
            "ITM-0001".parse().unwrap(),
            "Sirup Original",
            qty,
            "box",
            TransactionType::Support,
            "Expo",
            &session(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn approved_out_entry_carries_snapshot_and_negative_delta() {
        let entry = LedgerEntry::approved(&out_request(4), 6, Utc::now());
        assert_eq!(entry.action, LedgerAction::ApproveOut);
        assert_eq!(entry.resulting_balance, Some(6));
        assert_eq!(entry.signed_quantity(), -4);
        assert_eq!(entry.transaction_type, Some(TransactionType::Support));
        assert_eq!(entry.event.as_deref(), Some("Expo"));
    }

    #[test]
    fn rejected_entry_has_no_balance_and_zero_delta() {
        let entry = LedgerEntry::rejected(&out_request(4), Utc::now());
        assert_eq!(entry.action, LedgerAction::RejectOut);
        assert_eq!(entry.resulting_balance, None);
        assert_eq!(entry.signed_quantity(), 0);
    }

    #[test]
    fn add_item_counts_initial_quantity() {
        let item = Item::new(
            "ITM-0002".parse().unwrap(),
            "Teh Botol",
            "pcs",
            "Minuman",
            12,
        )
        .unwrap();
        let entry = LedgerEntry::add_item(&item, "tiara", Utc::now());
        assert_eq!(entry.signed_quantity(), 12);
        assert_eq!(entry.resulting_balance, Some(12));
        assert!(entry.action.affects_balance());
        assert!(!entry.action.is_approval());
    }

    #[test]
    fn effective_date_falls_back_to_record_timestamp() {
        let mut entry = LedgerEntry::rejected(&out_request(1), Utc::now());
        entry.effective_date = None;
        assert_eq!(entry.effective_date(), entry.recorded_at.date_naive());
    }

    #[test]
    fn action_labels_are_stable() {
        assert_eq!(LedgerAction::ApproveReturn.as_str(), "APPROVE_RETURN");
        assert_eq!(
            serde_json::to_string(&LedgerAction::RejectIn).unwrap(),
            "\"REJECT_IN\""
        );
    }
}
