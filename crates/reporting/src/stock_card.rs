//! Chronological running-balance view for one item, derived by ledger replay.

use chrono::NaiveDate;
use serde::Serialize;

use gudang_ledger::{LedgerAction, LedgerEntry};
use gudang_requests::TransactionType;

/// One stock card line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockCardRow {
    pub date: NaiveDate,
    pub description: String,
    pub quantity_in: Option<i64>,
    pub quantity_out: Option<i64>,
    /// Balance recomputed by replaying signed deltas from zero.
    pub running_balance: i64,
    /// Balance snapshot stored on the ledger row at approval time.
    pub stored_balance: Option<i64>,
}

impl StockCardRow {
    /// The replayed balance must reproduce the stored snapshot; a mismatch
    /// is a detectable data-integrity bug, reported but not fatal.
    pub fn is_consistent(&self) -> bool {
        self.stored_balance
            .is_none_or(|stored| stored == self.running_balance)
    }
}

/// Stock card for a single item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockCard {
    pub item_name: String,
    pub rows: Vec<StockCardRow>,
}

impl StockCard {
    pub fn integrity_violations(&self) -> usize {
        self.rows.iter().filter(|r| !r.is_consistent()).count()
    }

    pub fn closing_balance(&self) -> i64 {
        self.rows.last().map(|r| r.running_balance).unwrap_or(0)
    }
}

/// Replay the balance-affecting history of one item.
///
/// Entries are ordered by record timestamp ascending; equal timestamps keep
/// their insertion order (the sort is stable).
pub fn stock_card(item_name: &str, entries: &[LedgerEntry]) -> StockCard {
    let mut relevant: Vec<&LedgerEntry> = entries
        .iter()
        .filter(|e| e.item_name == item_name && e.action.affects_balance())
        .collect();
    relevant.sort_by_key(|e| e.recorded_at);

    let mut rows = Vec::with_capacity(relevant.len());
    let mut running = 0i64;
    for entry in relevant {
        running += entry.signed_quantity();

        let (quantity_in, quantity_out) = match entry.action {
            LedgerAction::ApproveOut => (None, Some(entry.quantity)),
            _ => (Some(entry.quantity), None),
        };

        rows.push(StockCardRow {
            date: entry.effective_date(),
            description: describe(entry),
            quantity_in,
            quantity_out,
            running_balance: running,
            stored_balance: entry.resulting_balance,
        });
    }

    StockCard {
        item_name: item_name.to_string(),
        rows,
    }
}

fn describe(entry: &LedgerEntry) -> String {
    match entry.action {
        LedgerAction::AddItem => "Initial stock".to_string(),
        LedgerAction::ApproveIn => match &entry.delivery_reference {
            Some(reference) => format!("Request IN by {} (DO {reference})", entry.actor),
            None => format!("Request IN by {}", entry.actor),
        },
        LedgerAction::ApproveOut => {
            let transaction = entry
                .transaction_type
                .map(TransactionType::as_str)
                .unwrap_or("-");
            format!(
                "Request OUT ({transaction}) by {} for event: {}",
                entry.actor,
                entry.event.as_deref().unwrap_or("-")
            )
        }
        LedgerAction::ApproveReturn => format!(
            "Return by {} for event: {}",
            entry.actor,
            entry.event.as_deref().unwrap_or("-")
        ),
        // Rejections never reach a stock card; they do not affect balance.
        other => other.as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use gudang_core::ItemCode;
    use proptest::prelude::*;

    fn code() -> ItemCode {
        "ITM-0001".parse().unwrap()
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_750_000_000 + seconds, 0).unwrap()
    }

    fn entry(
        action: LedgerAction,
        quantity: i64,
        stored: Option<i64>,
        recorded_at: DateTime<Utc>,
    ) -> LedgerEntry {
        LedgerEntry {
            action,
            item_code: code(),
            item_name: "Sirup Original".to_string(),
            quantity,
            unit: "box".to_string(),
            resulting_balance: stored,
            actor: "budi".to_string(),
            event: Some("Expo".to_string()),
            transaction_type: None,
            delivery_reference: None,
            attachment: None,
            effective_date: None,
            recorded_at,
        }
    }

    #[test]
    fn replay_reproduces_stored_balances() {
        let entries = vec![
            entry(LedgerAction::AddItem, 10, Some(10), at(0)),
            entry(LedgerAction::ApproveOut, 4, Some(6), at(10)),
            entry(LedgerAction::ApproveReturn, 1, Some(7), at(20)),
        ];

        let card = stock_card("Sirup Original", &entries);
        assert_eq!(card.rows.len(), 3);
        assert_eq!(card.integrity_violations(), 0);
        assert_eq!(card.closing_balance(), 7);
        let running: Vec<i64> = card.rows.iter().map(|r| r.running_balance).collect();
        assert_eq!(running, vec![10, 6, 7]);
    }

    #[test]
    fn mismatched_snapshot_is_flagged_not_fatal() {
        let entries = vec![
            entry(LedgerAction::AddItem, 10, Some(10), at(0)),
            // Stored snapshot disagrees with replay (corrupted row).
            entry(LedgerAction::ApproveOut, 4, Some(5), at(10)),
        ];

        let card = stock_card("Sirup Original", &entries);
        assert_eq!(card.integrity_violations(), 1);
        assert_eq!(card.rows[1].running_balance, 6);
        assert_eq!(card.rows[1].stored_balance, Some(5));
    }

    #[test]
    fn rejections_and_other_items_are_excluded() {
        let mut other = entry(LedgerAction::ApproveIn, 99, Some(99), at(5));
        other.item_name = "Teh Botol".to_string();
        let entries = vec![
            entry(LedgerAction::AddItem, 10, Some(10), at(0)),
            entry(LedgerAction::RejectOut, 4, None, at(10)),
            other,
        ];

        let card = stock_card("Sirup Original", &entries);
        assert_eq!(card.rows.len(), 1);
    }

    #[test]
    fn equal_timestamps_keep_insertion_order() {
        let entries = vec![
            entry(LedgerAction::AddItem, 10, Some(10), at(0)),
            entry(LedgerAction::ApproveOut, 4, Some(6), at(0)),
            entry(LedgerAction::ApproveOut, 6, Some(0), at(0)),
        ];

        let card = stock_card("Sirup Original", &entries);
        assert_eq!(card.integrity_violations(), 0);
        assert_eq!(card.closing_balance(), 0);
    }

    proptest! {
        /// For any sequence of movements whose snapshots were written from a
        /// faithful running balance, replay reproduces every snapshot.
        #[test]
        fn replay_matches_snapshots_for_generated_histories(
            moves in prop::collection::vec((0u8..3, 1i64..20), 0..40)
        ) {
            let mut entries = vec![entry(LedgerAction::AddItem, 100, Some(100), at(0))];
            let mut balance = 100i64;

            for (i, (kind, qty)) in moves.iter().enumerate() {
                let (action, delta) = match kind {
                    0 => (LedgerAction::ApproveIn, *qty),
                    1 => (LedgerAction::ApproveOut, -*qty),
                    _ => (LedgerAction::ApproveReturn, *qty),
                };
                if balance + delta < 0 {
                    // The engine would have rejected this one.
                    continue;
                }
                balance += delta;
                entries.push(entry(action, *qty, Some(balance), at(i as i64 + 1)));
            }

            let card = stock_card("Sirup Original", &entries);
            prop_assert_eq!(card.integrity_violations(), 0);
            prop_assert_eq!(card.closing_balance(), balance);
        }
    }
}
