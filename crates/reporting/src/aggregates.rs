//! Period aggregates and top-mover views.
//!
//! Everything here is a pure function of ledger entries + catalog rows.
//! Reads may observe a ledger mid-batch; that snapshot is still internally
//! orderable, so no coordination with the approval engine is needed.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use gudang_catalog::Item;
use gudang_core::ItemCode;
use gudang_ledger::{LedgerAction, LedgerEntry};
use gudang_requests::MovementKind;

/// Inclusive date range filter. `None` bounds are open.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

/// One calendar-month bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
    /// Display label ("Aug 2025"); ordering always follows (year, month),
    /// never this string.
    pub label: String,
    pub quantity: i64,
}

/// Sum approved quantities of one movement kind per calendar month.
///
/// Buckets are keyed on the entry's effective date (explicit business date
/// when present, else the record date) and returned chronologically.
pub fn monthly_aggregate(
    kind: MovementKind,
    range: DateRange,
    entries: &[LedgerEntry],
) -> Vec<MonthBucket> {
    let action = LedgerAction::approval_of(kind);
    let mut buckets: BTreeMap<(i32, u32), i64> = BTreeMap::new();

    for entry in entries {
        if entry.action != action {
            continue;
        }
        let date = entry.effective_date();
        if !range.contains(date) {
            continue;
        }
        use chrono::Datelike;
        *buckets.entry((date.year(), date.month())).or_insert(0) += entry.quantity;
    }

    buckets
        .into_iter()
        .map(|((year, month), quantity)| MonthBucket {
            year,
            month,
            label: month_label(year, month),
            quantity,
        })
        .collect()
}

fn month_label(year: i32, month: u32) -> String {
    // First of the month is always a valid date for a key that came from one.
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{year}-{month:02}"))
}

/// Items with the largest current balance, descending; ties keep catalog
/// order (the sort is stable).
pub fn top_by_balance(items: &[Item], n: usize) -> Vec<Item> {
    let mut ranked: Vec<Item> = items.to_vec();
    ranked.sort_by_key(|item| std::cmp::Reverse(item.balance));
    ranked.truncate(n);
    ranked
}

/// Total OUT quantity attributed to one event label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventTotal {
    pub event: String,
    pub quantity: i64,
}

/// Events ranked by approved OUT quantity, descending; ties keep first-seen
/// order. Placeholder labels ("-") are not events and are skipped.
pub fn top_events_by_out(entries: &[LedgerEntry], range: DateRange, n: usize) -> Vec<EventTotal> {
    let mut totals: Vec<EventTotal> = Vec::new();

    for entry in entries {
        if entry.action != LedgerAction::ApproveOut || !range.contains(entry.effective_date()) {
            continue;
        }
        let Some(event) = entry.event.as_deref() else {
            continue;
        };
        if event.trim().is_empty() || event == "-" {
            continue;
        }

        match totals.iter_mut().find(|t| t.event == event) {
            Some(total) => total.quantity += entry.quantity,
            None => totals.push(EventTotal {
                event: event.to_string(),
                quantity: entry.quantity,
            }),
        }
    }

    totals.sort_by_key(|t| std::cmp::Reverse(t.quantity));
    totals.truncate(n);
    totals
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total_skus: usize,
    pub total_on_hand: i64,
    pub total_in: i64,
    pub total_out: i64,
    pub total_returned: i64,
}

pub fn dashboard_summary(
    items: &[Item],
    entries: &[LedgerEntry],
    range: DateRange,
) -> DashboardSummary {
    let mut summary = DashboardSummary {
        total_skus: items.len(),
        total_on_hand: items.iter().map(|i| i.balance).sum(),
        total_in: 0,
        total_out: 0,
        total_returned: 0,
    };

    for entry in entries {
        if !range.contains(entry.effective_date()) {
            continue;
        }
        match entry.action {
            LedgerAction::ApproveIn => summary.total_in += entry.quantity,
            LedgerAction::ApproveOut => summary.total_out += entry.quantity,
            LedgerAction::ApproveReturn => summary.total_returned += entry.quantity,
            _ => {}
        }
    }

    summary
}

/// Reorder signal: current balance divided by the average daily OUT quantity
/// over the trailing window ending at `today` (inclusive).
///
/// `None` when there was no approved OUT movement in the window; "infinite
/// cover" and "no data" are the same non-signal to the reorder screen.
pub fn days_of_cover(
    balance: i64,
    item_code: &ItemCode,
    entries: &[LedgerEntry],
    today: NaiveDate,
    window_days: u32,
) -> Option<f64> {
    if window_days == 0 {
        return None;
    }
    let window_start = today - chrono::Duration::days(i64::from(window_days) - 1);

    let out_total: i64 = entries
        .iter()
        .filter(|e| e.action == LedgerAction::ApproveOut && &e.item_code == item_code)
        .filter(|e| {
            let d = e.effective_date();
            d >= window_start && d <= today
        })
        .map(|e| e.quantity)
        .sum();

    if out_total <= 0 {
        return None;
    }

    let daily = out_total as f64 / f64::from(window_days);
    Some(balance as f64 / daily)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn code(s: &str) -> ItemCode {
        s.parse().unwrap()
    }

    fn entry(
        action: LedgerAction,
        item: &str,
        quantity: i64,
        date: NaiveDate,
        event: Option<&str>,
    ) -> LedgerEntry {
        LedgerEntry {
            action,
            item_code: code(item),
            item_name: item.to_string(),
            quantity,
            unit: "pcs".to_string(),
            resulting_balance: None,
            actor: "budi".to_string(),
            event: event.map(str::to_string),
            transaction_type: None,
            delivery_reference: None,
            attachment: None,
            effective_date: Some(date),
            recorded_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn monthly_buckets_are_chronological_not_alphabetical() {
        // "Apr 2025" sorts before "Aug 2024" alphabetically; chronologically
        // it must come after.
        let entries = vec![
            entry(LedgerAction::ApproveIn, "ITM-0001", 3, d(2025, 4, 2), None),
            entry(LedgerAction::ApproveIn, "ITM-0001", 5, d(2024, 8, 15), None),
            entry(LedgerAction::ApproveIn, "ITM-0001", 2, d(2024, 8, 20), None),
        ];

        let buckets = monthly_aggregate(MovementKind::In, DateRange::default(), &entries);
        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Aug 2024", "Apr 2025"]);
        assert_eq!(buckets[0].quantity, 7);
        assert_eq!(buckets[1].quantity, 3);
    }

    #[test]
    fn monthly_aggregate_ignores_other_kinds_and_rejections() {
        let entries = vec![
            entry(LedgerAction::ApproveIn, "ITM-0001", 3, d(2025, 2, 1), None),
            entry(LedgerAction::ApproveOut, "ITM-0001", 9, d(2025, 2, 1), None),
            entry(LedgerAction::RejectIn, "ITM-0001", 8, d(2025, 2, 1), None),
        ];
        let buckets = monthly_aggregate(MovementKind::In, DateRange::default(), &entries);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].quantity, 3);
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let range = DateRange::new(Some(d(2025, 3, 1)), Some(d(2025, 3, 31)));
        assert!(range.contains(d(2025, 3, 1)));
        assert!(range.contains(d(2025, 3, 31)));
        assert!(!range.contains(d(2025, 4, 1)));
    }

    #[test]
    fn top_by_balance_breaks_ties_by_catalog_order() {
        let items = vec![
            Item::new(code("ITM-0001"), "A", "pcs", "x", 5).unwrap(),
            Item::new(code("ITM-0002"), "B", "pcs", "x", 9).unwrap(),
            Item::new(code("ITM-0003"), "C", "pcs", "x", 5).unwrap(),
        ];
        let top = top_by_balance(&items, 3);
        let names: Vec<&str> = top.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn top_events_skips_placeholder_labels() {
        let entries = vec![
            entry(
                LedgerAction::ApproveOut,
                "ITM-0001",
                4,
                d(2025, 5, 1),
                Some("Expo"),
            ),
            entry(
                LedgerAction::ApproveOut,
                "ITM-0001",
                2,
                d(2025, 5, 2),
                Some("-"),
            ),
            entry(
                LedgerAction::ApproveOut,
                "ITM-0001",
                1,
                d(2025, 5, 3),
                Some("Expo"),
            ),
        ];
        let top = top_events_by_out(&entries, DateRange::default(), 5);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].event, "Expo");
        assert_eq!(top[0].quantity, 5);
    }

    #[test]
    fn days_of_cover_is_none_without_out_movement() {
        let entries = vec![entry(
            LedgerAction::ApproveIn,
            "ITM-0001",
            10,
            d(2025, 6, 1),
            None,
        )];
        assert_eq!(
            days_of_cover(10, &code("ITM-0001"), &entries, d(2025, 6, 30), 30),
            None
        );
    }

    #[test]
    fn days_of_cover_uses_trailing_window_average() {
        // 6 units OUT over a 30-day window -> 0.2/day; balance 10 -> 50 days.
        let entries = vec![
            entry(LedgerAction::ApproveOut, "ITM-0001", 4, d(2025, 6, 10), None),
            entry(LedgerAction::ApproveOut, "ITM-0001", 2, d(2025, 6, 20), None),
            // Outside the window.
            entry(LedgerAction::ApproveOut, "ITM-0001", 50, d(2025, 4, 1), None),
            // Other item.
            entry(LedgerAction::ApproveOut, "ITM-0002", 50, d(2025, 6, 15), None),
        ];
        let cover = days_of_cover(10, &code("ITM-0001"), &entries, d(2025, 6, 30), 30).unwrap();
        assert!((cover - 50.0).abs() < 1e-9);
    }
}
