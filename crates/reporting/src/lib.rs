//! `gudang-reporting` — read-only views derived from the ledger and catalog.
//!
//! No function here mutates anything or feeds back into state.

pub mod aggregates;
pub mod stock_card;

pub use aggregates::{
    dashboard_summary, days_of_cover, monthly_aggregate, top_by_balance, top_events_by_out,
    DashboardSummary, DateRange, EventTotal, MonthBucket,
};
pub use stock_card::{stock_card, StockCard, StockCardRow};
