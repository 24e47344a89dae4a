//! `gudang-api` — HTTP surface for the stock service.

pub mod app;
pub mod middleware;
pub mod sessions;
