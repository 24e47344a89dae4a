//! `gudang-auth` — login gate primitives.

pub mod user;

pub use user::{authenticate, User};
