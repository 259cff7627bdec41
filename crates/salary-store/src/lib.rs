//! Append-only prediction history for the salary service.

mod store;

pub use salary_core::StoreError;
pub use store::SqliteStore;
