//! # Repository Module
//!
//! Database repository implementations for the Stockbook ledger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  CLI command                                                           │
//! │       │                                                                 │
//! │       │  db.sales().record(NewSale { .. })                             │
//! │       ▼                                                                 │
//! │  SaleRepository                                                        │
//! │  ├── record(&self, sale)     ── write gate + transaction               │
//! │  ├── recent(&self, limit)    ── joined with product name               │
//! │  └── all(&self)              ── snapshot input                         │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`] - Product upsert, edits, listing, low stock
//! - [`PurchaseRepository`] - Purchase postings (stock + cost basis)
//! - [`SaleRepository`] - Sale postings (stock + sales totals)
//! - [`ExpenseRepository`] - Expense appends
//! - [`ReportRepository`] - Snapshots and report engine calls

pub mod expense;
pub mod product;
pub mod purchase;
pub mod report;
pub mod sale;

pub use expense::ExpenseRepository;
pub use product::ProductRepository;
pub use purchase::PurchaseRepository;
pub use report::ReportRepository;
pub use sale::SaleRepository;

use sqlx::{Sqlite, SqlitePool, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{DbError, DbResult};

/// In-process writer lock shared by every repository of one [`crate::Database`].
///
/// Held for the whole read-modify-write transaction of a mutation.
pub(crate) type WriteGate = Arc<Mutex<()>>;

/// Starts a transaction, mapping failures to [`DbError::TransactionFailed`].
pub(crate) async fn begin(pool: &SqlitePool) -> DbResult<Transaction<'static, Sqlite>> {
    pool.begin()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))
}

/// Commits a transaction, mapping failures to [`DbError::TransactionFailed`].
pub(crate) async fn commit(tx: Transaction<'static, Sqlite>) -> DbResult<()> {
    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))
}
