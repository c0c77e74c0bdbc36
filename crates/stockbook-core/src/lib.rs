//! # stockbook-core: Pure Business Logic for Stockbook
//!
//! This crate is the **heart** of Stockbook, a single-location inventory and
//! point-of-sale ledger. It contains every rule that does not need a database:
//! entity types, weighted-average costing, validation, and the report engine.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Host process (apps/cli, any UI)                 │   │
//! │  │    input ──► validation ──► store call ──► render result       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  stockbook-db (Ledger Store)                    │   │
//! │  │    products, purchases, sales, expenses, snapshots             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockbook-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐  │   │
//! │  │   │  types  │ │  money  │ │ costing │ │validation│ │ report │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └──────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Ledger entities (Product, Purchase, Sale, Expense) and requests
//! - [`money`] - Money type with integer arithmetic
//! - [`costing`] - Weighted-average unit cost rules
//! - [`report`] - Date-range financial report over a ledger snapshot
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use stockbook_core::costing::cost_after_purchase;
//!
//! // 10 units at 20.00, then 10 more at 30.00
//! let cost = cost_after_purchase(10, 2000.0, 10, 3000);
//! assert_eq!(cost, 2500.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod costing;
pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use report::{
    compute_report, profitability, DailyRevenue, InventorySummary, ProductMargin, Report, TopProduct,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Label shown in place of a product name when the product row was deleted.
///
/// Purchase and sale history keeps its `product_id` after the product is
/// removed, so every reader that resolves names must fall back to this.
pub const DELETED_PRODUCT_LABEL: &str = "—";

/// Maximum quantity accepted on a single purchase or sale line.
///
/// Guards the `quantity × price` products against overflow.
pub const MAX_LINE_QUANTITY: i64 = 1_000_000;

/// Largest price, cost or expense amount accepted, in cents (one billion units).
///
/// `MAX_UNIT_CENTS × MAX_LINE_QUANTITY` stays far below `i64::MAX`.
pub const MAX_UNIT_CENTS: i64 = 100_000_000_000;

/// Default stock level at or below which a product counts as "low stock".
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;
