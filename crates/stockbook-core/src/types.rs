//! # Domain Types
//!
//! Ledger entities and the request objects used to mutate them.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Ledger Entities                                 │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │◄──│    Purchase     │   │    Expense      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, name       │   │  product_id     │   │  kind           │       │
//! │  │  unit_cost      │   │  qty, unit_cost │   │  amount_cents   │       │
//! │  │  sale_price     │   │  date           │   │  date           │       │
//! │  │  stock          │   └─────────────────┘   └─────────────────┘       │
//! │  │  total_sold     │   ┌─────────────────┐                             │
//! │  │  total_revenue  │◄──│      Sale       │   Purchase and Sale are     │
//! │  └─────────────────┘   │  product_id     │   append-only. Their        │
//! │                        │  qty, price     │   product_id may dangle     │
//! │                        │  date           │   after a product delete.   │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Aggregate Invariant
//! `stock`, `total_sold`, `total_revenue_cents` and `unit_cost_cents` on a
//! [`Product`] are derived from its creation plus the ordered Purchase/Sale
//! postings against it. Only the store's posting paths write them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::validation::{
    validate_category, validate_cents, validate_expense_kind, validate_incoming_stock,
    validate_product_name, validate_quantity, ValidationResult,
};
use crate::DELETED_PRODUCT_LABEL;

// =============================================================================
// Product
// =============================================================================

/// A product the shop stocks and sells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Store-assigned identity, never reused.
    pub id: i64,

    /// Unique, trimmed display name.
    pub name: String,

    /// Free-text category, may be empty.
    pub category: String,

    /// Weighted-average unit purchase cost, in fractional cents.
    pub unit_cost_cents: f64,

    /// Latest explicit unit sale price in cents.
    pub sale_price_cents: i64,

    /// Units on hand. Negative after an oversell.
    pub stock: i64,

    /// Cumulative units sold.
    pub total_sold: i64,

    /// Cumulative sale revenue in cents.
    pub total_revenue_cents: i64,
}

impl Product {
    /// Returns the sale price as Money.
    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }

    /// Returns cumulative revenue as Money.
    #[inline]
    pub fn total_revenue(&self) -> Money {
        Money::from_cents(self.total_revenue_cents)
    }

    /// Unit cost rounded to whole cents, for display.
    #[inline]
    pub fn unit_cost(&self) -> Money {
        Money::from_fractional_cents(self.unit_cost_cents)
    }

    /// True when stock is at or below `threshold`.
    #[inline]
    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.stock <= threshold
    }
}

// =============================================================================
// Purchase
// =============================================================================

/// A stock replenishment. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Purchase {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// Unit cost paid, in cents.
    pub unit_cost_cents: i64,
    #[ts(as = "String")]
    pub date: NaiveDate,
}

impl Purchase {
    /// quantity × unit cost.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_cost_cents).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A sale of some units of one product. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// Unit price charged at the time of sale, in cents.
    pub unit_price_cents: i64,
    #[ts(as = "String")]
    pub date: NaiveDate,
}

impl Sale {
    /// quantity × unit price.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Expense
// =============================================================================

/// A miscellaneous expense (rent, packaging, ...). Not tied to any product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Expense {
    pub id: i64,
    /// Free-text category tag.
    pub kind: String,
    pub description: Option<String>,
    pub amount_cents: i64,
    #[ts(as = "String")]
    pub date: NaiveDate,
}

impl Expense {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// History Rows
// =============================================================================

/// A purchase joined with the referenced product's current name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PurchaseEntry {
    pub id: i64,
    pub product_id: i64,
    /// `None` when the product has been deleted.
    pub product_name: Option<String>,
    pub quantity: i64,
    pub unit_cost_cents: i64,
    #[ts(as = "String")]
    pub date: NaiveDate,
}

impl PurchaseEntry {
    /// Product name, or the deleted-product placeholder.
    pub fn product_label(&self) -> &str {
        self.product_name.as_deref().unwrap_or(DELETED_PRODUCT_LABEL)
    }
}

/// A sale joined with the referenced product's current name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleEntry {
    pub id: i64,
    pub product_id: i64,
    /// `None` when the product has been deleted.
    pub product_name: Option<String>,
    pub quantity: i64,
    pub unit_price_cents: i64,
    #[ts(as = "String")]
    pub date: NaiveDate,
}

impl SaleEntry {
    /// Product name, or the deleted-product placeholder.
    pub fn product_label(&self) -> &str {
        self.product_name.as_deref().unwrap_or(DELETED_PRODUCT_LABEL)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Create-or-restock request, keyed by trimmed product name.
///
/// ## Behavior
/// ```text
/// name not found ──► INSERT with the given stock / cost / price
///
/// name found ──────► stock    += incoming_stock
///                    cost      = weighted average (see costing)
///                    price     = incoming price if > 0, else unchanged
///                    category  = ALWAYS overwritten, even with ""
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductUpsert {
    pub name: String,
    pub category: String,
    pub incoming_stock: i64,
    pub incoming_unit_cost_cents: i64,
    pub incoming_sale_price_cents: i64,
}

impl ProductUpsert {
    /// Starts an upsert for `name` with zero stock, cost and price.
    pub fn named(name: impl Into<String>) -> Self {
        ProductUpsert {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Units received and their unit cost in cents.
    pub fn stock(mut self, quantity: i64, unit_cost_cents: i64) -> Self {
        self.incoming_stock = quantity;
        self.incoming_unit_cost_cents = unit_cost_cents;
        self
    }

    pub fn sale_price(mut self, cents: i64) -> Self {
        self.incoming_sale_price_cents = cents;
        self
    }

    /// Name with surrounding whitespace removed (the lookup key).
    pub fn trimmed_name(&self) -> &str {
        self.name.trim()
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_product_name(&self.name)?;
        validate_category(&self.category)?;
        validate_incoming_stock(self.incoming_stock)?;
        validate_cents("unit_cost", self.incoming_unit_cost_cents)?;
        validate_cents("sale_price", self.incoming_sale_price_cents)?;
        Ok(())
    }
}

/// Partial edit of a product's descriptive fields.
///
/// Only `Some` fields change. Stock, cost basis and sales totals are not
/// part of the patch: they move only through postings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub sale_price_cents: Option<i64>,
}

impl ProductPatch {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.category.is_none() && self.sale_price_cents.is_none()
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_product_name(name)?;
        }
        if let Some(category) = &self.category {
            validate_category(category)?;
        }
        if let Some(cents) = self.sale_price_cents {
            validate_cents("sale_price", cents)?;
        }
        Ok(())
    }
}

/// Purchase to post against an existing product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPurchase {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_cost_cents: i64,
    #[ts(as = "String")]
    pub date: NaiveDate,
}

impl NewPurchase {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_quantity(self.quantity)?;
        validate_cents("unit_cost", self.unit_cost_cents)?;
        Ok(())
    }
}

/// Sale to post against an existing product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
    #[ts(as = "String")]
    pub date: NaiveDate,
}

impl NewSale {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_quantity(self.quantity)?;
        validate_cents("unit_price", self.unit_price_cents)?;
        Ok(())
    }

    /// quantity × unit price.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }

    /// quantity × unit price, `None` on overflow.
    #[inline]
    pub fn line_total_checked(&self) -> Option<Money> {
        Money::from_cents(self.unit_price_cents).checked_multiply_quantity(self.quantity)
    }
}

/// Expense to append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewExpense {
    pub kind: String,
    pub amount_cents: i64,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub date: NaiveDate,
}

impl NewExpense {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_expense_kind(&self.kind)?;
        validate_cents("amount", self.amount_cents)?;
        Ok(())
    }
}

// =============================================================================
// Store Results
// =============================================================================

/// Result of a reset request.
///
/// A reset without confirmation is not an error, but the caller must be able
/// to tell it apart from a reset that ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "status", rename_all = "snake_case")]
#[ts(export)]
pub enum ResetOutcome {
    /// Confirmation was missing. Nothing was touched.
    Skipped,
    /// Every collection was emptied. Counts are rows removed.
    Cleared {
        products: u64,
        purchases: u64,
        sales: u64,
        expenses: u64,
    },
}

impl ResetOutcome {
    #[inline]
    pub fn is_cleared(&self) -> bool {
        matches!(self, ResetOutcome::Cleared { .. })
    }
}

/// Full copy of the four ledger collections, each in id order.
///
/// Input to the report engine and the shape of a data export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LedgerSnapshot {
    pub products: Vec<Product>,
    pub purchases: Vec<Purchase>,
    pub sales: Vec<Sale>,
    pub expenses: Vec<Expense>,
}

impl LedgerSnapshot {
    /// Looks up a product by id.
    pub fn product(&self, id: i64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
