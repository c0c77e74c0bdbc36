//! # Purchase Repository
//!
//! Posts stock replenishments and reads purchase history.
//!
//! ## Posting
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record(NewPurchase { product_id, quantity, unit_cost, date })          │
//! │                                                                         │
//! │  write gate ──► BEGIN                                                  │
//! │                   │                                                     │
//! │                   ├── SELECT stock, unit_cost_cents   (NotFound → abort)│
//! │                   ├── stock + q (checked), cost_after_purchase(..)      │
//! │                   ├── UPDATE products SET stock, unit_cost_cents        │
//! │                   ├── INSERT INTO purchases                             │
//! │                   ▼                                                     │
//! │                 COMMIT   (both writes or neither)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::{debug, info};

use super::{begin, commit, WriteGate};
use crate::error::{DbError, DbResult};
use stockbook_core::costing::cost_after_purchase;
use stockbook_core::validation::checked_total;
use stockbook_core::{NewPurchase, Purchase, PurchaseEntry};

/// Repository for purchase postings.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
    write_gate: WriteGate,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub(crate) fn new(pool: SqlitePool, write_gate: WriteGate) -> Self {
        PurchaseRepository { pool, write_gate }
    }

    /// Records a purchase and folds it into the product's stock and cost basis.
    ///
    /// ## Returns
    /// * `Ok(Purchase)` - The recorded purchase with its new id
    /// * `Err(DbError::Validation)` - Quantity not positive, cost out of
    ///   range, or stock would overflow
    /// * `Err(DbError::NotFound)` - Unknown product; nothing is written
    pub async fn record(&self, purchase: NewPurchase) -> DbResult<Purchase> {
        purchase.validate()?;

        let _guard = self.write_gate.lock().await;
        let mut tx = begin(&self.pool).await?;

        let (stock, unit_cost_cents): (i64, f64) =
            sqlx::query_as("SELECT stock, unit_cost_cents FROM products WHERE id = ?1")
                .bind(purchase.product_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DbError::not_found("Product", purchase.product_id))?;

        let new_stock = checked_total("stock", stock, purchase.quantity)?;
        let new_cost = cost_after_purchase(
            stock,
            unit_cost_cents,
            purchase.quantity,
            purchase.unit_cost_cents,
        );

        debug!(
            product_id = purchase.product_id,
            old_cost = unit_cost_cents,
            new_cost,
            "Applying purchase to product"
        );

        sqlx::query(
            r#"
            UPDATE products SET
                stock = ?2,
                unit_cost_cents = ?3
            WHERE id = ?1
            "#,
        )
        .bind(purchase.product_id)
        .bind(new_stock)
        .bind(new_cost)
        .execute(&mut *tx)
        .await?;

        let id = sqlx::query(
            r#"
            INSERT INTO purchases (product_id, quantity, unit_cost_cents, date)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(purchase.product_id)
        .bind(purchase.quantity)
        .bind(purchase.unit_cost_cents)
        .bind(purchase.date)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        commit(tx).await?;

        info!(
            id,
            product_id = purchase.product_id,
            quantity = purchase.quantity,
            "Purchase recorded"
        );

        Ok(Purchase {
            id,
            product_id: purchase.product_id,
            quantity: purchase.quantity,
            unit_cost_cents: purchase.unit_cost_cents,
            date: purchase.date,
        })
    }

    /// Newest purchases first, joined with the product's current name.
    ///
    /// Rows for deleted products come back with `product_name = None`.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<PurchaseEntry>> {
        let entries = sqlx::query_as(
            r#"
            SELECT
                pu.id,
                pu.product_id,
                p.name AS product_name,
                pu.quantity,
                pu.unit_cost_cents,
                pu.date
            FROM purchases pu
            LEFT JOIN products p ON p.id = pu.product_id
            ORDER BY pu.date DESC, pu.id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Every purchase in id order.
    pub async fn all(&self) -> DbResult<Vec<Purchase>> {
        let purchases = sqlx::query_as(
            r#"
            SELECT id, product_id, quantity, unit_cost_cents, date
            FROM purchases
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }
}
