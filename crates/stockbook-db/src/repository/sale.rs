//! # Sale Repository
//!
//! Posts sales and reads sale history.
//!
//! ## Sale Posting
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Posting                                      │
//! │                                                                         │
//! │  record(NewSale { product_id, quantity: q, unit_price: p, date })      │
//! │                                                                         │
//! │  write gate ──► BEGIN                                                  │
//! │                   │                                                     │
//! │                   ├── SELECT stock, totals         (NotFound → abort)   │
//! │                   ├── checked: stock - q, sold + q, revenue + q*p      │
//! │                   │   (overflow → Validation, rollback)                 │
//! │                   ├── UPDATE products                                   │
//! │                   ├── INSERT INTO sales                                 │
//! │                   ▼                                                     │
//! │                 COMMIT                                                  │
//! │                                                                         │
//! │  Cost basis is untouched. Stock may go negative: oversell guards       │
//! │  belong to the caller.                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::{debug, info};

use super::{begin, commit, WriteGate};
use crate::error::{DbError, DbResult};
use stockbook_core::validation::checked_total;
use stockbook_core::{NewSale, Sale, SaleEntry, ValidationError};

/// Repository for sale postings.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    write_gate: WriteGate,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub(crate) fn new(pool: SqlitePool, write_gate: WriteGate) -> Self {
        SaleRepository { pool, write_gate }
    }

    /// Records a sale and applies it to the product's stock and sales totals.
    ///
    /// ## Returns
    /// * `Ok(Sale)` - The recorded sale with its new id
    /// * `Err(DbError::Validation)` - Quantity not positive, price out of
    ///   range, or a product total would overflow; nothing is written
    /// * `Err(DbError::NotFound)` - Unknown product; nothing is written
    pub async fn record(&self, sale: NewSale) -> DbResult<Sale> {
        sale.validate()?;
        let revenue_cents = sale
            .line_total_checked()
            .ok_or_else(|| ValidationError::Overflow {
                field: "line_total".to_string(),
            })?
            .cents();

        let _guard = self.write_gate.lock().await;
        let mut tx = begin(&self.pool).await?;

        let (stock, total_sold, total_revenue_cents): (i64, i64, i64) = sqlx::query_as(
            "SELECT stock, total_sold, total_revenue_cents FROM products WHERE id = ?1",
        )
        .bind(sale.product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Product", sale.product_id))?;

        // SQLite turns an overflowing integer sum into REAL; never hand it one
        let stock = checked_total("stock", stock, -sale.quantity)?;
        let total_sold = checked_total("total_sold", total_sold, sale.quantity)?;
        let total_revenue_cents =
            checked_total("total_revenue", total_revenue_cents, revenue_cents)?;

        debug!(product_id = sale.product_id, quantity = sale.quantity, "Applying sale to product");

        sqlx::query(
            r#"
            UPDATE products SET
                stock = ?2,
                total_sold = ?3,
                total_revenue_cents = ?4
            WHERE id = ?1
            "#,
        )
        .bind(sale.product_id)
        .bind(stock)
        .bind(total_sold)
        .bind(total_revenue_cents)
        .execute(&mut *tx)
        .await?;

        let id = sqlx::query(
            r#"
            INSERT INTO sales (product_id, quantity, unit_price_cents, date)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(sale.product_id)
        .bind(sale.quantity)
        .bind(sale.unit_price_cents)
        .bind(sale.date)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        commit(tx).await?;

        info!(
            id,
            product_id = sale.product_id,
            quantity = sale.quantity,
            revenue_cents,
            "Sale recorded"
        );

        Ok(Sale {
            id,
            product_id: sale.product_id,
            quantity: sale.quantity,
            unit_price_cents: sale.unit_price_cents,
            date: sale.date,
        })
    }

    /// Newest sales first, joined with the product's current name.
    ///
    /// Rows for deleted products come back with `product_name = None`.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<SaleEntry>> {
        let entries = sqlx::query_as(
            r#"
            SELECT
                s.id,
                s.product_id,
                p.name AS product_name,
                s.quantity,
                s.unit_price_cents,
                s.date
            FROM sales s
            LEFT JOIN products p ON p.id = s.product_id
            ORDER BY s.date DESC, s.id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Every sale in id order.
    pub async fn all(&self) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as(
            r#"
            SELECT id, product_id, quantity, unit_price_cents, date
            FROM sales
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }
}
