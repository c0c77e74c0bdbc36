//! # Report Repository
//!
//! Loads ledger snapshots and hands them to the pure report engine in
//! `stockbook-core`.
//!
//! ```text
//!   snapshot()  ── one read transaction over the four tables
//!       │
//!       ▼
//!   stockbook_core::compute_report(&snapshot, from, to)
//! ```
//!
//! Nothing here writes, so no write gate is taken.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use super::{begin, commit};
use crate::error::DbResult;
use stockbook_core::{compute_report, profitability, LedgerSnapshot, ProductMargin, Report};

/// Read-only access to whole-ledger views.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub(crate) fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Copies all four collections, each in id order.
    ///
    /// Runs in one read transaction so the collections agree with each other.
    pub async fn snapshot(&self) -> DbResult<LedgerSnapshot> {
        let mut tx = begin(&self.pool).await?;

        let products = sqlx::query_as(
            r#"
            SELECT
                id, name, category, unit_cost_cents, sale_price_cents,
                stock, total_sold, total_revenue_cents
            FROM products
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let purchases = sqlx::query_as(
            "SELECT id, product_id, quantity, unit_cost_cents, date FROM purchases ORDER BY id ASC",
        )
        .fetch_all(&mut *tx)
        .await?;

        let sales = sqlx::query_as(
            "SELECT id, product_id, quantity, unit_price_cents, date FROM sales ORDER BY id ASC",
        )
        .fetch_all(&mut *tx)
        .await?;

        let expenses = sqlx::query_as(
            "SELECT id, kind, description, amount_cents, date FROM expenses ORDER BY id ASC",
        )
        .fetch_all(&mut *tx)
        .await?;

        commit(tx).await?;

        let snapshot = LedgerSnapshot {
            products,
            purchases,
            sales,
            expenses,
        };

        debug!(
            products = snapshot.products.len(),
            purchases = snapshot.purchases.len(),
            sales = snapshot.sales.len(),
            expenses = snapshot.expenses.len(),
            "Ledger snapshot loaded"
        );

        Ok(snapshot)
    }

    /// Report for `[from, to]`, inclusive on both ends.
    ///
    /// Range validation belongs to the caller. An inverted range simply
    /// matches nothing.
    pub async fn compute(&self, from: NaiveDate, to: NaiveDate) -> DbResult<Report> {
        let snapshot = self.snapshot().await?;
        Ok(compute_report(&snapshot, from, to))
    }

    /// Lifetime margin per product, highest first.
    pub async fn profitability(&self) -> DbResult<Vec<ProductMargin>> {
        let snapshot = self.snapshot().await?;
        Ok(profitability(&snapshot.products))
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use stockbook_core::{NewExpense, NewPurchase, NewSale, ProductUpsert};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[tokio::test]
    async fn test_ring_scenario() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let ring = db
            .products()
            .upsert(ProductUpsert::named("Ring A").stock(10, 2000).sale_price(5000))
            .await
            .unwrap();
        db.purchases()
            .record(NewPurchase {
                product_id: ring.id,
                quantity: 10,
                unit_cost_cents: 3000,
                date: day(10),
            })
            .await
            .unwrap();
        db.sales()
            .record(NewSale {
                product_id: ring.id,
                quantity: 5,
                unit_price_cents: 5000,
                date: day(10),
            })
            .await
            .unwrap();
        db.expenses()
            .record(NewExpense {
                kind: "Rent".to_string(),
                amount_cents: 1000,
                description: None,
                date: day(10),
            })
            .await
            .unwrap();

        let report = db.reports().compute(day(10), day(10)).await.unwrap();

        assert_eq!(report.revenue_cents, 25000);
        assert_eq!(report.cost_of_goods_sold_cents, 12500);
        assert_eq!(report.total_expenses_cents, 1000);
        assert_eq!(report.net_profit_cents, 11500);
        assert_eq!(report.total_purchases_cents, 30000);
        assert_eq!(report.sale_count, 1);
        assert_eq!(report.top_products.len(), 1);
        assert_eq!(report.top_products[0].product_name, "Ring A");
        assert_eq!(report.daily_revenue.len(), 1);

        let outside = db.reports().compute(day(11), day(31)).await.unwrap();
        assert_eq!(outside.revenue_cents, 0);
        assert!(outside.top_products.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_is_in_id_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for name in ["Watch", "Anklet"] {
            db.products().upsert(ProductUpsert::named(name)).await.unwrap();
        }

        let snapshot = db.reports().snapshot().await.unwrap();
        let names: Vec<&str> = snapshot.products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Watch", "Anklet"]);
    }

    #[tokio::test]
    async fn test_profitability() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ring = db
            .products()
            .upsert(ProductUpsert::named("Ring").stock(10, 2000).sale_price(5000))
            .await
            .unwrap();
        db.products()
            .upsert(ProductUpsert::named("Unsold").stock(1, 100).sale_price(200))
            .await
            .unwrap();
        db.sales()
            .record(NewSale {
                product_id: ring.id,
                quantity: 2,
                unit_price_cents: 5000,
                date: day(3),
            })
            .await
            .unwrap();

        let margins = db.reports().profitability().await.unwrap();
        assert_eq!(margins[0].product_name, "Ring");
        assert_eq!(margins[0].margin_cents, 6000);
        assert_eq!(margins[1].margin_cents, 0);
    }
}
