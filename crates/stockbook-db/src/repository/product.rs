//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Upsert by name (restock with weighted-average costing)
//! - Descriptive edits and deletes
//! - Listing and low-stock queries
//!
//! ## Upsert Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    upsert("Ring A", +10 @ 30.00)                        │
//! │                                                                         │
//! │  validate() ──► write gate ──► BEGIN                                   │
//! │                                  │                                      │
//! │                                  ▼                                      │
//! │                  SELECT ... WHERE name = 'Ring A'                       │
//! │                     │                          │                        │
//! │                  absent                     present                     │
//! │                     │                          │                        │
//! │                     ▼                          ▼                        │
//! │               INSERT row            stock += 10                         │
//! │                                     cost   = cost_after_restock(..)     │
//! │                                     price  = new price if > 0           │
//! │                                     category overwritten                │
//! │                     │                          │                        │
//! │                     └────────────┬─────────────┘                        │
//! │                                  ▼                                      │
//! │                               COMMIT                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock deltas from purchases and sales live in their own repositories.
//! Nothing here changes `total_sold` or `total_revenue_cents`.

use sqlx::SqlitePool;
use tracing::{debug, info};

use super::{begin, commit, WriteGate};
use crate::error::{DbError, DbResult};
use stockbook_core::costing::cost_after_restock;
use stockbook_core::validation::checked_total;
use stockbook_core::{InventorySummary, Product, ProductPatch, ProductUpsert};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// // Create, or restock an existing product with the same name
/// let ring = repo.upsert(ProductUpsert::named("Ring A").stock(10, 2000)).await?;
///
/// // Get by ID
/// let ring = repo.get_by_id(ring.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    write_gate: WriteGate,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub(crate) fn new(pool: SqlitePool, write_gate: WriteGate) -> Self {
        ProductRepository { pool, write_gate }
    }

    /// Creates a product, or restocks the product with the same trimmed name.
    ///
    /// ## Existing Product
    /// - `stock` grows by `incoming_stock`
    /// - cost basis follows [`cost_after_restock`]
    /// - sale price is replaced only by a strictly positive incoming price
    /// - category is replaced unconditionally, an empty string included
    ///
    /// ## Returns
    /// * `Ok(Product)` - The product as stored after the upsert
    /// * `Err(DbError::Validation)` - Empty name, negative stock/cost/price
    pub async fn upsert(&self, request: ProductUpsert) -> DbResult<Product> {
        request.validate()?;
        let name = request.trimmed_name().to_string();

        let _guard = self.write_gate.lock().await;
        let mut tx = begin(&self.pool).await?;

        let existing: Option<Product> = sqlx::query_as(
            r#"
            SELECT
                id, name, category, unit_cost_cents, sale_price_cents,
                stock, total_sold, total_revenue_cents
            FROM products
            WHERE name = ?1
            "#,
        )
        .bind(&name)
        .fetch_optional(&mut *tx)
        .await?;

        let product = match existing {
            None => {
                debug!(name = %name, "Inserting product");

                let id = sqlx::query(
                    r#"
                    INSERT INTO products (
                        name, category, unit_cost_cents, sale_price_cents, stock
                    ) VALUES (?1, ?2, ?3, ?4, ?5)
                    "#,
                )
                .bind(&name)
                .bind(&request.category)
                .bind(request.incoming_unit_cost_cents as f64)
                .bind(request.incoming_sale_price_cents)
                .bind(request.incoming_stock)
                .execute(&mut *tx)
                .await?
                .last_insert_rowid();

                Product {
                    id,
                    name,
                    category: request.category,
                    unit_cost_cents: request.incoming_unit_cost_cents as f64,
                    sale_price_cents: request.incoming_sale_price_cents,
                    stock: request.incoming_stock,
                    total_sold: 0,
                    total_revenue_cents: 0,
                }
            }

            Some(mut product) => {
                debug!(id = product.id, incoming = request.incoming_stock, "Restocking product");

                let new_stock = checked_total("stock", product.stock, request.incoming_stock)?;
                product.unit_cost_cents = cost_after_restock(
                    product.stock,
                    product.unit_cost_cents,
                    request.incoming_stock,
                    request.incoming_unit_cost_cents,
                );
                product.stock = new_stock;
                if request.incoming_sale_price_cents > 0 {
                    product.sale_price_cents = request.incoming_sale_price_cents;
                }
                product.category = request.category;

                sqlx::query(
                    r#"
                    UPDATE products SET
                        category = ?2,
                        unit_cost_cents = ?3,
                        sale_price_cents = ?4,
                        stock = ?5
                    WHERE id = ?1
                    "#,
                )
                .bind(product.id)
                .bind(&product.category)
                .bind(product.unit_cost_cents)
                .bind(product.sale_price_cents)
                .bind(product.stock)
                .execute(&mut *tx)
                .await?;

                product
            }
        };

        commit(tx).await?;

        info!(id = product.id, name = %product.name, stock = product.stock, "Product saved");
        Ok(product)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Product found
    /// * `Err(DbError::NotFound)` - No product with this id
    pub async fn get_by_id(&self, id: i64) -> DbResult<Product> {
        let product: Option<Product> = sqlx::query_as(
            r#"
            SELECT
                id, name, category, unit_cost_cents, sale_price_cents,
                stock, total_sold, total_revenue_cents
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        product.ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Gets a product by its exact (trimmed) name.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as(
            r#"
            SELECT
                id, name, category, unit_cost_cents, sale_price_cents,
                stock, total_sold, total_revenue_cents
            FROM products
            WHERE name = ?1
            "#,
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists all products, sorted by name ascending.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as(
            r#"
            SELECT
                id, name, category, unit_cost_cents, sale_price_cents,
                stock, total_sold, total_revenue_cents
            FROM products
            ORDER BY name ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists products with stock at or below `threshold`, lowest stock first.
    pub async fn list_low_stock(&self, threshold: i64) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as(
            r#"
            SELECT
                id, name, category, unit_cost_cents, sale_price_cents,
                stock, total_sold, total_revenue_cents
            FROM products
            WHERE stock <= ?1
            ORDER BY stock ASC, name ASC
            "#,
        )
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Edits a product's name, category or sale price.
    ///
    /// An empty patch returns the product unchanged.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The product after the edit
    /// * `Err(DbError::NotFound)` - No product with this id
    /// * `Err(DbError::UniqueViolation)` - Another product already has the new name
    pub async fn update(&self, id: i64, patch: ProductPatch) -> DbResult<Product> {
        patch.validate()?;

        let _guard = self.write_gate.lock().await;
        let mut tx = begin(&self.pool).await?;

        let mut product: Product = sqlx::query_as(
            r#"
            SELECT
                id, name, category, unit_cost_cents, sale_price_cents,
                stock, total_sold, total_revenue_cents
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Product", id))?;

        if patch.is_empty() {
            return Ok(product);
        }

        if let Some(name) = patch.name {
            product.name = name.trim().to_string();
        }
        if let Some(category) = patch.category {
            product.category = category;
        }
        if let Some(cents) = patch.sale_price_cents {
            product.sale_price_cents = cents;
        }

        debug!(id, name = %product.name, "Updating product");

        sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                category = ?3,
                sale_price_cents = ?4
            WHERE id = ?1
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.sale_price_cents)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("name", &product.name),
            other => other,
        })?;

        commit(tx).await?;
        Ok(product)
    }

    /// Deletes a product row.
    ///
    /// Purchase and sale history that references the product is kept. Readers
    /// show it under the deleted-product placeholder.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let _guard = self.write_gate.lock().await;

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(id, "Product deleted");
        Ok(())
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Headline inventory numbers over the current product table.
    pub async fn inventory_summary(&self, low_stock_threshold: i64) -> DbResult<InventorySummary> {
        let products = self.list().await?;
        Ok(InventorySummary::from_products(&products, low_stock_threshold))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use crate::DbError;
    use stockbook_core::{ProductPatch, ProductUpsert};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_upsert_inserts_new_product() {
        let db = test_db().await;

        let ring = db
            .products()
            .upsert(
                ProductUpsert::named("  Ring A  ")
                    .category("Rings")
                    .stock(10, 2000)
                    .sale_price(5000),
            )
            .await
            .unwrap();

        assert_eq!(ring.name, "Ring A");
        assert_eq!(ring.category, "Rings");
        assert_eq!(ring.stock, 10);
        assert_eq!(ring.unit_cost_cents, 2000.0);
        assert_eq!(ring.sale_price_cents, 5000);
        assert_eq!(ring.total_sold, 0);
        assert_eq!(ring.total_revenue_cents, 0);

        let stored = db.products().get_by_id(ring.id).await.unwrap();
        assert_eq!(stored, ring);
    }

    #[tokio::test]
    async fn test_upsert_restocks_with_weighted_average() {
        let db = test_db().await;
        let repo = db.products();

        repo.upsert(ProductUpsert::named("Ring A").stock(10, 2000).sale_price(5000))
            .await
            .unwrap();
        let ring = repo
            .upsert(ProductUpsert::named("Ring A").stock(10, 3000))
            .await
            .unwrap();

        assert_eq!(ring.stock, 20);
        assert_eq!(ring.unit_cost_cents, 2500.0);
        // Zero incoming price keeps the old price
        assert_eq!(ring.sale_price_cents, 5000);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_without_incoming_stock_keeps_cost() {
        let db = test_db().await;
        let repo = db.products();

        repo.upsert(ProductUpsert::named("Watch").stock(4, 10000))
            .await
            .unwrap();
        let watch = repo
            .upsert(ProductUpsert::named("Watch").stock(0, 99999).sale_price(25000))
            .await
            .unwrap();

        assert_eq!(watch.stock, 4);
        assert_eq!(watch.unit_cost_cents, 10000.0);
        assert_eq!(watch.sale_price_cents, 25000);
    }

    #[tokio::test]
    async fn test_upsert_always_overwrites_category() {
        let db = test_db().await;
        let repo = db.products();

        repo.upsert(ProductUpsert::named("Glasses").category("Eyewear"))
            .await
            .unwrap();
        let glasses = repo.upsert(ProductUpsert::named("Glasses")).await.unwrap();

        assert_eq!(glasses.category, "");
    }

    #[tokio::test]
    async fn test_upsert_rejects_invalid_input_without_writing() {
        let db = test_db().await;

        let err = db
            .products()
            .upsert(ProductUpsert::named("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        let err = db
            .products()
            .upsert(ProductUpsert::named("Ring").stock(-1, 100))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = test_db().await;

        let err = db.products().get_by_id(42).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Product not found: 42");
    }

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let db = test_db().await;
        let repo = db.products();

        for name in ["Watch", "Bracelet", "Ring"] {
            repo.upsert(ProductUpsert::named(name)).await.unwrap();
        }

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Bracelet", "Ring", "Watch"]);
    }

    #[tokio::test]
    async fn test_list_low_stock_ascending() {
        let db = test_db().await;
        let repo = db.products();

        repo.upsert(ProductUpsert::named("Plenty").stock(50, 100)).await.unwrap();
        repo.upsert(ProductUpsert::named("Few").stock(3, 100)).await.unwrap();
        repo.upsert(ProductUpsert::named("Edge").stock(5, 100)).await.unwrap();
        repo.upsert(ProductUpsert::named("None")).await.unwrap();

        let low: Vec<(String, i64)> = repo
            .list_low_stock(5)
            .await
            .unwrap()
            .into_iter()
            .map(|p| (p.name, p.stock))
            .collect();

        assert_eq!(
            low,
            vec![
                ("None".to_string(), 0),
                ("Few".to_string(), 3),
                ("Edge".to_string(), 5),
            ]
        );
    }

    #[tokio::test]
    async fn test_find_by_name_trims() {
        let db = test_db().await;
        db.products().upsert(ProductUpsert::named("Ring A")).await.unwrap();

        assert!(db.products().find_by_name(" Ring A ").await.unwrap().is_some());
        assert!(db.products().find_by_name("Ring B").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_patch() {
        let db = test_db().await;
        let repo = db.products();
        let ring = repo
            .upsert(ProductUpsert::named("Ring").category("Rings").stock(3, 1500))
            .await
            .unwrap();

        let unchanged = repo.update(ring.id, ProductPatch::default()).await.unwrap();
        assert_eq!(unchanged, ring);

        let edited = repo
            .update(
                ring.id,
                ProductPatch {
                    name: Some(" Gold Ring ".to_string()),
                    sale_price_cents: Some(4500),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(edited.name, "Gold Ring");
        assert_eq!(edited.category, "Rings");
        assert_eq!(edited.sale_price_cents, 4500);
        assert_eq!(edited.stock, 3);
        assert_eq!(edited.unit_cost_cents, 1500.0);
        assert_eq!(repo.get_by_id(ring.id).await.unwrap(), edited);
    }

    #[tokio::test]
    async fn test_update_rename_to_existing_name() {
        let db = test_db().await;
        let repo = db.products();
        repo.upsert(ProductUpsert::named("Ring")).await.unwrap();
        let watch = repo.upsert(ProductUpsert::named("Watch")).await.unwrap();

        let err = repo
            .update(
                watch.id,
                ProductPatch {
                    name: Some("Ring".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert_eq!(repo.get_by_id(watch.id).await.unwrap().name, "Watch");
    }

    #[tokio::test]
    async fn test_update_unknown_product() {
        let db = test_db().await;

        let err = db
            .products()
            .update(7, ProductPatch::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete() {
        let db = test_db().await;
        let repo = db.products();
        let ring = repo.upsert(ProductUpsert::named("Ring")).await.unwrap();

        repo.delete(ring.id).await.unwrap();
        assert!(repo.get_by_id(ring.id).await.unwrap_err().is_not_found());
        assert!(repo.delete(ring.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let db = test_db().await;
        let repo = db.products();
        let first = repo.upsert(ProductUpsert::named("Ring")).await.unwrap();
        repo.delete(first.id).await.unwrap();

        let second = repo.upsert(ProductUpsert::named("Ring")).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_inventory_summary() {
        let db = test_db().await;
        let repo = db.products();
        repo.upsert(ProductUpsert::named("Ring").stock(10, 2000)).await.unwrap();
        repo.upsert(ProductUpsert::named("Watch").stock(2, 10000)).await.unwrap();

        let summary = repo.inventory_summary(5).await.unwrap();
        assert_eq!(summary.product_count, 2);
        assert_eq!(summary.units_in_stock, 12);
        assert_eq!(summary.low_stock_count, 1);
        assert_eq!(summary.stock_value_cents, 40000);
    }
}
