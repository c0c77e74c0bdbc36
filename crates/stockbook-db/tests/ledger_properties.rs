//! End-to-end ledger properties against a real (in-memory) SQLite store.

use chrono::NaiveDate;
use stockbook_core::{
    NewExpense, NewPurchase, NewSale, Product, ProductUpsert, ResetOutcome, DELETED_PRODUCT_LABEL,
};
use stockbook_db::{Database, DbConfig};

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

async fn purchase(db: &Database, product: &Product, quantity: i64, unit_cost_cents: i64, on: NaiveDate) {
    db.purchases()
        .record(NewPurchase {
            product_id: product.id,
            quantity,
            unit_cost_cents,
            date: on,
        })
        .await
        .unwrap();
}

async fn sell(db: &Database, product: &Product, quantity: i64, unit_price_cents: i64, on: NaiveDate) {
    db.sales()
        .record(NewSale {
            product_id: product.id,
            quantity,
            unit_price_cents,
            date: on,
        })
        .await
        .unwrap();
}

async fn expense(db: &Database, amount_cents: i64, on: NaiveDate) {
    db.expenses()
        .record(NewExpense {
            kind: "Rent".to_string(),
            amount_cents,
            description: None,
            date: on,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn ring_scenario_end_to_end() {
    let db = test_db().await;
    let d = date(3, 14);

    let ring = db
        .products()
        .upsert(ProductUpsert::named("Ring A").sale_price(10000))
        .await
        .unwrap();

    purchase(&db, &ring, 10, 2000, d).await;
    let after_first = db.products().get_by_id(ring.id).await.unwrap();
    assert_eq!(after_first.stock, 10);
    assert_eq!(after_first.unit_cost_cents, 2000.0);

    purchase(&db, &ring, 10, 3000, d).await;
    let after_second = db.products().get_by_id(ring.id).await.unwrap();
    assert_eq!(after_second.stock, 20);
    assert_eq!(after_second.unit_cost_cents, 2500.0);

    sell(&db, &ring, 5, 10000, d).await;
    let after_sale = db.products().get_by_id(ring.id).await.unwrap();
    assert_eq!(after_sale.stock, 15);
    assert_eq!(after_sale.total_sold, 5);
    assert_eq!(after_sale.total_revenue_cents, 50000);

    let report = db.reports().compute(d, d).await.unwrap();
    assert_eq!(report.revenue_cents, 50000);
    assert_eq!(report.cost_of_goods_sold_cents, 12500);
    assert_eq!(report.top_products.len(), 1);
    assert_eq!(report.top_products[0].product_name, "Ring A");
    assert_eq!(report.top_products[0].quantity_sold, 5);
    assert_eq!(report.top_products[0].revenue_cents, 50000);
}

#[tokio::test]
async fn weighted_average_cost_over_purchase_sequence() {
    let db = test_db().await;
    let watch = db
        .products()
        .upsert(ProductUpsert::named("Watch").stock(3, 1000))
        .await
        .unwrap();

    let steps = [(4, 1500), (1, 999), (7, 2350), (2, 0)];
    let mut weighted_sum = 3.0 * 1000.0;
    let mut units = 3.0;

    for (qty, cost) in steps {
        purchase(&db, &watch, qty, cost, date(1, 2)).await;
        weighted_sum += qty as f64 * cost as f64;
        units += qty as f64;

        let stored = db.products().get_by_id(watch.id).await.unwrap();
        let expected = weighted_sum / units;
        assert!(
            (stored.unit_cost_cents - expected).abs() < 1e-6,
            "after +{qty} @ {cost}: stored {} expected {expected}",
            stored.unit_cost_cents
        );
    }
}

#[tokio::test]
async fn purchase_into_negative_stock_falls_back_to_incoming_cost() {
    let db = test_db().await;
    let glasses = db
        .products()
        .upsert(ProductUpsert::named("Glasses").stock(1, 500))
        .await
        .unwrap();

    sell(&db, &glasses, 6, 900, date(1, 1)).await;
    purchase(&db, &glasses, 5, 700, date(1, 2)).await;

    let stored = db.products().get_by_id(glasses.id).await.unwrap();
    assert_eq!(stored.stock, 0);
    assert_eq!(stored.unit_cost_cents, 700.0);

    // Back above zero: averaging resumes from the fallback cost
    purchase(&db, &glasses, 2, 1000, date(1, 3)).await;
    let stored = db.products().get_by_id(glasses.id).await.unwrap();
    assert_eq!(stored.stock, 2);
    assert_eq!(stored.unit_cost_cents, 1000.0);
}

#[tokio::test]
async fn sale_accounting_leaves_cost_unchanged() {
    let db = test_db().await;
    let ring = db
        .products()
        .upsert(ProductUpsert::named("Ring").stock(8, 1234))
        .await
        .unwrap();

    sell(&db, &ring, 3, 4999, date(2, 1)).await;

    let after = db.products().get_by_id(ring.id).await.unwrap();
    assert_eq!(after.stock, ring.stock - 3);
    assert_eq!(after.total_sold, ring.total_sold + 3);
    assert_eq!(after.total_revenue_cents, ring.total_revenue_cents + 3 * 4999);
    assert_eq!(after.unit_cost_cents, ring.unit_cost_cents);
}

#[tokio::test]
async fn reads_are_idempotent() {
    let db = test_db().await;
    let ring = db
        .products()
        .upsert(ProductUpsert::named("Ring").stock(5, 100))
        .await
        .unwrap();
    sell(&db, &ring, 2, 300, date(4, 1)).await;
    expense(&db, 50, date(4, 1)).await;

    assert_eq!(
        db.products().list().await.unwrap(),
        db.products().list().await.unwrap()
    );

    let first = db.reports().compute(date(4, 1), date(4, 30)).await.unwrap();
    let second = db.reports().compute(date(4, 1), date(4, 30)).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn report_is_additive_over_disjoint_ranges() {
    let db = test_db().await;
    let ring = db
        .products()
        .upsert(ProductUpsert::named("Ring").stock(100, 333))
        .await
        .unwrap();
    let watch = db
        .products()
        .upsert(ProductUpsert::named("Watch").stock(100, 1000))
        .await
        .unwrap();

    for day in 1..=20 {
        sell(&db, &ring, 1 + day as i64 % 3, 900, date(5, day)).await;
        if day % 4 == 0 {
            sell(&db, &watch, 1, 2500, date(5, day)).await;
        }
        if day % 5 == 0 {
            expense(&db, 700, date(5, day)).await;
        }
    }

    let (d1, d2, d3) = (date(5, 1), date(5, 9), date(5, 20));
    let left = db.reports().compute(d1, d2).await.unwrap();
    let right = db.reports().compute(date(5, 10), d3).await.unwrap();
    let whole = db.reports().compute(d1, d3).await.unwrap();

    assert_eq!(left.revenue_cents + right.revenue_cents, whole.revenue_cents);
    assert_eq!(
        left.total_expenses_cents + right.total_expenses_cents,
        whole.total_expenses_cents
    );
    // Unit costs here are whole cents, so per-range rounding is exact
    assert_eq!(
        left.cost_of_goods_sold_cents + right.cost_of_goods_sold_cents,
        whole.cost_of_goods_sold_cents
    );
}

#[tokio::test]
async fn top_products_are_sorted_by_quantity() {
    let db = test_db().await;
    let mut catalogue = Vec::new();
    for name in ["A", "B", "C", "D"] {
        catalogue.push(db.products().upsert(ProductUpsert::named(name)).await.unwrap());
    }

    for (idx, qty) in [(0, 2), (1, 9), (2, 2), (3, 5), (0, 1)] {
        sell(&db, &catalogue[idx], qty, 100, date(6, 1)).await;
    }

    let report = db.reports().compute(date(6, 1), date(6, 1)).await.unwrap();
    assert!(report
        .top_products
        .windows(2)
        .all(|pair| pair[0].quantity_sold >= pair[1].quantity_sold));

    let names: Vec<&str> = report
        .top_products
        .iter()
        .map(|t| t.product_name.as_str())
        .collect();
    assert_eq!(names, vec!["B", "D", "A", "C"]);
}

#[tokio::test]
async fn deleting_a_product_keeps_its_history() {
    let db = test_db().await;
    let ring = db
        .products()
        .upsert(ProductUpsert::named("Ring").stock(5, 100))
        .await
        .unwrap();
    purchase(&db, &ring, 2, 120, date(7, 1)).await;
    sell(&db, &ring, 1, 400, date(7, 2)).await;

    db.products().delete(ring.id).await.unwrap();

    let purchases = db.purchases().recent(10).await.unwrap();
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0].product_id, ring.id);
    assert_eq!(purchases[0].product_label(), DELETED_PRODUCT_LABEL);

    let sales = db.sales().recent(10).await.unwrap();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].product_label(), DELETED_PRODUCT_LABEL);

    let report = db.reports().compute(date(7, 1), date(7, 31)).await.unwrap();
    assert_eq!(report.revenue_cents, 400);
    assert_eq!(report.cost_of_goods_sold_cents, 0);
    assert_eq!(report.top_products[0].product_name, DELETED_PRODUCT_LABEL);
}

#[tokio::test]
async fn upsert_overwrites_category_but_keeps_price_on_zero() {
    let db = test_db().await;
    db.products()
        .upsert(
            ProductUpsert::named("Ring")
                .category("Rings")
                .sale_price(5000),
        )
        .await
        .unwrap();

    let ring = db
        .products()
        .upsert(ProductUpsert::named("Ring").stock(1, 100))
        .await
        .unwrap();

    assert_eq!(ring.category, "");
    assert_eq!(ring.sale_price_cents, 5000);
}

#[tokio::test]
async fn reset_without_confirmation_changes_nothing() {
    let db = test_db().await;
    let ring = db
        .products()
        .upsert(ProductUpsert::named("Ring").stock(5, 100))
        .await
        .unwrap();
    purchase(&db, &ring, 1, 100, date(8, 1)).await;
    sell(&db, &ring, 1, 200, date(8, 1)).await;
    expense(&db, 10, date(8, 1)).await;

    let before = db.reports().snapshot().await.unwrap();
    assert_eq!(db.reset_all(false).await.unwrap(), ResetOutcome::Skipped);
    assert_eq!(db.reports().snapshot().await.unwrap(), before);

    let outcome = db.reset_all(true).await.unwrap();
    assert_eq!(
        outcome,
        ResetOutcome::Cleared {
            products: 1,
            purchases: 1,
            sales: 1,
            expenses: 1,
        }
    );

    let after = db.reports().snapshot().await.unwrap();
    assert!(after.products.is_empty());
    assert!(after.purchases.is_empty());
    assert!(after.sales.is_empty());
    assert!(after.expenses.is_empty());
}

#[tokio::test]
async fn concurrent_sales_on_one_product_all_apply() {
    let db = test_db().await;
    let ring = db
        .products()
        .upsert(ProductUpsert::named("Ring").stock(100, 100))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let db = db.clone();
        let product_id = ring.id;
        handles.push(tokio::spawn(async move {
            db.sales()
                .record(NewSale {
                    product_id,
                    quantity: 2,
                    unit_price_cents: 150,
                    date: date(9, 1),
                })
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = db.products().get_by_id(ring.id).await.unwrap();
    assert_eq!(stored.stock, 60);
    assert_eq!(stored.total_sold, 40);
    assert_eq!(stored.total_revenue_cents, 6000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_purchases_on_a_file_store_lose_no_update() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::new(DbConfig::new(dir.path().join("ledger.db")).max_connections(4))
        .await
        .unwrap();
    let ring = db
        .products()
        .upsert(ProductUpsert::named("Ring").stock(10, 2000))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..24_i64 {
        let db = db.clone();
        let product_id = ring.id;
        handles.push(tokio::spawn(async move {
            db.purchases()
                .record(NewPurchase {
                    product_id,
                    quantity: 5,
                    unit_cost_cents: 1000 + 100 * i,
                    date: date(9, 2),
                })
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // stock stays positive, so the average is order-independent:
    // (10×2000 + 5×Σ(1000 + 100i)) / (10 + 24×5)
    let stored = db.products().get_by_id(ring.id).await.unwrap();
    assert_eq!(stored.stock, 130);
    assert!((stored.unit_cost_cents - 278_000.0 / 130.0).abs() < 1e-6);
    assert_eq!(db.purchases().all().await.unwrap().len(), 24);

    db.close().await;
}
