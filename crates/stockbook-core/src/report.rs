//! # Report Engine
//!
//! Pure aggregation over a [`LedgerSnapshot`] for a calendar-date range.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     compute_report(snapshot, from, to)                  │
//! │                                                                         │
//! │  sales / purchases / expenses                                          │
//! │       │  keep rows with from ≤ date ≤ to (inclusive, by day)           │
//! │       ▼                                                                 │
//! │  revenue        = Σ unit_price × qty                                   │
//! │  cost_of_goods  = Σ product.CURRENT unit_cost × qty                    │
//! │  expenses       = Σ amount                                             │
//! │  net_profit     = revenue − cost_of_goods − expenses                   │
//! │       │                                                                 │
//! │       ├──► top_products : group by product, qty desc (stable)          │
//! │       └──► daily_revenue: group by date, ascending, no gap filling     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Known Limitation
//! Cost of goods sold uses each product's cost basis *at query time*, not the
//! cost in force when the sale happened. A later purchase at a different
//! price therefore changes the cost of goods of earlier periods. Sales of a
//! deleted product contribute zero cost.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{LedgerSnapshot, Product};
use crate::DELETED_PRODUCT_LABEL;

// =============================================================================
// Report Types
// =============================================================================

/// Financial summary for a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Report {
    #[ts(as = "String")]
    pub from: NaiveDate,
    #[ts(as = "String")]
    pub to: NaiveDate,
    pub revenue_cents: i64,
    /// Rounded to whole cents once, after summing fractional costs.
    pub cost_of_goods_sold_cents: i64,
    pub total_expenses_cents: i64,
    pub net_profit_cents: i64,
    /// Spend on purchases in range. Informational, not part of net profit.
    pub total_purchases_cents: i64,
    pub sale_count: u64,
    /// Every product sold in range, most units first.
    pub top_products: Vec<TopProduct>,
    /// Days with at least one sale, oldest first.
    pub daily_revenue: Vec<DailyRevenue>,
}

impl Report {
    pub fn revenue(&self) -> Money {
        Money::from_cents(self.revenue_cents)
    }

    pub fn cost_of_goods_sold(&self) -> Money {
        Money::from_cents(self.cost_of_goods_sold_cents)
    }

    pub fn total_expenses(&self) -> Money {
        Money::from_cents(self.total_expenses_cents)
    }

    pub fn net_profit(&self) -> Money {
        Money::from_cents(self.net_profit_cents)
    }

    pub fn total_purchases(&self) -> Money {
        Money::from_cents(self.total_purchases_cents)
    }

    /// The first `n` entries of `top_products`.
    pub fn top(&self, n: usize) -> &[TopProduct] {
        &self.top_products[..n.min(self.top_products.len())]
    }
}

/// Units and revenue of one product within a report range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TopProduct {
    pub product_id: i64,
    /// Current name, or the deleted-product placeholder.
    pub product_name: String,
    pub quantity_sold: i64,
    pub revenue_cents: i64,
}

impl TopProduct {
    pub fn revenue(&self) -> Money {
        Money::from_cents(self.revenue_cents)
    }
}

/// Revenue of one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyRevenue {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub revenue_cents: i64,
}

// =============================================================================
// compute_report
// =============================================================================

/// Aggregates the snapshot over `[from, to]`.
///
/// Pure: the result depends only on `snapshot` and the range. An inverted
/// range matches no row and yields an all-zero report.
pub fn compute_report(snapshot: &LedgerSnapshot, from: NaiveDate, to: NaiveDate) -> Report {
    let in_range = |date: NaiveDate| from <= date && date <= to;

    let products: HashMap<i64, &Product> = snapshot.products.iter().map(|p| (p.id, p)).collect();

    let mut revenue = Money::zero();
    let mut cost_of_goods = 0.0_f64;
    let mut sale_count = 0_u64;

    let mut top_products: Vec<TopProduct> = Vec::new();
    let mut top_index: HashMap<i64, usize> = HashMap::new();
    let mut by_day: BTreeMap<NaiveDate, Money> = BTreeMap::new();

    for sale in snapshot.sales.iter().filter(|s| in_range(s.date)) {
        let line = sale.line_total();
        let product = products.get(&sale.product_id);

        revenue += line;
        sale_count += 1;
        cost_of_goods += product.map_or(0.0, |p| p.unit_cost_cents) * sale.quantity as f64;

        let slot = *top_index.entry(sale.product_id).or_insert_with(|| {
            top_products.push(TopProduct {
                product_id: sale.product_id,
                product_name: product
                    .map_or(DELETED_PRODUCT_LABEL, |p| p.name.as_str())
                    .to_string(),
                quantity_sold: 0,
                revenue_cents: 0,
            });
            top_products.len() - 1
        });
        let top = &mut top_products[slot];
        top.quantity_sold = top.quantity_sold.saturating_add(sale.quantity);
        top.revenue_cents = top.revenue_cents.saturating_add(line.cents());

        *by_day.entry(sale.date).or_default() += line;
    }

    // Stable: equal quantities keep first-sold order.
    top_products.sort_by(|a, b| b.quantity_sold.cmp(&a.quantity_sold));

    let total_expenses: Money = snapshot
        .expenses
        .iter()
        .filter(|e| in_range(e.date))
        .map(|e| e.amount())
        .sum();

    let total_purchases: Money = snapshot
        .purchases
        .iter()
        .filter(|p| in_range(p.date))
        .map(|p| p.line_total())
        .sum();

    let cost_of_goods = Money::from_fractional_cents(cost_of_goods);
    let net_profit = revenue - cost_of_goods - total_expenses;

    Report {
        from,
        to,
        revenue_cents: revenue.cents(),
        cost_of_goods_sold_cents: cost_of_goods.cents(),
        total_expenses_cents: total_expenses.cents(),
        net_profit_cents: net_profit.cents(),
        total_purchases_cents: total_purchases.cents(),
        sale_count,
        top_products,
        daily_revenue: by_day
            .into_iter()
            .map(|(date, revenue)| DailyRevenue {
                date,
                revenue_cents: revenue.cents(),
            })
            .collect(),
    }
}

// =============================================================================
// Profitability
// =============================================================================

/// Lifetime margin of one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductMargin {
    pub product_id: i64,
    pub product_name: String,
    pub unit_cost_cents: f64,
    pub sale_price_cents: i64,
    pub units_sold: i64,
    /// (sale price − unit cost) × units sold, rounded to cents.
    pub margin_cents: i64,
}

/// Margin per product at current price and cost, highest first.
///
/// Uses the list price, not the prices actually charged, so it estimates
/// what the catalogue earns rather than restating revenue.
pub fn profitability(products: &[Product]) -> Vec<ProductMargin> {
    let mut margins: Vec<ProductMargin> = products
        .iter()
        .map(|p| ProductMargin {
            product_id: p.id,
            product_name: p.name.clone(),
            unit_cost_cents: p.unit_cost_cents,
            sale_price_cents: p.sale_price_cents,
            units_sold: p.total_sold,
            margin_cents: Money::from_fractional_cents(
                (p.sale_price_cents as f64 - p.unit_cost_cents) * p.total_sold as f64,
            )
            .cents(),
        })
        .collect();

    margins.sort_by(|a, b| b.margin_cents.cmp(&a.margin_cents));
    margins
}

// =============================================================================
// Inventory Summary
// =============================================================================

/// Headline numbers for a dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventorySummary {
    pub product_count: u64,
    /// Σ stock, negative stock included.
    pub units_in_stock: i64,
    pub low_stock_count: u64,
    pub low_stock_threshold: i64,
    /// Σ positive stock × unit cost, rounded to cents.
    pub stock_value_cents: i64,
}

impl InventorySummary {
    pub fn from_products(products: &[Product], low_stock_threshold: i64) -> Self {
        let stock_value: f64 = products
            .iter()
            .map(|p| p.stock.max(0) as f64 * p.unit_cost_cents)
            .sum();

        InventorySummary {
            product_count: products.len() as u64,
            units_in_stock: products
                .iter()
                .fold(0_i64, |acc, p| acc.saturating_add(p.stock)),
            low_stock_count: products
                .iter()
                .filter(|p| p.is_low_stock(low_stock_threshold))
                .count() as u64,
            low_stock_threshold,
            stock_value_cents: Money::from_fractional_cents(stock_value).cents(),
        }
    }

    pub fn stock_value(&self) -> Money {
        Money::from_cents(self.stock_value_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
