//! Plain-text rendering of store and report results.
//!
//! Every `render_*` function returns the text instead of printing it, so the
//! layout can be tested.

use std::fmt::Write;

use stockbook_core::{
    Expense, InventorySummary, Money, Product, ProductMargin, PurchaseEntry, Report, SaleEntry,
};

pub fn render_products(products: &[Product]) -> String {
    if products.is_empty() {
        return "No products.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5}  {:<28} {:<14} {:>7} {:>11} {:>11} {:>6} {:>12}",
        "ID", "NAME", "CATEGORY", "STOCK", "COST", "PRICE", "SOLD", "REVENUE"
    );
    for p in products {
        let _ = writeln!(
            out,
            "{:>5}  {:<28} {:<14} {:>7} {:>11} {:>11} {:>6} {:>12}",
            p.id,
            truncate(&p.name, 28),
            truncate(&p.category, 14),
            p.stock,
            p.unit_cost().to_string(),
            p.sale_price().to_string(),
            p.total_sold,
            p.total_revenue().to_string(),
        );
    }
    out
}

pub fn render_product(p: &Product) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Product #{}", p.id);
    let _ = writeln!(out, "  Name:       {}", p.name);
    let _ = writeln!(out, "  Category:   {}", p.category);
    let _ = writeln!(out, "  Stock:      {}", p.stock);
    let _ = writeln!(out, "  Unit cost:  {} ({:.4} cents)", p.unit_cost(), p.unit_cost_cents);
    let _ = writeln!(out, "  Sale price: {}", p.sale_price());
    let _ = writeln!(out, "  Units sold: {}", p.total_sold);
    let _ = writeln!(out, "  Revenue:    {}", p.total_revenue());
    out
}

pub fn render_purchases(entries: &[PurchaseEntry]) -> String {
    if entries.is_empty() {
        return "No purchases.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5}  {:<10}  {:<28} {:>6} {:>11} {:>12}",
        "ID", "DATE", "PRODUCT", "QTY", "UNIT COST", "TOTAL"
    );
    for e in entries {
        let total = Money::from_cents(e.unit_cost_cents).multiply_quantity(e.quantity);
        let _ = writeln!(
            out,
            "{:>5}  {:<10}  {:<28} {:>6} {:>11} {:>12}",
            e.id,
            e.date,
            truncate(e.product_label(), 28),
            e.quantity,
            Money::from_cents(e.unit_cost_cents).to_string(),
            total.to_string(),
        );
    }
    out
}

pub fn render_sales(entries: &[SaleEntry]) -> String {
    if entries.is_empty() {
        return "No sales.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5}  {:<10}  {:<28} {:>6} {:>11} {:>12}",
        "ID", "DATE", "PRODUCT", "QTY", "UNIT PRICE", "TOTAL"
    );
    for e in entries {
        let _ = writeln!(
            out,
            "{:>5}  {:<10}  {:<28} {:>6} {:>11} {:>12}",
            e.id,
            e.date,
            truncate(e.product_label(), 28),
            e.quantity,
            Money::from_cents(e.unit_price_cents).to_string(),
            e.line_total().to_string(),
        );
    }
    out
}

pub fn render_expenses(expenses: &[Expense]) -> String {
    if expenses.is_empty() {
        return "No expenses.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5}  {:<10}  {:<16} {:>12}  {}",
        "ID", "DATE", "TYPE", "AMOUNT", "DESCRIPTION"
    );
    for e in expenses {
        let _ = writeln!(
            out,
            "{:>5}  {:<10}  {:<16} {:>12}  {}",
            e.id,
            e.date,
            truncate(&e.kind, 16),
            e.amount().to_string(),
            e.description.as_deref().unwrap_or(""),
        );
    }
    out
}

/// Report summary, the first `top` best sellers, then revenue per day.
pub fn render_report(report: &Report, top: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Report {} .. {}", report.from, report.to);
    let _ = writeln!(out, "  Revenue:            {:>12}", report.revenue().to_string());
    let _ = writeln!(out, "  Cost of goods sold: {:>12}", report.cost_of_goods_sold().to_string());
    let _ = writeln!(out, "  Expenses:           {:>12}", report.total_expenses().to_string());
    let _ = writeln!(out, "  Net profit:         {:>12}", report.net_profit().to_string());
    let _ = writeln!(out, "  Purchases:          {:>12}", report.total_purchases().to_string());
    let _ = writeln!(out, "  Sales:              {:>12}", report.sale_count);

    let best = report.top(top);
    if !best.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Top products");
        for (rank, t) in best.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {:>2}. {:<28} {:>6} {:>12}",
                rank + 1,
                truncate(&t.product_name, 28),
                t.quantity_sold,
                t.revenue().to_string(),
            );
        }
    }

    if !report.daily_revenue.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Daily revenue");
        for day in &report.daily_revenue {
            let _ = writeln!(
                out,
                "  {}  {:>12}",
                day.date,
                Money::from_cents(day.revenue_cents).to_string()
            );
        }
    }
    out
}

pub fn render_margins(margins: &[ProductMargin]) -> String {
    if margins.is_empty() {
        return "No products.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5}  {:<28} {:>11} {:>11} {:>6} {:>12}",
        "ID", "NAME", "COST", "PRICE", "SOLD", "MARGIN"
    );
    for m in margins {
        let _ = writeln!(
            out,
            "{:>5}  {:<28} {:>11} {:>11} {:>6} {:>12}",
            m.product_id,
            truncate(&m.product_name, 28),
            Money::from_fractional_cents(m.unit_cost_cents).to_string(),
            Money::from_cents(m.sale_price_cents).to_string(),
            m.units_sold,
            Money::from_cents(m.margin_cents).to_string(),
        );
    }
    out
}

pub fn render_summary(summary: &InventorySummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Inventory");
    let _ = writeln!(out, "  Products:        {}", summary.product_count);
    let _ = writeln!(out, "  Units in stock:  {}", summary.units_in_stock);
    let _ = writeln!(out, "  Stock value:     {}", summary.stock_value());
    let _ = writeln!(
        out,
        "  Low stock (<= {}): {}",
        summary.low_stock_threshold, summary.low_stock_count
    );
    out
}

/// Cuts `text` to at most `width` characters, marking the cut with `…`.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
