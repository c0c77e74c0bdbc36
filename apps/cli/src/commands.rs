//! Command handlers.
//!
//! Each handler turns parsed arguments into store calls and prints the
//! result, as a table or as JSON with `--json`.

use anyhow::{bail, Context as _, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;
use tracing::info;

use stockbook_core::validation::validate_date_range;
use stockbook_core::{
    Money, NewExpense, NewPurchase, NewSale, Product, ProductPatch, ProductUpsert, ResetOutcome,
};
use stockbook_db::Database;

use crate::cli::{
    Command, ExpenseCommand, ListArgs, ProductCommand, PurchaseCommand, ReportArgs, SaleCommand,
};
use crate::config::AppConfig;
use crate::render;

/// Everything a handler needs besides its own arguments.
pub struct Context {
    pub db: Database,
    pub config: AppConfig,
    pub json: bool,
    /// Default date for postings and reports.
    pub today: NaiveDate,
}

impl Context {
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            print!("{}", text(value));
        }
        Ok(())
    }

    fn limit(&self, args: &ListArgs) -> u32 {
        args.limit.unwrap_or(self.config.history_limit)
    }
}

pub async fn run(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::Product(cmd) => product(ctx, cmd).await,
        Command::Purchase(cmd) => purchase(ctx, cmd).await,
        Command::Sale(cmd) => sale(ctx, cmd).await,
        Command::Expense(cmd) => expense(ctx, cmd).await,
        Command::Report(args) => report(ctx, args).await,
        Command::Margins => {
            let margins = ctx.db.reports().profitability().await?;
            ctx.emit(&margins, |m| render::render_margins(m))
        }
        Command::Dashboard => dashboard(ctx).await,
        Command::Export { output } => export(ctx, output.as_deref()).await,
        Command::Reset { yes } => reset(ctx, yes).await,
    }
}

async fn product(ctx: &Context, cmd: ProductCommand) -> Result<()> {
    let products = ctx.db.products();

    match cmd {
        ProductCommand::Add {
            name,
            category,
            stock,
            cost,
            price,
        } => {
            let product = products
                .upsert(
                    ProductUpsert::named(name)
                        .category(category)
                        .stock(stock, cost.cents())
                        .sale_price(price.cents()),
                )
                .await
                .context("Failed to save product")?;
            ctx.emit(&product, render::render_product)
        }

        ProductCommand::List => {
            let list = products.list().await?;
            ctx.emit(&list, |p| render::render_products(p))
        }

        ProductCommand::Show { id } => {
            let product = products.get_by_id(id).await?;
            ctx.emit(&product, render::render_product)
        }

        ProductCommand::Edit {
            id,
            name,
            category,
            price,
        } => {
            let patch = ProductPatch {
                name,
                category,
                sale_price_cents: price.map(|p| p.cents()),
            };
            let product = products
                .update(id, patch)
                .await
                .with_context(|| format!("Failed to edit product {id}"))?;
            ctx.emit(&product, render::render_product)
        }

        ProductCommand::Delete { id, yes } => {
            if !yes {
                bail!("Refusing to delete product {id} without --yes");
            }
            products.delete(id).await?;
            info!(id, "Product deleted from CLI");
            ctx.emit(&serde_json::json!({ "deleted": id }), |_| {
                format!("Deleted product {id}. Its purchase and sale history is kept.\n")
            })
        }

        ProductCommand::LowStock { threshold } => {
            let threshold = threshold.unwrap_or(ctx.config.low_stock_threshold);
            let list = products.list_low_stock(threshold).await?;
            ctx.emit(&list, |p| render::render_products(p))
        }
    }
}

async fn purchase(ctx: &Context, cmd: PurchaseCommand) -> Result<()> {
    match cmd {
        PurchaseCommand::Add {
            product,
            qty,
            cost,
            date,
        } => {
            let purchase = ctx
                .db
                .purchases()
                .record(NewPurchase {
                    product_id: product,
                    quantity: qty,
                    unit_cost_cents: cost.cents(),
                    date: date.unwrap_or(ctx.today),
                })
                .await
                .context("Failed to record purchase")?;
            let product = ctx.db.products().get_by_id(product).await?;
            ctx.emit(&purchase, |p| {
                format!(
                    "Recorded purchase #{}: {} x {} of {}. Stock now {}, unit cost {}.\n",
                    p.id,
                    p.quantity,
                    Money::from_cents(p.unit_cost_cents),
                    product.name,
                    product.stock,
                    product.unit_cost(),
                )
            })
        }

        PurchaseCommand::List(args) => {
            let entries = ctx.db.purchases().recent(ctx.limit(&args)).await?;
            ctx.emit(&entries, |e| render::render_purchases(e))
        }
    }
}

async fn sale(ctx: &Context, cmd: SaleCommand) -> Result<()> {
    match cmd {
        SaleCommand::Add {
            product,
            qty,
            price,
            date,
            allow_oversell,
        } => {
            let current = ctx.db.products().get_by_id(product).await?;
            check_oversell(&current, qty, allow_oversell)?;

            let unit_price = price.unwrap_or_else(|| current.sale_price());
            let sale = ctx
                .db
                .sales()
                .record(NewSale {
                    product_id: product,
                    quantity: qty,
                    unit_price_cents: unit_price.cents(),
                    date: date.unwrap_or(ctx.today),
                })
                .await
                .context("Failed to record sale")?;
            ctx.emit(&sale, |s| {
                format!(
                    "Recorded sale #{}: {} x {} of {} = {}. Stock now {}.\n",
                    s.id,
                    s.quantity,
                    unit_price,
                    current.name,
                    s.line_total(),
                    current.stock.saturating_sub(s.quantity),
                )
            })
        }

        SaleCommand::List(args) => {
            let entries = ctx.db.sales().recent(ctx.limit(&args)).await?;
            ctx.emit(&entries, |e| render::render_sales(e))
        }
    }
}

/// Refuses a sale that would take stock below zero, unless allowed.
///
/// The store itself accepts oversells; this guard is the host's choice.
pub fn check_oversell(product: &Product, quantity: i64, allow_oversell: bool) -> Result<()> {
    if !allow_oversell && quantity > product.stock {
        bail!(
            "Only {} of '{}' in stock, cannot sell {} (use --allow-oversell to override)",
            product.stock,
            product.name,
            quantity
        );
    }
    Ok(())
}

async fn expense(ctx: &Context, cmd: ExpenseCommand) -> Result<()> {
    match cmd {
        ExpenseCommand::Add {
            kind,
            amount,
            description,
            date,
        } => {
            let expense = ctx
                .db
                .expenses()
                .record(NewExpense {
                    kind,
                    amount_cents: amount.cents(),
                    description,
                    date: date.unwrap_or(ctx.today),
                })
                .await
                .context("Failed to record expense")?;
            ctx.emit(&expense, |e| {
                format!("Recorded expense #{}: {} {}.\n", e.id, e.kind, e.amount())
            })
        }

        ExpenseCommand::List(args) => {
            let expenses = ctx.db.expenses().recent(ctx.limit(&args)).await?;
            ctx.emit(&expenses, |e| render::render_expenses(e))
        }
    }
}

async fn report(ctx: &Context, args: ReportArgs) -> Result<()> {
    let from = args.from.unwrap_or(ctx.today);
    let to = args.to.unwrap_or(ctx.today);
    validate_date_range(from, to)?;

    let report = ctx.db.reports().compute(from, to).await?;
    let top = args.top.unwrap_or(ctx.config.top_products);
    ctx.emit(&report, |r| render::render_report(r, top))
}

#[derive(Serialize)]
struct Dashboard {
    inventory: stockbook_core::InventorySummary,
    today: stockbook_core::Report,
    low_stock: Vec<Product>,
}

async fn dashboard(ctx: &Context) -> Result<()> {
    let threshold = ctx.config.low_stock_threshold;
    let dashboard = Dashboard {
        inventory: ctx.db.products().inventory_summary(threshold).await?,
        today: ctx.db.reports().compute(ctx.today, ctx.today).await?,
        low_stock: ctx.db.products().list_low_stock(threshold).await?,
    };

    ctx.emit(&dashboard, |d| {
        let mut text = render::render_summary(&d.inventory);
        text.push('\n');
        text.push_str(&render::render_report(&d.today, ctx.config.top_products));
        if !d.low_stock.is_empty() {
            text.push_str("\nLow stock\n");
            text.push_str(&render::render_products(&d.low_stock));
        }
        text
    })
}

async fn export(ctx: &Context, output: Option<&Path>) -> Result<()> {
    let snapshot = ctx.db.reports().snapshot().await?;
    let body = serde_json::to_string_pretty(&snapshot)?;

    match output {
        Some(path) => {
            std::fs::write(path, body)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Ledger exported");
            eprintln!(
                "Exported {} products, {} purchases, {} sales, {} expenses to {}",
                snapshot.products.len(),
                snapshot.purchases.len(),
                snapshot.sales.len(),
                snapshot.expenses.len(),
                path.display()
            );
        }
        None => println!("{body}"),
    }
    Ok(())
}

async fn reset(ctx: &Context, confirmed: bool) -> Result<()> {
    let outcome = ctx.db.reset_all(confirmed).await?;
    ctx.emit(&outcome, |o| match o {
        ResetOutcome::Skipped => "Nothing deleted. Pass --yes to erase all data.\n".to_string(),
        ResetOutcome::Cleared {
            products,
            purchases,
            sales,
            expenses,
        } => format!(
            "Deleted {products} products, {purchases} purchases, {sales} sales, {expenses} expenses.\n"
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_with_stock(stock: i64) -> Product {
        Product {
            id: 1,
            name: "Ring".to_string(),
            category: String::new(),
            unit_cost_cents: 0.0,
            sale_price_cents: 0,
            stock,
            total_sold: 0,
            total_revenue_cents: 0,
        }
    }

    #[test]
    fn test_oversell_guard() {
        let ring = product_with_stock(3);

        assert!(check_oversell(&ring, 3, false).is_ok());
        assert!(check_oversell(&ring, 4, true).is_ok());

        let err = check_oversell(&ring, 4, false).unwrap_err();
        assert!(err.to_string().contains("Only 3 of 'Ring' in stock"));
    }

    #[test]
    fn test_oversell_guard_on_negative_stock() {
        assert!(check_oversell(&product_with_stock(-2), 1, false).is_err());
    }
}
