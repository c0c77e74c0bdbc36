//! Command-line argument definitions.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use stockbook_core::validation::parse_date;
use stockbook_core::Money;

#[derive(Debug, Parser)]
#[command(name = "stockbook")]
#[command(about = "Inventory and sales ledger for a small shop")]
#[command(version)]
pub struct Cli {
    /// Database file (overrides STOCKBOOK_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage products
    #[command(subcommand)]
    Product(ProductCommand),

    /// Record or list purchases (restocks)
    #[command(subcommand)]
    Purchase(PurchaseCommand),

    /// Record or list sales
    #[command(subcommand)]
    Sale(SaleCommand),

    /// Record or list expenses
    #[command(subcommand)]
    Expense(ExpenseCommand),

    /// Financial report for a date range
    Report(ReportArgs),

    /// Lifetime margin per product at current price and cost
    Margins,

    /// Inventory summary, today's figures and low stock
    Dashboard,

    /// Write every collection as JSON
    Export {
        /// Output file (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Delete ALL data (products, purchases, sales, expenses)
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    /// Create a product, or restock the product with the same name
    Add {
        /// Product name
        #[arg(long)]
        name: String,

        /// Category (replaces the current one, even when empty)
        #[arg(long, default_value = "")]
        category: String,

        /// Units received
        #[arg(long, default_value_t = 0)]
        stock: i64,

        /// Unit purchase cost of the received units, e.g. 12.50
        #[arg(long, value_parser = money_arg, default_value = "0")]
        cost: Money,

        /// Unit sale price; 0 keeps the current price
        #[arg(long, value_parser = money_arg, default_value = "0")]
        price: Money,
    },

    /// List all products by name
    List,

    /// Show one product
    Show {
        /// Product id
        id: i64,
    },

    /// Edit name, category or sale price
    Edit {
        /// Product id
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long, value_parser = money_arg)]
        price: Option<Money>,
    },

    /// Delete a product (its history is kept)
    Delete {
        /// Product id
        id: i64,

        /// Confirm the delete
        #[arg(long)]
        yes: bool,
    },

    /// Products at or below a stock threshold
    LowStock {
        /// Threshold (default: STOCKBOOK_LOW_STOCK_THRESHOLD)
        #[arg(long)]
        threshold: Option<i64>,
    },
}

#[derive(Debug, Subcommand)]
pub enum PurchaseCommand {
    /// Record a purchase
    Add {
        /// Product id
        #[arg(long)]
        product: i64,

        /// Units purchased
        #[arg(long)]
        qty: i64,

        /// Unit cost, e.g. 12.50
        #[arg(long, value_parser = money_arg)]
        cost: Money,

        /// Date (YYYY-MM-DD, default: today)
        #[arg(long, value_parser = date_arg)]
        date: Option<NaiveDate>,
    },

    /// Newest purchases first
    List(ListArgs),
}

#[derive(Debug, Subcommand)]
pub enum SaleCommand {
    /// Record a sale
    Add {
        /// Product id
        #[arg(long)]
        product: i64,

        /// Units sold
        #[arg(long)]
        qty: i64,

        /// Unit price (default: the product's sale price)
        #[arg(long, value_parser = money_arg)]
        price: Option<Money>,

        /// Date (YYYY-MM-DD, default: today)
        #[arg(long, value_parser = date_arg)]
        date: Option<NaiveDate>,

        /// Allow stock to go negative
        #[arg(long)]
        allow_oversell: bool,
    },

    /// Newest sales first
    List(ListArgs),
}

#[derive(Debug, Subcommand)]
pub enum ExpenseCommand {
    /// Record an expense
    Add {
        /// Expense type, e.g. Rent
        #[arg(long, default_value = "")]
        kind: String,

        /// Amount, e.g. 350.00
        #[arg(long, value_parser = money_arg)]
        amount: Money,

        #[arg(long)]
        description: Option<String>,

        /// Date (YYYY-MM-DD, default: today)
        #[arg(long, value_parser = date_arg)]
        date: Option<NaiveDate>,
    },

    /// Newest expenses first
    List(ListArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Maximum rows (default: STOCKBOOK_HISTORY_LIMIT)
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// First day, inclusive (YYYY-MM-DD, default: today)
    #[arg(long, value_parser = date_arg)]
    pub from: Option<NaiveDate>,

    /// Last day, inclusive (YYYY-MM-DD, default: today)
    #[arg(long, value_parser = date_arg)]
    pub to: Option<NaiveDate>,

    /// Best sellers to show (default: STOCKBOOK_TOP_PRODUCTS)
    #[arg(long)]
    pub top: Option<usize>,
}

fn money_arg(input: &str) -> Result<Money, String> {
    Money::parse("amount", input).map_err(|e| e.to_string())
}

fn date_arg(input: &str) -> Result<NaiveDate, String> {
    parse_date("date", input).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sale_add() {
        let cli = Cli::try_parse_from([
            "stockbook", "--json", "sale", "add", "--product", "3", "--qty", "2", "--price",
            "49.90", "--date", "2024-02-29",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Command::Sale(SaleCommand::Add {
                product,
                qty,
                price,
                date,
                allow_oversell,
            }) => {
                assert_eq!(product, 3);
                assert_eq!(qty, 2);
                assert_eq!(price, Some(Money::from_cents(4990)));
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 2, 29));
                assert!(!allow_oversell);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_bad_money_and_dates() {
        assert!(Cli::try_parse_from([
            "stockbook", "purchase", "add", "--product", "1", "--qty", "1", "--cost", "1.234",
        ])
        .is_err());

        assert!(Cli::try_parse_from(["stockbook", "report", "--from", "2024-13-01"]).is_err());
    }
}
