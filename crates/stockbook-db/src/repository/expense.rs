//! # Expense Repository
//!
//! Expenses are a plain append-only list. They never touch products.

use sqlx::SqlitePool;
use tracing::info;

use super::WriteGate;
use crate::error::DbResult;
use stockbook_core::{Expense, NewExpense};

/// Repository for expense records.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
    write_gate: WriteGate,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub(crate) fn new(pool: SqlitePool, write_gate: WriteGate) -> Self {
        ExpenseRepository { pool, write_gate }
    }

    /// Appends an expense.
    ///
    /// `kind` and `description` are stored verbatim; an all-blank
    /// description is stored as `None`.
    pub async fn record(&self, expense: NewExpense) -> DbResult<Expense> {
        expense.validate()?;

        let kind = expense.kind;
        let description = expense.description.filter(|d| !d.trim().is_empty());

        let _guard = self.write_gate.lock().await;

        let id = sqlx::query(
            r#"
            INSERT INTO expenses (kind, description, amount_cents, date)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&kind)
        .bind(&description)
        .bind(expense.amount_cents)
        .bind(expense.date)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        info!(id, kind = %kind, amount_cents = expense.amount_cents, "Expense recorded");

        Ok(Expense {
            id,
            kind,
            description,
            amount_cents: expense.amount_cents,
            date: expense.date,
        })
    }

    /// Newest expenses first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<Expense>> {
        let expenses = sqlx::query_as(
            r#"
            SELECT id, kind, description, amount_cents, date
            FROM expenses
            ORDER BY date DESC, id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    /// Every expense in id order.
    pub async fn all(&self) -> DbResult<Vec<Expense>> {
        let expenses = sqlx::query_as(
            r#"
            SELECT id, kind, description, amount_cents, date
            FROM expenses
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use crate::DbError;
    use chrono::NaiveDate;
    use stockbook_core::NewExpense;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[tokio::test]
    async fn test_record_and_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let rent = db
            .expenses()
            .record(NewExpense {
                kind: " Rent ".to_string(),
                amount_cents: 120000,
                description: Some("   ".to_string()),
                date: day(1),
            })
            .await
            .unwrap();
        assert_eq!(rent.kind, " Rent ");
        assert_eq!(rent.description, None);

        db.expenses()
            .record(NewExpense {
                kind: String::new(),
                amount_cents: 0,
                description: Some(" Coffee ".to_string()),
                date: day(4),
            })
            .await
            .unwrap();

        let recent = db.expenses().recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].description.as_deref(), Some(" Coffee "));
        assert_eq!(recent[0].kind, "");
        assert_eq!(recent[1], rent);
    }

    #[tokio::test]
    async fn test_negative_amount_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db
            .expenses()
            .record(NewExpense {
                kind: "Rent".to_string(),
                amount_cents: -1,
                description: None,
                date: day(1),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Validation(_)));
        assert!(db.expenses().all().await.unwrap().is_empty());
    }
}
