//! # Expense Repository
//!
//! Spending outside of purchases. Read by the dashboard for net profit.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use super::sortable_timestamp;
use crate::error::{DbError, DbResult};
use stockroom_core::validation::{validate_name, validate_price};
use stockroom_core::Expense;

#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Inserts or replaces an expense, assigning an id when empty.
    pub async fn save(&self, mut expense: Expense) -> DbResult<Expense> {
        validate_name("description", &expense.description)?;
        validate_price("amount", expense.amount_cents)?;
        if expense.id.is_empty() {
            expense.id = Uuid::new_v4().to_string();
        }

        debug!(id = %expense.id, amount_cents = expense.amount_cents, "Saving expense");

        sqlx::query(
            r#"
            INSERT INTO expenses (id, description, amount_cents, category, expense_date)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                description = excluded.description,
                amount_cents = excluded.amount_cents,
                category = excluded.category,
                expense_date = excluded.expense_date
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.description)
        .bind(expense.amount_cents)
        .bind(&expense.category)
        .bind(sortable_timestamp(expense.expense_date))
        .execute(&self.pool)
        .await?;

        Ok(expense)
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Expense", id));
        }
        Ok(())
    }

    /// Expenses dated within `[start, end]`, oldest first.
    pub async fn list_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<Expense>> {
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, description, amount_cents, category, expense_date
            FROM expenses
            WHERE expense_date >= ?1 AND expense_date <= ?2
            ORDER BY expense_date, id
            "#,
        )
        .bind(sortable_timestamp(start))
        .bind(sortable_timestamp(end))
        .fetch_all(&self.pool)
        .await?;
        Ok(expenses)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use chrono::{TimeZone, Utc};
    use stockroom_core::Expense;

    #[tokio::test]
    async fn test_list_between_is_inclusive() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.expenses();

        for (day, amount) in [(1, 5000), (15, 700), (28, 1200)] {
            repo.save(Expense {
                description: "Rent".to_string(),
                amount_cents: amount,
                expense_date: Utc.with_ymd_and_hms(2026, 2, day, 9, 0, 0).unwrap(),
                ..Default::default()
            })
            .await
            .unwrap();
        }

        let start = Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 2, 15, 9, 0, 0).unwrap();
        let found = repo.list_between(start, end).await.unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].amount_cents, 5000);
        assert_eq!(found[1].expense_date, end);
    }

    #[tokio::test]
    async fn test_negative_amount_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let result = db
            .expenses()
            .save(Expense {
                description: "Refund?".to_string(),
                amount_cents: -1,
                ..Default::default()
            })
            .await;
        assert!(result.is_err());
        assert!(db.expenses().delete("missing").await.unwrap_err().is_not_found());
    }
}
