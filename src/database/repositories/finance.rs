//! Finance transaction repository implementation

use sqlx::PgPool;
use chrono::Utc;
use uuid::Uuid;
use crate::models::finance::{FinanceTransaction, CreateTransactionRequest, UpdateTransactionRequest};
use crate::utils::errors::DashboardError;

#[derive(Clone, Debug)]
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All transactions, most recent date first
    pub async fn list(&self) -> Result<Vec<FinanceTransaction>, DashboardError> {
        let transactions = sqlx::query_as::<_, FinanceTransaction>(
            "SELECT id, type, category, title, amount, date, note, created_at FROM finance_transactions ORDER BY date DESC, created_at DESC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Create a new transaction
    pub async fn create(&self, request: &CreateTransactionRequest) -> Result<FinanceTransaction, DashboardError> {
        let transaction = sqlx::query_as::<_, FinanceTransaction>(
            r#"
            INSERT INTO finance_transactions (type, category, title, amount, date, note)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, type, category, title, amount, date, note, created_at
            "#
        )
        .bind(request.kind)
        .bind(&request.category)
        .bind(&request.title)
        .bind(request.amount)
        .bind(request.date)
        .bind(&request.note)
        .fetch_one(&self.pool)
        .await?;

        Ok(transaction)
    }

    /// Update transaction
    pub async fn update(&self, id: Uuid, request: UpdateTransactionRequest) -> Result<FinanceTransaction, DashboardError> {
        let transaction = sqlx::query_as::<_, FinanceTransaction>(
            r#"
            UPDATE finance_transactions
            SET type = COALESCE($2, type),
                category = COALESCE($3, category),
                title = COALESCE($4, title),
                amount = COALESCE($5, amount),
                date = COALESCE($6, date),
                note = CASE WHEN $7 THEN $8 ELSE note END,
                updated_at = $9
            WHERE id = $1
            RETURNING id, type, category, title, amount, date, note, created_at
            "#
        )
        .bind(id)
        .bind(request.kind)
        .bind(request.category)
        .bind(request.title)
        .bind(request.amount)
        .bind(request.date)
        .bind(request.note.is_some())
        .bind(request.note.flatten())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DashboardError::NotFound { entity: "transaction", id })?;

        Ok(transaction)
    }

    /// Delete transaction
    pub async fn delete(&self, id: Uuid) -> Result<(), DashboardError> {
        sqlx::query("DELETE FROM finance_transactions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
