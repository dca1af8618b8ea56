//! Payment item and record repository implementation

use sqlx::PgPool;
use chrono::Utc;
use uuid::Uuid;
use crate::models::payment::{
    PaymentItem, PaymentRecord, PaymentStatus, CreatePaymentItemRequest, UpdatePaymentItemRequest,
};
use crate::utils::errors::DashboardError;

#[derive(Clone, Debug)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All payment items, newest first
    pub async fn list_items(&self) -> Result<Vec<PaymentItem>, DashboardError> {
        let items = sqlx::query_as::<_, PaymentItem>(
            "SELECT id, title, deadline_date, type, amount, description, is_active, created_at FROM payment_items ORDER BY created_at DESC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Create an active payment item
    pub async fn create_item(&self, request: &CreatePaymentItemRequest) -> Result<PaymentItem, DashboardError> {
        let item = sqlx::query_as::<_, PaymentItem>(
            r#"
            INSERT INTO payment_items (title, deadline_date, type, amount, description, is_active)
            VALUES ($1, $2, $3, $4, $5, TRUE)
            RETURNING id, title, deadline_date, type, amount, description, is_active, created_at
            "#
        )
        .bind(&request.title)
        .bind(request.deadline_date)
        .bind(request.kind)
        .bind(request.amount)
        .bind(&request.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    /// Update payment item
    pub async fn update_item(&self, id: Uuid, request: UpdatePaymentItemRequest) -> Result<PaymentItem, DashboardError> {
        let item = sqlx::query_as::<_, PaymentItem>(
            r#"
            UPDATE payment_items
            SET title = COALESCE($2, title),
                deadline_date = COALESCE($3, deadline_date),
                type = COALESCE($4, type),
                amount = COALESCE($5, amount),
                description = CASE WHEN $6 THEN $7 ELSE description END,
                is_active = COALESCE($8, is_active),
                updated_at = $9
            WHERE id = $1
            RETURNING id, title, deadline_date, type, amount, description, is_active, created_at
            "#
        )
        .bind(id)
        .bind(request.title)
        .bind(request.deadline_date)
        .bind(request.kind)
        .bind(request.amount)
        .bind(request.description.is_some())
        .bind(request.description.flatten())
        .bind(request.is_active)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DashboardError::NotFound { entity: "payment item", id })?;

        Ok(item)
    }

    /// Delete payment item and its records
    pub async fn delete_item(&self, id: Uuid) -> Result<(), DashboardError> {
        sqlx::query("DELETE FROM payment_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Records of one payment item
    pub async fn records_for_item(&self, item_id: Uuid) -> Result<Vec<PaymentRecord>, DashboardError> {
        let records = sqlx::query_as::<_, PaymentRecord>(
            "SELECT id, payment_item_id, member_id, amount_paid, status, last_payment_date, notes, created_at FROM payment_records WHERE payment_item_id = $1"
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Record of one member for one item
    pub async fn find_record(&self, item_id: Uuid, member_id: Uuid) -> Result<Option<PaymentRecord>, DashboardError> {
        let record = sqlx::query_as::<_, PaymentRecord>(
            "SELECT id, payment_item_id, member_id, amount_paid, status, last_payment_date, notes, created_at FROM payment_records WHERE payment_item_id = $1 AND member_id = $2"
        )
        .bind(item_id)
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Insert or overwrite the (item, member) record
    pub async fn upsert_record(&self, item_id: Uuid, member_id: Uuid, amount_paid: i64, status: PaymentStatus) -> Result<PaymentRecord, DashboardError> {
        let record = sqlx::query_as::<_, PaymentRecord>(
            r#"
            INSERT INTO payment_records (payment_item_id, member_id, amount_paid, status, last_payment_date)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (payment_item_id, member_id)
            DO UPDATE SET
                amount_paid = EXCLUDED.amount_paid,
                status = EXCLUDED.status,
                last_payment_date = EXCLUDED.last_payment_date,
                updated_at = EXCLUDED.last_payment_date
            RETURNING id, payment_item_id, member_id, amount_paid, status, last_payment_date, notes, created_at
            "#
        )
        .bind(item_id)
        .bind(member_id)
        .bind(amount_paid)
        .bind(status)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }
}
