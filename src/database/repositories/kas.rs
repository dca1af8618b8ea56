//! Kas payment repository implementation

use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use crate::models::kas::{KasPayment, KasEntry};
use crate::utils::errors::DashboardError;
use crate::utils::helpers::MonthKey;

#[derive(Clone, Debug)]
pub struct KasRepository {
    pool: PgPool,
}

impl KasRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All payments, latest month first
    pub async fn list(&self) -> Result<Vec<KasPayment>, DashboardError> {
        let payments = sqlx::query_as::<_, KasPayment>(
            "SELECT id, month_key, year, member_id, amount, paid_at, status FROM kas_payments ORDER BY month_key DESC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Whether any payment exists for the month
    pub async fn month_exists(&self, month: MonthKey) -> Result<bool, DashboardError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM kas_payments WHERE month_key = $1")
            .bind(month.to_string())
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0 > 0)
    }

    /// Replace every payment of a month with the given entries
    pub async fn replace_month(&self, month: MonthKey, entries: &[KasEntry]) -> Result<(), DashboardError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM kas_payments WHERE month_key = $1")
            .bind(month.to_string())
            .execute(&mut *tx)
            .await?;

        Self::insert_entries(&mut *tx, month, entries).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Insert entries for a month without touching existing rows
    pub async fn insert_month(&self, month: MonthKey, entries: &[KasEntry]) -> Result<(), DashboardError> {
        let mut conn = self.pool.acquire().await?;
        Self::insert_entries(&mut *conn, month, entries).await
    }

    async fn insert_entries(conn: &mut PgConnection, month: MonthKey, entries: &[KasEntry]) -> Result<(), DashboardError> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO kas_payments (month_key, year, member_id, amount, paid_at, status) "
        );
        builder.push_values(entries, |mut row, entry| {
            row.push_bind(month.to_string())
                .push_bind(month.year())
                .push_bind(entry.member_id)
                .push_bind(entry.amount)
                .push_bind(entry.paid_at)
                .push_bind(entry.status);
        });
        builder.build().execute(conn).await?;

        Ok(())
    }
}
