//! Account application repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use uuid::Uuid;
use crate::models::application::{AccountApplication, ApplicationForm, ApplicationStatus};
use crate::utils::errors::DashboardError;

#[derive(Clone, Debug)]
pub struct ApplicationRepository {
    pool: PgPool,
}

impl ApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All applications, newest first
    pub async fn list(&self) -> Result<Vec<AccountApplication>, DashboardError> {
        let applications = sqlx::query_as::<_, AccountApplication>(
            "SELECT * FROM account_applications ORDER BY submitted_at DESC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(applications)
    }

    /// Find application by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AccountApplication>, DashboardError> {
        let application = sqlx::query_as::<_, AccountApplication>(
            "SELECT * FROM account_applications WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(application)
    }

    /// Store a new pending application
    pub async fn create(&self, form: &ApplicationForm) -> Result<AccountApplication, DashboardError> {
        let profile = &form.profile;
        let application = sqlx::query_as::<_, AccountApplication>(
            r#"
            INSERT INTO account_applications (full_name, birth_place, birth_date, rt, phone, instagram, job, grade, university, joined_whatsapp, education_status, education_level, username, password, status, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, 'pending', $15)
            RETURNING *
            "#
        )
        .bind(&profile.full_name)
        .bind(&profile.birth_place)
        .bind(profile.birth_date)
        .bind(profile.rt)
        .bind(&profile.phone)
        .bind(&profile.instagram)
        .bind(&profile.job)
        .bind(&profile.grade)
        .bind(&profile.university)
        .bind(profile.joined_whatsapp)
        .bind(profile.education_status)
        .bind(profile.education_level)
        .bind(&form.username)
        .bind(&form.password)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(application)
    }

    /// Mark an application as reviewed
    pub async fn set_status(&self, id: Uuid, status: ApplicationStatus, admin_id: Uuid) -> Result<(), DashboardError> {
        let mut conn = self.pool.acquire().await?;
        Self::review(&mut *conn, id, status, admin_id).await
    }

    /// Review stamp on an existing connection or transaction
    pub async fn review(conn: &mut PgConnection, id: Uuid, status: ApplicationStatus, admin_id: Uuid) -> Result<(), DashboardError> {
        let result = sqlx::query(
            r#"
            UPDATE account_applications
            SET status = $2, reviewed_at = $3, reviewed_by_admin_id = $4, updated_at = $3
            WHERE id = $1
            "#
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .bind(admin_id)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DashboardError::NotFound { entity: "application", id });
        }

        Ok(())
    }

    /// Username claimed by a pending or approved application
    pub async fn username_taken(&self, username: &str) -> Result<bool, DashboardError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM account_applications WHERE username = $1 AND status <> 'rejected'"
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0 > 0)
    }

    /// Phone claimed by a pending or approved application
    pub async fn phone_taken(&self, phone: &str) -> Result<bool, DashboardError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM account_applications WHERE phone = $1 AND status <> 'rejected'"
        )
        .bind(phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0 > 0)
    }
}
