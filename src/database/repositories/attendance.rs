//! Attendance event and check-in repository implementation

use sqlx::PgPool;
use chrono::Utc;
use uuid::Uuid;
use crate::models::attendance::{
    AttendanceEvent, AttendanceCheckin, CreateAttendanceEventRequest, UpdateAttendanceEventRequest,
    CreateCheckinRequest,
};
use crate::utils::errors::DashboardError;

const EVENT_COLUMNS: &str =
    "id, title, description, date, start_time, end_time, is_active, token, token_expires_at, created_at, created_by_admin_id";

#[derive(Clone, Debug)]
pub struct AttendanceEventRepository {
    pool: PgPool,
}

impl AttendanceEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All attendance events, newest first
    pub async fn list(&self) -> Result<Vec<AttendanceEvent>, DashboardError> {
        let events = sqlx::query_as::<_, AttendanceEvent>(
            &format!("SELECT {} FROM attendance_events ORDER BY created_at DESC", EVENT_COLUMNS)
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Create an inactive event carrying an initial token
    pub async fn create(&self, request: &CreateAttendanceEventRequest, token: &str, expires_at: i64) -> Result<AttendanceEvent, DashboardError> {
        let event = sqlx::query_as::<_, AttendanceEvent>(&format!(
            r#"
            INSERT INTO attendance_events (title, description, date, start_time, end_time, is_active, token, token_expires_at, created_by_admin_id)
            VALUES ($1, $2, $3, $4, $5, FALSE, $6, $7, $8)
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.date)
        .bind(request.start_time)
        .bind(request.end_time)
        .bind(token)
        .bind(expires_at)
        .bind(request.created_by_admin_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Update the descriptive fields of an event
    pub async fn update(&self, id: Uuid, request: UpdateAttendanceEventRequest) -> Result<AttendanceEvent, DashboardError> {
        let event = sqlx::query_as::<_, AttendanceEvent>(&format!(
            r#"
            UPDATE attendance_events
            SET title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                date = COALESCE($5, date),
                start_time = CASE WHEN $6 THEN $7 ELSE start_time END,
                end_time = CASE WHEN $8 THEN $9 ELSE end_time END,
                updated_at = $10
            WHERE id = $1
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(id)
        .bind(request.title)
        .bind(request.description.is_some())
        .bind(request.description.flatten())
        .bind(request.date)
        .bind(request.start_time.is_some())
        .bind(request.start_time.flatten())
        .bind(request.end_time.is_some())
        .bind(request.end_time.flatten())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DashboardError::NotFound { entity: "attendance event", id })?;

        Ok(event)
    }

    /// Delete attendance event
    pub async fn delete(&self, id: Uuid) -> Result<(), DashboardError> {
        sqlx::query("DELETE FROM attendance_events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Make this the only active event, with a fresh token
    pub async fn activate_exclusive(&self, id: Uuid, token: &str, expires_at: i64) -> Result<(), DashboardError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE attendance_events SET is_active = FALSE, updated_at = $2 WHERE id <> $1 AND is_active")
            .bind(id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query(
            "UPDATE attendance_events SET is_active = TRUE, token = $2, token_expires_at = $3, updated_at = $4 WHERE id = $1"
        )
        .bind(id)
        .bind(token)
        .bind(expires_at)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DashboardError::NotFound { entity: "attendance event", id });
        }

        tx.commit().await?;
        Ok(())
    }

    /// Deactivate and clear the token
    pub async fn deactivate(&self, id: Uuid) -> Result<(), DashboardError> {
        sqlx::query(
            "UPDATE attendance_events SET is_active = FALSE, token = '', token_expires_at = 0, updated_at = $2 WHERE id = $1"
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Store a rotated token
    pub async fn set_token(&self, id: Uuid, token: &str, expires_at: i64) -> Result<(), DashboardError> {
        sqlx::query(
            "UPDATE attendance_events SET token = $2, token_expires_at = $3, updated_at = $4 WHERE id = $1"
        )
        .bind(id)
        .bind(token)
        .bind(expires_at)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct CheckinRepository {
    pool: PgPool,
}

impl CheckinRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All check-ins, most recent first
    pub async fn list(&self) -> Result<Vec<AttendanceCheckin>, DashboardError> {
        let checkins = sqlx::query_as::<_, AttendanceCheckin>(
            "SELECT id, event_id, member_id, checked_in_at, token_used FROM attendance_checkins ORDER BY checked_in_at DESC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(checkins)
    }

    /// Insert a check-in
    pub async fn create(&self, request: &CreateCheckinRequest) -> Result<AttendanceCheckin, DashboardError> {
        let checkin = sqlx::query_as::<_, AttendanceCheckin>(
            r#"
            INSERT INTO attendance_checkins (event_id, member_id, checked_in_at, token_used)
            VALUES ($1, $2, $3, $4)
            RETURNING id, event_id, member_id, checked_in_at, token_used
            "#
        )
        .bind(request.event_id)
        .bind(request.member_id)
        .bind(request.checked_in_at)
        .bind(&request.token_used)
        .fetch_one(&self.pool)
        .await?;

        Ok(checkin)
    }
}
