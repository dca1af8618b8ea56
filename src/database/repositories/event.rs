//! Calendar event repository implementation

use sqlx::PgPool;
use uuid::Uuid;
use crate::models::event::{Event, CreateEventRequest};
use crate::utils::errors::DashboardError;

#[derive(Clone, Debug)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All events in date order
    pub async fn list(&self) -> Result<Vec<Event>, DashboardError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT id, title, date, type, description, created_at FROM events ORDER BY date ASC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Create a new event
    pub async fn create(&self, request: &CreateEventRequest) -> Result<Event, DashboardError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (title, date, type, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, date, type, description, created_at
            "#
        )
        .bind(&request.title)
        .bind(request.date)
        .bind(request.kind)
        .bind(&request.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Delete event
    pub async fn delete(&self, id: Uuid) -> Result<(), DashboardError> {
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
