//! Attendance event and check-in models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use crate::utils::helpers::deserialize_some;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceEvent {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub is_active: bool,
    /// Empty while the event is inactive
    pub token: String,
    /// Epoch milliseconds, 0 while the event is inactive
    pub token_expires_at: i64,
    pub created_at: DateTime<Utc>,
    pub created_by_admin_id: Uuid,
}

impl AttendanceEvent {
    /// Token matches and has not passed its expiry
    pub fn accepts_token(&self, token: &str, now_ms: i64) -> bool {
        self.is_active && self.token == token && now_ms <= self.token_expires_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAttendanceEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub created_by_admin_id: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAttendanceEventRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Option<NaiveTime>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Option<NaiveTime>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceCheckin {
    pub id: Uuid,
    pub event_id: Uuid,
    pub member_id: Uuid,
    /// Epoch milliseconds
    pub checked_in_at: i64,
    pub token_used: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCheckinRequest {
    pub event_id: Uuid,
    pub member_id: Uuid,
    pub checked_in_at: i64,
    pub token_used: String,
}
