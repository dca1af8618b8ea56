//! Account application model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use crate::models::member::MemberProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AccountApplication {
    pub id: Uuid,
    #[sqlx(flatten)]
    pub profile: MemberProfile,
    pub username: String,
    pub password: String,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by_admin_id: Option<Uuid>,
}

impl AccountApplication {
    pub fn is_pending(&self) -> bool {
        self.status == ApplicationStatus::Pending
    }
}

/// Registration form submitted by a prospective member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationForm {
    pub profile: MemberProfile,
    pub username: String,
    pub password: String,
}

/// Which registration fields are already in use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateCheck {
    pub username_taken: bool,
    pub phone_taken: bool,
}

impl DuplicateCheck {
    pub fn any(&self) -> bool {
        self.username_taken || self.phone_taken
    }
}
