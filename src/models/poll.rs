//! Poll models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "poll_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PollKind {
    General,
    Election,
    Survey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "poll_question_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "poll_result_visibility", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ResultVisibility {
    Always,
    AfterVote,
    AfterClose,
    AdminOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "poll_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    Draft,
    Active,
    Closed,
    Archived,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Poll {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: PollKind,
    pub question_type: QuestionType,
    pub is_anonymous: bool,
    pub requires_login: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub result_visibility: ResultVisibility,
    pub allow_edit_vote: bool,
    pub status: PollStatus,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
}

impl Poll {
    /// Active and inside its voting window
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.status == PollStatus::Active && self.start_date <= now && now <= self.end_date
    }

    /// Finished, either explicitly or by passing its end date
    pub fn is_history_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.status, PollStatus::Closed | PollStatus::Archived)
            || (self.status == PollStatus::Active && self.end_date < now)
    }
}

/// Editable poll fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollDraft {
    pub title: String,
    pub description: Option<String>,
    pub kind: PollKind,
    pub question_type: QuestionType,
    pub is_anonymous: bool,
    pub requires_login: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub result_visibility: ResultVisibility,
    pub allow_edit_vote: bool,
    pub status: Option<PollStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PollOption {
    pub id: Uuid,
    pub poll_id: Uuid,
    pub label: String,
}

/// Option as submitted by the poll editor; `id` is absent for new options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionInput {
    pub id: Option<Uuid>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PollVote {
    pub id: Uuid,
    pub poll_id: Uuid,
    pub option_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A vote with the voter's display name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VoterDetail {
    pub id: Uuid,
    pub option_id: Uuid,
    pub user_id: Uuid,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl VoterDetail {
    pub const ANONYMOUS: &'static str = "Anonim";

    /// Member name, then username, then "Anonim"
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or(Self::ANONYMOUS)
    }
}
