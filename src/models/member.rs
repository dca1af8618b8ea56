//! Member model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use crate::utils::helpers::deserialize_some;
use crate::models::account::Role;

/// Neighbourhood sub-unit a member belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "rt_unit")]
pub enum Rt {
    #[sqlx(rename = "01")]
    #[serde(rename = "01")]
    Rt01,
    #[sqlx(rename = "02")]
    #[serde(rename = "02")]
    Rt02,
    #[sqlx(rename = "03")]
    #[serde(rename = "03")]
    Rt03,
    #[sqlx(rename = "04")]
    #[serde(rename = "04")]
    Rt04,
}

impl Rt {
    pub const ALL: [Rt; 4] = [Rt::Rt01, Rt::Rt02, Rt::Rt03, Rt::Rt04];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rt::Rt01 => "01",
            Rt::Rt02 => "02",
            Rt::Rt03 => "03",
            Rt::Rt04 => "04",
        }
    }
}

impl std::fmt::Display for Rt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "education_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EducationStatus {
    School,
    NotSchool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "education_level")]
pub enum EducationLevel {
    #[sqlx(rename = "SD")]
    #[serde(rename = "SD")]
    Sd,
    #[sqlx(rename = "SMP")]
    #[serde(rename = "SMP")]
    Smp,
    #[sqlx(rename = "SMA/SMK")]
    #[serde(rename = "SMA/SMK")]
    SmaSmk,
    #[sqlx(rename = "College")]
    #[serde(rename = "College")]
    College,
}

/// Personal data collected by the registration form and stored on a member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MemberProfile {
    pub full_name: String,
    pub birth_place: String,
    pub birth_date: NaiveDate,
    pub rt: Rt,
    pub phone: String,
    pub instagram: Option<String>,
    pub job: Option<String>,
    pub grade: Option<String>,
    pub university: Option<String>,
    pub joined_whatsapp: bool,
    pub education_status: EducationStatus,
    pub education_level: Option<EducationLevel>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Member {
    pub id: Uuid,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub profile: MemberProfile,
    /// Role of the linked account, filled by roster queries
    #[sqlx(default)]
    pub account_role: Option<Role>,
    pub created_at: DateTime<Utc>,
}

impl Member {
    pub fn is_admin(&self) -> bool {
        self.account_role == Some(Role::Admin)
    }
}

pub type CreateMemberRequest = MemberProfile;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMemberRequest {
    pub full_name: Option<String>,
    pub birth_place: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub rt: Option<Rt>,
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub instagram: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub job: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub grade: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub university: Option<Option<String>>,
    pub joined_whatsapp: Option<bool>,
    pub education_status: Option<EducationStatus>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub education_level: Option<Option<EducationLevel>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rt_serializes_as_two_digits() {
        assert_eq!(serde_json::to_string(&Rt::Rt03).unwrap(), "\"03\"");
        assert_eq!(Rt::ALL.iter().map(Rt::as_str).collect::<Vec<_>>(), ["01", "02", "03", "04"]);
    }

    #[test]
    fn test_education_level_wire_names() {
        assert_eq!(serde_json::to_string(&EducationLevel::SmaSmk).unwrap(), "\"SMA/SMK\"");
        assert_eq!(serde_json::to_string(&EducationStatus::NotSchool).unwrap(), "\"not_school\"");
    }
}
