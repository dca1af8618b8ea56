//! Fake fixture data

use chrono::{NaiveDate, Utc};
use fake::faker::address::en::CityName;
use fake::faker::name::en::Name;
use fake::Fake;
use uuid::Uuid;
use prsdn_dashboard::models::application::ApplicationForm;
use prsdn_dashboard::models::attendance::AttendanceEvent;
use prsdn_dashboard::models::member::{EducationLevel, EducationStatus, MemberProfile, Rt};

/// Random Indonesian-style mobile number
pub fn phone_number() -> String {
    format!("08{}", (1_000_000_000u64..9_999_999_999u64).fake::<u64>())
}

pub fn member_profile(rt: Rt) -> MemberProfile {
    MemberProfile {
        full_name: Name().fake(),
        birth_place: CityName().fake(),
        birth_date: NaiveDate::from_ymd_opt((1995..2010).fake::<i32>(), (1..13).fake::<u32>(), (1..29).fake::<u32>())
            .expect("valid fixture date"),
        rt,
        phone: phone_number(),
        instagram: None,
        job: None,
        grade: Some("XI".to_string()),
        university: None,
        joined_whatsapp: true,
        education_status: EducationStatus::School,
        education_level: Some(EducationLevel::SmaSmk),
    }
}

pub fn application_form(username: &str) -> ApplicationForm {
    ApplicationForm {
        profile: member_profile(Rt::Rt02),
        username: username.to_string(),
        password: "rahasia123".to_string(),
    }
}

pub fn attendance_event(token: &str, expires_at: i64, active: bool) -> AttendanceEvent {
    AttendanceEvent {
        id: Uuid::new_v4(),
        title: "Rapat pengurus".to_string(),
        description: None,
        date: Utc::now().date_naive(),
        start_time: None,
        end_time: None,
        is_active: active,
        token: token.to_string(),
        token_expires_at: expires_at,
        created_at: Utc::now(),
        created_by_admin_id: Uuid::new_v4(),
    }
}
