//! Token check-in store

use std::sync::Arc;
use chrono::{DateTime, TimeZone};
use tokio::sync::RwLock;
use tracing::{info, error};
use uuid::Uuid;
use crate::database::CheckinRepository;
use crate::models::attendance::{AttendanceCheckin, AttendanceEvent, CreateCheckinRequest};
use crate::utils::errors::{CheckinRejection, DashboardError, Result};
use crate::utils::helpers::{month_key_of_millis, now_millis, MonthKey};
use crate::utils::logging::log_member_action;
use super::attendance::AttendanceEventStore;
use super::{timed, LoadingFlag};

const STATS_MONTHS: u32 = 6;

/// Decide whether a check-in may go ahead.
///
/// Checks run in a fixed order: the event must exist, be active, not already
/// have this member, and finally accept the token. A refused token is
/// reported as expired when the expiry has passed, otherwise as a mismatch.
pub fn validate_checkin(
    event: Option<&AttendanceEvent>,
    already_checked_in: bool,
    token: &str,
    now_ms: i64,
) -> std::result::Result<(), CheckinRejection> {
    let event = event.ok_or(CheckinRejection::EventNotFound)?;

    if !event.is_active {
        return Err(CheckinRejection::NoActiveEvent);
    }
    if already_checked_in {
        return Err(CheckinRejection::AlreadyCheckedIn);
    }
    if !event.accepts_token(token, now_ms) {
        return Err(if now_ms > event.token_expires_at {
            CheckinRejection::TokenExpired
        } else {
            CheckinRejection::TokenInvalid
        });
    }

    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct CheckinSnapshot {
    checkins: Vec<AttendanceCheckin>,
}

impl CheckinSnapshot {
    pub fn new(checkins: Vec<AttendanceCheckin>) -> Self {
        Self { checkins }
    }

    pub fn checkins(&self) -> &[AttendanceCheckin] {
        &self.checkins
    }

    pub fn checkins_by_event(&self, event_id: Uuid) -> Vec<&AttendanceCheckin> {
        self.checkins.iter().filter(|c| c.event_id == event_id).collect()
    }

    /// A member's check-ins, most recent first
    pub fn checkins_by_member(&self, member_id: Uuid) -> Vec<&AttendanceCheckin> {
        let mut checkins: Vec<&AttendanceCheckin> = self.checkins.iter().filter(|c| c.member_id == member_id).collect();
        checkins.sort_by(|a, b| b.checked_in_at.cmp(&a.checked_in_at));
        checkins
    }

    pub fn has_checked_in(&self, event_id: Uuid, member_id: Uuid) -> bool {
        self.checkins.iter().any(|c| c.event_id == event_id && c.member_id == member_id)
    }

    /// Check-in counts for the six months ending with the month of `now`, oldest first
    pub fn last_six_months_stats<Tz: TimeZone>(&self, now: DateTime<Tz>) -> Vec<(MonthKey, usize)> {
        let tz = now.timezone();
        let current = MonthKey::from_date(now.date_naive());

        (0..STATS_MONTHS)
            .rev()
            .map(|back| {
                let month = current.minus_months(back);
                let count = self
                    .checkins
                    .iter()
                    .filter(|c| month_key_of_millis(c.checked_in_at, &tz) == Some(month))
                    .count();
                (month, count)
            })
            .collect()
    }
}

#[derive(Clone)]
pub struct CheckinStore {
    repository: CheckinRepository,
    events: AttendanceEventStore,
    snapshot: Arc<RwLock<CheckinSnapshot>>,
    loading: LoadingFlag,
}

impl CheckinStore {
    pub fn new(repository: CheckinRepository, events: AttendanceEventStore) -> Self {
        Self {
            repository,
            events,
            snapshot: Arc::new(RwLock::new(CheckinSnapshot::default())),
            loading: LoadingFlag::default(),
        }
    }

    pub async fn load_checkins(&self) -> Result<()> {
        let _loading = self.loading.start();
        let checkins = timed("select", "attendance_checkins", self.repository.list()).await?;
        *self.snapshot.write().await = CheckinSnapshot::new(checkins);
        Ok(())
    }

    pub async fn snapshot(&self) -> CheckinSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Check a member into an event with the token shown on screen
    pub async fn checkin(&self, event_id: Uuid, member_id: Uuid, token: &str) -> Result<AttendanceCheckin> {
        let now_ms = now_millis();
        let events = self.events.snapshot().await;
        let already = self.snapshot.read().await.has_checked_in(event_id, member_id);

        if let Err(rejection) = validate_checkin(events.get_event_by_id(event_id), already, token, now_ms) {
            info!(event_id = %event_id, member_id = %member_id, reason = %rejection, "Check-in rejected");
            return Err(rejection.into());
        }

        let request = CreateCheckinRequest {
            event_id,
            member_id,
            checked_in_at: now_ms,
            token_used: token.to_string(),
        };

        let checkin = match self.repository.create(&request).await {
            Ok(checkin) => checkin,
            Err(e) if e.is_unique_violation() => {
                return Err(CheckinRejection::AlreadyCheckedIn.into());
            }
            Err(e) => {
                error!(event_id = %event_id, member_id = %member_id, error = %e, "Check-in insert failed");
                return Err(DashboardError::CheckinFailed(e.to_string()));
            }
        };

        log_member_action(Some(member_id), "checkin", Some(&event_id.to_string()));
        super::reload_quietly("attendance_checkins", self.load_checkins()).await;
        Ok(checkin)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn active_event(token: &str, expires_at: i64) -> AttendanceEvent {
        AttendanceEvent {
            id: Uuid::new_v4(),
            title: "Rapat bulanan".to_string(),
            description: None,
            date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            start_time: None,
            end_time: None,
            is_active: true,
            token: token.to_string(),
            token_expires_at: expires_at,
            created_at: Utc::now(),
            created_by_admin_id: Uuid::new_v4(),
        }
    }

    fn checkin_at(event_id: Uuid, member_id: Uuid, at: DateTime<Utc>) -> AttendanceCheckin {
        AttendanceCheckin {
            id: Uuid::new_v4(),
            event_id,
            member_id,
            checked_in_at: at.timestamp_millis(),
            token_used: "ABC234".to_string(),
        }
    }

    #[test]
    fn test_validation_order() {
        let event = active_event("ABC234", 1_000);
        assert_eq!(validate_checkin(None, false, "ABC234", 0), Err(CheckinRejection::EventNotFound));

        let mut inactive = event.clone();
        inactive.is_active = false;
        assert_eq!(validate_checkin(Some(&inactive), true, "WRONG", 5_000), Err(CheckinRejection::NoActiveEvent));

        assert_eq!(validate_checkin(Some(&event), true, "WRONG", 5_000), Err(CheckinRejection::AlreadyCheckedIn));
        assert_eq!(validate_checkin(Some(&event), false, "ABC234", 1_001), Err(CheckinRejection::TokenExpired));
        assert_eq!(validate_checkin(Some(&event), false, "WRONG", 1_001), Err(CheckinRejection::TokenExpired));
        assert_eq!(validate_checkin(Some(&event), false, "WRONG", 500), Err(CheckinRejection::TokenInvalid));
        assert_eq!(validate_checkin(Some(&event), false, "ABC234", 1_000), Ok(()));
    }

    #[test]
    fn test_has_checked_in_and_member_order() {
        let (event, member) = (Uuid::new_v4(), Uuid::new_v4());
        let early = Utc.with_ymd_and_hms(2024, 1, 5, 9, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 2, 5, 9, 0, 0).unwrap();
        let snapshot = CheckinSnapshot::new(vec![
            checkin_at(Uuid::new_v4(), member, early),
            checkin_at(event, member, late),
        ]);

        assert!(snapshot.has_checked_in(event, member));
        assert!(!snapshot.has_checked_in(event, Uuid::new_v4()));
        assert_eq!(snapshot.checkins_by_member(member)[0].event_id, event);
        assert_eq!(snapshot.checkins_by_event(event).len(), 1);
    }

    #[test]
    fn test_last_six_months_stats() {
        let member = Uuid::new_v4();
        let snapshot = CheckinSnapshot::new(vec![
            checkin_at(Uuid::new_v4(), member, Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap()),
            checkin_at(Uuid::new_v4(), member, Utc.with_ymd_and_hms(2024, 3, 20, 8, 0, 0).unwrap()),
            checkin_at(Uuid::new_v4(), member, Utc.with_ymd_and_hms(2023, 10, 1, 8, 0, 0).unwrap()),
            checkin_at(Uuid::new_v4(), member, Utc.with_ymd_and_hms(2023, 9, 30, 8, 0, 0).unwrap()),
        ]);

        let stats = snapshot.last_six_months_stats(Utc.with_ymd_and_hms(2024, 3, 25, 12, 0, 0).unwrap());
        let rendered: Vec<(String, usize)> = stats.into_iter().map(|(m, n)| (m.to_string(), n)).collect();
        assert_eq!(
            rendered,
            vec![
                ("2023-10".to_string(), 1),
                ("2023-11".to_string(), 0),
                ("2023-12".to_string(), 0),
                ("2024-01".to_string(), 0),
                ("2024-02".to_string(), 0),
                ("2024-03".to_string(), 2),
            ]
        );
    }
}
