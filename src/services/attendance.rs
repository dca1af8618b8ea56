//! Attendance event store
//!
//! At most one event is active at a time. The active event carries a short
//! random token that members type in to check in; tokens expire after the
//! configured TTL and are rotated by the binary.

use std::sync::Arc;
use chrono::NaiveTime;
use tokio::sync::RwLock;
use tracing::{info, debug};
use uuid::Uuid;
use crate::config::AttendanceConfig;
use crate::database::AttendanceEventRepository;
use crate::models::attendance::{
    AttendanceEvent, CreateAttendanceEventRequest, UpdateAttendanceEventRequest,
};
use crate::utils::errors::Result;
use crate::utils::helpers::{generate_token, now_millis};
use super::{timed, LoadingFlag};

const DAY_MS: i64 = 86_400_000;

/// A freshly issued check-in token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: i64,
}

#[derive(Debug, Clone, Default)]
pub struct AttendanceSnapshot {
    events: Vec<AttendanceEvent>,
}

impl AttendanceSnapshot {
    pub fn new(events: Vec<AttendanceEvent>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[AttendanceEvent] {
        &self.events
    }

    pub fn active_event(&self) -> Option<&AttendanceEvent> {
        self.events.iter().find(|e| e.is_active)
    }

    /// Events whose date (midnight UTC) is no more than a day behind `now_ms`, soonest first
    pub fn upcoming_events(&self, now_ms: i64) -> Vec<&AttendanceEvent> {
        let cutoff = now_ms - DAY_MS;
        let mut events: Vec<&AttendanceEvent> = self
            .events
            .iter()
            .filter(|e| e.date.and_time(NaiveTime::MIN).and_utc().timestamp_millis() >= cutoff)
            .collect();
        events.sort_by_key(|e| e.date);
        events
    }

    pub fn get_event_by_id(&self, id: Uuid) -> Option<&AttendanceEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Active event whose token expires within `lead_ms` of `now_ms`
    pub fn token_due_for_rotation(&self, now_ms: i64, lead_ms: i64) -> Option<Uuid> {
        self.active_event()
            .filter(|e| now_ms + lead_ms >= e.token_expires_at)
            .map(|e| e.id)
    }

    pub fn is_token_valid(&self, id: Uuid, token: &str, now_ms: i64) -> bool {
        self.get_event_by_id(id)
            .map(|e| e.accepts_token(token, now_ms))
            .unwrap_or(false)
    }
}

#[derive(Clone)]
pub struct AttendanceEventStore {
    repository: AttendanceEventRepository,
    config: AttendanceConfig,
    snapshot: Arc<RwLock<AttendanceSnapshot>>,
    loading: LoadingFlag,
}

impl AttendanceEventStore {
    pub fn new(repository: AttendanceEventRepository, config: AttendanceConfig) -> Self {
        Self {
            repository,
            config,
            snapshot: Arc::new(RwLock::new(AttendanceSnapshot::default())),
            loading: LoadingFlag::default(),
        }
    }

    fn issue_token(&self, now_ms: i64) -> IssuedToken {
        IssuedToken {
            token: generate_token(self.config.token_length),
            expires_at: now_ms + self.config.token_ttl_ms(),
        }
    }

    pub async fn load_events(&self) -> Result<()> {
        let _loading = self.loading.start();
        let events = timed("select", "attendance_events", self.repository.list()).await?;
        *self.snapshot.write().await = AttendanceSnapshot::new(events);
        Ok(())
    }

    pub async fn snapshot(&self) -> AttendanceSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Create an inactive event with a token already issued
    pub async fn create_event(&self, request: &CreateAttendanceEventRequest) -> Result<AttendanceEvent> {
        let issued = self.issue_token(now_millis());
        let event = timed(
            "insert",
            "attendance_events",
            self.repository.create(request, &issued.token, issued.expires_at),
        )
        .await?;
        info!(event_id = %event.id, title = %event.title, "Attendance event created");
        super::reload_quietly("attendance_events", self.load_events()).await;
        Ok(event)
    }

    pub async fn update_event(&self, id: Uuid, request: UpdateAttendanceEventRequest) -> Result<AttendanceEvent> {
        let event = timed("update", "attendance_events", self.repository.update(id, request)).await?;
        super::reload_quietly("attendance_events", self.load_events()).await;
        Ok(event)
    }

    pub async fn delete_event(&self, id: Uuid) -> Result<()> {
        timed("delete", "attendance_events", self.repository.delete(id)).await?;
        super::reload_quietly("attendance_events", self.load_events()).await;
        Ok(())
    }

    /// Make `id` the only active event, with a fresh token
    pub async fn set_active_event(&self, id: Uuid) -> Result<IssuedToken> {
        let issued = self.issue_token(now_millis());
        timed(
            "activate",
            "attendance_events",
            self.repository.activate_exclusive(id, &issued.token, issued.expires_at),
        )
        .await?;
        info!(event_id = %id, "Attendance event activated");
        super::reload_quietly("attendance_events", self.load_events()).await;
        Ok(issued)
    }

    pub async fn deactivate_event(&self, id: Uuid) -> Result<()> {
        timed("deactivate", "attendance_events", self.repository.deactivate(id)).await?;
        info!(event_id = %id, "Attendance event deactivated");
        super::reload_quietly("attendance_events", self.load_events()).await;
        Ok(())
    }

    /// Issue a new token for an active event; `None` when the event is unknown or inactive
    pub async fn generate_event_token(&self, id: Uuid) -> Result<Option<IssuedToken>> {
        let active = self
            .snapshot
            .read()
            .await
            .get_event_by_id(id)
            .map(|e| e.is_active)
            .unwrap_or(false);
        if !active {
            return Ok(None);
        }

        let issued = self.issue_token(now_millis());
        timed(
            "update",
            "attendance_events",
            self.repository.set_token(id, &issued.token, issued.expires_at),
        )
        .await?;
        super::reload_quietly("attendance_events", self.load_events()).await;
        Ok(Some(issued))
    }

    /// Replace the active event's token before the next rotation check would find it expired
    pub async fn rotate_if_expiring(&self, now_ms: i64) -> Result<Option<IssuedToken>> {
        let lead_ms = self.config.rotation_period().as_millis() as i64;
        let due = self.snapshot.read().await.token_due_for_rotation(now_ms, lead_ms);

        match due {
            Some(id) => {
                debug!(event_id = %id, "Rotating attendance token");
                self.generate_event_token(id).await
            }
            None => Ok(None),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn event(title: &str, date: NaiveDate, active: bool, token: &str, expires_at: i64) -> AttendanceEvent {
        AttendanceEvent {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            date,
            start_time: None,
            end_time: None,
            is_active: active,
            token: token.to_string(),
            token_expires_at: expires_at,
            created_at: Utc::now(),
            created_by_admin_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_active_event_and_token_validity() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let active = event("Rapat", date, true, "ABC234", 10_000);
        let id = active.id;
        let snapshot = AttendanceSnapshot::new(vec![event("Kerja bakti", date, false, "", 0), active]);

        assert_eq!(snapshot.active_event().map(|e| e.id), Some(id));
        assert!(snapshot.is_token_valid(id, "ABC234", 10_000));
        assert!(!snapshot.is_token_valid(id, "ABC234", 10_001));
        assert!(!snapshot.is_token_valid(id, "XYZ234", 5_000));
        assert!(!snapshot.is_token_valid(Uuid::new_v4(), "ABC234", 5_000));
    }

    #[test]
    fn test_upcoming_events_cutoff_is_one_day_back() {
        // cutoff falls at 2024-03-09T00:00Z exactly
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap().timestamp_millis();
        let snapshot = AttendanceSnapshot::new(vec![
            event("Minggu depan", NaiveDate::from_ymd_opt(2024, 3, 17).unwrap(), false, "", 0),
            event("Kemarin", NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(), false, "", 0),
            event("Lusa kemarin", NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(), false, "", 0),
            event("Hari ini", NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(), false, "", 0),
        ]);

        let titles: Vec<&str> = snapshot.upcoming_events(now).iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Kemarin", "Hari ini", "Minggu depan"]);
    }

    #[test]
    fn test_token_due_for_rotation_within_lead() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let active = event("Rapat", date, true, "ABC234", 30_000);
        let id = active.id;
        let snapshot = AttendanceSnapshot::new(vec![event("Lama", date, false, "", 0), active]);

        assert_eq!(snapshot.token_due_for_rotation(0, 10_000), None);
        assert_eq!(snapshot.token_due_for_rotation(19_999, 10_000), None);
        assert_eq!(snapshot.token_due_for_rotation(20_000, 10_000), Some(id));
        assert_eq!(snapshot.token_due_for_rotation(45_000, 10_000), Some(id));
        assert_eq!(AttendanceSnapshot::default().token_due_for_rotation(45_000, 10_000), None);
    }

    #[test]
    fn test_rotation_keeps_displayed_token_valid() {
        let config = crate::config::Settings::default().attendance;
        let ttl = config.token_ttl_ms();
        let period = config.rotation_period().as_millis() as i64;
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let mut current = event("Rapat", date, true, "ABC234", ttl);

        // Ticks land a few milliseconds late and rotation takes a few more
        for tick in 1..=30 {
            let now = tick * period + 7;
            let snapshot = AttendanceSnapshot::new(vec![current.clone()]);
            if snapshot.token_due_for_rotation(now, period).is_some() {
                current.token_expires_at = now + 5 + ttl;
            }
            for offset in (0..period).step_by(250) {
                assert!(
                    current.accepts_token("ABC234", now + offset),
                    "token expired at {}",
                    now + offset
                );
            }
        }
    }
}

