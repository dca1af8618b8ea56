//! Calendar events store

use std::sync::Arc;
use chrono::{Duration, NaiveDate};
use tokio::sync::RwLock;
use uuid::Uuid;
use crate::database::EventRepository;
use crate::models::event::{CreateEventRequest, Event};
use crate::utils::errors::Result;
use super::{timed, LoadingFlag};

pub const DEFAULT_UPCOMING_DAYS: i64 = 60;

#[derive(Debug, Clone, Default)]
pub struct CalendarSnapshot {
    events: Vec<Event>,
}

impl CalendarSnapshot {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events dated from `today` through `today + days`, inclusive
    ///
    /// A window reaching past the last representable date has no upper bound.
    pub fn upcoming_events(&self, today: NaiveDate, days: i64) -> Vec<&Event> {
        let until = Duration::try_days(days).and_then(|span| today.checked_add_signed(span));
        self.events
            .iter()
            .filter(|e| e.date >= today && until.map_or(true, |until| e.date <= until))
            .collect()
    }
}

#[derive(Clone)]
pub struct CalendarStore {
    repository: EventRepository,
    snapshot: Arc<RwLock<CalendarSnapshot>>,
    loading: LoadingFlag,
}

impl CalendarStore {
    pub fn new(repository: EventRepository) -> Self {
        Self {
            repository,
            snapshot: Arc::new(RwLock::new(CalendarSnapshot::default())),
            loading: LoadingFlag::default(),
        }
    }

    pub async fn load_events(&self) -> Result<()> {
        let _loading = self.loading.start();
        let events = timed("select", "events", self.repository.list()).await?;
        *self.snapshot.write().await = CalendarSnapshot::new(events);
        Ok(())
    }

    pub async fn snapshot(&self) -> CalendarSnapshot {
        self.snapshot.read().await.clone()
    }

    pub async fn create_event(&self, request: &CreateEventRequest) -> Result<Event> {
        let event = timed("insert", "events", self.repository.create(request)).await?;
        super::reload_quietly("events", self.load_events()).await;
        Ok(event)
    }

    pub async fn delete_event(&self, id: Uuid) -> Result<()> {
        timed("delete", "events", self.repository.delete(id)).await?;
        super::reload_quietly("events", self.load_events()).await;
        Ok(())
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::models::event::EventType;

    fn event(title: &str, date: NaiveDate) -> Event {
        Event {
            id: Uuid::new_v4(),
            title: title.to_string(),
            date,
            kind: EventType::Event,
            description: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_upcoming_window_is_inclusive() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let calendar = CalendarSnapshot::new(vec![
            event("Kemarin", today.pred_opt().unwrap()),
            event("Hari ini", today),
            event("Batas", today + Duration::days(DEFAULT_UPCOMING_DAYS)),
            event("Terlalu jauh", today + Duration::days(DEFAULT_UPCOMING_DAYS + 1)),
        ]);

        let titles: Vec<&str> = calendar
            .upcoming_events(today, DEFAULT_UPCOMING_DAYS)
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Hari ini", "Batas"]);
    }

    #[test]
    fn test_huge_window_has_no_upper_bound() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let calendar = CalendarSnapshot::new(vec![
            event("Kemarin", today.pred_opt().unwrap()),
            event("Jauh sekali", NaiveDate::from_ymd_opt(9999, 12, 31).unwrap()),
        ]);

        for days in [i64::MAX, 1_000_000_000] {
            let titles: Vec<&str> = calendar.upcoming_events(today, days).iter().map(|e| e.title.as_str()).collect();
            assert_eq!(titles, vec!["Jauh sekali"]);
        }
    }
}
