//! Services module
//!
//! One store per dashboard area, plus the [`Dashboard`] aggregate that wires
//! them together and feeds them backend change notifications.

pub mod auth;
pub mod members;
pub mod applications;
pub mod finance;
pub mod kas;
pub mod calendar;
pub mod attendance;
pub mod checkin;
pub mod polls;
pub mod payments;

// Re-export commonly used services
pub use auth::AuthStore;
pub use members::{MemberStore, MemberSnapshot};
pub use applications::{ApplicationStore, ApplicationSnapshot};
pub use finance::{FinanceStore, LedgerSnapshot};
pub use kas::{KasStore, KasSnapshot};
pub use calendar::{CalendarStore, CalendarSnapshot};
pub use attendance::{AttendanceEventStore, AttendanceSnapshot, IssuedToken};
pub use checkin::{CheckinStore, CheckinSnapshot, validate_checkin};
pub use polls::{PollStore, PollState};
pub use payments::{PaymentStore, PaymentSnapshot};

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use chrono::Utc;
use futures::StreamExt;
use tokio::sync::broadcast;
use tracing::{info, warn};
use crate::config::Settings;
use crate::database::{ChangeFeed, DatabaseService, Table, TableChange};
use crate::models::kas::MonthSummary;
use crate::state::{SessionCache, UiStore};
use crate::utils::errors::Result;
use crate::utils::helpers::{today, MonthKey};
use crate::utils::logging::log_database_operation;

/// Shared "request in flight" flag
#[derive(Debug, Clone, Default)]
pub struct LoadingFlag(Arc<AtomicBool>);

/// Clears the flag when dropped
pub struct LoadingGuard(Arc<AtomicBool>);

impl LoadingFlag {
    pub fn start(&self) -> LoadingGuard {
        self.0.store(true, Ordering::SeqCst);
        LoadingGuard(self.0.clone())
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Run a repository call and log its duration and outcome
pub(crate) async fn timed<T, F>(operation: &str, table: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let started = Instant::now();
    let result = fut.await;
    log_database_operation(operation, table, started.elapsed().as_millis() as u64, result.is_ok());
    result
}

/// Refresh a snapshot after a write that already succeeded; failures are only logged
pub(crate) async fn reload_quietly<F>(table: &str, fut: F)
where
    F: Future<Output = Result<()>>,
{
    if let Err(e) = fut.await {
        warn!(table = table, error = %e, "Reload after write failed");
    }
}

const RELOAD_BUFFER: usize = 32;

/// All dashboard stores behind one handle
#[derive(Clone)]
pub struct Dashboard {
    db: DatabaseService,
    cache: Option<SessionCache>,
    pub auth: AuthStore,
    pub members: MemberStore,
    pub applications: ApplicationStore,
    pub finance: FinanceStore,
    pub kas: KasStore,
    pub calendar: CalendarStore,
    pub attendance: AttendanceEventStore,
    pub checkins: CheckinStore,
    pub polls: PollStore,
    pub payments: PaymentStore,
    pub ui: UiStore,
    reloads: broadcast::Sender<Table>,
}

impl Dashboard {
    pub fn new(db: DatabaseService, cache: Option<SessionCache>, settings: &Settings) -> Self {
        let auth = AuthStore::new(db.accounts.clone(), cache.clone());
        let members = MemberStore::new(db.members.clone());
        let finance = FinanceStore::new(db.transactions.clone());
        let attendance = AttendanceEventStore::new(db.attendance_events.clone(), settings.attendance.clone());

        Self {
            applications: ApplicationStore::new(db.clone(), members.clone()),
            kas: KasStore::new(db.kas.clone(), finance.clone(), members.clone(), settings.dues.clone()),
            calendar: CalendarStore::new(db.events.clone()),
            checkins: CheckinStore::new(db.checkins.clone(), attendance.clone()),
            polls: PollStore::new(db.polls.clone(), auth.clone()),
            payments: PaymentStore::new(db.payments.clone()),
            ui: UiStore::new(),
            reloads: broadcast::channel(RELOAD_BUFFER).0,
            auth,
            members,
            finance,
            attendance,
            db,
            cache,
        }
    }

    /// Load every collection the dashboard shows on start
    pub async fn load_all(&self) -> Result<()> {
        let is_admin = self.auth.is_admin().await;

        tokio::try_join!(
            self.members.load_members(false),
            self.applications.load_applications(),
            self.finance.load_transactions(),
            self.kas.load_payments(),
            self.calendar.load_events(),
            self.attendance.load_events(),
            self.checkins.load_checkins(),
            self.polls.fetch_polls(is_admin),
            self.payments.load_payment_items(),
        )?;

        info!("Dashboard data loaded");
        Ok(())
    }

    /// Tables reloaded in response to change notifications
    pub fn reloads(&self) -> broadcast::Receiver<Table> {
        self.reloads.subscribe()
    }

    /// Reload whatever a backend change touched
    pub async fn handle_change(&self, change: &TableChange) -> Result<()> {
        self.reload_table(change).await?;
        if change.table != Table::Unknown {
            // Nobody listening is fine
            let _ = self.reloads.send(change.table);
        }
        Ok(())
    }

    async fn reload_table(&self, change: &TableChange) -> Result<()> {
        match change.table {
            Table::Members => self.members.reload().await,
            Table::AccountApplications => self.applications.load_applications().await,
            Table::FinanceTransactions => self.finance.load_transactions().await,
            Table::KasPayments => self.kas.load_payments().await,
            Table::Events => self.calendar.load_events().await,
            Table::AttendanceEvents => self.attendance.load_events().await,
            Table::AttendanceCheckins => self.checkins.load_checkins().await,
            Table::Polls => self.polls.fetch_polls(self.auth.is_admin().await).await,
            Table::PollVotes => {
                self.polls.handle_vote_change(change.poll_id).await;
                Ok(())
            }
            Table::Unknown => Ok(()),
        }
    }

    /// Apply change notifications until the feed's connection drops
    pub async fn follow_changes(&self, feed: ChangeFeed) -> Result<()> {
        let changes = feed.subscribe().await?;
        futures::pin_mut!(changes);

        while let Some(change) = changes.next().await {
            let change = change?;
            if let Err(e) = self.handle_change(&change).await {
                warn!(table = change.table.as_str(), error = %e, "Failed to apply change notification");
            }
        }

        Ok(())
    }

    pub async fn health_check(&self) -> DashboardHealth {
        let database = self.db.health_check().await.is_ok();
        let session_cache = match &self.cache {
            Some(cache) => Some(cache.health_check().await.unwrap_or(false)),
            None => None,
        };

        DashboardHealth { database, session_cache }
    }

    /// Headline figures for the admin dashboard
    pub async fn summary(&self) -> DashboardSummary {
        let now = Utc::now();
        let month = MonthKey::from_date(today());

        let members = self.members.snapshot().await;
        let applications = self.applications.snapshot().await;
        let ledger = self.finance.snapshot().await;
        let kas = self.kas.snapshot().await;
        let attendance = self.attendance.snapshot().await;
        let polls = self.polls.state().await;

        DashboardSummary {
            total_members: members.total_members(),
            pending_applications: applications.pending_count(),
            balance: ledger.balance(),
            month,
            kas: kas.month_summary(month),
            active_event: attendance.active_event().map(|e| e.title.clone()),
            active_polls: polls.active_polls(now).len(),
        }
    }
}

/// Backend reachability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardHealth {
    pub database: bool,
    /// `None` when running without a session cache
    pub session_cache: Option<bool>,
}

impl DashboardHealth {
    pub fn is_healthy(&self) -> bool {
        self.database
    }

    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.database {
            issues.push("Database connection failed".to_string());
        }
        if self.session_cache == Some(false) {
            issues.push("Session cache connection failed".to_string());
        }

        issues
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub total_members: usize,
    pub pending_applications: usize,
    pub balance: i64,
    pub month: MonthKey,
    pub kas: MonthSummary,
    pub active_event: Option<String>,
    pub active_polls: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    #[test]
    fn test_loading_flag_guard() {
        let flag = LoadingFlag::default();
        assert!(!flag.get());
        {
            let _guard = flag.start();
            assert!(flag.clone().get());
        }
        assert!(!flag.get());
    }

    #[tokio::test]
    async fn test_timed_passes_result_through() {
        let ok: Result<u32> = timed("select", "members", async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err: Result<u32> = timed("select", "members", async {
            Err(crate::utils::errors::DashboardError::InvalidInput("x".into()))
        })
        .await;
        assert!(err.is_err());
    }

    #[test]
    fn test_health_issues() {
        let health = DashboardHealth { database: true, session_cache: Some(false) };
        assert!(health.is_healthy());
        assert_eq!(health.get_issues(), vec!["Session cache connection failed".to_string()]);
        assert!(DashboardHealth { database: true, session_cache: None }.get_issues().is_empty());
    }

    #[tokio::test]
    async fn test_summary_of_empty_dashboard() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/prsdn_offline")
            .unwrap();
        let dashboard = Dashboard::new(DatabaseService::new(pool), None, &Settings::default());

        let summary = dashboard.summary().await;
        assert_eq!(summary.total_members, 0);
        assert_eq!(summary.balance, 0);
        assert_eq!(summary.kas, MonthSummary::default());
        assert!(summary.active_event.is_none());
    }

    #[tokio::test]
    async fn test_unknown_table_change_is_ignored() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/prsdn_offline")
            .unwrap();
        let dashboard = Dashboard::new(DatabaseService::new(pool), None, &Settings::default());
        let change = TableChange { table: Table::Unknown, op: crate::database::ChangeOp::Update, id: None, poll_id: None };
        assert!(dashboard.handle_change(&change).await.is_ok());

        // No poll is open, so vote notifications do not touch the backend
        let mut reloads = dashboard.reloads();
        let vote = TableChange { table: Table::PollVotes, op: crate::database::ChangeOp::Insert, id: None, poll_id: None };
        assert!(dashboard.handle_change(&vote).await.is_ok());
        assert_eq!(reloads.try_recv().unwrap(), Table::PollVotes);
    }
}
