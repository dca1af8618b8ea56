//! Account application store

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, error};
use uuid::Uuid;
use crate::database::DatabaseService;
use crate::models::application::{AccountApplication, ApplicationForm, ApplicationStatus, DuplicateCheck};
use crate::utils::errors::{DashboardError, Result};
use crate::utils::logging::log_admin_action;
use crate::utils::validation::validate_username;
use super::members::MemberStore;
use super::{timed, LoadingFlag};

#[derive(Debug, Clone, Default)]
pub struct ApplicationSnapshot {
    applications: Vec<AccountApplication>,
}

impl ApplicationSnapshot {
    pub fn new(applications: Vec<AccountApplication>) -> Self {
        Self { applications }
    }

    pub fn applications(&self) -> &[AccountApplication] {
        &self.applications
    }

    pub fn pending_applications(&self) -> Vec<&AccountApplication> {
        self.applications.iter().filter(|a| a.is_pending()).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.applications.iter().filter(|a| a.is_pending()).count()
    }

    pub fn get_application_by_id(&self, id: Uuid) -> Option<&AccountApplication> {
        self.applications.iter().find(|a| a.id == id)
    }
}

#[derive(Clone)]
pub struct ApplicationStore {
    db: DatabaseService,
    members: MemberStore,
    snapshot: Arc<RwLock<ApplicationSnapshot>>,
    loading: LoadingFlag,
}

impl ApplicationStore {
    pub fn new(db: DatabaseService, members: MemberStore) -> Self {
        Self {
            db,
            members,
            snapshot: Arc::new(RwLock::new(ApplicationSnapshot::default())),
            loading: LoadingFlag::default(),
        }
    }

    pub async fn load_applications(&self) -> Result<()> {
        let _loading = self.loading.start();
        let applications = timed("select", "account_applications", self.db.applications.list()).await?;
        *self.snapshot.write().await = ApplicationSnapshot::new(applications);
        Ok(())
    }

    pub async fn snapshot(&self) -> ApplicationSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Submit a registration form as a pending application
    pub async fn submit_application(&self, form: &ApplicationForm) -> Result<AccountApplication> {
        validate_username(&form.username)?;

        let application = match self.db.applications.create(form).await {
            Ok(application) => application,
            Err(e) if e.is_unique_violation() => {
                info!(username = %form.username, "Application rejected as duplicate");
                return Err(DashboardError::DuplicateRegistration);
            }
            Err(e) => {
                error!(username = %form.username, error = %e, "Error submitting application");
                return Err(DashboardError::SubmissionFailed(e.to_string()));
            }
        };

        info!(application_id = %application.id, "Application submitted");
        super::reload_quietly("account_applications", self.load_applications()).await;
        Ok(application)
    }

    /// Report whether a username or phone is already claimed
    ///
    /// Backend failures are logged and reported as "not taken".
    pub async fn check_duplicates(&self, username: &str, phone: &str) -> DuplicateCheck {
        let checks = futures::try_join!(
            self.db.applications.username_taken(username),
            self.db.accounts.username_exists(username),
            self.db.applications.phone_taken(phone),
            self.db.members.phone_exists(phone),
        );

        match checks {
            Ok((app_username, account_username, app_phone, member_phone)) => DuplicateCheck {
                username_taken: app_username || account_username,
                phone_taken: app_phone || member_phone,
            },
            Err(e) => {
                error!(error = %e, "Error checking duplicates");
                DuplicateCheck::default()
            }
        }
    }

    /// Create the member and account for an application and mark it approved
    pub async fn approve_application(&self, id: Uuid, admin_id: Uuid) -> Result<()> {
        let cached = self.snapshot.read().await.get_application_by_id(id).cloned();
        let application = match cached {
            Some(application) => application,
            None => self.db.applications.find_by_id(id).await?
                .ok_or(DashboardError::NotFound { entity: "application", id })?,
        };

        let (member, _account) = timed(
            "approve",
            "account_applications",
            self.db.approve_application(&application, admin_id),
        )
        .await?;
        log_admin_action(admin_id, "approve_application", Some(member.id), Some(&application.username));

        super::reload_quietly("members", self.members.reload()).await;
        super::reload_quietly("account_applications", self.load_applications()).await;
        Ok(())
    }

    pub async fn reject_application(&self, id: Uuid, admin_id: Uuid) -> Result<()> {
        timed(
            "reject",
            "account_applications",
            self.db.applications.set_status(id, ApplicationStatus::Rejected, admin_id),
        )
        .await?;
        log_admin_action(admin_id, "reject_application", Some(id), None);

        super::reload_quietly("account_applications", self.load_applications()).await;
        Ok(())
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use sqlx::postgres::PgPoolOptions;
    use crate::database::MemberRepository;

    fn unreachable_store() -> ApplicationStore {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(300))
            .connect_lazy("postgresql://prsdn@127.0.0.1:1/offline")
            .unwrap();
        let members = MemberStore::new(MemberRepository::new(pool.clone()));
        ApplicationStore::new(DatabaseService::new(pool), members)
    }

    #[tokio::test]
    async fn test_check_duplicates_falls_back_to_not_taken() {
        let store = unreachable_store();
        let check = store.check_duplicates("budi01", "081234567890").await;
        assert_eq!(check, DuplicateCheck { username_taken: false, phone_taken: false });
    }
}
