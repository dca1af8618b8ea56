//! Database service layer
//! 
//! This module provides a high-level interface to database operations

use uuid::Uuid;
use crate::database::{
    DatabasePool, MemberRepository, AccountRepository, ApplicationRepository, TransactionRepository,
    KasRepository, EventRepository, AttendanceEventRepository, CheckinRepository, PollRepository,
    PaymentRepository,
};
use crate::database::connection;
use crate::models::*;
use crate::utils::errors::DashboardError;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pool: DatabasePool,
    pub members: MemberRepository,
    pub accounts: AccountRepository,
    pub applications: ApplicationRepository,
    pub transactions: TransactionRepository,
    pub kas: KasRepository,
    pub events: EventRepository,
    pub attendance_events: AttendanceEventRepository,
    pub checkins: CheckinRepository,
    pub polls: PollRepository,
    pub payments: PaymentRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            members: MemberRepository::new(pool.clone()),
            accounts: AccountRepository::new(pool.clone()),
            applications: ApplicationRepository::new(pool.clone()),
            transactions: TransactionRepository::new(pool.clone()),
            kas: KasRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            attendance_events: AttendanceEventRepository::new(pool.clone()),
            checkins: CheckinRepository::new(pool.clone()),
            polls: PollRepository::new(pool.clone()),
            payments: PaymentRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Turn an application into a member with an active account
    ///
    /// The member row, the account row and the review stamp are written in one
    /// transaction.
    pub async fn approve_application(&self, application: &AccountApplication, admin_id: Uuid) -> Result<(Member, UserAccount), DashboardError> {
        let mut tx = self.pool.begin().await?;

        let member = MemberRepository::insert(&mut *tx, &application.profile).await?;

        let request = CreateAccountRequest {
            member_id: Some(member.id),
            username: application.username.clone(),
            password: application.password.clone(),
            role: Role::User,
        };
        let account = AccountRepository::insert(&mut *tx, &request).await?;

        ApplicationRepository::review(&mut *tx, application.id, ApplicationStatus::Approved, admin_id).await?;

        tx.commit().await?;
        Ok((member, account))
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<(), DashboardError> {
        connection::health_check(&self.pool).await
    }
}
