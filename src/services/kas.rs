//! Kas (monthly dues) store
//!
//! Saving a month also books the collected total into the finance ledger.

use std::sync::Arc;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::{info, error, debug};
use uuid::Uuid;
use crate::config::DuesConfig;
use crate::database::KasRepository;
use crate::models::finance::{CreateTransactionRequest, TransactionType, UpdateTransactionRequest};
use crate::models::kas::{KasEntry, KasPayment, KasStatus, MonthSummary};
use crate::utils::errors::Result;
use crate::utils::helpers::{today, MonthKey};
use super::finance::FinanceStore;
use super::members::MemberStore;
use super::{timed, LoadingFlag};

const LEDGER_NOTE: &str = "Auto-generated from Kas payment";

/// Sum of the amounts marked paid
pub fn paid_total(entries: &[KasEntry]) -> i64 {
    entries.iter().filter(|e| e.status == KasStatus::Paid).map(|e| e.amount).sum()
}

#[derive(Debug, Clone, Default)]
pub struct KasSnapshot {
    payments: Vec<KasPayment>,
}

impl KasSnapshot {
    pub fn new(payments: Vec<KasPayment>) -> Self {
        Self { payments }
    }

    pub fn payments(&self) -> &[KasPayment] {
        &self.payments
    }

    pub fn payments_by_month(&self, month: MonthKey) -> Vec<&KasPayment> {
        self.payments.iter().filter(|p| p.month_key == month).collect()
    }

    /// A member's payments, newest month first
    pub fn payments_by_member(&self, member_id: Uuid) -> Vec<&KasPayment> {
        let mut payments: Vec<&KasPayment> = self.payments.iter().filter(|p| p.member_id == member_id).collect();
        payments.sort_by(|a, b| b.month_key.cmp(&a.month_key));
        payments
    }

    pub fn month_summary(&self, month: MonthKey) -> MonthSummary {
        self.payments_by_month(month)
            .into_iter()
            .fold(MonthSummary::default(), |mut summary, payment| {
                summary.total += 1;
                if payment.is_paid() {
                    summary.paid_count += 1;
                    summary.total_collected += payment.amount;
                } else {
                    summary.unpaid_count += 1;
                }
                summary
            })
    }

    pub fn current_month_unpaid(&self, today: NaiveDate) -> Vec<&KasPayment> {
        let month = MonthKey::from_date(today);
        self.payments
            .iter()
            .filter(|p| p.month_key == month && !p.is_paid())
            .collect()
    }
}

#[derive(Clone)]
pub struct KasStore {
    repository: KasRepository,
    finance: FinanceStore,
    members: MemberStore,
    dues: DuesConfig,
    snapshot: Arc<RwLock<KasSnapshot>>,
    loading: LoadingFlag,
}

impl KasStore {
    pub fn new(repository: KasRepository, finance: FinanceStore, members: MemberStore, dues: DuesConfig) -> Self {
        Self {
            repository,
            finance,
            members,
            dues,
            snapshot: Arc::new(RwLock::new(KasSnapshot::default())),
            loading: LoadingFlag::default(),
        }
    }

    pub async fn load_payments(&self) -> Result<()> {
        let _loading = self.loading.start();
        let payments = timed("select", "kas_payments", self.repository.list()).await?;
        *self.snapshot.write().await = KasSnapshot::new(payments);
        Ok(())
    }

    pub async fn snapshot(&self) -> KasSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Replace a month's payments and sync the ledger entry for it
    pub async fn save_month_payments(&self, month: MonthKey, entries: &[KasEntry]) -> Result<()> {
        timed("replace", "kas_payments", self.repository.replace_month(month, entries)).await?;
        info!(month = %month, entries = entries.len(), "Kas month saved");
        super::reload_quietly("kas_payments", self.load_payments()).await;

        self.sync_ledger(month, paid_total(entries)).await
    }

    async fn sync_ledger(&self, month: MonthKey, collected: i64) -> Result<()> {
        self.finance.load_transactions().await?;
        let existing = self
            .finance
            .snapshot()
            .await
            .kas_transaction_for_month(month, &self.dues.ledger_category)
            .map(|t| t.id);

        match existing {
            Some(id) => {
                debug!(month = %month, amount = collected, "Updating kas ledger entry");
                let update = UpdateTransactionRequest {
                    amount: Some(collected),
                    date: Some(today()),
                    ..Default::default()
                };
                self.finance.update_transaction(id, update).await?;
            }
            None => {
                debug!(month = %month, amount = collected, "Creating kas ledger entry");
                let request = CreateTransactionRequest {
                    kind: TransactionType::Income,
                    category: self.dues.ledger_category.clone(),
                    title: format!("Kas {}", month),
                    amount: collected,
                    date: today(),
                    note: Some(LEDGER_NOTE.to_string()),
                };
                self.finance.create_transaction(&request).await?;
            }
        }

        Ok(())
    }

    /// Seed a month with one unpaid row per member; months that already have rows are left alone
    pub async fn initialize_month_payments(&self, month: MonthKey) {
        if let Err(e) = self.try_initialize_month(month).await {
            error!(month = %month, error = %e, "Failed to initialize kas month");
        }
    }

    async fn try_initialize_month(&self, month: MonthKey) -> Result<()> {
        if self.repository.month_exists(month).await? {
            debug!(month = %month, "Kas month already initialized");
            return Ok(());
        }

        if self.members.snapshot().await.is_empty() {
            self.members.reload().await?;
        }

        let entries: Vec<KasEntry> = self
            .members
            .snapshot()
            .await
            .members()
            .iter()
            .map(|m| KasEntry::unpaid(m.id, self.dues.default_amount))
            .collect();

        timed("insert", "kas_payments", self.repository.insert_month(month, &entries)).await?;
        info!(month = %month, members = entries.len(), "Kas month initialized");
        super::reload_quietly("kas_payments", self.load_payments()).await;
        Ok(())
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }
}
