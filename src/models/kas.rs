//! Kas (monthly dues) model

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use sqlx::FromRow;
use uuid::Uuid;
use crate::utils::helpers::MonthKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "kas_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum KasStatus {
    Paid,
    Unpaid,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct KasPayment {
    pub id: Uuid,
    #[sqlx(try_from = "String")]
    pub month_key: MonthKey,
    pub year: i32,
    pub member_id: Uuid,
    pub amount: i64,
    pub paid_at: Option<NaiveDate>,
    pub status: KasStatus,
}

impl KasPayment {
    pub fn is_paid(&self) -> bool {
        self.status == KasStatus::Paid
    }
}

/// One member's row when saving a month of dues
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KasEntry {
    pub member_id: Uuid,
    pub amount: i64,
    pub paid_at: Option<NaiveDate>,
    pub status: KasStatus,
}

impl KasEntry {
    pub fn unpaid(member_id: Uuid, amount: i64) -> Self {
        Self { member_id, amount, paid_at: None, status: KasStatus::Unpaid }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub total: usize,
    pub paid_count: usize,
    pub unpaid_count: usize,
    pub total_collected: i64,
}
