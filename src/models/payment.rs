//! Payment item and record models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use crate::utils::helpers::deserialize_some;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    OneTime,
    Installment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Partial,
    Unpaid,
}

impl PaymentStatus {
    /// Status for a cumulative amount against the item's target
    pub fn for_amount(amount_paid: i64, target: i64) -> Self {
        if amount_paid >= target {
            PaymentStatus::Paid
        } else if amount_paid > 0 {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Unpaid
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentItem {
    pub id: Uuid,
    pub title: String,
    pub deadline_date: NaiveDate,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: PaymentType,
    /// Target amount per member
    pub amount: i64,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub payment_item_id: Uuid,
    pub member_id: Uuid,
    pub amount_paid: i64,
    pub status: PaymentStatus,
    pub last_payment_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentItemRequest {
    pub title: String,
    pub deadline_date: NaiveDate,
    pub kind: PaymentType,
    pub amount: i64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePaymentItemRequest {
    pub title: Option<String>,
    pub deadline_date: Option<NaiveDate>,
    pub kind: Option<PaymentType>,
    pub amount: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for_amount() {
        assert_eq!(PaymentStatus::for_amount(0, 100_000), PaymentStatus::Unpaid);
        assert_eq!(PaymentStatus::for_amount(40_000, 100_000), PaymentStatus::Partial);
        assert_eq!(PaymentStatus::for_amount(100_000, 100_000), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::for_amount(120_000, 100_000), PaymentStatus::Paid);
    }
}
