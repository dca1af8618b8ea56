//! Payment items and per-member payment records

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;
use crate::database::PaymentRepository;
use crate::models::payment::{
    CreatePaymentItemRequest, PaymentItem, PaymentRecord, PaymentStatus, UpdatePaymentItemRequest,
};
use crate::utils::errors::Result;
use super::{timed, LoadingFlag};

#[derive(Debug, Clone, Default)]
pub struct PaymentSnapshot {
    items: Vec<PaymentItem>,
    records: Vec<PaymentRecord>,
    records_item: Option<Uuid>,
}

impl PaymentSnapshot {
    pub fn items(&self) -> &[PaymentItem] {
        &self.items
    }

    pub fn active_items(&self) -> Vec<&PaymentItem> {
        self.items.iter().filter(|i| i.is_active).collect()
    }

    pub fn get_payment_item_by_id(&self, id: Uuid) -> Option<&PaymentItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Records of the item loaded last
    pub fn records(&self) -> &[PaymentRecord] {
        &self.records
    }

    pub fn records_item(&self) -> Option<Uuid> {
        self.records_item
    }

    pub fn record_for_member(&self, member_id: Uuid) -> Option<&PaymentRecord> {
        self.records.iter().find(|r| r.member_id == member_id)
    }

    pub fn total_collected(&self) -> i64 {
        self.records.iter().map(|r| r.amount_paid).sum()
    }
}

#[derive(Clone)]
pub struct PaymentStore {
    repository: PaymentRepository,
    snapshot: Arc<RwLock<PaymentSnapshot>>,
    loading: LoadingFlag,
}

impl PaymentStore {
    pub fn new(repository: PaymentRepository) -> Self {
        Self {
            repository,
            snapshot: Arc::new(RwLock::new(PaymentSnapshot::default())),
            loading: LoadingFlag::default(),
        }
    }

    pub async fn snapshot(&self) -> PaymentSnapshot {
        self.snapshot.read().await.clone()
    }

    pub async fn load_payment_items(&self) -> Result<()> {
        let _loading = self.loading.start();
        let items = timed("select", "payment_items", self.repository.list_items()).await?;
        self.snapshot.write().await.items = items;
        Ok(())
    }

    pub async fn get_payment_item_by_id(&self, id: Uuid) -> Option<PaymentItem> {
        self.snapshot.read().await.get_payment_item_by_id(id).cloned()
    }

    pub async fn load_payment_records(&self, item_id: Uuid) -> Result<()> {
        let _loading = self.loading.start();
        let records = timed("select", "payment_records", self.repository.records_for_item(item_id)).await?;
        let mut snapshot = self.snapshot.write().await;
        snapshot.records = records;
        snapshot.records_item = Some(item_id);
        Ok(())
    }

    /// Add `amount` to a member's running total for an item
    pub async fn record_payment(&self, item_id: Uuid, member_id: Uuid, amount: i64, target: i64) -> Result<PaymentRecord> {
        let existing = self
            .repository
            .find_record(item_id, member_id)
            .await?
            .map(|r| r.amount_paid)
            .unwrap_or(0);

        let total = existing + amount;
        let status = PaymentStatus::for_amount(total, target);
        let record = timed(
            "upsert",
            "payment_records",
            self.repository.upsert_record(item_id, member_id, total, status),
        )
        .await?;
        info!(item_id = %item_id, member_id = %member_id, amount_paid = total, status = ?status, "Payment recorded");

        super::reload_quietly("payment_records", self.load_payment_records(item_id)).await;
        Ok(record)
    }

    pub async fn create_payment_item(&self, request: &CreatePaymentItemRequest) -> Result<PaymentItem> {
        let item = timed("insert", "payment_items", self.repository.create_item(request)).await?;
        super::reload_quietly("payment_items", self.load_payment_items()).await;
        Ok(item)
    }

    pub async fn update_payment_item(&self, id: Uuid, request: UpdatePaymentItemRequest) -> Result<PaymentItem> {
        let item = timed("update", "payment_items", self.repository.update_item(id, request)).await?;
        super::reload_quietly("payment_items", self.load_payment_items()).await;
        Ok(item)
    }

    pub async fn delete_payment_item(&self, id: Uuid) -> Result<()> {
        timed("delete", "payment_items", self.repository.delete_item(id)).await?;
        super::reload_quietly("payment_items", self.load_payment_items()).await;
        Ok(())
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }
}
