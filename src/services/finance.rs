//! Finance ledger store

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;
use crate::database::TransactionRepository;
use crate::models::finance::{
    FinanceTransaction, TransactionType, CreateTransactionRequest, UpdateTransactionRequest,
};
use crate::utils::errors::Result;
use crate::utils::helpers::MonthKey;
use super::{timed, LoadingFlag};

#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    transactions: Vec<FinanceTransaction>,
}

impl LedgerSnapshot {
    pub fn new(transactions: Vec<FinanceTransaction>) -> Self {
        Self { transactions }
    }

    pub fn transactions(&self) -> &[FinanceTransaction] {
        &self.transactions
    }

    fn sum(&self, kind: TransactionType) -> i64 {
        self.transactions.iter().filter(|t| t.kind == kind).map(|t| t.amount).sum()
    }

    pub fn total_income(&self) -> i64 {
        self.sum(TransactionType::Income)
    }

    pub fn total_expense(&self) -> i64 {
        self.sum(TransactionType::Expense)
    }

    pub fn balance(&self) -> i64 {
        self.total_income() - self.total_expense()
    }

    fn of_kind(&self, kind: TransactionType) -> Vec<&FinanceTransaction> {
        let mut matching: Vec<&FinanceTransaction> = self.transactions.iter().filter(|t| t.kind == kind).collect();
        matching.sort_by(|a, b| b.date.cmp(&a.date));
        matching
    }

    pub fn income_transactions(&self) -> Vec<&FinanceTransaction> {
        self.of_kind(TransactionType::Income)
    }

    pub fn expense_transactions(&self) -> Vec<&FinanceTransaction> {
        self.of_kind(TransactionType::Expense)
    }

    /// The dues entry booked for a month: first in `category` whose title mentions the month key
    pub fn kas_transaction_for_month(&self, month: MonthKey, category: &str) -> Option<&FinanceTransaction> {
        let key = month.to_string();
        self.transactions
            .iter()
            .find(|t| t.category == category && t.title.contains(&key))
    }
}

#[derive(Clone)]
pub struct FinanceStore {
    repository: TransactionRepository,
    snapshot: Arc<RwLock<LedgerSnapshot>>,
    loading: LoadingFlag,
}

impl FinanceStore {
    pub fn new(repository: TransactionRepository) -> Self {
        Self {
            repository,
            snapshot: Arc::new(RwLock::new(LedgerSnapshot::default())),
            loading: LoadingFlag::default(),
        }
    }

    pub async fn load_transactions(&self) -> Result<()> {
        let _loading = self.loading.start();
        let transactions = timed("select", "finance_transactions", self.repository.list()).await?;
        *self.snapshot.write().await = LedgerSnapshot::new(transactions);
        Ok(())
    }

    pub async fn snapshot(&self) -> LedgerSnapshot {
        self.snapshot.read().await.clone()
    }

    pub async fn create_transaction(&self, request: &CreateTransactionRequest) -> Result<FinanceTransaction> {
        let transaction = timed("insert", "finance_transactions", self.repository.create(request)).await?;
        info!(transaction_id = %transaction.id, amount = transaction.amount, "Transaction recorded");
        super::reload_quietly("finance_transactions", self.load_transactions()).await;
        Ok(transaction)
    }

    pub async fn update_transaction(&self, id: Uuid, request: UpdateTransactionRequest) -> Result<FinanceTransaction> {
        let transaction = timed("update", "finance_transactions", self.repository.update(id, request)).await?;
        super::reload_quietly("finance_transactions", self.load_transactions()).await;
        Ok(transaction)
    }

    pub async fn delete_transaction(&self, id: Uuid) -> Result<()> {
        timed("delete", "finance_transactions", self.repository.delete(id)).await?;
        super::reload_quietly("finance_transactions", self.load_transactions()).await;
        Ok(())
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn transaction(kind: TransactionType, category: &str, title: &str, amount: i64, day: u32) -> FinanceTransaction {
        FinanceTransaction {
            id: Uuid::new_v4(),
            kind,
            category: category.to_string(),
            title: title.to_string(),
            amount,
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            note: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_totals_and_balance() {
        let ledger = LedgerSnapshot::new(vec![
            transaction(TransactionType::Income, "kas", "Kas 2024-03", 45_000, 2),
            transaction(TransactionType::Income, "donasi", "Donasi warga", 100_000, 9),
            transaction(TransactionType::Expense, "acara", "Konsumsi rapat", 60_000, 5),
        ]);
        assert_eq!(ledger.total_income(), 145_000);
        assert_eq!(ledger.total_expense(), 60_000);
        assert_eq!(ledger.balance(), 85_000);
    }

    #[test]
    fn test_income_sorted_by_date_desc() {
        let ledger = LedgerSnapshot::new(vec![
            transaction(TransactionType::Income, "kas", "Kas 2024-03", 1, 2),
            transaction(TransactionType::Income, "donasi", "Donasi", 1, 20),
            transaction(TransactionType::Expense, "acara", "Sewa tenda", 1, 25),
        ]);
        let income = ledger.income_transactions();
        assert_eq!(income.len(), 2);
        assert_eq!(income[0].title, "Donasi");
        assert_eq!(ledger.expense_transactions().len(), 1);
    }

    #[test]
    fn test_kas_transaction_for_month() {
        let ledger = LedgerSnapshot::new(vec![
            transaction(TransactionType::Income, "donasi", "Kas 2024-03 tambahan", 1, 2),
            transaction(TransactionType::Income, "kas", "Kas 2024-03", 1, 3),
        ]);
        let march: MonthKey = "2024-03".parse().unwrap();
        let april: MonthKey = "2024-04".parse().unwrap();
        assert_eq!(ledger.kas_transaction_for_month(march, "kas").unwrap().title, "Kas 2024-03");
        assert!(ledger.kas_transaction_for_month(april, "kas").is_none());
    }
}
