//! Change feed over Postgres LISTEN/NOTIFY
//!
//! Every realtime table carries a trigger that publishes a small JSON document
//! (`{"table", "op", "id", "poll_id"}`) on the configured channel. The feed
//! decodes those documents into [`TableChange`] values.

use async_stream::try_stream;
use futures::Stream;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgListener;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;
use crate::utils::errors::{DashboardError, Result};
use crate::utils::logging::log_change_event;

/// Tables that publish change notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Members,
    AccountApplications,
    FinanceTransactions,
    KasPayments,
    Events,
    AttendanceEvents,
    AttendanceCheckins,
    Polls,
    PollVotes,
    #[serde(other)]
    Unknown,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Members => "members",
            Table::AccountApplications => "account_applications",
            Table::FinanceTransactions => "finance_transactions",
            Table::KasPayments => "kas_payments",
            Table::Events => "events",
            Table::AttendanceEvents => "attendance_events",
            Table::AttendanceCheckins => "attendance_checkins",
            Table::Polls => "polls",
            Table::PollVotes => "poll_votes",
            Table::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

/// One row change published by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableChange {
    pub table: Table,
    pub op: ChangeOp,
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub poll_id: Option<Uuid>,
}

impl TableChange {
    pub fn parse(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }
}

/// Subscription factory for the change channel
#[derive(Clone, Debug)]
pub struct ChangeFeed {
    pool: PgPool,
    channel: String,
}

impl ChangeFeed {
    pub fn new(pool: PgPool, channel: impl Into<String>) -> Self {
        Self { pool, channel: channel.into() }
    }

    /// Start listening; the stream ends only on a connection error
    pub async fn subscribe(&self) -> Result<impl Stream<Item = Result<TableChange>> + Send + 'static> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(&self.channel).await?;
        tracing::info!(channel = %self.channel, "Listening for table changes");

        Ok(try_stream! {
            loop {
                let notification = listener.recv().await.map_err(DashboardError::from)?;
                match TableChange::parse(notification.payload()) {
                    Ok(change) => {
                        log_change_event(change.table.as_str(), &format!("{:?}", change.op), change.id);
                        yield change;
                    }
                    Err(e) => warn!(payload = notification.payload(), error = %e, "Ignoring malformed change notification"),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trigger_payload() {
        let change = TableChange::parse(
            r#"{"table":"poll_votes","op":"INSERT","id":"6f1c1d2e-8a57-4d0e-9d35-2f0f3f0ad001","poll_id":"0b8d8f5c-3e3a-4c55-a7bb-9c1f2f6c0a02"}"#,
        )
        .unwrap();

        assert_eq!(change.table, Table::PollVotes);
        assert_eq!(change.op, ChangeOp::Insert);
        assert!(change.id.is_some());
        assert_eq!(change.poll_id.unwrap().to_string(), "0b8d8f5c-3e3a-4c55-a7bb-9c1f2f6c0a02");
    }

    #[test]
    fn test_parse_payload_without_poll_id() {
        let change = TableChange::parse(r#"{"table":"members","op":"DELETE","id":null,"poll_id":null}"#).unwrap();
        assert_eq!(change.table, Table::Members);
        assert_eq!(change.op, ChangeOp::Delete);
        assert_eq!(change.poll_id, None);
    }

    #[test]
    fn test_unknown_table_is_tolerated() {
        let change = TableChange::parse(r#"{"table":"audit_log","op":"UPDATE"}"#).unwrap();
        assert_eq!(change.table, Table::Unknown);
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        assert!(matches!(TableChange::parse("not json"), Err(DashboardError::Serialization(_))));
    }
}
