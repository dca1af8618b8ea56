//! Test database helper utilities
//!
//! Postgres-backed tests run only when `TEST_DATABASE_URL` is set; every
//! table is truncated before each test so they can share one database.

use std::sync::Once;
use sqlx::PgPool;
use prsdn_dashboard::config::Settings;
use prsdn_dashboard::database::DatabaseService;
use prsdn_dashboard::services::Dashboard;

static INIT: Once = Once::new();

const TABLES: &[&str] = &[
    "poll_votes",
    "poll_options",
    "polls",
    "payment_records",
    "payment_items",
    "attendance_checkins",
    "attendance_events",
    "events",
    "kas_payments",
    "finance_transactions",
    "account_applications",
    "user_accounts",
    "members",
];

pub struct TestDatabase {
    pub pool: PgPool,
}

impl TestDatabase {
    /// Connect, migrate and empty the test database; `None` when no database is configured
    pub async fn connect() -> Option<Self> {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt::try_init();
        });

        let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set, skipping database test");
            return None;
        };

        let pool = PgPool::connect(&url).await.expect("Failed to connect to test database");
        sqlx::migrate!("./migrations").run(&pool).await.expect("Failed to run migrations");

        let db = Self { pool };
        db.cleanup().await.expect("Failed to clean test database");
        Some(db)
    }

    pub async fn cleanup(&self) -> Result<(), sqlx::Error> {
        sqlx::query(&format!("TRUNCATE {} CASCADE", TABLES.join(", ")))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn count_records(&self, table: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
    }

    pub fn service(&self) -> DatabaseService {
        DatabaseService::new(self.pool.clone())
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::new(self.service(), None, &Settings::default())
    }
}
