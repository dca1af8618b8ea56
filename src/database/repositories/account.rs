//! User account repository implementation

use sqlx::{PgConnection, PgPool};
use crate::models::account::{UserAccount, CreateAccountRequest};
use crate::utils::errors::DashboardError;

#[derive(Clone, Debug)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the account with exactly this username and password
    pub async fn find_by_credentials(&self, username: &str, password: &str) -> Result<Option<UserAccount>, DashboardError> {
        let account = sqlx::query_as::<_, UserAccount>(
            "SELECT id, member_id, username, password, role, status, created_at FROM user_accounts WHERE username = $1 AND password = $2"
        )
        .bind(username)
        .bind(password)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Find account by username
    pub async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, DashboardError> {
        let account = sqlx::query_as::<_, UserAccount>(
            "SELECT id, member_id, username, password, role, status, created_at FROM user_accounts WHERE username = $1"
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Create a new account
    pub async fn create(&self, request: &CreateAccountRequest) -> Result<UserAccount, DashboardError> {
        let mut conn = self.pool.acquire().await?;
        Self::insert(&mut *conn, request).await
    }

    /// Insert an active account on an existing connection or transaction
    pub async fn insert(conn: &mut PgConnection, request: &CreateAccountRequest) -> Result<UserAccount, DashboardError> {
        let account = sqlx::query_as::<_, UserAccount>(
            r#"
            INSERT INTO user_accounts (member_id, username, password, role, status)
            VALUES ($1, $2, $3, $4, 'active')
            RETURNING id, member_id, username, password, role, status, created_at
            "#
        )
        .bind(request.member_id)
        .bind(&request.username)
        .bind(&request.password)
        .bind(request.role)
        .fetch_one(conn)
        .await?;

        Ok(account)
    }

    /// Check whether a username belongs to an account
    pub async fn username_exists(&self, username: &str) -> Result<bool, DashboardError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_accounts WHERE username = $1")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0 > 0)
    }
}
