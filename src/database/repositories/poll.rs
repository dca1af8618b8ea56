//! Poll repository implementation

use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use chrono::Utc;
use uuid::Uuid;
use crate::models::poll::{Poll, PollDraft, PollOption, PollStatus, OptionInput, PollVote, VoterDetail};
use crate::utils::errors::DashboardError;

const POLL_COLUMNS: &str =
    "id, title, description, type, question_type, is_anonymous, requires_login, start_date, end_date, result_visibility, allow_edit_vote, status, created_at, created_by";

#[derive(Clone, Debug)]
pub struct PollRepository {
    pool: PgPool,
}

impl PollRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Polls, newest first; `published_only` restricts to active and closed
    pub async fn list(&self, published_only: bool) -> Result<Vec<Poll>, DashboardError> {
        let filter = if published_only {
            "WHERE status IN ('active', 'closed')"
        } else {
            ""
        };

        let polls = sqlx::query_as::<_, Poll>(
            &format!("SELECT {} FROM polls {} ORDER BY created_at DESC", POLL_COLUMNS, filter)
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(polls)
    }

    /// Find poll by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Poll>, DashboardError> {
        let poll = sqlx::query_as::<_, Poll>(
            &format!("SELECT {} FROM polls WHERE id = $1", POLL_COLUMNS)
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(poll)
    }

    /// Options of a poll
    pub async fn options(&self, poll_id: Uuid) -> Result<Vec<PollOption>, DashboardError> {
        let options = sqlx::query_as::<_, PollOption>(
            "SELECT id, poll_id, label FROM poll_options WHERE poll_id = $1"
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(options)
    }

    /// Insert a poll and its options together
    pub async fn create_with_options(&self, draft: &PollDraft, created_by: Option<Uuid>, labels: &[String]) -> Result<Poll, DashboardError> {
        let mut tx = self.pool.begin().await?;

        let poll = sqlx::query_as::<_, Poll>(&format!(
            r#"
            INSERT INTO polls (title, description, type, question_type, is_anonymous, requires_login, start_date, end_date, result_visibility, allow_edit_vote, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            POLL_COLUMNS
        ))
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.kind)
        .bind(draft.question_type)
        .bind(draft.is_anonymous)
        .bind(draft.requires_login)
        .bind(draft.start_date)
        .bind(draft.end_date)
        .bind(draft.result_visibility)
        .bind(draft.allow_edit_vote)
        .bind(draft.status.unwrap_or(PollStatus::Draft))
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        Self::insert_options(&mut *tx, poll.id, labels.iter().map(String::as_str)).await?;

        tx.commit().await?;
        Ok(poll)
    }

    /// Update poll fields and bring its options in line with `options`
    ///
    /// Existing options missing from the list are deleted, listed options with an
    /// id get their label updated and options without an id are inserted. The
    /// creator and status are left untouched.
    pub async fn update_with_options(&self, id: Uuid, draft: &PollDraft, options: &[OptionInput]) -> Result<(), DashboardError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE polls
            SET title = $2, description = $3, type = $4, question_type = $5, is_anonymous = $6,
                requires_login = $7, start_date = $8, end_date = $9, result_visibility = $10,
                allow_edit_vote = $11, updated_at = $12
            WHERE id = $1
            "#
        )
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.kind)
        .bind(draft.question_type)
        .bind(draft.is_anonymous)
        .bind(draft.requires_login)
        .bind(draft.start_date)
        .bind(draft.end_date)
        .bind(draft.result_visibility)
        .bind(draft.allow_edit_vote)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DashboardError::NotFound { entity: "poll", id });
        }

        let kept: Vec<Uuid> = options.iter().filter_map(|o| o.id).collect();
        sqlx::query("DELETE FROM poll_options WHERE poll_id = $1 AND NOT (id = ANY($2))")
            .bind(id)
            .bind(&kept)
            .execute(&mut *tx)
            .await?;

        for option in options {
            if let Some(option_id) = option.id {
                sqlx::query("UPDATE poll_options SET label = $3 WHERE id = $1 AND poll_id = $2")
                    .bind(option_id)
                    .bind(id)
                    .bind(&option.label)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        let new_labels = options.iter().filter(|o| o.id.is_none()).map(|o| o.label.as_str());
        Self::insert_options(&mut *tx, id, new_labels).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn insert_options<'a>(conn: &mut PgConnection, poll_id: Uuid, labels: impl Iterator<Item = &'a str>) -> Result<(), DashboardError> {
        let labels: Vec<&str> = labels.collect();
        if labels.is_empty() {
            return Ok(());
        }

        let mut builder = QueryBuilder::<Postgres>::new("INSERT INTO poll_options (poll_id, label) ");
        builder.push_values(labels, |mut row, label| {
            row.push_bind(poll_id).push_bind(label.to_string());
        });
        builder.build().execute(conn).await?;

        Ok(())
    }

    /// Every vote cast in a poll
    pub async fn votes(&self, poll_id: Uuid) -> Result<Vec<PollVote>, DashboardError> {
        let votes = sqlx::query_as::<_, PollVote>(
            "SELECT id, poll_id, option_id, user_id, created_at FROM poll_votes WHERE poll_id = $1"
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(votes)
    }

    /// Votes cast by one user in a poll
    pub async fn user_votes(&self, poll_id: Uuid, user_id: Uuid) -> Result<Vec<PollVote>, DashboardError> {
        let votes = sqlx::query_as::<_, PollVote>(
            "SELECT id, poll_id, option_id, user_id, created_at FROM poll_votes WHERE poll_id = $1 AND user_id = $2"
        )
        .bind(poll_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(votes)
    }

    /// Record a ballot, optionally replacing the user's earlier one
    pub async fn cast_votes(&self, poll_id: Uuid, user_id: Uuid, option_ids: &[Uuid], replace_previous: bool) -> Result<(), DashboardError> {
        let mut tx = self.pool.begin().await?;

        if replace_previous {
            sqlx::query("DELETE FROM poll_votes WHERE poll_id = $1 AND user_id = $2")
                .bind(poll_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        let mut builder = QueryBuilder::<Postgres>::new("INSERT INTO poll_votes (poll_id, option_id, user_id) ");
        builder.push_values(option_ids, |mut row, option_id| {
            row.push_bind(poll_id).push_bind(*option_id).push_bind(user_id);
        });
        builder.build().execute(&mut *tx).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Votes joined with the voter's username and member name
    pub async fn voter_details(&self, poll_id: Uuid) -> Result<Vec<VoterDetail>, DashboardError> {
        let details = sqlx::query_as::<_, VoterDetail>(
            r#"
            SELECT v.id, v.option_id, v.user_id, ua.username, m.full_name, v.created_at
            FROM poll_votes v
            LEFT JOIN user_accounts ua ON ua.id = v.user_id
            LEFT JOIN members m ON m.id = ua.member_id
            WHERE v.poll_id = $1
            ORDER BY v.created_at ASC
            "#
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(details)
    }

    /// Change poll status
    pub async fn set_status(&self, id: Uuid, status: PollStatus) -> Result<(), DashboardError> {
        sqlx::query("UPDATE polls SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete poll with its options and votes
    pub async fn delete(&self, id: Uuid) -> Result<(), DashboardError> {
        sqlx::query("DELETE FROM polls WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
