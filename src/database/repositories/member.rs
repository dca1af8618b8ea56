//! Member repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use uuid::Uuid;
use crate::models::member::{Member, MemberProfile, UpdateMemberRequest};
use crate::utils::errors::DashboardError;

#[derive(Clone, Debug)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All members, newest first, with the role of their account
    pub async fn list_with_roles(&self) -> Result<Vec<Member>, DashboardError> {
        let members = sqlx::query_as::<_, Member>(
            r#"
            SELECT m.*, ua.role AS account_role
            FROM members m
            LEFT JOIN user_accounts ua ON ua.member_id = m.id
            ORDER BY m.created_at DESC
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    /// Create a new member
    pub async fn create(&self, profile: &MemberProfile) -> Result<Member, DashboardError> {
        let mut conn = self.pool.acquire().await?;
        Self::insert(&mut *conn, profile).await
    }

    /// Insert a member on an existing connection or transaction
    pub async fn insert(conn: &mut PgConnection, profile: &MemberProfile) -> Result<Member, DashboardError> {
        let member = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (full_name, birth_place, birth_date, rt, phone, instagram, job, grade, university, joined_whatsapp, education_status, education_level)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#
        )
        .bind(&profile.full_name)
        .bind(&profile.birth_place)
        .bind(profile.birth_date)
        .bind(profile.rt)
        .bind(&profile.phone)
        .bind(&profile.instagram)
        .bind(&profile.job)
        .bind(&profile.grade)
        .bind(&profile.university)
        .bind(profile.joined_whatsapp)
        .bind(profile.education_status)
        .bind(profile.education_level)
        .fetch_one(conn)
        .await?;

        Ok(member)
    }

    /// Update member
    pub async fn update(&self, id: Uuid, request: UpdateMemberRequest) -> Result<Member, DashboardError> {
        let member = sqlx::query_as::<_, Member>(
            r#"
            UPDATE members
            SET full_name = COALESCE($2, full_name),
                birth_place = COALESCE($3, birth_place),
                birth_date = COALESCE($4, birth_date),
                rt = COALESCE($5, rt),
                phone = COALESCE($6, phone),
                instagram = CASE WHEN $7 THEN $8 ELSE instagram END,
                job = CASE WHEN $9 THEN $10 ELSE job END,
                grade = CASE WHEN $11 THEN $12 ELSE grade END,
                university = CASE WHEN $13 THEN $14 ELSE university END,
                joined_whatsapp = COALESCE($15, joined_whatsapp),
                education_status = COALESCE($16, education_status),
                education_level = CASE WHEN $17 THEN $18 ELSE education_level END,
                updated_at = $19
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(request.full_name)
        .bind(request.birth_place)
        .bind(request.birth_date)
        .bind(request.rt)
        .bind(request.phone)
        .bind(request.instagram.is_some())
        .bind(request.instagram.flatten())
        .bind(request.job.is_some())
        .bind(request.job.flatten())
        .bind(request.grade.is_some())
        .bind(request.grade.flatten())
        .bind(request.university.is_some())
        .bind(request.university.flatten())
        .bind(request.joined_whatsapp)
        .bind(request.education_status)
        .bind(request.education_level.is_some())
        .bind(request.education_level.flatten())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DashboardError::NotFound { entity: "member", id })?;

        Ok(member)
    }

    /// Delete a member together with their user account
    pub async fn delete(&self, id: Uuid) -> Result<(), DashboardError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_accounts WHERE member_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Check whether a phone number belongs to a member
    pub async fn phone_exists(&self, phone: &str) -> Result<bool, DashboardError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM members WHERE phone = $1")
            .bind(phone)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0 > 0)
    }
}
