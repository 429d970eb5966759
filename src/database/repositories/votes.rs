use chrono::Utc;
use sqlx::PgPool;

use crate::database::models::VoteEntity;
use crate::error::AppResult;
use crate::models::Vote;

#[derive(Clone)]
pub struct VoteRepository {
    pool: PgPool,
}

impl VoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts a vote for `(user_id, startup_id)` — a re-vote replaces the
    /// prior `interested` value rather than duplicating the row.
    pub async fn upsert(&self, user_id: &str, startup_id: i64, interested: bool) -> AppResult<Vote> {
        let entity = sqlx::query_as::<_, VoteEntity>(
            r#"
            INSERT INTO votes (user_id, startup_id, interested, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, startup_id)
            DO UPDATE SET interested = EXCLUDED.interested
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(startup_id)
        .bind(interested)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.to_domain_model())
    }

    pub async fn votes_of(&self, user_id: &str) -> AppResult<Vec<Vote>> {
        let rows = sqlx::query_as::<_, VoteEntity>("SELECT * FROM votes WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(VoteEntity::to_domain_model).collect())
    }
}
