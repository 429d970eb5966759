use chrono::Utc;
use sqlx::PgPool;

use crate::database::models::RatingEntity;
use crate::error::AppResult;
use crate::models::Rating;

#[derive(Clone)]
pub struct RatingRepository {
    pool: PgPool,
}

impl RatingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, user_id: &str, startup_id: i64, score: i16) -> AppResult<Rating> {
        let entity = sqlx::query_as::<_, RatingEntity>(
            r#"
            INSERT INTO ratings (user_id, startup_id, score, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, startup_id)
            DO UPDATE SET score = EXCLUDED.score, updated_at = EXCLUDED.updated_at
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(startup_id)
        .bind(score)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.to_domain_model())
    }

    pub async fn ratings_of(&self, user_id: &str) -> AppResult<Vec<Rating>> {
        let rows = sqlx::query_as::<_, RatingEntity>("SELECT * FROM ratings WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(RatingEntity::to_domain_model).collect())
    }
}
