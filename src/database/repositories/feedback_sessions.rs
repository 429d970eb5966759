use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{FeedbackSessionEntity, InsightEntity};
use crate::error::{AppError, AppResult};
use crate::models::{FeedbackSession, Insight};

#[derive(Clone)]
pub struct FeedbackSessionRepository {
    pool: PgPool,
}

impl FeedbackSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, session: &FeedbackSession) -> AppResult<FeedbackSession> {
        let entity = FeedbackSessionEntity::from_domain(session)
            .map_err(|e| AppError::SerializationError(e.to_string()))?;
        let row = sqlx::query_as::<_, FeedbackSessionEntity>(
            r#"
            INSERT INTO feedback_sessions
                (id, meeting_id, user_id, startup_id, startup_name, questions, answers,
                 current_index, status, history, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(entity.id)
        .bind(entity.meeting_id)
        .bind(entity.user_id)
        .bind(entity.startup_id)
        .bind(entity.startup_name)
        .bind(entity.questions)
        .bind(entity.answers)
        .bind(entity.current_index)
        .bind(entity.status)
        .bind(entity.history)
        .bind(entity.created_at)
        .bind(entity.updated_at)
        .fetch_one(&self.pool)
        .await?;

        row.to_domain_model()
            .map_err(|e| AppError::SerializationError(e.to_string()))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Option<FeedbackSession>> {
        let row = sqlx::query_as::<_, FeedbackSessionEntity>(
            "SELECT * FROM feedback_sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|e| e.to_domain_model().map_err(|e| AppError::SerializationError(e.to_string())))
            .transpose()
    }

    pub async fn save(&self, session: &FeedbackSession) -> AppResult<()> {
        let entity = FeedbackSessionEntity::from_domain(session)
            .map_err(|e| AppError::SerializationError(e.to_string()))?;
        sqlx::query(
            r#"
            UPDATE feedback_sessions SET
                answers = $2, current_index = $3, status = $4, history = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(entity.id)
        .bind(entity.answers)
        .bind(entity.current_index)
        .bind(entity.status)
        .bind(entity.history)
        .bind(entity.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn save_insight(&self, insight: &Insight) -> AppResult<()> {
        let entity = InsightEntity::from_domain(insight)
            .map_err(|e| AppError::SerializationError(e.to_string()))?;
        sqlx::query(
            r#"
            INSERT INTO insights (id, meeting_id, user_id, startup_id, structured_qa, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id)
            DO UPDATE SET structured_qa = EXCLUDED.structured_qa, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(entity.id)
        .bind(entity.meeting_id)
        .bind(entity.user_id)
        .bind(entity.startup_id)
        .bind(entity.structured_qa)
        .bind(entity.created_at)
        .bind(entity.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_insight(&self, id: Uuid) -> AppResult<Option<Insight>> {
        let row = sqlx::query_as::<_, InsightEntity>("SELECT * FROM insights WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|e| e.to_domain_model().map_err(|e| AppError::SerializationError(e.to_string())))
            .transpose()
    }

    pub async fn get_insight_by_meeting(&self, meeting_id: &str) -> AppResult<Option<Insight>> {
        let row = sqlx::query_as::<_, InsightEntity>(
            "SELECT * FROM insights WHERE meeting_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(meeting_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|e| e.to_domain_model().map_err(|e| AppError::SerializationError(e.to_string())))
            .transpose()
    }
}
