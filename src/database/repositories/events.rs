use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::CalendarEventEntity;
use crate::error::{AppError, AppResult};
use crate::models::CalendarEvent;

#[derive(Clone)]
pub struct CalendarEventRepository {
    pool: PgPool,
}

impl CalendarEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, event: &CalendarEvent) -> AppResult<CalendarEvent> {
        let entity = CalendarEventEntity::from_domain(event)?;
        let row = sqlx::query_as::<_, CalendarEventEntity>(
            r#"
            INSERT INTO calendar_events (id, title, start, "end", attendees, event_type, category, stage)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(entity.id)
        .bind(entity.title)
        .bind(entity.start)
        .bind(entity.end)
        .bind(entity.attendees)
        .bind(entity.event_type)
        .bind(entity.category)
        .bind(entity.stage)
        .fetch_one(&self.pool)
        .await?;

        Ok(row
            .to_domain_model()
            .map_err(|e| AppError::SerializationError(e.to_string()))?)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Option<CalendarEvent>> {
        let row = sqlx::query_as::<_, CalendarEventEntity>("SELECT * FROM calendar_events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|e| e.to_domain_model().map_err(|e| AppError::SerializationError(e.to_string())))
            .transpose()
    }

    pub async fn list(&self) -> AppResult<Vec<CalendarEvent>> {
        let rows = sqlx::query_as::<_, CalendarEventEntity>("SELECT * FROM calendar_events ORDER BY start ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|e| e.to_domain_model().map_err(|e| AppError::SerializationError(e.to_string())))
            .collect()
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM calendar_events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
