use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{
    CalendarEvent, ChatTurn, FeedbackSession, FeedbackSessionStatus, Insight, Question, Rating,
    Stage, StructuredQaEntry, Vote,
};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct VoteEntity {
    pub user_id: String,
    pub startup_id: i64,
    pub interested: bool,
    pub created_at: DateTime<Utc>,
}

impl VoteEntity {
    pub fn to_domain_model(self) -> Vote {
        Vote {
            user_id: self.user_id,
            startup_id: self.startup_id,
            interested: self.interested,
            created_at: self.created_at,
        }
    }

    pub fn from_domain(vote: &Vote) -> Self {
        Self {
            user_id: vote.user_id.clone(),
            startup_id: vote.startup_id,
            interested: vote.interested,
            created_at: vote.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RatingEntity {
    pub user_id: String,
    pub startup_id: i64,
    pub score: i16,
    pub updated_at: DateTime<Utc>,
}

impl RatingEntity {
    pub fn to_domain_model(self) -> Rating {
        Rating {
            user_id: self.user_id,
            startup_id: self.startup_id,
            score: self.score,
            updated_at: self.updated_at,
        }
    }

    pub fn from_domain(rating: &Rating) -> Self {
        Self {
            user_id: rating.user_id.clone(),
            startup_id: rating.startup_id,
            score: rating.score,
            updated_at: rating.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CalendarEventEntity {
    pub id: Uuid,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub attendees: serde_json::Value,
    pub event_type: String,
    pub category: Option<String>,
    pub stage: Option<String>,
}

impl CalendarEventEntity {
    pub fn to_domain_model(self) -> Result<CalendarEvent, serde_json::Error> {
        let attendees = serde_json::from_value(self.attendees)?;
        Ok(CalendarEvent {
            id: self.id,
            title: self.title,
            start: self.start,
            end: self.end,
            attendees,
            event_type: self.event_type,
            category: self.category,
            stage: self.stage.as_deref().map(Stage::normalize),
        })
    }

    pub fn from_domain(event: &CalendarEvent) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: event.id,
            title: event.title.clone(),
            start: event.start,
            end: event.end,
            attendees: serde_json::to_value(&event.attendees)?,
            event_type: event.event_type.clone(),
            category: event.category.clone(),
            stage: event.stage.map(|s| format!("{:?}", s)),
        })
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FeedbackSessionEntity {
    pub id: Uuid,
    pub meeting_id: String,
    pub user_id: String,
    pub startup_id: Option<i64>,
    pub startup_name: String,
    pub questions: serde_json::Value,
    pub answers: serde_json::Value,
    pub current_index: i32,
    pub status: String,
    pub history: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn status_to_string(status: FeedbackSessionStatus) -> String {
    match status {
        FeedbackSessionStatus::InProgress => "in_progress".to_string(),
        FeedbackSessionStatus::Completed => "completed".to_string(),
        FeedbackSessionStatus::Abandoned => "abandoned".to_string(),
    }
}

fn status_from_str(raw: &str) -> FeedbackSessionStatus {
    match raw {
        "completed" => FeedbackSessionStatus::Completed,
        "abandoned" => FeedbackSessionStatus::Abandoned,
        _ => FeedbackSessionStatus::InProgress,
    }
}

impl FeedbackSessionEntity {
    pub fn to_domain_model(self) -> Result<FeedbackSession, serde_json::Error> {
        let questions: Vec<Question> = serde_json::from_value(self.questions)?;
        let answers: Vec<(Uuid, String)> = serde_json::from_value(self.answers)?;
        let history: Vec<ChatTurn> = serde_json::from_value(self.history)?;
        Ok(FeedbackSession {
            id: self.id,
            meeting_id: self.meeting_id,
            user_id: self.user_id,
            startup_id: self.startup_id,
            startup_name: self.startup_name,
            questions,
            answers,
            current_index: self.current_index,
            status: status_from_str(&self.status),
            history,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }

    pub fn from_domain(session: &FeedbackSession) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: session.id,
            meeting_id: session.meeting_id.clone(),
            user_id: session.user_id.clone(),
            startup_id: session.startup_id,
            startup_name: session.startup_name.clone(),
            questions: serde_json::to_value(&session.questions)?,
            answers: serde_json::to_value(&session.answers)?,
            current_index: session.current_index,
            status: status_to_string(session.status),
            history: serde_json::to_value(&session.history)?,
            created_at: session.created_at,
            updated_at: session.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct InsightEntity {
    pub id: Uuid,
    pub meeting_id: String,
    pub user_id: String,
    pub startup_id: Option<i64>,
    pub structured_qa: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InsightEntity {
    pub fn to_domain_model(self) -> Result<Insight, serde_json::Error> {
        let structured_qa: Vec<StructuredQaEntry> = serde_json::from_value(self.structured_qa)?;
        Ok(Insight {
            id: self.id,
            meeting_id: self.meeting_id,
            user_id: self.user_id,
            startup_id: self.startup_id,
            structured_qa,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }

    pub fn from_domain(insight: &Insight) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: insight.id,
            meeting_id: insight.meeting_id.clone(),
            user_id: insight.user_id.clone(),
            startup_id: insight.startup_id,
            structured_qa: serde_json::to_value(&insight.structured_qa)?,
            created_at: insight.created_at,
            updated_at: insight.updated_at,
        })
    }
}
