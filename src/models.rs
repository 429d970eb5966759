//! Domain data model shared across the corpus store, classifier,
//! prioritization engine, filter pipeline, and HTTP handlers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    PreSeed,
    Seed,
    SeriesA,
    SeriesB,
    SeriesC,
    SeriesDPlus,
    Growth,
    Undisclosed,
}

impl Stage {
    /// Stage weight multiplier applied in prioritization step 2.
    pub fn weight(&self) -> f64 {
        match self {
            Stage::PreSeed => 1.10,
            Stage::Seed => 1.00,
            Stage::SeriesA => 1.00,
            Stage::SeriesB => 1.00,
            Stage::SeriesC => 0.90,
            Stage::SeriesDPlus => 0.80,
            Stage::Growth => 0.80,
            Stage::Undisclosed => 1.00,
        }
    }

    /// Deterministic normalization of the corpus's free-text investment
    /// stage label into the enum scoring actually consults. Resolves Open
    /// Question 1.
    pub fn normalize(raw: &str) -> Stage {
        let lower = raw.to_lowercase();
        if lower.contains("pre-seed") || lower.contains("preseed") || lower.contains("pre seed") {
            Stage::PreSeed
        } else if lower.contains("series a") {
            Stage::SeriesA
        } else if lower.contains("series b") {
            Stage::SeriesB
        } else if lower.contains("series c") {
            Stage::SeriesC
        } else if lower.contains("series d")
            || lower.contains("series e")
            || lower.contains("series f")
            || lower.contains("growth equity")
        {
            Stage::SeriesDPlus
        } else if lower.contains("growth") {
            Stage::Growth
        } else if lower.contains("seed") {
            Stage::Seed
        } else {
            Stage::Undisclosed
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Startup {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub short_description: Option<String>,
    pub primary_industry: String,
    #[serde(default)]
    pub secondary_industries: HashSet<String>,
    #[serde(default)]
    pub business_types: HashSet<String>,
    pub stage: Stage,
    /// The corpus's free-text stage label, kept for display only — never
    /// consulted by scoring logic.
    #[serde(default)]
    pub raw_stage_label: String,
    #[serde(default)]
    pub total_funding_usd_millions: Option<f64>,
    #[serde(default)]
    pub last_funding_date: Option<NaiveDate>,
    #[serde(default)]
    pub employees: String,
    pub country: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub topics: HashSet<String>,
    #[serde(default)]
    pub tech_stack: HashSet<String>,
    #[serde(default)]
    pub maturity_score: Option<i32>,
    #[serde(default)]
    pub enrichment: Option<serde_json::Value>,
}

impl Startup {
    pub fn short_description(&self) -> String {
        self.short_description
            .clone()
            .unwrap_or_else(|| self.description.chars().take(160).collect::<String>())
    }

    /// Concatenation of the fields the classifier and filter match phrases
    /// against: name, description, topics, tech stack (lowercased).
    pub fn searchable_text(&self) -> String {
        let mut out = String::with_capacity(self.name.len() + self.description.len() + 64);
        out.push_str(&self.name.to_lowercase());
        out.push(' ');
        out.push_str(&self.description.to_lowercase());
        for t in &self.topics {
            out.push(' ');
            out.push_str(&t.to_lowercase());
        }
        for t in &self.tech_stack {
            out.push(' ');
            out.push_str(&t.to_lowercase());
        }
        out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub user_id: String,
    pub startup_id: i64,
    pub interested: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: String,
    pub startup_id: i64,
    pub score: i16,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: uuid::Uuid,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub attendees: HashSet<String>,
    pub event_type: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub stage: Option<Stage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCategory {
    Technical,
    Business,
    Action,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: uuid::Uuid,
    pub text: String,
    pub category: QuestionCategory,
    pub placeholder: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackSessionStatus {
    InProgress,
    Completed,
    Abandoned,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackSession {
    pub id: uuid::Uuid,
    pub meeting_id: String,
    pub user_id: String,
    pub startup_id: Option<i64>,
    pub startup_name: String,
    pub questions: Vec<Question>,
    pub answers: Vec<(uuid::Uuid, String)>,
    pub current_index: i32,
    pub status: FeedbackSessionStatus,
    pub history: Vec<ChatTurn>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredQaEntry {
    pub question_id: uuid::Uuid,
    pub question: String,
    pub category: QuestionCategory,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub id: uuid::Uuid,
    pub meeting_id: String,
    pub user_id: String,
    pub startup_id: Option<i64>,
    pub structured_qa: Vec<StructuredQaEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Category {
    AgenticPlatformEnabler,
    AgenticMarketing,
    AgenticClaims,
    AgenticHR,
    AgenticCustomerService,
    DevIntegration,
    InsuranceTech,
    GeneralAIML,
    Uncategorized,
}

impl Category {
    /// Priority tier used by the first-10 diversity rule (step 7).
    pub fn tier(&self) -> u8 {
        match self {
            Category::AgenticPlatformEnabler => 1,
            Category::AgenticMarketing
            | Category::AgenticClaims
            | Category::AgenticHR
            | Category::AgenticCustomerService => 2,
            Category::DevIntegration => 3,
            Category::InsuranceTech => 4,
            Category::GeneralAIML => 5,
            Category::Uncategorized => 6,
        }
    }

    pub fn base_score(&self) -> i32 {
        match self {
            Category::AgenticPlatformEnabler => 100,
            Category::AgenticMarketing | Category::AgenticClaims => 85,
            Category::AgenticHR | Category::AgenticCustomerService => 80,
            Category::DevIntegration => 75,
            Category::InsuranceTech => 65,
            Category::GeneralAIML => 50,
            Category::Uncategorized => 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub key: String,
    pub value: T,
    pub inserted_at: DateTime<Utc>,
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_series_labels() {
        assert_eq!(Stage::normalize("Series A"), Stage::SeriesA);
        assert_eq!(Stage::normalize("series-b"), Stage::SeriesB);
        assert_eq!(Stage::normalize("Pre-Seed"), Stage::PreSeed);
        assert_eq!(Stage::normalize("Series D"), Stage::SeriesDPlus);
        assert_eq!(Stage::normalize("Growth Equity"), Stage::SeriesDPlus);
        assert_eq!(Stage::normalize("Bootstrapped"), Stage::Undisclosed);
    }

    #[test]
    fn category_tiers_match_priority_table() {
        assert_eq!(Category::AgenticPlatformEnabler.tier(), 1);
        assert_eq!(Category::AgenticMarketing.tier(), 2);
        assert_eq!(Category::InsuranceTech.tier(), 4);
    }
}
