//! Append-only JSON-per-file log of LLM calls, satisfying the persisted
//! state layout requirement in §6: one file per call, named
//! `{YYYYMMDD_HHMMSS_micros}_{model}_{request_id}.json`.

use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct CallLogRecord {
    pub request_id: Uuid,
    pub model: String,
    pub duration_ms: u64,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub success: bool,
    pub error_kind: Option<String>,
}

pub struct CallLog {
    dir: PathBuf,
}

impl CallLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub async fn write(&self, record: &CallLogRecord) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let now = Utc::now();
        let filename = format!(
            "{}_{}_{}.json",
            now.format("%Y%m%d_%H%M%S_%6f"),
            record.model,
            record.request_id
        );
        let path = self.dir.join(filename);
        let body = serde_json::to_vec_pretty(record).unwrap_or_default();
        tokio::fs::write(path, body).await
    }
}
