//! C1 — Corpus Store: an immutable, atomically-swappable in-memory index
//! over the startup/event corpus, loaded from a JSON snapshot file.

pub mod snapshot;

use crate::error::{AppError, AppResult};
use crate::models::Startup;
use std::sync::{Arc, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub use snapshot::CorpusSnapshot;

/// Snapshot-swap handle, generalizing the teacher's `Arc<RwLock<..>>` agent
/// state idiom: readers clone the inner `Arc` under a brief read lock and
/// then see a consistent view for the lifetime of their request, even if a
/// refresh swaps in a new snapshot concurrently.
pub struct CorpusStore {
    current: RwLock<Arc<CorpusSnapshot>>,
    path: String,
}

impl CorpusStore {
    pub async fn load(path: &str) -> AppResult<Self> {
        let snapshot = snapshot::load_from_path(path).await?;
        info!(
            startups = snapshot.startups.len(),
            path, "corpus snapshot loaded"
        );
        Ok(Self {
            current: RwLock::new(Arc::new(snapshot)),
            path: path.to_string(),
        })
    }

    /// Builds a store from an already-assembled snapshot, bypassing disk —
    /// used by tests and by any caller that constructs the corpus in-memory.
    pub fn from_snapshot(snapshot: CorpusSnapshot, path: String) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
            path,
        }
    }

    pub fn snapshot(&self) -> Arc<CorpusSnapshot> {
        self.current.read().expect("corpus lock poisoned").clone()
    }

    /// Reloads the snapshot from disk and atomically swaps it in. Honors
    /// cancellation only at entry, per the concurrency model: once the file
    /// read starts, it runs to completion rather than leaving the store in a
    /// half-swapped state.
    pub async fn refresh(&self, cancel: &CancellationToken) -> AppResult<()> {
        if cancel.is_cancelled() {
            return Err(AppError::InternalError("refresh cancelled".to_string()));
        }
        match snapshot::load_from_path(&self.path).await {
            Ok(snapshot) => {
                info!(
                    startups = snapshot.startups.len(),
                    "corpus snapshot refreshed"
                );
                *self.current.write().expect("corpus lock poisoned") = Arc::new(snapshot);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "corpus refresh failed, keeping previous snapshot");
                Err(e)
            }
        }
    }

    pub fn get(&self, id: i64) -> Option<Startup> {
        let snap = self.snapshot();
        snap.by_id.get(&id).map(|&idx| snap.startups[idx].clone())
    }

    pub fn all(&self) -> Vec<Startup> {
        self.snapshot().startups.clone()
    }

    pub fn by_industry(&self, industry: &str) -> Vec<Startup> {
        let snap = self.snapshot();
        let key = industry.to_lowercase();
        snap.by_industry
            .get(&key)
            .map(|idxs| idxs.iter().map(|&i| snap.startups[i].clone()).collect())
            .unwrap_or_default()
    }

    pub fn search_by_name(&self, query: &str) -> Vec<Startup> {
        let q = query.to_lowercase();
        self.snapshot()
            .startups
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&q))
            .cloned()
            .collect()
    }

    /// Funding-descending ordering with nulls last, ties broken by `id`
    /// ascending (stable) — the `top_by_funding` contract (§4.1).
    pub fn top_by_funding(&self, limit: usize) -> Vec<Startup> {
        let mut all = self.all();
        all.sort_by(|a, b| {
            match (a.total_funding_usd_millions, b.total_funding_usd_millions) {
                (Some(x), Some(y)) => y
                    .partial_cmp(&x)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.id.cmp(&b.id)),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.id.cmp(&b.id),
            }
        });
        all.into_iter().take(limit).collect()
    }

    /// `list_startups(filter, page)` — the C1 filtered-listing contract
    /// (§4.1). Returns the total match count alongside the requested page.
    pub fn list_startups(
        &self,
        filter: &StartupFilter,
        skip: usize,
        limit: usize,
    ) -> (usize, Vec<Startup>) {
        let matches: Vec<Startup> = self
            .all()
            .into_iter()
            .filter(|s| {
                filter
                    .industry
                    .as_deref()
                    .map(|i| {
                        s.primary_industry.eq_ignore_ascii_case(i)
                            || s.secondary_industries.iter().any(|si| si.eq_ignore_ascii_case(i))
                    })
                    .unwrap_or(true)
            })
            .filter(|s| {
                filter
                    .country
                    .as_deref()
                    .map(|c| s.country.eq_ignore_ascii_case(c))
                    .unwrap_or(true)
            })
            .filter(|s| filter.stage.map(|st| s.stage == st).unwrap_or(true))
            .filter(|s| {
                filter
                    .min_funding
                    .map(|floor| s.total_funding_usd_millions.unwrap_or(0.0) >= floor)
                    .unwrap_or(true)
            })
            .filter(|s| {
                filter
                    .name_substring
                    .as_deref()
                    .map(|sub| s.name.to_lowercase().contains(&sub.to_lowercase()))
                    .unwrap_or(true)
            })
            .collect();
        let total = matches.len();
        let page = matches.into_iter().skip(skip).take(limit).collect();
        (total, page)
    }
}

/// Filter dimensions for `list_startups` (§4.1): all fields are optional
/// and combine with AND semantics.
#[derive(Debug, Default, Clone)]
pub struct StartupFilter {
    pub industry: Option<String>,
    pub country: Option<String>,
    pub stage: Option<crate::models::Stage>,
    pub min_funding: Option<f64>,
    pub name_substring: Option<String>,
}
