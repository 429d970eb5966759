use crate::cache::AssessmentCache;
use crate::classifier::Classifier;
use crate::config::Config;
use crate::corpus::CorpusStore;
use crate::database::repositories::{
    CalendarEventRepository, FeedbackSessionRepository, RatingRepository, VoteRepository,
};
use crate::database::Database;
use crate::error::AppResult;
use crate::filter::Decision;
use crate::llm::call_log::CallLog;
use crate::llm::circuit_breaker::CircuitBreaker;
use crate::llm::gateway::LlmGateway;
use crate::llm::provider::HttpProvider;
use crate::llm::rate_limiter::RateLimiter;
use crate::llm::retry::RetryPolicy;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Repositories backing the ambient votes/ratings/calendar/feedback CRUD —
/// thin `sqlx` wrappers sharing one pool, mirroring the teacher's
/// `AgentRepository` construction from `Database::pool()`.
#[derive(Clone)]
pub struct Repositories {
    pub votes: VoteRepository,
    pub ratings: RatingRepository,
    pub events: CalendarEventRepository,
    pub feedback_sessions: FeedbackSessionRepository,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub corpus: Arc<CorpusStore>,
    pub classifier: Arc<Classifier>,
    pub llm_gateway: Arc<LlmGateway>,
    pub assessment_cache: Arc<AssessmentCache<Decision>>,
    /// `false` when `LLM_API_KEY` was absent at startup; LLM-dependent
    /// routes reject with `ServiceBusy` instead of attempting a call the
    /// vendor would reject anyway.
    pub llm_configured: bool,
    pub database: Option<Arc<Database>>,
    pub repos: Option<Repositories>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let corpus = CorpusStore::load(&config.corpus_snapshot_path).await?;
        info!(path = %config.corpus_snapshot_path, "corpus store ready");

        let classifier = Classifier::load(&config.categories_path);

        let llm_configured = config.llm.api_key.is_some();
        if !llm_configured {
            warn!("⚠️ LLM_API_KEY not set, LLM-dependent routes will reply ServiceBusy");
        }

        let provider = HttpProvider::new(
            config.llm.base_url.clone(),
            config.llm.api_key.clone(),
            config.llm.request_timeout,
        );
        let breaker = CircuitBreaker::new(
            config.resilience.circuit_fail_threshold,
            Duration::from_secs(config.resilience.circuit_cooldown_seconds),
            Duration::from_secs(config.resilience.circuit_cooldown_max_seconds),
        );
        let limiter =
            RateLimiter::new(config.resilience.rate_limit_per_min, Duration::from_secs(5));
        let call_log = CallLog::new(config.llm.log_dir.clone());
        let llm_gateway = LlmGateway::new(
            Arc::new(provider),
            breaker,
            limiter,
            RetryPolicy::default(),
            call_log,
        );

        let assessment_cache = AssessmentCache::new(
            config.cache.max_size,
            Duration::from_secs(config.cache.ttl_seconds),
        );

        // Database connection is optional, per the teacher's defensive
        // pattern: the service stays up without persistent storage, serving
        // corpus reads and LLM-backed routes, with ambient CRUD disabled.
        let (database, repos) = if let Some(database_url) = config.database_url.clone() {
            match Database::new(&database_url).await {
                Ok(db) => {
                    if let Err(e) = db.run_migrations().await {
                        warn!("⚠️ Failed to run database migrations: {}", e);
                    } else {
                        info!("✅ Database migrations completed successfully");
                    }
                    let pool = db.pool().clone();
                    let repos = Repositories {
                        votes: VoteRepository::new(pool.clone()),
                        ratings: RatingRepository::new(pool.clone()),
                        events: CalendarEventRepository::new(pool.clone()),
                        feedback_sessions: FeedbackSessionRepository::new(pool),
                    };
                    (Some(Arc::new(db)), Some(repos))
                }
                Err(e) => {
                    warn!(
                        "⚠️ Failed to connect to database: {}, running without persistent storage",
                        e
                    );
                    (None, None)
                }
            }
        } else {
            warn!("⚠️ DATABASE_URL not set, running without persistent storage");
            (None, None)
        };

        Ok(Self {
            config,
            corpus: Arc::new(corpus),
            classifier: Arc::new(classifier),
            llm_gateway: Arc::new(llm_gateway),
            assessment_cache: Arc::new(assessment_cache),
            llm_configured,
            database,
            repos,
        })
    }
}
