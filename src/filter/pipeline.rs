//! C6 — Provider Filter: hard exclusions → keyword gate → LLM viability
//! assessment, run as a bounded worker pool over the prioritized candidate
//! list, preserving input order on output.

use super::decision::{Decision, RejectionReason};
use crate::cache::{cache_key, AssessmentCache};
use crate::classifier::Classifier;
use crate::error::AppError;
use crate::llm::{CompletionParams, CompletionRequest, LlmGateway, Message};
use crate::models::Startup;
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_WORKER_COUNT: usize = 3;

/// Phrases that reject a candidate outright, never reaching the LLM.
pub const HARD_EXCLUSION_PHRASES: &[&str] = &[
    "dating app",
    "dating platform",
    "matchmaking app",
    "food delivery",
    "restaurant delivery",
    "meal delivery",
    "social network",
    "social media platform",
    "consumer marketplace",
    "e-commerce platform",
    "mobile game",
    "gaming platform",
    "music streaming",
    "video streaming",
];

/// Phrases that admit a candidate without spending an LLM call.
pub const KEYWORD_GATE_PHRASES: &[&str] = &[
    "b2b",
    "enterprise",
    "saas",
    "api",
    "platform",
    "insurance",
    "claim",
    "underwriting",
    "risk",
    "compliance",
    "devops",
    "integration",
    "automation",
    "developer tool",
];

pub struct Accepted {
    pub startup: Startup,
    pub reason: String,
}

pub struct Rejected {
    pub startup: Startup,
    pub reason: RejectionReason,
}

pub struct FilterOutcome {
    pub accepted: Vec<Accepted>,
    pub rejected: Vec<Rejected>,
}

fn matches_any(text: &str, phrases: &[&str]) -> Option<String> {
    phrases
        .iter()
        .find(|phrase| text.contains(**phrase))
        .map(|p| p.to_string())
}

async fn assess_via_llm(
    gateway: &LlmGateway,
    cache: &AssessmentCache<Decision>,
    classifier: &Classifier,
    startup: &Startup,
    cancel: &CancellationToken,
) -> Result<Decision, AppError> {
    let categories = classifier.classify(startup);
    let category_names: Vec<&str> = categories
        .iter()
        .map(|c| match c {
            crate::models::Category::AgenticPlatformEnabler => "agentic platform enabler",
            crate::models::Category::AgenticMarketing => "agentic marketing",
            crate::models::Category::AgenticClaims => "agentic claims",
            crate::models::Category::AgenticHR => "agentic HR",
            crate::models::Category::AgenticCustomerService => "agentic customer service",
            crate::models::Category::DevIntegration => "dev integration",
            crate::models::Category::InsuranceTech => "insurance tech",
            crate::models::Category::GeneralAIML => "general AI/ML",
            crate::models::Category::Uncategorized => "uncategorized",
        })
        .collect();

    let prompt = format!(
        "Startup: {}\nDescription: {}\nCandidate categories: {}\n\n\
         Assess whether this startup is a viable conference-networking match for an \
         agentic-AI / insurtech audience. Reply in exactly this format:\n\
         DECISION=VIABLE|NOT_VIABLE\nCONFIDENCE=<0-100>\nREASON=<one sentence>",
        startup.name,
        startup.description,
        category_names.join(", "),
    );

    let messages = vec![
        Message::system("You are a terse startup-viability classifier."),
        Message::user(&prompt),
    ];
    let params = CompletionParams {
        temperature: 0.3,
        max_tokens: 300,
    };
    let key = cache_key(&gateway_model_placeholder(), &messages, &params);

    if let Some(decision) = cache.get(&key) {
        crate::log_cache_event!("hit", &key);
        return Ok(decision);
    }
    crate::log_cache_event!("miss", &key);

    let request = CompletionRequest {
        messages,
        model: gateway_model_placeholder(),
        params,
        tools: None,
        metadata: None,
    };
    let response = gateway.complete(request, cancel).await?;
    let decision = Decision::parse(&response.content);
    cache.put(key, decision.clone());
    Ok(decision)
}

/// The model id is fixed for assessment calls; kept as a function so the
/// cache-key and request construction stay in lockstep.
fn gateway_model_placeholder() -> String {
    "gpt-4o-mini".to_string()
}

async fn assess_one(
    startup: Startup,
    classifier: &Classifier,
    gateway: &LlmGateway,
    cache: &AssessmentCache<Decision>,
    cancel: &CancellationToken,
) -> Result<Accepted, Rejected> {
    let text = startup.searchable_text();

    if let Some(phrase) = matches_any(&text, HARD_EXCLUSION_PHRASES) {
        return Err(Rejected {
            startup,
            reason: RejectionReason::HardExcluded(phrase),
        });
    }

    if matches_any(&text, KEYWORD_GATE_PHRASES).is_some() {
        return Ok(Accepted {
            startup,
            reason: "keyword gate".to_string(),
        });
    }

    if gateway.circuit_open() {
        return Err(Rejected {
            startup,
            reason: RejectionReason::Unavailable,
        });
    }

    match assess_via_llm(gateway, cache, classifier, &startup, cancel).await {
        Ok(decision) => match decision.fold() {
            Ok(()) => Ok(Accepted {
                startup,
                reason: "llm assessment".to_string(),
            }),
            Err(reason) => Err(Rejected { startup, reason }),
        },
        Err(AppError::CircuitOpen { .. }) => Err(Rejected {
            startup,
            reason: RejectionReason::Unavailable,
        }),
        Err(err) => Err(Rejected {
            startup,
            reason: RejectionReason::NotViable(err.user_friendly_message()),
        }),
    }
}

/// Runs the full filter pipeline with a bounded worker pool, preserving the
/// input order of both the accepted and rejected outputs.
pub async fn filter(
    candidates: Vec<Startup>,
    classifier: &Classifier,
    gateway: &LlmGateway,
    cache: &AssessmentCache<Decision>,
    worker_count: usize,
    cancel: &CancellationToken,
) -> FilterOutcome {
    let worker_count = worker_count.max(1);
    let indexed: Vec<(usize, Startup)> = candidates.into_iter().enumerate().collect();

    let mut results: Vec<(usize, Result<Accepted, Rejected>)> = stream::iter(indexed)
        .map(|(idx, startup)| {
            let classifier = classifier;
            let gateway = gateway;
            let cache = cache;
            let cancel = cancel;
            async move {
                let outcome = assess_one(startup, classifier, gateway, cache, cancel).await;
                (idx, outcome)
            }
        })
        .buffer_unordered(worker_count)
        .collect()
        .await;

    results.sort_by_key(|(idx, _)| *idx);

    let mut accepted = Vec::new();
    let mut rejected = Vec::new();
    for (_, result) in results {
        match result {
            Ok(a) => accepted.push(a),
            Err(r) => rejected.push(r),
        }
    }

    FilterOutcome { accepted, rejected }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Stage;
    use std::collections::HashSet;

    fn startup(id: i64, name: &str, description: &str) -> Startup {
        Startup {
            id,
            name: name.to_string(),
            description: description.to_string(),
            short_description: None,
            primary_industry: "fintech".to_string(),
            secondary_industries: HashSet::new(),
            business_types: HashSet::new(),
            stage: Stage::SeriesA,
            raw_stage_label: "Series A".to_string(),
            total_funding_usd_millions: None,
            last_funding_date: None,
            employees: String::new(),
            country: "US".to_string(),
            city: String::new(),
            website: None,
            logo_url: None,
            topics: HashSet::new(),
            tech_stack: HashSet::new(),
            maturity_score: None,
            enrichment: None,
        }
    }

    #[test]
    fn hard_exclusion_phrase_is_detected_case_insensitively() {
        let s = startup(1, "Swipely", "A Social Media Platform for meeting new people nearby");
        let text = s.searchable_text();
        assert!(matches_any(&text, HARD_EXCLUSION_PHRASES).is_some());
    }

    #[test]
    fn keyword_gate_admits_b2b_saas_platforms() {
        let s = startup(2, "Ledgerly", "a b2b saas platform for enterprise compliance automation");
        let text = s.searchable_text();
        assert!(matches_any(&text, HARD_EXCLUSION_PHRASES).is_none());
        assert!(matches_any(&text, KEYWORD_GATE_PHRASES).is_some());
    }

    struct PanicProvider;

    #[async_trait::async_trait]
    impl crate::llm::provider::Provider for PanicProvider {
        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> Result<crate::llm::CompletionResponse, AppError> {
            panic!("LLM gateway must not be called for a hard-excluded candidate");
        }
    }

    fn gateway_with_panic_provider() -> LlmGateway {
        use crate::llm::call_log::CallLog;
        use crate::llm::circuit_breaker::CircuitBreaker;
        use crate::llm::rate_limiter::RateLimiter;
        use crate::llm::retry::RetryPolicy;
        use std::sync::Arc;
        use std::time::Duration;

        LlmGateway::new(
            Arc::new(PanicProvider),
            CircuitBreaker::new(5, Duration::from_secs(60), Duration::from_secs(300)),
            RateLimiter::new(60, Duration::from_secs(5)),
            RetryPolicy::default(),
            CallLog::new(std::env::temp_dir().join("concierge_filter_test_logs")),
        )
    }

    #[tokio::test]
    async fn hard_excluded_candidate_never_reaches_the_llm_gateway() {
        let gateway = gateway_with_panic_provider();
        let cache: AssessmentCache<Decision> =
            AssessmentCache::new(100, std::time::Duration::from_secs(60));
        let classifier = Classifier::load("nonexistent_categories.yaml");
        let cancel = CancellationToken::new();

        let s = startup(3, "DatingApp Inc", "dating app for singles");
        let outcome = filter(vec![s], &classifier, &gateway, &cache, 1, &cancel).await;

        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.rejected.len(), 1);
        assert!(matches!(
            outcome.rejected[0].reason,
            RejectionReason::HardExcluded(ref phrase) if phrase == "dating app"
        ));
    }
}
