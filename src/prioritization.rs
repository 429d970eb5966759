//! C3 — Prioritization Engine: scores and orders startups per request,
//! applying personalization, diversity enforcement, and controlled
//! exploration on top of the category classifier (C2).

use crate::classifier::Classifier;
use crate::models::{Category, Stage, Startup, Vote};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use tokio_util::sync::CancellationToken;
use tracing::warn;

const DIVERSITY_WINDOW: usize = 5;

struct Candidate {
    startup: Startup,
    categories: HashSet<Category>,
    score: f64,
}

/// Tiers required to appear within the first 10 results, per the
/// "first-10 diversity rule" (minimum counts taken from the worked
/// examples in the source material).
const TIER_MINIMUMS: [(u8, usize); 4] = [(1, 1), (2, 2), (3, 1), (4, 1)];

pub fn prioritize(
    classifier: &Classifier,
    startups: &[Startup],
    user_id: Option<&str>,
    limit: usize,
    min_score: i32,
    votes: &[Vote],
    seen: &HashSet<i64>,
    cancel: &CancellationToken,
) -> Vec<Startup> {
    if cancel.is_cancelled() {
        return Vec::new();
    }
    if startups.is_empty() {
        warn!("prioritize called against an empty corpus snapshot");
        return Vec::new();
    }

    let liked_categories = liked_categories(classifier, startups, votes);
    let liked_stages = liked_stages(startups, votes);
    let has_personalization = votes.iter().any(|v| v.interested);

    let epoch_day = chrono::Utc::now().timestamp() / 86_400;
    let mut rng = seeded_rng(user_id.unwrap_or("anon"), epoch_day);

    let mut candidates: Vec<Candidate> = startups
        .iter()
        .filter_map(|s| {
            let base = classifier.base_score(s);
            if base < min_score {
                return None;
            }
            let categories = classifier.classify(s);
            let mut score = base as f64;

            // Step 2: stage weight.
            score *= s.stage.weight();

            // Step 3: freshness.
            if let Some(uid) = user_id {
                if !seen.contains(&s.id) {
                    score *= 1.5;
                }
                let _ = uid;
            }

            // Step 4: personalization, multipliers stack multiplicatively
            // but the combined factor is capped at 1.5.
            if has_personalization {
                let mut factor = 1.0f64;
                if !categories.is_disjoint(&liked_categories) {
                    factor *= 1.3;
                }
                if liked_stages.contains_key(&s.stage) {
                    factor *= 1.2;
                }
                score *= factor.min(1.5);
            }

            // Step 6: exploration noise, seeded per (user, epoch_day) so
            // repeated requests the same day are stable.
            let noise = rng.gen_range(0.9..=1.1);
            score *= noise;

            Some(Candidate {
                startup: s.clone(),
                categories,
                score,
            })
        })
        .collect();

    if candidates.is_empty() {
        return Vec::new();
    }

    // Stable tie-break: sort descending by score, ties by id ascending.
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.startup.id.cmp(&b.startup.id))
    });

    let pure_score_order: Vec<Startup> = candidates
        .iter()
        .take(limit)
        .map(|c| c.startup.clone())
        .collect();

    let diversified = diversity_emit(candidates, limit);

    if satisfies_first_ten_rule(classifier, &diversified) {
        diversified
    } else {
        pure_score_order
    }
}

/// Step 5: greedy diversity-aware emission. At each step the candidate
/// with the highest *effective* score (raw score discounted by overlap
/// with the last `DIVERSITY_WINDOW` emitted items) is chosen next.
fn diversity_emit(mut remaining: Vec<Candidate>, limit: usize) -> Vec<Startup> {
    let mut emitted: Vec<Startup> = Vec::with_capacity(limit.min(remaining.len()));
    let mut emitted_meta: Vec<(HashSet<Category>, Stage)> = Vec::with_capacity(limit);

    while !remaining.is_empty() && emitted.len() < limit {
        let window_start = emitted_meta.len().saturating_sub(DIVERSITY_WINDOW);
        let window = &emitted_meta[window_start..];

        let mut best_idx = 0usize;
        let mut best_effective = f64::NEG_INFINITY;
        for (idx, cand) in remaining.iter().enumerate() {
            let mut effective = cand.score;
            for (cats, stage) in window {
                if !cand.categories.is_disjoint(cats) {
                    effective *= 0.9;
                }
                if *stage == cand.startup.stage {
                    effective *= 0.95;
                }
            }
            if effective > best_effective
                || (effective == best_effective && idx < best_idx)
            {
                best_effective = effective;
                best_idx = idx;
            }
        }

        let chosen = remaining.remove(best_idx);
        emitted_meta.push((chosen.categories.clone(), chosen.startup.stage));
        emitted.push(chosen.startup);
    }

    emitted
}

fn satisfies_first_ten_rule(classifier: &Classifier, ordered: &[Startup]) -> bool {
    let first_ten = &ordered[..ordered.len().min(10)];
    if first_ten.len() < 10 {
        // Not enough candidates to enforce the rule meaningfully.
        return true;
    }
    let mut tier_counts: HashMap<u8, usize> = HashMap::new();
    for s in first_ten {
        for cat in classifier.classify(s) {
            *tier_counts.entry(cat.tier()).or_insert(0) += 1;
        }
    }
    for (tier, min_count) in TIER_MINIMUMS {
        if tier_counts.get(&tier).copied().unwrap_or(0) < min_count {
            return false;
        }
    }
    true
}

fn liked_categories(
    classifier: &Classifier,
    startups: &[Startup],
    votes: &[Vote],
) -> HashSet<Category> {
    let index: HashMap<i64, &Startup> = startups.iter().map(|s| (s.id, s)).collect();
    votes
        .iter()
        .filter(|v| v.interested)
        .filter_map(|v| index.get(&v.startup_id))
        .flat_map(|s| classifier.classify(s))
        .collect()
}

fn liked_stages(startups: &[Startup], votes: &[Vote]) -> HashMap<Stage, usize> {
    let index: HashMap<i64, &Startup> = startups.iter().map(|s| (s.id, s)).collect();
    let mut counts = HashMap::new();
    for v in votes.iter().filter(|v| v.interested) {
        if let Some(s) = index.get(&v.startup_id) {
            *counts.entry(s.stage).or_insert(0) += 1;
        }
    }
    counts
}

fn seeded_rng(user_id: &str, epoch_day: i64) -> StdRng {
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());
    hasher.update(b":");
    hasher.update(epoch_day.to_string().as_bytes());
    let digest = hasher.finalize();
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&digest[..8]);
    StdRng::seed_from_u64(u64::from_le_bytes(seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashSet as Set;

    fn startup(id: i64, description: &str, stage: Stage) -> Startup {
        Startup {
            id,
            name: format!("Startup{id}"),
            description: description.into(),
            short_description: None,
            primary_industry: "Software".into(),
            secondary_industries: Set::new(),
            business_types: Set::new(),
            stage,
            raw_stage_label: format!("{:?}", stage),
            total_funding_usd_millions: None,
            last_funding_date: None,
            employees: String::new(),
            country: "US".into(),
            city: String::new(),
            website: None,
            logo_url: None,
            topics: Set::new(),
            tech_stack: Set::new(),
            maturity_score: None,
            enrichment: None,
        }
    }

    #[test]
    fn respects_limit_and_min_score() {
        let classifier = Classifier::load("nonexistent.yaml");
        let startups: Vec<Startup> = (1..=5)
            .map(|i| startup(i, "we sell artisanal coffee beans", Stage::Seed))
            .collect();
        let cancel = CancellationToken::new();
        let out = prioritize(&classifier, &startups, None, 3, 30, &[], &HashSet::new(), &cancel);
        assert!(out.len() <= 3);
    }

    #[test]
    fn diversity_surfaces_platform_enabler_and_other_tiers() {
        let classifier = Classifier::load("nonexistent.yaml");
        let mut startups = Vec::new();
        for i in 1..=10 {
            startups.push(startup(i, "marketing automation for content generation", Stage::Seed));
        }
        for i in 11..=20 {
            startups.push(startup(i, "insurtech underwriting platform", Stage::SeriesB));
        }
        startups.push(startup(21, "agentic platform for multi-agent orchestration", Stage::Seed));

        let cancel = CancellationToken::new();
        let out = prioritize(&classifier, &startups, None, 10, 30, &[], &HashSet::new(), &cancel);
        assert_eq!(out.len(), 10);

        let has_platform_enabler = out
            .iter()
            .any(|s| classifier.classify(s).contains(&Category::AgenticPlatformEnabler));
        let has_insurance = out
            .iter()
            .any(|s| classifier.classify(s).contains(&Category::InsuranceTech));
        assert!(has_platform_enabler);
        assert!(has_insurance);
    }

    #[test]
    fn personalization_boosts_liked_categories() {
        let classifier = Classifier::load("nonexistent.yaml");
        let mut startups = Vec::new();
        for i in 1..=10 {
            startups.push(startup(i, "marketing automation for content generation", Stage::Seed));
        }
        for i in 11..=20 {
            startups.push(startup(i, "insurtech underwriting platform", Stage::SeriesB));
        }
        let votes: Vec<Vote> = (1..=3)
            .map(|i| Vote {
                user_id: "u1".into(),
                startup_id: i,
                interested: true,
                created_at: Utc::now(),
            })
            .collect();
        let cancel = CancellationToken::new();
        let out = prioritize(
            &classifier,
            &startups,
            Some("u1"),
            20,
            30,
            &votes,
            &HashSet::new(),
            &cancel,
        );
        let marketing_in_top20 = out
            .iter()
            .filter(|s| classifier.classify(s).contains(&Category::AgenticMarketing))
            .count();
        assert!(marketing_in_top20 >= 10);
    }

    #[test]
    fn stable_within_same_day_for_same_user() {
        let classifier = Classifier::load("nonexistent.yaml");
        let startups: Vec<Startup> = (1..=15)
            .map(|i| startup(i, "an agentic platform for multi-agent orchestration", Stage::Seed))
            .collect();
        let cancel = CancellationToken::new();
        let first = prioritize(&classifier, &startups, Some("u42"), 10, 30, &[], &HashSet::new(), &cancel);
        let second = prioritize(&classifier, &startups, Some("u42"), 10, 30, &[], &HashSet::new(), &cancel);
        let first_ids: Vec<i64> = first.iter().map(|s| s.id).collect();
        let second_ids: Vec<i64> = second.iter().map(|s| s.id).collect();
        assert_eq!(first_ids, second_ids);
    }
}
