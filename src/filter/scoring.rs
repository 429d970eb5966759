//! Composite downstream relevance score applied to candidates that survive
//! the filter pipeline. Separate from prioritization's ranking score —
//! this one feeds the tool-facing "relevance" field returned to callers.

use crate::models::{Category, Startup};
use chrono::Utc;
use std::collections::HashSet;

const FUNDING_CAP: f64 = 40.0;
const TEAM_SIZE_CAP: f64 = 30.0;
const MATURITY_CAP: f64 = 20.0;
const CATEGORY_CAP: f64 = 10.0;
const FUNDING_DECAY_PER_YEAR: f64 = 0.10;

/// log-scaled, capped, decayed by 10%/year since last funding.
fn funding_component(startup: &Startup) -> f64 {
    let millions = match startup.total_funding_usd_millions {
        Some(m) if m > 0.0 => m,
        _ => return 0.0,
    };
    let raw = (millions.ln() / 10.0_f64.ln()) * (FUNDING_CAP / 3.0);
    let capped = raw.clamp(0.0, FUNDING_CAP);

    let years_since = startup
        .last_funding_date
        .map(|d| {
            let days = (Utc::now().date_naive() - d).num_days().max(0);
            days as f64 / 365.25
        })
        .unwrap_or(0.0);
    let decay = (1.0 - FUNDING_DECAY_PER_YEAR).powf(years_since);
    capped * decay
}

/// log-scaled employee-count bucket, parsed from the corpus's free-text
/// range (e.g. "51-200").
fn team_size_component(startup: &Startup) -> f64 {
    let estimate = parse_employee_estimate(&startup.employees);
    if estimate <= 0.0 {
        return 0.0;
    }
    let raw = (estimate.ln() / 1000f64.ln()) * TEAM_SIZE_CAP;
    raw.clamp(0.0, TEAM_SIZE_CAP)
}

fn parse_employee_estimate(raw: &str) -> f64 {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == '-').collect();
    let parts: Vec<&str> = digits.split('-').filter(|s| !s.is_empty()).collect();
    match parts.len() {
        0 => 0.0,
        1 => parts[0].parse().unwrap_or(0.0),
        _ => {
            let lo: f64 = parts[0].parse().unwrap_or(0.0);
            let hi: f64 = parts[1].parse().unwrap_or(lo);
            (lo + hi) / 2.0
        }
    }
}

fn maturity_component(startup: &Startup) -> f64 {
    let score = startup.maturity_score.unwrap_or(0).clamp(0, 100) as f64;
    (score / 100.0) * MATURITY_CAP
}

fn category_relevance_component(categories: &HashSet<Category>) -> f64 {
    let best_tier = categories.iter().map(|c| c.tier()).min().unwrap_or(6);
    let fraction = (7 - best_tier) as f64 / 6.0;
    fraction * CATEGORY_CAP
}

/// Sum of the four capped components; never exceeds 100.
pub fn composite_score(startup: &Startup, categories: &HashSet<Category>) -> f64 {
    funding_component(startup)
        + team_size_component(startup)
        + maturity_component(startup)
        + category_relevance_component(categories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Stage;
    use std::collections::HashSet as Set;

    fn startup(funding: Option<f64>, employees: &str, maturity: Option<i32>) -> Startup {
        Startup {
            id: 1,
            name: "Acme".to_string(),
            description: "desc".to_string(),
            short_description: None,
            primary_industry: "fintech".to_string(),
            secondary_industries: Set::new(),
            business_types: Set::new(),
            stage: Stage::SeriesA,
            raw_stage_label: "Series A".to_string(),
            total_funding_usd_millions: funding,
            last_funding_date: None,
            employees: employees.to_string(),
            country: "US".to_string(),
            city: String::new(),
            website: None,
            logo_url: None,
            topics: Set::new(),
            tech_stack: Set::new(),
            maturity_score: maturity,
            enrichment: None,
        }
    }

    #[test]
    fn score_never_exceeds_one_hundred() {
        let s = startup(Some(500_000.0), "10000+", Some(100));
        let mut cats = Set::new();
        cats.insert(Category::AgenticPlatformEnabler);
        let score = composite_score(&s, &cats);
        assert!(score <= 100.0, "score {score} exceeded 100");
    }

    #[test]
    fn missing_fields_contribute_zero() {
        let s = startup(None, "", None);
        let score = composite_score(&s, &Set::new());
        assert!(score >= 0.0 && score < 5.0);
    }
}
