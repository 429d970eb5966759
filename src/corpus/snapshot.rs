use crate::error::AppResult;
use crate::models::{Startup, Stage};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

/// Shape of the on-disk snapshot file — a plain JSON array of raw startup
/// records as exported by the upstream enrichment pipeline.
#[derive(Debug, Deserialize)]
pub struct RawStartupRecord {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub short_description: Option<String>,
    pub primary_industry: String,
    #[serde(default)]
    pub secondary_industries: Vec<String>,
    #[serde(default)]
    pub business_types: Vec<String>,
    #[serde(default)]
    pub current_investment_stage: String,
    #[serde(default)]
    pub total_funding_usd_millions: Option<f64>,
    #[serde(default)]
    pub last_funding_date: Option<chrono::NaiveDate>,
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
    pub topics: Vec<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub maturity_score: Option<i32>,
    #[serde(default)]
    pub enrichment: Option<serde_json::Value>,
}

impl From<RawStartupRecord> for Startup {
    fn from(raw: RawStartupRecord) -> Self {
        let stage = Stage::normalize(&raw.current_investment_stage);
        Startup {
            id: raw.id,
            name: raw.name,
            description: raw.description,
            short_description: raw.short_description,
            primary_industry: raw.primary_industry,
            secondary_industries: raw.secondary_industries.into_iter().collect(),
            business_types: raw.business_types.into_iter().collect(),
            stage,
            raw_stage_label: raw.current_investment_stage,
            total_funding_usd_millions: raw.total_funding_usd_millions,
            last_funding_date: raw.last_funding_date,
            employees: raw.employees,
            country: raw.country,
            city: raw.city,
            website: raw.website,
            logo_url: raw.logo_url,
            topics: raw.topics.into_iter().collect(),
            tech_stack: raw.tech_stack.into_iter().collect(),
            maturity_score: raw.maturity_score,
            enrichment: raw.enrichment,
        }
    }
}

pub struct CorpusSnapshot {
    pub startups: Vec<Startup>,
    pub by_id: HashMap<i64, usize>,
    pub by_industry: HashMap<String, Vec<usize>>,
}

impl CorpusSnapshot {
    pub fn build(startups: Vec<Startup>) -> Self {
        let mut by_id = HashMap::with_capacity(startups.len());
        let mut by_industry: HashMap<String, Vec<usize>> = HashMap::new();
        let mut seen_industries: HashSet<String> = HashSet::new();
        for (idx, s) in startups.iter().enumerate() {
            by_id.insert(s.id, idx);
            let key = s.primary_industry.to_lowercase();
            by_industry.entry(key.clone()).or_default().push(idx);
            seen_industries.insert(key);
            for sec in &s.secondary_industries {
                by_industry
                    .entry(sec.to_lowercase())
                    .or_default()
                    .push(idx);
            }
        }
        Self {
            startups,
            by_id,
            by_industry,
        }
    }
}

pub async fn load_from_path(path: &str) -> AppResult<CorpusSnapshot> {
    let bytes = tokio::fs::read(path).await?;
    let raw: Vec<RawStartupRecord> = serde_json::from_slice(&bytes)?;
    let startups: Vec<Startup> = raw.into_iter().map(Startup::from).collect();
    Ok(CorpusSnapshot::build(startups))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_indexes_by_id_and_industry() {
        let raw = vec![
            RawStartupRecord {
                id: 1,
                name: "Acme".into(),
                description: "agentic workflow automation".into(),
                short_description: None,
                primary_industry: "Agentic AI".into(),
                secondary_industries: vec!["DevTools".into()],
                business_types: vec![],
                current_investment_stage: "Series A".into(),
                total_funding_usd_millions: Some(5.0),
                last_funding_date: None,
                employees: "11-50".into(),
                country: "US".into(),
                city: "SF".into(),
                website: None,
                logo_url: None,
                topics: vec![],
                tech_stack: vec![],
                maturity_score: None,
                enrichment: None,
            },
        ];
        let startups: Vec<Startup> = raw.into_iter().map(Startup::from).collect();
        let snap = CorpusSnapshot::build(startups);
        assert_eq!(snap.by_id.get(&1), Some(&0));
        assert!(snap.by_industry.contains_key("agentic ai"));
        assert!(snap.by_industry.contains_key("devtools"));
    }
}
