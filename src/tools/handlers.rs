//! Tool handler execution: validates arguments against the declared
//! schema, then dispatches to a read-only lookup against C1. Mirrors the
//! teacher's `mcp::handlers::execute_tool` dispatch shape.

use super::registry::{find_tool, ToolSpec};
use crate::corpus::CorpusStore;
use crate::error::AppError;
use crate::models::Startup;
use serde_json::Value;

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 50;

fn limit_from(args: &Value) -> usize {
    args.get("limit")
        .and_then(|v| v.as_u64())
        .map(|n| n as usize)
        .unwrap_or(DEFAULT_LIMIT)
        .min(MAX_LIMIT)
}

/// Checks the schema's `required` array and coarse JSON types for the
/// fields it declares, replacing "parse then introspect" with a single
/// up-front check per REDESIGN FLAGS.
pub fn validate_and_parse(tool: &ToolSpec, args: &Value) -> Result<(), AppError> {
    let schema = &tool.parameters;
    let required = schema
        .get("required")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    for field in &required {
        let name = field.as_str().unwrap_or_default();
        if args.get(name).is_none() {
            return Err(AppError::BadRequest(format!(
                "tool '{}' missing required argument '{}'",
                tool.name, name
            )));
        }
    }

    if let Some(properties) = schema.get("properties").and_then(|v| v.as_object()) {
        for (name, prop_schema) in properties {
            let Some(value) = args.get(name) else { continue };
            let Some(expected_type) = prop_schema.get("type").and_then(|v| v.as_str()) else {
                continue;
            };
            let matches = match expected_type {
                "string" => value.is_string(),
                "integer" => value.is_i64() || value.is_u64(),
                "number" => value.is_number(),
                "boolean" => value.is_boolean(),
                "array" => value.is_array(),
                "object" => value.is_object(),
                _ => true,
            };
            if !matches {
                return Err(AppError::BadRequest(format!(
                    "tool '{}' argument '{}' has wrong type, expected {}",
                    tool.name, name, expected_type
                )));
            }
        }
    }

    if tool.name == "get_startup_details" || tool.name == "get_startup_enrichment_data" {
        let has_id = args.get("startup_id").is_some();
        let has_name = args.get("company_name").is_some();
        if has_id == has_name {
            return Err(AppError::BadRequest(format!(
                "tool '{}' requires exactly one of startup_id or company_name",
                tool.name
            )));
        }
    }

    Ok(())
}

fn project(startups: Vec<&Startup>) -> Value {
    serde_json::json!(startups)
}

fn success(count: usize, results: Value) -> Value {
    serde_json::json!({ "success": true, "count": count, "results": results })
}

fn failure(message: impl Into<String>) -> Value {
    serde_json::json!({ "success": false, "error": message.into() })
}

/// Executes a named tool call against the corpus. Returns the spec's
/// `{success, count?, results?, error?}` envelope; never errors itself —
/// unknown tools and bad lookups surface as `success:false`.
pub async fn execute_tool(corpus: &CorpusStore, name: &str, args: Value) -> Value {
    let Some(tool) = find_tool(name) else {
        return failure(format!("unknown tool: {}", name));
    };
    if let Err(e) = validate_and_parse(&tool, &args) {
        return failure(e.to_string());
    }

    match name {
        "search_startups_by_name" => {
            let query = args.get("query").and_then(|v| v.as_str()).unwrap_or_default();
            let limit = limit_from(&args);
            let matches = corpus.search_by_name(query);
            let page: Vec<&Startup> = matches.iter().take(limit).collect();
            success(page.len(), project(page))
        }
        "search_startups_by_industry" => {
            let industry = args.get("industry").and_then(|v| v.as_str()).unwrap_or_default();
            let limit = limit_from(&args);
            let matches = corpus.by_industry(industry);
            let page: Vec<&Startup> = matches.iter().take(limit).collect();
            success(page.len(), project(page))
        }
        "search_startups_by_funding" => {
            let stage_filter = args.get("stage").and_then(|v| v.as_str()).unwrap_or_default();
            let min_funding = args.get("min_funding").and_then(|v| v.as_f64());
            let limit = limit_from(&args);
            let normalized = crate::models::Stage::normalize(stage_filter);
            let all = corpus.all();
            let matches: Vec<&Startup> = all
                .iter()
                .filter(|s| s.stage == normalized)
                .filter(|s| match min_funding {
                    Some(floor) => s.total_funding_usd_millions.unwrap_or(0.0) >= floor,
                    None => true,
                })
                .take(limit)
                .collect();
            success(matches.len(), project(matches))
        }
        "search_startups_by_location" => {
            let country = args.get("country").and_then(|v| v.as_str()).unwrap_or_default();
            let city = args.get("city").and_then(|v| v.as_str());
            let limit = limit_from(&args);
            let all = corpus.all();
            let matches: Vec<&Startup> = all
                .iter()
                .filter(|s| s.country.eq_ignore_ascii_case(country))
                .filter(|s| city.map(|c| s.city.eq_ignore_ascii_case(c)).unwrap_or(true))
                .take(limit)
                .collect();
            success(matches.len(), project(matches))
        }
        "get_startup_details" => {
            let all = corpus.all();
            let found = locate_one(&all, &args);
            match found {
                Some(s) => success(1, serde_json::to_value(s).unwrap_or(Value::Null)),
                None => failure("startup not found"),
            }
        }
        "get_startup_enrichment_data" => {
            let all = corpus.all();
            let found = locate_one(&all, &args);
            match found {
                Some(s) => success(
                    1,
                    s.enrichment.clone().unwrap_or_else(|| serde_json::json!({})),
                ),
                None => failure("startup not found"),
            }
        }
        "get_top_startups_by_funding" => {
            let limit = limit_from(&args);
            let top = corpus.top_by_funding(limit);
            success(top.len(), project(top.iter().collect()))
        }
        _ => failure(format!("unknown tool: {}", name)),
    }
}

fn locate_one<'a>(all: &'a [Startup], args: &Value) -> Option<&'a Startup> {
    if let Some(id) = args.get("startup_id").and_then(|v| v.as_i64()) {
        return all.iter().find(|s| s.id == id);
    }
    if let Some(name) = args.get("company_name").and_then(|v| v.as_str()) {
        return all.iter().find(|s| s.name.eq_ignore_ascii_case(name));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::snapshot::CorpusSnapshot;
    use crate::models::Stage;
    use std::collections::HashSet;

    fn startup(id: i64, name: &str, country: &str, funding: Option<f64>) -> Startup {
        Startup {
            id,
            name: name.to_string(),
            description: "a startup".to_string(),
            short_description: None,
            primary_industry: "fintech".to_string(),
            secondary_industries: HashSet::new(),
            business_types: HashSet::new(),
            stage: Stage::SeriesA,
            raw_stage_label: "Series A".to_string(),
            total_funding_usd_millions: funding,
            last_funding_date: None,
            employees: String::new(),
            country: country.to_string(),
            city: String::new(),
            website: None,
            logo_url: None,
            topics: HashSet::new(),
            tech_stack: HashSet::new(),
            maturity_score: None,
            enrichment: None,
        }
    }

    fn store_with(startups: Vec<Startup>) -> CorpusStore {
        CorpusStore::from_snapshot(CorpusSnapshot::build(startups), "test".to_string())
    }

    #[tokio::test]
    async fn missing_required_argument_fails_validation() {
        let store = store_with(vec![startup(1, "Acme", "US", None)]);
        let result = execute_tool(&store, "search_startups_by_name", serde_json::json!({})).await;
        assert_eq!(result["success"], false);
    }

    #[tokio::test]
    async fn get_startup_details_requires_exactly_one_identifier() {
        let store = store_with(vec![startup(1, "Acme", "US", None)]);
        let both = serde_json::json!({"startup_id": 1, "company_name": "Acme"});
        let result = execute_tool(&store, "get_startup_details", both).await;
        assert_eq!(result["success"], false);
    }

    #[tokio::test]
    async fn search_by_location_filters_by_country() {
        let store = store_with(vec![
            startup(1, "Acme", "Germany", Some(5.0)),
            startup(2, "Beta", "France", Some(5.0)),
        ]);
        let args = serde_json::json!({"country": "Germany"});
        let result = execute_tool(&store, "search_startups_by_location", args).await;
        assert_eq!(result["success"], true);
        assert_eq!(result["count"], 1);
    }
}
