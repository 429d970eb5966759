//! C7 — Tool Registry: seven read-only tools over the corpus snapshot,
//! declared as JSON-Schema specs the same way the teacher declares MCP
//! tools in `mcp::tools::get_all_tools`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Returns the tool declarations the orchestrator hands to the LLM as
/// `tools` on every completion request.
pub fn get_all_tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "search_startups_by_name".to_string(),
            description: "Search the startup corpus by name or description substring.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Name or keyword to search for" },
                    "limit": { "type": "integer", "maximum": 50, "default": 10 }
                },
                "required": ["query"]
            }),
        },
        ToolSpec {
            name: "search_startups_by_industry".to_string(),
            description: "Search the startup corpus by primary or secondary industry.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "industry": { "type": "string" },
                    "limit": { "type": "integer", "maximum": 50, "default": 10 }
                },
                "required": ["industry"]
            }),
        },
        ToolSpec {
            name: "search_startups_by_funding".to_string(),
            description: "Search the startup corpus by investment stage and an optional funding floor.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "stage": { "type": "string" },
                    "min_funding": { "type": "number" },
                    "limit": { "type": "integer", "maximum": 50, "default": 10 }
                },
                "required": ["stage"]
            }),
        },
        ToolSpec {
            name: "search_startups_by_location".to_string(),
            description: "Search the startup corpus by country and optional city.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "country": { "type": "string" },
                    "city": { "type": "string" },
                    "limit": { "type": "integer", "maximum": 50, "default": 10 }
                },
                "required": ["country"]
            }),
        },
        ToolSpec {
            name: "get_startup_details".to_string(),
            description: "Fetch full details for one startup, by id or by company name.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "startup_id": { "type": "integer" },
                    "company_name": { "type": "string" }
                }
            }),
        },
        ToolSpec {
            name: "get_startup_enrichment_data".to_string(),
            description: "Fetch the enrichment payload for one startup, by id or by company name.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "startup_id": { "type": "integer" },
                    "company_name": { "type": "string" }
                }
            }),
        },
        ToolSpec {
            name: "get_top_startups_by_funding".to_string(),
            description: "Return the startups with the highest total funding.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "limit": { "type": "integer", "maximum": 50, "default": 10 }
                }
            }),
        },
    ]
}

pub fn find_tool(name: &str) -> Option<ToolSpec> {
    get_all_tools().into_iter().find(|t| t.name == name)
}

/// Converts every declared tool into the `tools` array shape the LLM
/// gateway's `CompletionRequest.tools` field expects.
pub fn as_completion_tools() -> Vec<Value> {
    get_all_tools()
        .into_iter()
        .map(|t| {
            serde_json::json!({
                "type": "function",
                "function": {
                    "name": t.name,
                    "description": t.description,
                    "parameters": t.parameters,
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declares_exactly_seven_tools() {
        assert_eq!(get_all_tools().len(), 7);
    }

    #[test]
    fn find_tool_locates_a_known_tool() {
        assert!(find_tool("get_top_startups_by_funding").is_some());
        assert!(find_tool("nonexistent_tool").is_none());
    }
}
