//! C2 — Category Classifier: a priority-ordered keyword rule table, loaded
//! from YAML so the rules are data rather than code. A compiled-in fallback
//! table keeps the service bootable even if the file is missing.

use crate::models::{Category, Startup};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRule {
    pub category: Category,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CategoryRuleFile {
    rules: Vec<CategoryRule>,
}

pub struct Classifier {
    rules: Vec<CategoryRule>,
}

impl Classifier {
    pub fn load(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str::<CategoryRuleFile>(&contents) {
                Ok(file) => {
                    return Self { rules: file.rules };
                }
                Err(e) => {
                    warn!(error = %e, path, "failed to parse category rules, using fallback table");
                }
            },
            Err(e) => {
                warn!(error = %e, path, "category rules file unreadable, using fallback table");
            }
        }
        Self {
            rules: fallback_rules(),
        }
    }

    /// Returns every category whose keyword list matches, since a startup
    /// may belong to more than one (diversity in C3 keys off the full set).
    /// `GeneralAIML` only applies when no higher-tier rule matched — it is
    /// the "any AI/ML mention without above" catch-all, not an additional
    /// tag alongside a more specific category (§4.2).
    pub fn classify(&self, startup: &Startup) -> HashSet<Category> {
        let text = startup.searchable_text();
        let is_match = |rule: &&CategoryRule| {
            rule.keywords.iter().any(|kw| text.contains(&kw.to_lowercase()))
        };

        let mut matched: HashSet<Category> = self
            .rules
            .iter()
            .filter(|rule| rule.category != Category::GeneralAIML)
            .filter(is_match)
            .map(|rule| rule.category)
            .collect();

        if matched.is_empty() {
            if let Some(rule) = self
                .rules
                .iter()
                .find(|rule| rule.category == Category::GeneralAIML && is_match(rule))
            {
                matched.insert(rule.category);
            }
        }

        if matched.is_empty() {
            matched.insert(Category::Uncategorized);
        }
        matched
    }

    /// Maximum score among matched categories, floored at 30.
    pub fn base_score(&self, startup: &Startup) -> i32 {
        self.classify(startup)
            .iter()
            .map(|c| c.base_score())
            .max()
            .unwrap_or(30)
            .max(30)
    }
}

/// Compiled-in fallback, mirroring the teacher's `get_static_models`
/// hardcoded-registry pattern in `llm/router.rs`.
fn fallback_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule {
            category: Category::AgenticPlatformEnabler,
            keywords: vec![
                "agentic platform".into(),
                "agent framework".into(),
                "multi-agent".into(),
                "agent orchestration".into(),
                "autonomous agents".into(),
            ],
        },
        CategoryRule {
            category: Category::AgenticMarketing,
            keywords: vec![
                "marketing automation".into(),
                "content generation".into(),
                "campaign automation".into(),
            ],
        },
        CategoryRule {
            category: Category::AgenticClaims,
            keywords: vec![
                "claims automation".into(),
                "claims processing".into(),
                "automated underwriting".into(),
            ],
        },
        CategoryRule {
            category: Category::AgenticHR,
            keywords: vec![
                "hr automation".into(),
                "recruitment ai".into(),
                "talent ai".into(),
            ],
        },
        CategoryRule {
            category: Category::AgenticCustomerService,
            keywords: vec![
                "customer service ai".into(),
                "support automation".into(),
                "enterprise chatbot".into(),
            ],
        },
        CategoryRule {
            category: Category::DevIntegration,
            keywords: vec![
                "code generation".into(),
                "test automation".into(),
                "legacy modernization".into(),
                "devops".into(),
            ],
        },
        CategoryRule {
            category: Category::InsuranceTech,
            keywords: vec![
                "insurtech".into(),
                "insurance".into(),
                "policy".into(),
                "actuarial".into(),
            ],
        },
        CategoryRule {
            category: Category::GeneralAIML,
            keywords: vec![
                "artificial intelligence".into(),
                "machine learning".into(),
                "ai-powered".into(),
                "llm".into(),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet as Set;

    fn startup_with_description(description: &str) -> Startup {
        Startup {
            id: 1,
            name: "Test".into(),
            description: description.into(),
            short_description: None,
            primary_industry: "Software".into(),
            secondary_industries: Set::new(),
            business_types: Set::new(),
            stage: crate::models::Stage::SeriesA,
            raw_stage_label: "Series A".into(),
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
    fn matches_multiple_categories_and_takes_max_score() {
        let classifier = Classifier {
            rules: fallback_rules(),
        };
        let s = startup_with_description(
            "a multi-agent orchestration platform for automated underwriting",
        );
        let cats = classifier.classify(&s);
        assert!(cats.contains(&Category::AgenticPlatformEnabler));
        assert!(cats.contains(&Category::AgenticClaims));
        assert_eq!(classifier.base_score(&s), 100);
    }

    #[test]
    fn general_ai_ml_only_applies_without_a_higher_tier_match() {
        let classifier = Classifier {
            rules: fallback_rules(),
        };
        let higher_tier = startup_with_description(
            "a multi-agent platform that also happens to use machine learning",
        );
        let cats = classifier.classify(&higher_tier);
        assert!(cats.contains(&Category::AgenticPlatformEnabler));
        assert!(!cats.contains(&Category::GeneralAIML));

        let general_only = startup_with_description("an ai-powered machine learning toolkit");
        let cats = classifier.classify(&general_only);
        assert_eq!(cats, Set::from([Category::GeneralAIML]));
    }

    #[test]
    fn falls_back_to_uncategorized() {
        let classifier = Classifier {
            rules: fallback_rules(),
        };
        let s = startup_with_description("we sell artisanal coffee beans");
        assert_eq!(classifier.classify(&s), Set::from([Category::Uncategorized]));
        assert_eq!(classifier.base_score(&s), 30);
    }
}
