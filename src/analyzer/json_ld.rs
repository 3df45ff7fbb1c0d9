//! JSON-LD structured-data extraction and schema.org validation
//! (spec.md §4.1).

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

const MISSING_TYPE_PENALTY: f64 = 30.0;
const MISSING_CONTEXT_PENALTY: f64 = 20.0;
const MISSING_REQUIRED_PENALTY: f64 = 15.0;
const MISSING_RECOMMENDED_PENALTY: f64 = 5.0;

/// Required and recommended top-level properties per `@type`.
pub struct SchemaRule {
    pub required: &'static [&'static str],
    pub recommended: &'static [&'static str],
}

pub static SCHEMA_RULES: Lazy<HashMap<&'static str, SchemaRule>> = Lazy::new(|| {
    HashMap::from([
        ("Organization", SchemaRule { required: &["name", "url"], recommended: &["logo", "sameAs"] }),
        ("WebSite", SchemaRule { required: &["name", "url"], recommended: &["potentialAction"] }),
        ("WebPage", SchemaRule { required: &["name", "url"], recommended: &["description"] }),
        ("Article", SchemaRule { required: &["headline", "author", "datePublished"], recommended: &["image", "dateModified"] }),
        ("BlogPosting", SchemaRule { required: &["headline", "author", "datePublished"], recommended: &["image", "dateModified"] }),
        ("NewsArticle", SchemaRule { required: &["headline", "author", "datePublished"], recommended: &["image", "dateModified"] }),
        ("BreadcrumbList", SchemaRule { required: &["itemListElement"], recommended: &[] }),
        ("Product", SchemaRule { required: &["name", "image"], recommended: &["description", "offers"] }),
        ("LocalBusiness", SchemaRule { required: &["name", "address"], recommended: &["telephone", "openingHours"] }),
        ("Person", SchemaRule { required: &["name"], recommended: &["url", "sameAs"] }),
        ("Event", SchemaRule { required: &["name", "startDate", "location"], recommended: &["endDate", "image"] }),
        ("FAQPage", SchemaRule { required: &["mainEntity"], recommended: &[] }),
        ("HowTo", SchemaRule { required: &["name", "step"], recommended: &["totalTime", "image"] }),
        ("VideoObject", SchemaRule { required: &["name", "description", "uploadDate"], recommended: &["thumbnailUrl", "duration"] }),
    ])
});

/// One `<script type="application/ld+json">` block's analysis.
#[derive(Debug, Clone, Serialize)]
pub struct JsonLdBlockAnalysis {
    pub types: Vec<String>,
    pub has_context: bool,
    pub missing_required: Vec<String>,
    pub missing_recommended: Vec<String>,
    pub score: f64,
    pub is_valid: bool,
    pub parse_error: Option<String>,
}

/// Aggregate JSON-LD analysis for a page.
#[derive(Debug, Clone, Serialize, Default)]
pub struct JsonLdAnalysis {
    pub blocks: Vec<JsonLdBlockAnalysis>,
    pub types: Vec<String>,
    pub score: f64,
    pub is_valid: bool,
    pub issues: Vec<String>,
}

#[must_use]
pub fn analyze_json_ld(html: &str) -> JsonLdAnalysis {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
        return JsonLdAnalysis::default();
    };

    let mut out = JsonLdAnalysis::default();

    for el in document.select(&selector) {
        let raw = el.text().collect::<String>();
        match serde_json::from_str::<Value>(raw.trim()) {
            Ok(value) => {
                let block = analyze_block(&value);
                for prop in &block.missing_required {
                    for t in &block.types {
                        out.issues.push(format!("{t} is missing required property `{prop}`"));
                    }
                }
                if !block.has_context {
                    out.issues.push("block is missing @context".to_string());
                }
                for t in &block.types {
                    if !out.types.contains(t) {
                        out.types.push(t.clone());
                    }
                }
                out.blocks.push(block);
            }
            Err(e) => {
                out.issues.push(format!("malformed JSON-LD block: {e}"));
                out.blocks.push(JsonLdBlockAnalysis {
                    types: Vec::new(),
                    has_context: false,
                    missing_required: Vec::new(),
                    missing_recommended: Vec::new(),
                    score: 0.0,
                    is_valid: false,
                    parse_error: Some(e.to_string()),
                });
            }
        }
    }

    out.score = if out.blocks.is_empty() {
        0.0
    } else {
        out.blocks.iter().map(|b| b.score).sum::<f64>() / out.blocks.len() as f64
    };
    out.is_valid = !out.blocks.is_empty() && out.blocks.iter().all(|b| b.is_valid);
    out
}

fn analyze_block(value: &Value) -> JsonLdBlockAnalysis {
    let types = extract_types(value);
    let has_context = value.get("@context").and_then(Value::as_str).is_some_and(|c| c.contains("schema.org"));
    let has_type = !types.is_empty();

    let mut missing_required = Vec::new();
    let mut missing_recommended = Vec::new();
    for t in &types {
        if let Some(rule) = SCHEMA_RULES.get(t.as_str()) {
            for prop in rule.required {
                if value.get(prop).is_none() {
                    missing_required.push((*prop).to_string());
                }
            }
            for prop in rule.recommended {
                if value.get(prop).is_none() {
                    missing_recommended.push((*prop).to_string());
                }
            }
        }
    }

    let mut score: f64 = 100.0;
    if !has_type {
        score -= MISSING_TYPE_PENALTY;
    }
    if !has_context {
        score -= MISSING_CONTEXT_PENALTY;
    }
    score -= MISSING_REQUIRED_PENALTY * missing_required.len() as f64;
    score -= MISSING_RECOMMENDED_PENALTY * missing_recommended.len() as f64;
    let score = score.clamp(0.0, 100.0);

    let is_valid = has_context && has_type;

    JsonLdBlockAnalysis { types, has_context, missing_required, missing_recommended, score, is_valid, parse_error: None }
}

fn extract_types(value: &Value) -> Vec<String> {
    match value.get("@type") {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect(),
        _ => {
            if let Some(Value::Array(graph)) = value.get("@graph") {
                return graph.iter().flat_map(extract_types).collect();
            }
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_blocks_scores_zero_and_invalid() {
        let analysis = analyze_json_ld("<html></html>");
        assert_eq!(analysis.score, 0.0);
        assert!(!analysis.is_valid);
        assert!(analysis.blocks.is_empty());
    }

    #[test]
    fn complete_article_scores_full_and_valid() {
        let html = r#"<script type="application/ld+json">
            {"@context":"https://schema.org","@type":"Article","headline":"h","author":"a","datePublished":"2024-01-01","image":"i","dateModified":"2024-01-02"}
        </script>"#;
        let analysis = analyze_json_ld(html);
        assert_eq!(analysis.score, 100.0);
        assert!(analysis.is_valid);
        assert!(analysis.issues.is_empty());
    }

    #[test]
    fn required_fields_only_still_scores_at_least_70() {
        let html = r#"<script type="application/ld+json">
            {"@context":"https://schema.org","@type":"Product","name":"Widget","image":"w.png"}
        </script>"#;
        let analysis = analyze_json_ld(html);
        assert!(analysis.blocks[0].score >= 70.0);
        assert!(analysis.blocks[0].is_valid);
    }

    #[test]
    fn incomplete_product_flags_missing_image() {
        let html = r#"<script type="application/ld+json">{"@context":"https://schema.org","@type":"Product","name":"Widget"}</script>"#;
        let analysis = analyze_json_ld(html);
        assert!(analysis.issues.iter().any(|i| i.contains("image")));
    }

    #[test]
    fn missing_context_is_invalid_but_not_crashing() {
        let html = r#"<script type="application/ld+json">{"@type":"Article","headline":"h","author":"a","datePublished":"2024-01-01"}</script>"#;
        let analysis = analyze_json_ld(html);
        assert!(!analysis.blocks[0].has_context);
        assert!(!analysis.blocks[0].is_valid);
    }

    #[test]
    fn malformed_json_is_reported_not_panicked() {
        let html = r#"<script type="application/ld+json">{not valid json</script>"#;
        let analysis = analyze_json_ld(html);
        assert_eq!(analysis.blocks.len(), 1);
        assert!(analysis.blocks[0].parse_error.is_some());
        assert!(!analysis.is_valid);
    }
}
