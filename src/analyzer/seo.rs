//! On-page SEO factor extraction: title, meta description, canonical, robots
//! noindex presence, the first JSON-LD block, and the H1 quality composite
//! (spec.md §4.1).

use scraper::{Html, Selector};
use serde::Serialize;
use serde_json::Value;

use super::h1_quality::{compute_h1_quality, H1QualityBreakdown};

const MISSING_TITLE_PENALTY: f64 = 30.0;
const MISSING_DESCRIPTION_PENALTY: f64 = 20.0;
const MISSING_CANONICAL_PENALTY: f64 = 10.0;
const ROBOTS_NOINDEX_PENALTY: f64 = 20.0;
const MISSING_JSON_LD_PENALTY: f64 = 5.0;

#[derive(Debug, Clone, Serialize)]
pub struct SeoAnalysis {
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub canonical: Option<String>,
    pub h1: Option<String>,
    pub h1_quality: H1QualityBreakdown,
    pub robots_noindex: bool,
    pub json_ld: Option<Value>,
    pub score: i64,
}

#[must_use]
pub fn analyze_seo(html: &str) -> SeoAnalysis {
    let document = Html::parse_document(html);

    let title = select_text(&document, "title");
    let meta_description = select_attr(&document, r#"meta[name="description"]"#, "content");
    let canonical = select_attr(&document, r#"link[rel="canonical"]"#, "href");
    let h1_text = select_text(&document, "h1");
    let h1_raw = select_inner_html(&document, "h1");
    let robots_noindex = has_robots_noindex(&document);
    let json_ld = first_json_ld_block(&document);

    let h1_quality = compute_h1_quality(h1_text.as_deref(), h1_raw.as_deref(), title.as_deref());

    let score = score_page(
        title.as_deref(),
        meta_description.as_deref(),
        canonical.as_deref(),
        robots_noindex,
        json_ld.is_some(),
        &h1_quality,
    );

    SeoAnalysis { title, meta_description, canonical, h1: h1_text, h1_quality, robots_noindex, json_ld, score }
}

fn score_page(
    title: Option<&str>,
    description: Option<&str>,
    canonical: Option<&str>,
    robots_noindex: bool,
    has_json_ld: bool,
    h1_quality: &H1QualityBreakdown,
) -> i64 {
    let mut score: f64 = 100.0;

    if title.is_none_or(|t| t.trim().is_empty()) {
        score -= MISSING_TITLE_PENALTY;
    }
    if description.is_none_or(|d| d.trim().is_empty()) {
        score -= MISSING_DESCRIPTION_PENALTY;
    }
    if canonical.is_none_or(|c| c.trim().is_empty()) {
        score -= MISSING_CANONICAL_PENALTY;
    }
    if robots_noindex {
        score -= ROBOTS_NOINDEX_PENALTY;
    }
    if !has_json_ld {
        score -= MISSING_JSON_LD_PENALTY;
    }

    let h1_penalty = ((100.0 - f64::from(h1_quality.total())) * 0.2).round();
    score -= h1_penalty;

    score.round().clamp(0.0, 100.0) as i64
}

/// `<meta name="robots" content="...">` (or `googlebot`) carrying a
/// comma-separated directive list that includes `noindex`.
fn has_robots_noindex(document: &Html) -> bool {
    for selector in ["meta[name=\"robots\" i]", "meta[name=\"googlebot\" i]"] {
        let Ok(sel) = Selector::parse(selector) else { continue };
        for el in document.select(&sel) {
            if let Some(content) = el.value().attr("content") {
                if content.split(',').any(|d| d.trim().eq_ignore_ascii_case("noindex")) {
                    return true;
                }
            }
        }
    }
    false
}

/// The first `<script type="application/ld+json">` block, parsed as JSON.
/// Falls back to the raw text wrapped in a JSON string when it fails to
/// parse, per spec.md's "falling back to raw text on parse failure".
fn first_json_ld_block(document: &Html) -> Option<Value> {
    let sel = Selector::parse(r#"script[type="application/ld+json"]"#).ok()?;
    let el = document.select(&sel).next()?;
    let raw = el.text().collect::<String>();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string())))
}

fn select_text(document: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let el = document.select(&sel).next()?;
    let text = el.text().collect::<String>().trim().to_string();
    if text.is_empty() { None } else { Some(text) }
}

fn select_inner_html(document: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let el = document.select(&sel).next()?;
    Some(el.inner_html())
}

fn select_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let el = document.select(&sel).next()?;
    el.value().attr(attr).map(str::to_string).filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_core_fields() {
        let html = r#"<html><head>
            <title>A Perfectly Sized Page Title For SEO</title>
            <meta name="description" content="A description that is long enough to land squarely in the optimal range for search engines to display in full without truncation at all.">
            <link rel="canonical" href="https://example.com/page">
            <script type="application/ld+json">{"@context":"https://schema.org","@type":"WebSite","name":"Demo"}</script>
        </head><body><h1>A Perfectly Sized Page Title For SEO</h1></body></html>"#;
        let a = analyze_seo(html);
        assert!(a.title.is_some());
        assert!(a.meta_description.is_some());
        assert_eq!(a.canonical.as_deref(), Some("https://example.com/page"));
        assert!(!a.robots_noindex);
        assert!(a.json_ld.is_some());
        assert!(a.score > 50);
    }

    #[test]
    fn missing_everything_scores_deductions_only() {
        let a = analyze_seo("<html><body></body></html>");
        assert_eq!(a.title, None);
        assert!(a.json_ld.is_none());
        // title -30, description -20, canonical -10, json-ld -5, H1 penalty round(100*0.2)=20
        assert_eq!(a.score, 15);
    }

    #[test]
    fn robots_noindex_is_detected_and_penalized() {
        let html = r#"<html><head><title>T</title><meta name="robots" content="noindex, nofollow"></head><body></body></html>"#;
        let a = analyze_seo(html);
        assert!(a.robots_noindex);
    }

    #[test]
    fn malformed_json_ld_falls_back_to_raw_text() {
        let html = r#"<html><head><script type="application/ld+json">{not valid json</script></head><body></body></html>"#;
        let a = analyze_seo(html);
        assert_eq!(a.json_ld, Some(Value::String("{not valid json".to_string())));
    }
}
