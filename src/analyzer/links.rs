//! Link and UTM-parameter extraction (spec.md §4.1).
//!
//! Internal/external classification is host-based: a link is internal iff
//! its resolved host matches the page's own host. Broken-link and redirect
//! counts are NOT computed here — they require a network round trip and are
//! filled in by the page pipeline after this pass (spec.md §4.3).

use std::collections::HashSet;

use scraper::{Html, Node};
use serde::Serialize;
use url::Url;

use crate::config::DeviceProfile;

/// One heading found on the page, in document order.
#[derive(Debug, Clone, Serialize)]
pub struct HeadingRef {
    pub level: u8,
    pub text: String,
}

/// A single URL carrying `utm_*` query parameters, or an internal anchor
/// that is missing them, kept as a sample.
#[derive(Debug, Clone, Serialize)]
pub struct UtmExample {
    pub url: String,
    pub text: String,
    pub source: Option<String>,
    pub medium: Option<String>,
    pub campaign: Option<String>,
    pub heading: Option<HeadingRef>,
    pub device_variant: Option<DeviceProfile>,
}

/// Aggregate view over every anchor relevant to UTM coverage on the page.
#[derive(Debug, Clone, Serialize, Default)]
pub struct UtmSummary {
    pub tracked_links: usize,
    pub missing_utm: usize,
    pub sources: Vec<String>,
    pub mediums: Vec<String>,
    pub campaigns: Vec<String>,
    pub examples: Vec<UtmExample>,
}

/// Link and heading inventory for one page.
#[derive(Debug, Clone, Serialize, Default)]
pub struct LinkAnalysis {
    pub internal_links: Vec<String>,
    pub external_links: Vec<String>,
    /// Filled in by the pipeline after this analysis runs.
    pub broken_links: i64,
    /// Filled in by the pipeline after this analysis runs.
    pub redirects: i64,
    pub utm: UtmSummary,
    pub headings: Vec<HeadingRef>,
}

const MAX_UTM_EXAMPLES: usize = 5;
const MAX_INTERNAL_LINKS: usize = 200;

/// Resolve `href` against `base`, strip its fragment, and strip one trailing
/// slash from the path. Returns `None` for unresolvable or non-http(s)
/// targets (`mailto:`, `javascript:`, etc.).
#[must_use]
pub fn normalize_url(base: &Url, href: &str) -> Option<Url> {
    let trimmed = href.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let mut resolved = base.join(trimmed).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    resolved.set_fragment(None);
    strip_trailing_slash(&mut resolved);
    Some(resolved)
}

fn strip_trailing_slash(url: &mut Url) {
    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let stripped = path.trim_end_matches('/').to_string();
        let stripped = if stripped.is_empty() { "/".to_string() } else { stripped };
        url.set_path(&stripped);
    }
}

/// Single document-order scan of anchors and `h1..h3` headings, so each
/// anchor can be attributed to the last heading seen at or before it.
#[must_use]
pub fn analyze_links(html: &str, base_url: &str) -> LinkAnalysis {
    let mut out = LinkAnalysis::default();
    let Ok(base) = Url::parse(base_url) else {
        return out;
    };
    let document = Html::parse_document(html);

    let mut seen_internal = HashSet::new();
    let mut seen_external = HashSet::new();
    let mut current_heading: Option<HeadingRef> = None;

    for node in document.tree.root().descendants() {
        let Some(element) = node.value().as_element() else { continue };
        let name = element.name();

        if matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6") {
            let level = name.as_bytes()[1] - b'0';
            let text = collect_text(node);
            if text.is_empty() {
                continue;
            }
            out.headings.push(HeadingRef { level, text: text.clone() });
            if level <= 3 {
                current_heading = Some(HeadingRef { level, text });
            }
            continue;
        }

        if name != "a" {
            continue;
        }
        let Some(href) = element.attr("href") else { continue };
        let Some(resolved) = normalize_url(&base, href) else { continue };

        let anchor_text = collect_text(node);
        let class_attr = element.attr("class").unwrap_or("");
        let data_attrs: String = element
            .attrs()
            .filter(|(name, _)| name.starts_with("data-"))
            .map(|(_, value)| value)
            .collect::<Vec<_>>()
            .join(" ");
        let device_variant = DeviceProfile::infer_from_text(&format!("{class_attr} {data_attrs}"));

        let is_internal = resolved.host_str() == base.host_str();
        let utm_params = utm_params(&resolved);

        if !utm_params.is_empty() {
            out.utm.tracked_links += 1;
            let find = |key: &str| utm_params.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone());
            if let Some(s) = find("utm_source") {
                push_unique(&mut out.utm.sources, s);
            }
            if let Some(m) = find("utm_medium") {
                push_unique(&mut out.utm.mediums, m);
            }
            if let Some(c) = find("utm_campaign") {
                push_unique(&mut out.utm.campaigns, c);
            }
            push_example(&mut out.utm.examples, UtmExample {
                url: resolved.to_string(),
                text: anchor_text,
                source: find("utm_source"),
                medium: find("utm_medium"),
                campaign: find("utm_campaign"),
                heading: current_heading.clone(),
                device_variant,
            });
        } else if is_internal {
            out.utm.missing_utm += 1;
            push_example(&mut out.utm.examples, UtmExample {
                url: resolved.to_string(),
                text: anchor_text,
                source: None,
                medium: None,
                campaign: None,
                heading: current_heading.clone(),
                device_variant,
            });
        }

        let url_str = resolved.to_string();
        if is_internal {
            if seen_internal.insert(url_str.clone()) && out.internal_links.len() < MAX_INTERNAL_LINKS {
                out.internal_links.push(url_str);
            }
        } else if seen_external.insert(url_str.clone()) {
            out.external_links.push(url_str);
        }
    }

    out
}

fn collect_text(node: ego_tree::NodeRef<Node>) -> String {
    node.descendants()
        .filter_map(|n| n.value().as_text())
        .map(|t| &**t)
        .collect::<String>()
        .trim()
        .to_string()
}

fn utm_params(url: &Url) -> Vec<(String, String)> {
    url.query_pairs()
        .filter(|(k, _)| k.to_ascii_lowercase().starts_with("utm_"))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn push_example(examples: &mut Vec<UtmExample>, example: UtmExample) {
    if examples.len() < MAX_UTM_EXAMPLES {
        examples.push(example);
    }
}

fn push_unique(vec: &mut Vec<String>, value: String) {
    if !vec.contains(&value) {
        vec.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_internal_and_external() {
        let html = r##"
            <a href="/about">About</a>
            <a href="https://other.example/page">Other</a>
            <a href="#section">Anchor</a>
            <a href="mailto:a@b.com">Mail</a>
        "##;
        let analysis = analyze_links(html, "https://site.example/");
        assert_eq!(analysis.internal_links, vec!["https://site.example/about"]);
        assert_eq!(analysis.external_links, vec!["https://other.example/page"]);
    }

    #[test]
    fn detects_utm_params_and_attributes_heading() {
        let html = r#"<h1>Top</h1><a href="https://site.example/?utm_source=newsletter&utm_medium=email&utm_campaign=fall">Go</a>"#;
        let analysis = analyze_links(html, "https://site.example/");
        assert_eq!(analysis.utm.tracked_links, 1);
        assert_eq!(analysis.utm.sources, vec!["newsletter"]);
        assert_eq!(analysis.utm.examples.len(), 1);
        assert_eq!(analysis.utm.examples[0].heading.as_ref().map(|h| h.text.as_str()), Some("Top"));
    }

    #[test]
    fn flags_internal_link_missing_utm() {
        let html = r#"<a href="/about">About</a>"#;
        let analysis = analyze_links(html, "https://site.example/");
        assert_eq!(analysis.utm.missing_utm, 1);
        assert_eq!(analysis.utm.examples.len(), 1);
    }

    #[test]
    fn infers_device_variant_from_class_and_data_attributes() {
        let html = r#"<a class="cta desktop-link" data-viewport="desktop" href="/internal?utm_source=newsletter">Internal tracked</a>"#;
        let analysis = analyze_links(html, "https://site.example/");
        assert_eq!(analysis.utm.examples[0].device_variant, Some(DeviceProfile::Desktop));
    }

    #[test]
    fn collects_headings_in_order() {
        let html = "<h1>Title</h1><p>x</p><h2>Sub</h2>";
        let analysis = analyze_links(html, "https://site.example/");
        assert_eq!(analysis.headings.len(), 2);
        assert_eq!(analysis.headings[0].level, 1);
        assert_eq!(analysis.headings[1].level, 2);
    }

    #[test]
    fn normalizes_trailing_slash() {
        let base = Url::parse("https://site.example/").unwrap();
        let resolved = normalize_url(&base, "/about/").unwrap();
        assert_eq!(resolved.path(), "/about");
    }
}
