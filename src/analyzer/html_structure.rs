//! Document-structure checks: heading hierarchy, landmark elements, image
//! alt/dimension/lazy-load coverage, form labeling, ARIA accessible names,
//! and list/table well-formedness (spec.md §4.1).

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

const SEMANTIC_WEIGHT: f64 = 0.20;
const HEADINGS_WEIGHT: f64 = 0.25;
const IMAGES_WEIGHT: f64 = 0.20;
const FORMS_WEIGHT: f64 = 0.10;
const ARIA_WEIGHT: f64 = 0.15;
const LISTS_WEIGHT: f64 = 0.05;
const TABLES_WEIGHT: f64 = 0.05;

#[derive(Debug, Clone, Serialize, Default)]
pub struct HtmlStructureAnalysis {
    pub h1_count: usize,
    pub heading_order_violations: usize,
    pub images_total: usize,
    pub images_missing_alt: usize,
    pub images_missing_dimensions: usize,
    pub images_missing_lazy_loading: usize,
    pub has_main_landmark: bool,
    pub has_nav_landmark: bool,
    pub has_header_landmark: bool,
    pub has_footer_landmark: bool,
    pub has_article_landmark: bool,
    pub has_aside_landmark: bool,
    pub has_section_landmark: bool,
    pub lang_attribute: Option<String>,
    pub forms_total: usize,
    pub inputs_missing_labels: usize,
    pub interactive_missing_accessible_name: usize,
    pub malformed_lists: usize,
    pub malformed_tables: usize,
    pub semantic_score: f64,
    pub headings_score: f64,
    pub images_score: f64,
    pub forms_score: f64,
    pub aria_score: f64,
    pub lists_score: f64,
    pub tables_score: f64,
    pub score: f64,
    pub issues: Vec<String>,
}

#[must_use]
pub fn analyze_html_structure(html: &str) -> HtmlStructureAnalysis {
    let document = Html::parse_document(html);
    let mut out = HtmlStructureAnalysis::default();

    audit_lang(&document, &mut out);
    audit_headings(&document, &mut out);
    audit_images(&document, &mut out);
    audit_landmarks(&document, &mut out);
    audit_forms(&document, &mut out);
    audit_aria(&document, &mut out);
    audit_lists(&document, &mut out);
    audit_tables(&document, &mut out);

    out.semantic_score = semantic_score(&out);
    out.headings_score = headings_score(&out);
    out.images_score = images_score(&out);
    out.forms_score = forms_score(&out);
    out.aria_score = aria_score(&out);
    out.lists_score = lists_score(&out);
    out.tables_score = tables_score(&out);

    out.score = (out.semantic_score * SEMANTIC_WEIGHT)
        + (out.headings_score * HEADINGS_WEIGHT)
        + (out.images_score * IMAGES_WEIGHT)
        + (out.forms_score * FORMS_WEIGHT)
        + (out.aria_score * ARIA_WEIGHT)
        + (out.lists_score * LISTS_WEIGHT)
        + (out.tables_score * TABLES_WEIGHT);

    out
}

fn audit_lang(document: &Html, out: &mut HtmlStructureAnalysis) {
    if let Ok(sel) = Selector::parse("html") {
        if let Some(el) = document.select(&sel).next() {
            out.lang_attribute = el.value().attr("lang").map(str::to_string);
        }
    }
    if out.lang_attribute.is_none() {
        out.issues.push("missing lang attribute on <html>".to_string());
    }
}

fn audit_headings(document: &Html, out: &mut HtmlStructureAnalysis) {
    let Ok(sel) = Selector::parse("h1, h2, h3, h4, h5, h6") else { return };
    let mut prev_level = 0u8;
    for el in document.select(&sel) {
        let level = el.value().name().as_bytes()[1] - b'0';
        if level == 1 {
            out.h1_count += 1;
        }
        if prev_level > 0 && level > prev_level + 1 {
            out.heading_order_violations += 1;
        }
        prev_level = level;
    }
    if out.h1_count == 0 {
        out.issues.push("page has no <h1>".to_string());
    } else if out.h1_count > 1 {
        out.issues.push(format!("page has {} <h1> elements, expected 1", out.h1_count));
    }
    if out.heading_order_violations > 0 {
        out.issues.push(format!("{} heading level(s) skip a rank", out.heading_order_violations));
    }
}

fn audit_images(document: &Html, out: &mut HtmlStructureAnalysis) {
    let Ok(sel) = Selector::parse("img") else { return };
    for el in document.select(&sel) {
        out.images_total += 1;
        let value = el.value();
        if value.attr("alt").map(str::trim).unwrap_or("").is_empty() {
            out.images_missing_alt += 1;
        }
        if value.attr("width").is_none() || value.attr("height").is_none() {
            out.images_missing_dimensions += 1;
        }
        if value.attr("loading").is_none() {
            out.images_missing_lazy_loading += 1;
        }
    }
    if out.images_missing_alt > 0 {
        out.issues.push(format!("{} image(s) missing alt text", out.images_missing_alt));
    }
    if out.images_missing_dimensions > 0 {
        out.issues.push(format!("{} image(s) missing width/height", out.images_missing_dimensions));
    }
}

fn audit_landmarks(document: &Html, out: &mut HtmlStructureAnalysis) {
    let landmark = |selector: &str| -> bool {
        Selector::parse(selector).ok().is_some_and(|sel| document.select(&sel).next().is_some())
    };
    out.has_main_landmark = landmark("main, [role=main]");
    out.has_nav_landmark = landmark("nav, [role=navigation]");
    out.has_header_landmark = landmark("header, [role=banner]");
    out.has_footer_landmark = landmark("footer, [role=contentinfo]");
    out.has_article_landmark = landmark("article");
    out.has_aside_landmark = landmark("aside, [role=complementary]");
    out.has_section_landmark = landmark("section, [role=region]");

    if !out.has_main_landmark {
        out.issues.push("missing <main> landmark".to_string());
    }
}

/// A form control is labeled when it has a matching `<label for>`, sits
/// inside a `<label>`, or carries `aria-label`/`aria-labelledby`.
fn audit_forms(document: &Html, out: &mut HtmlStructureAnalysis) {
    let Ok(forms) = Selector::parse("form") else { return };
    out.forms_total = document.select(&forms).count();

    let label_ids: std::collections::HashSet<String> = Selector::parse("label[for]")
        .map(|sel| document.select(&sel).filter_map(|el| el.value().attr("for").map(str::to_string)).collect())
        .unwrap_or_default();

    let Ok(controls) = Selector::parse("input, select, textarea") else { return };
    for el in document.select(&controls) {
        let value = el.value();
        if matches!(value.attr("type"), Some("hidden" | "submit" | "button" | "reset")) {
            continue;
        }
        let labeled_by_for = value.attr("id").is_some_and(|id| label_ids.contains(id));
        let labeled_by_aria = value.attr("aria-label").is_some() || value.attr("aria-labelledby").is_some();
        let wrapped_in_label = el.ancestors().any(|a| a.value().as_element().is_some_and(|e| e.name() == "label"));
        if !labeled_by_for && !labeled_by_aria && !wrapped_in_label {
            out.inputs_missing_labels += 1;
        }
    }
    if out.inputs_missing_labels > 0 {
        out.issues.push(format!("{} form control(s) missing a label", out.inputs_missing_labels));
    }
}

/// Interactive controls need a text node, `aria-label`/`aria-labelledby`, or
/// (for image inputs) `alt` to have an accessible name.
fn audit_aria(document: &Html, out: &mut HtmlStructureAnalysis) {
    let Ok(sel) = Selector::parse(r#"button, a[href], input[type="submit"], input[type="button"], input[type="image"]"#) else {
        return;
    };
    for el in document.select(&sel) {
        let value = el.value();
        let has_text = !el.text().collect::<String>().trim().is_empty();
        let has_aria = value.attr("aria-label").is_some() || value.attr("aria-labelledby").is_some();
        let has_alt = value.attr("alt").map(str::trim).is_some_and(|a| !a.is_empty());
        if !has_text && !has_aria && !has_alt {
            out.interactive_missing_accessible_name += 1;
        }
    }
    if out.interactive_missing_accessible_name > 0 {
        out.issues.push(format!("{} interactive element(s) missing an accessible name", out.interactive_missing_accessible_name));
    }
}

/// A `<ul>`/`<ol>` is malformed when a direct child isn't `<li>`.
fn audit_lists(document: &Html, out: &mut HtmlStructureAnalysis) {
    let Ok(sel) = Selector::parse("ul, ol") else { return };
    for el in document.select(&sel) {
        if direct_element_children(el).any(|child| child.value().name() != "li") {
            out.malformed_lists += 1;
        }
    }
    if out.malformed_lists > 0 {
        out.issues.push(format!("{} list(s) contain a non-<li> direct child", out.malformed_lists));
    }
}

/// A `<table>` is malformed when it carries no `<th>` header cell at all.
fn audit_tables(document: &Html, out: &mut HtmlStructureAnalysis) {
    let Ok(tables) = Selector::parse("table") else { return };
    let Ok(th) = Selector::parse("th") else { return };
    for el in document.select(&tables) {
        if el.select(&th).next().is_none() {
            out.malformed_tables += 1;
        }
    }
    if out.malformed_tables > 0 {
        out.issues.push(format!("{} table(s) have no <th> header cell", out.malformed_tables));
    }
}

fn direct_element_children(el: ElementRef) -> impl Iterator<Item = ElementRef> {
    el.children().filter_map(ElementRef::wrap)
}

fn semantic_score(a: &HtmlStructureAnalysis) -> f64 {
    let mut score: f64 = 100.0;
    if a.lang_attribute.is_none() {
        score -= 30.0;
    }
    if !a.has_header_landmark {
        score -= 15.0;
    }
    if !a.has_footer_landmark {
        score -= 15.0;
    }
    if !a.has_article_landmark && !a.has_section_landmark {
        score -= 20.0;
    }
    score.clamp(0.0, 100.0)
}

fn headings_score(a: &HtmlStructureAnalysis) -> f64 {
    let mut score = 100.0;
    if a.h1_count == 0 {
        score -= 50.0;
    } else if a.h1_count > 1 {
        score -= 20.0;
    }
    score -= (a.heading_order_violations as f64) * 10.0;
    score.clamp(0.0, 100.0)
}

fn images_score(a: &HtmlStructureAnalysis) -> f64 {
    if a.images_total == 0 {
        return 100.0;
    }
    let total = a.images_total as f64;
    let mut score = 100.0;
    score -= (a.images_missing_alt as f64 / total) * 50.0;
    score -= (a.images_missing_dimensions as f64 / total) * 30.0;
    score -= (a.images_missing_lazy_loading as f64 / total) * 20.0;
    score.clamp(0.0, 100.0)
}

fn forms_score(a: &HtmlStructureAnalysis) -> f64 {
    if a.forms_total == 0 {
        return 100.0;
    }
    let penalty = (a.inputs_missing_labels as f64) * 20.0;
    (100.0 - penalty).clamp(0.0, 100.0)
}

fn aria_score(a: &HtmlStructureAnalysis) -> f64 {
    let mut score = 100.0;
    if !a.has_main_landmark {
        score -= 30.0;
    }
    if !a.has_nav_landmark {
        score -= 10.0;
    }
    score -= (a.interactive_missing_accessible_name as f64) * 10.0;
    score.clamp(0.0, 100.0)
}

fn lists_score(a: &HtmlStructureAnalysis) -> f64 {
    (100.0 - (a.malformed_lists as f64) * 25.0).clamp(0.0, 100.0)
}

fn tables_score(a: &HtmlStructureAnalysis) -> f64 {
    (100.0 - (a.malformed_tables as f64) * 25.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_page_scores_high() {
        let html = r#"<html lang="en"><body>
            <header></header>
            <nav></nav>
            <main><h1>Title</h1><h2>Sub</h2><img src="a.png" alt="a" width="10" height="10" loading="lazy"></main>
            <footer></footer>
        </body></html>"#;
        let a = analyze_html_structure(html);
        assert_eq!(a.h1_count, 1);
        assert_eq!(a.images_missing_alt, 0);
        assert!(a.score > 80.0);
    }

    #[test]
    fn missing_h1_and_alt_penalized() {
        let html = r#"<html><body><img src="a.png"></body></html>"#;
        let a = analyze_html_structure(html);
        assert_eq!(a.h1_count, 0);
        assert_eq!(a.images_missing_alt, 1);
        assert!(a.score < 70.0);
        assert!(a.issues.iter().any(|i| i.contains("no <h1>")));
    }

    #[test]
    fn heading_skip_is_flagged() {
        let html = "<html lang=\"en\"><body><main><h1>T</h1><h3>Skip</h3></main></body></html>";
        let a = analyze_html_structure(html);
        assert_eq!(a.heading_order_violations, 1);
    }

    #[test]
    fn unlabeled_input_is_flagged() {
        let html = r#"<html lang="en"><body><form><input type="text" name="email"></form></body></html>"#;
        let a = analyze_html_structure(html);
        assert_eq!(a.forms_total, 1);
        assert_eq!(a.inputs_missing_labels, 1);
    }

    #[test]
    fn labeled_input_via_for_is_not_flagged() {
        let html = r#"<html lang="en"><body><form>
            <label for="email">Email</label><input type="text" id="email" name="email">
        </form></body></html>"#;
        let a = analyze_html_structure(html);
        assert_eq!(a.inputs_missing_labels, 0);
    }

    #[test]
    fn icon_button_with_no_name_is_flagged() {
        let html = r#"<html lang="en"><body><button><span></span></button></body></html>"#;
        let a = analyze_html_structure(html);
        assert_eq!(a.interactive_missing_accessible_name, 1);
    }

    #[test]
    fn malformed_list_is_detected() {
        let html = r#"<html lang="en"><body><ul><div>not an li</div></ul></body></html>"#;
        let a = analyze_html_structure(html);
        assert_eq!(a.malformed_lists, 1);
    }

    #[test]
    fn table_without_header_is_malformed() {
        let html = r#"<html lang="en"><body><table><tr><td>1</td></tr></table></body></html>"#;
        let a = analyze_html_structure(html);
        assert_eq!(a.malformed_tables, 1);
    }
}
