//! H1 quality sub-scoring (spec.md §4.1).
//!
//! Six weighted sub-scores summing to a 0–100 score. Implementations must
//! reproduce the spec's ordering exactly: a missing H1 scores 0 with only
//! `existence` populated (at 0); an H1 that strips to empty text also
//! scores 0. Otherwise every sub-score is computed and summed, clamped to
//! `[0, 100]`.

use serde::Serialize;

const GENERIC_PHRASES: &[&str] = &[
    "welcome",
    "home",
    "homepage",
    "untitled",
    "click here",
    "read more",
    "learn more",
];

const ACTION_WORDS: &[&str] = &[
    "get", "discover", "learn", "build", "start", "create", "boost", "save", "unlock", "grow",
    "improve", "transform",
];

/// Per-axis breakdown behind the composite H1 score.
#[derive(Debug, Clone, Copy, Serialize, Default)]
pub struct H1QualityBreakdown {
    pub existence: u32,
    pub length: u32,
    pub keyword_strategy: u32,
    pub content_quality: u32,
    pub ux: u32,
    pub technical: u32,
}

impl H1QualityBreakdown {
    #[must_use]
    pub fn total(&self) -> u32 {
        (self.existence + self.length + self.keyword_strategy + self.content_quality + self.ux + self.technical)
            .min(100)
    }
}

/// Score an H1 against its page title.
///
/// `h1_text` is the stripped inner text of the first `<h1>`; `h1_raw_html`
/// is its raw inner HTML (used for the technical-implementation axis, which
/// needs to see markup, not text).
#[must_use]
pub fn compute_h1_quality(
    h1_text: Option<&str>,
    h1_raw_html: Option<&str>,
    title: Option<&str>,
) -> H1QualityBreakdown {
    let Some(text) = h1_text.map(str::trim) else {
        return H1QualityBreakdown::default();
    };
    if text.is_empty() {
        return H1QualityBreakdown::default();
    }

    let mut b = H1QualityBreakdown {
        existence: 15,
        ..Default::default()
    };

    b.length = score_length(text);
    b.keyword_strategy = score_keyword_strategy(text, title);
    b.content_quality = score_content_quality(text);
    b.ux = score_ux(text);
    b.technical = score_technical(h1_raw_html.unwrap_or(text));

    b
}

fn score_length(text: &str) -> u32 {
    let len = text.chars().count();
    if (20..=70).contains(&len) {
        15
    } else if (10..20).contains(&len) || (70..100).contains(&len) {
        9
    } else if len > 0 {
        4
    } else {
        0
    }
}

fn score_keyword_strategy(text: &str, title: Option<&str>) -> u32 {
    let Some(title) = title else {
        return 10;
    };
    let h1_words = tokenize(text);
    let title_words = tokenize(title);
    if h1_words.is_empty() || title_words.is_empty() {
        return 10;
    }

    let overlap_count = h1_words.iter().filter(|w| title_words.contains(*w)).count();
    let overlap_ratio = overlap_count as f64 / h1_words.len() as f64;

    let mut score = 0.0;
    // overlap: up to 10
    score += (overlap_ratio * 10.0).min(10.0);
    // position: first h1 word appears early in title -> up to 6
    if let Some(first) = h1_words.first() {
        if let Some(pos) = title_words.iter().position(|w| w == first) {
            let position_score = 6.0 * (1.0 - (pos as f64 / title_words.len().max(1) as f64));
            score += position_score.max(0.0);
        }
    }
    // density: overlap relative to h1 length, penalize keyword stuffing (too dense)
    if overlap_ratio > 0.0 && overlap_ratio <= 0.8 {
        score += 5.0;
    } else if overlap_ratio > 0.8 {
        score += 2.0;
    }
    // long-tail presence: h1 has more distinct words than title's core overlap
    if h1_words.len() >= 4 {
        score += 4.0;
    }

    (score.round() as u32).min(25)
}

fn score_content_quality(text: &str) -> u32 {
    let lower = text.to_ascii_lowercase();
    let mut score: i32 = 20;

    if GENERIC_PHRASES.iter().any(|g| lower == *g || lower.contains(g)) {
        score -= 10;
    }

    let words = tokenize(text);
    if words.len() < 2 {
        score -= 8;
    }

    if ACTION_WORDS.iter().any(|a| words.iter().any(|w| w == a)) {
        score += 0; // already counted toward base; presence avoids further penalty
    } else if words.len() < 3 {
        score -= 4;
    }

    score.clamp(0, 20) as u32
}

fn score_ux(text: &str) -> u32 {
    let mut score: i32 = 15;
    let words = tokenize(text);

    let mut seen = std::collections::HashSet::new();
    let repeated = words.iter().any(|w| !seen.insert(w.clone()));
    if repeated {
        score -= 5;
    }

    let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
    if !letters.is_empty() {
        let upper = letters.iter().filter(|c| c.is_uppercase()).count();
        if upper as f64 / letters.len() as f64 > 0.6 {
            score -= 6;
        }
    }

    if text.chars().count() > 100 {
        score -= 4;
    }

    score.clamp(0, 15) as u32
}

fn score_technical(raw_html: &str) -> u32 {
    let lower = raw_html.to_ascii_lowercase();
    let mut score: i32 = 10;

    if lower.contains("<svg") {
        score -= 5;
    }
    if lower.contains("<img") && !lower.chars().any(|c| c.is_alphanumeric() && !"<img/>".contains(c)) {
        score -= 5;
    }
    let nesting_depth = lower.matches('<').count();
    if nesting_depth > 6 {
        score -= 3;
    }

    score.clamp(0, 10) as u32
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_h1_scores_zero() {
        let b = compute_h1_quality(None, None, Some("Title"));
        assert_eq!(b.total(), 0);
        assert_eq!(b.existence, 0);
    }

    #[test]
    fn empty_after_strip_scores_zero() {
        let b = compute_h1_quality(Some("   "), Some("<span></span>"), Some("Title"));
        assert_eq!(b.total(), 0);
    }

    #[test]
    fn total_is_clamped_to_100() {
        let b = compute_h1_quality(
            Some("Discover Amazing Widgets Today For Your Home"),
            Some("Discover Amazing Widgets Today For Your Home"),
            Some("Discover Amazing Widgets Today For Your Home"),
        );
        assert!(b.total() <= 100);
        assert!(b.existence > 0);
    }
}
