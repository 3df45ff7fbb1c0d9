//! Pure, deterministic HTML analyzers (spec.md §4.1).
//!
//! Every function here is a pure `&str -> T` (or `(&str, &str) -> T`)
//! transform with no I/O, matching the donor's own preference for
//! zero-allocation, regex/DOM based extraction over full browser rendering
//! wherever a full DOM model isn't required (spec.md §9 design notes).
//! Analyzers never panic or return `Err` on malformed input — see
//! `failure semantics` in spec.md §4.1: degrade to absent fields instead.

mod h1_quality;
mod html_structure;
mod issue_summary;
mod json_ld;
mod links;
mod seo;
mod tracking;

pub use h1_quality::H1QualityBreakdown;
pub use html_structure::{analyze_html_structure, HtmlStructureAnalysis};
pub use issue_summary::{
    aggregate_summaries, build_issue_summary, AggregatedScorecard, AggregatedSeo, AggregatedSummary, AggregatedTracking,
    IssueSummary, SeoFlags, TrackingFlags,
};
pub use json_ld::{analyze_json_ld, JsonLdAnalysis, JsonLdBlockAnalysis, SchemaRule, SCHEMA_RULES};
pub use links::{analyze_links, normalize_url, HeadingRef, LinkAnalysis, UtmExample, UtmSummary};
pub use seo::{analyze_seo, SeoAnalysis};
pub use tracking::{analyze_tracking, Platform, TrackingEvent, TrackingStatus};
