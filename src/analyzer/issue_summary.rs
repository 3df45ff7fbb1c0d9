//! Combines the per-analyzer outputs for one page into a structured issue
//! flag set plus a scorecard, and rolls per-page summaries up into a
//! job-level summary (spec.md §4.1, §4.4 — persisted as
//! `scan_jobs.issues_summary` and `scan_pages.issue_counts`).

use serde::Serialize;

use super::json_ld::JsonLdAnalysis;
use super::links::LinkAnalysis;
use super::seo::SeoAnalysis;
use super::tracking::{Platform, TrackingEvent};

/// Boolean SEO/JSON-LD findings for one page.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SeoFlags {
    pub missing_title: bool,
    pub missing_description: bool,
    pub missing_h1: bool,
    pub missing_canonical: bool,
    pub robots_blocked: bool,
    pub json_ld_missing: bool,
    pub json_ld_invalid: bool,
    pub json_ld_incomplete: bool,
}

impl SeoFlags {
    fn count_true(self) -> usize {
        [
            self.missing_title,
            self.missing_description,
            self.missing_h1,
            self.missing_canonical,
            self.robots_blocked,
            self.json_ld_missing,
            self.json_ld_invalid,
            self.json_ld_incomplete,
        ]
        .into_iter()
        .filter(|b| *b)
        .count()
    }
}

/// Named-platform tracking gaps for one page.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TrackingFlags {
    pub mixpanel_missing: bool,
    pub ga_missing: bool,
}

/// One page's full issue flag set plus its scorecard.
#[derive(Debug, Clone, Serialize)]
pub struct IssueSummary {
    pub seo: SeoFlags,
    pub internal_links: usize,
    pub external_links: usize,
    pub utm_tracked: usize,
    pub utm_missing: usize,
    pub tracking: TrackingFlags,
    pub seo_issues: usize,
    pub link_issues: usize,
    pub tracking_issues: usize,
    pub seo_score: i64,
}

#[must_use]
pub fn build_issue_summary(
    seo: &SeoAnalysis,
    links: &LinkAnalysis,
    tracking: &[TrackingEvent],
    json_ld: &JsonLdAnalysis,
) -> IssueSummary {
    let seo_flags = SeoFlags {
        missing_title: seo.title.is_none(),
        missing_description: seo.meta_description.is_none(),
        missing_h1: seo.h1.is_none(),
        missing_canonical: seo.canonical.is_none(),
        robots_blocked: seo.robots_noindex,
        json_ld_missing: json_ld.blocks.is_empty(),
        json_ld_invalid: !json_ld.is_valid,
        json_ld_incomplete: json_ld.is_valid && json_ld.score < 70.0,
    };

    let mixpanel_missing = !tracking.iter().any(|e| e.platform == Platform::Mixpanel);
    let ga_missing = !tracking
        .iter()
        .any(|e| matches!(e.platform, Platform::GoogleAnalytics4 | Platform::UniversalAnalytics | Platform::GoogleTagManager));
    let tracking_flags = TrackingFlags { mixpanel_missing, ga_missing };

    let seo_issues = seo_flags.count_true();
    let link_issues = links.utm.missing_utm;
    let tracking_issues = usize::from(mixpanel_missing) + usize::from(ga_missing);

    IssueSummary {
        seo: seo_flags,
        internal_links: links.internal_links.len(),
        external_links: links.external_links.len(),
        utm_tracked: links.utm.tracked_links,
        utm_missing: links.utm.missing_utm,
        tracking: tracking_flags,
        seo_issues,
        link_issues,
        tracking_issues,
        seo_score: seo.score,
    }
}

/// Per-flag counts across every page that carried that flag.
#[derive(Debug, Clone, Copy, Serialize, Default)]
pub struct AggregatedSeo {
    pub missing_title: usize,
    pub missing_description: usize,
    pub missing_h1: usize,
    pub missing_canonical: usize,
    pub robots_blocked: usize,
    pub json_ld_missing: usize,
    pub json_ld_invalid: usize,
    pub json_ld_incomplete: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Default)]
pub struct AggregatedTracking {
    pub mixpanel_missing: usize,
    pub ga_missing: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Default)]
pub struct AggregatedScorecard {
    pub seo_average_score: i64,
    pub utm_coverage_percent: i64,
    pub tracking_coverage_average: i64,
    pub overall_health_percent: i64,
}

/// Job-level roll-up across every completed page.
#[derive(Debug, Clone, Serialize, Default)]
pub struct AggregatedSummary {
    pub pages_analyzed: usize,
    pub seo: AggregatedSeo,
    pub tracking: AggregatedTracking,
    pub internal_links: usize,
    pub external_links: usize,
    pub utm_tracked: usize,
    pub utm_missing: usize,
    pub total_issues: usize,
    pub scorecard: AggregatedScorecard,
}

#[must_use]
pub fn aggregate_summaries(summaries: &[IssueSummary]) -> AggregatedSummary {
    if summaries.is_empty() {
        return AggregatedSummary::default();
    }

    let n = summaries.len();
    let mut seo = AggregatedSeo::default();
    let mut tracking = AggregatedTracking::default();
    let mut internal_links = 0usize;
    let mut external_links = 0usize;
    let mut utm_tracked = 0usize;
    let mut utm_missing = 0usize;
    let mut total_issues = 0usize;
    let mut seo_score_sum: i64 = 0;

    for s in summaries {
        seo.missing_title += usize::from(s.seo.missing_title);
        seo.missing_description += usize::from(s.seo.missing_description);
        seo.missing_h1 += usize::from(s.seo.missing_h1);
        seo.missing_canonical += usize::from(s.seo.missing_canonical);
        seo.robots_blocked += usize::from(s.seo.robots_blocked);
        seo.json_ld_missing += usize::from(s.seo.json_ld_missing);
        seo.json_ld_invalid += usize::from(s.seo.json_ld_invalid);
        seo.json_ld_incomplete += usize::from(s.seo.json_ld_incomplete);

        tracking.mixpanel_missing += usize::from(s.tracking.mixpanel_missing);
        tracking.ga_missing += usize::from(s.tracking.ga_missing);

        internal_links += s.internal_links;
        external_links += s.external_links;
        utm_tracked += s.utm_tracked;
        utm_missing += s.utm_missing;
        total_issues += s.seo_issues + s.link_issues + s.tracking_issues;
        seo_score_sum += s.seo_score;
    }

    let seo_average_score = round_div(seo_score_sum, n as i64);
    let utm_total = utm_tracked + utm_missing;
    let utm_coverage_percent = if utm_total == 0 { 0 } else { round_div((utm_tracked * 100) as i64, utm_total as i64) };
    let mixpanel_coverage = round_div(((n - tracking.mixpanel_missing) * 100) as i64, n as i64);
    let ga_coverage = round_div(((n - tracking.ga_missing) * 100) as i64, n as i64);
    let tracking_coverage_average = round_div(mixpanel_coverage + ga_coverage, 2);
    let overall_health_percent = round_div(seo_average_score + utm_coverage_percent + tracking_coverage_average, 3);

    AggregatedSummary {
        pages_analyzed: n,
        seo,
        tracking,
        internal_links,
        external_links,
        utm_tracked,
        utm_missing,
        total_issues,
        scorecard: AggregatedScorecard { seo_average_score, utm_coverage_percent, tracking_coverage_average, overall_health_percent },
    }
}

fn round_div(numerator: i64, denominator: i64) -> i64 {
    if denominator == 0 {
        return 0;
    }
    ((numerator as f64) / (denominator as f64)).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{analyze_json_ld, analyze_links, analyze_seo, analyze_tracking};

    #[test]
    fn empty_page_flags_core_issues() {
        let html = "<html><body></body></html>";
        let seo = analyze_seo(html);
        let links = analyze_links(html, "https://example.com/");
        let tracking = analyze_tracking(html);
        let json_ld = analyze_json_ld(html);

        let summary = build_issue_summary(&seo, &links, &tracking, &json_ld);
        assert!(summary.seo.missing_title);
        assert!(summary.seo.missing_h1);
        assert!(summary.tracking.mixpanel_missing);
        assert!(summary.tracking.ga_missing);
    }

    #[test]
    fn aggregate_empty_is_default() {
        let agg = aggregate_summaries(&[]);
        assert_eq!(agg.pages_analyzed, 0);
        assert_eq!(agg.scorecard.overall_health_percent, 0);
    }

    #[test]
    fn aggregate_computes_scorecard_percentages() {
        let flags_a = SeoFlags {
            missing_title: false,
            missing_description: false,
            missing_h1: false,
            missing_canonical: false,
            robots_blocked: false,
            json_ld_missing: false,
            json_ld_invalid: false,
            json_ld_incomplete: false,
        };
        let a = IssueSummary {
            seo: flags_a,
            internal_links: 5,
            external_links: 1,
            utm_tracked: 1,
            utm_missing: 1,
            tracking: TrackingFlags { mixpanel_missing: false, ga_missing: false },
            seo_issues: 0,
            link_issues: 1,
            tracking_issues: 0,
            seo_score: 90,
        };
        let b = IssueSummary {
            seo: SeoFlags { missing_title: true, ..flags_a },
            internal_links: 2,
            external_links: 0,
            utm_tracked: 0,
            utm_missing: 2,
            tracking: TrackingFlags { mixpanel_missing: true, ga_missing: false },
            seo_issues: 1,
            link_issues: 2,
            tracking_issues: 1,
            seo_score: 70,
        };
        let agg = aggregate_summaries(&[a, b]);
        assert_eq!(agg.pages_analyzed, 2);
        assert_eq!(agg.scorecard.seo_average_score, 80);
        assert_eq!(agg.scorecard.utm_coverage_percent, 25);
        assert_eq!(agg.scorecard.tracking_coverage_average, 75);
        assert_eq!(agg.total_issues, 4);
    }
}
