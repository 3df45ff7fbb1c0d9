//! `sitemap.xml` discovery, seeding the BFS frontier before crawling begins
//! (spec.md §9 supplement: the original tool seeds from sitemaps when
//! present, falling back to pure link-following otherwise).

use regex::Regex;
use url::Url;

use crate::error::ScanResult;

const MAX_SITEMAP_URLS: usize = 5000;

/// Fetch and parse `base_url`'s `/sitemap.xml`. Returns an empty list on
/// any failure (missing file, non-XML response, network error) — sitemap
/// seeding is a head start, not a requirement.
pub async fn discover_sitemap_urls(client: &reqwest::Client, base_url: &str) -> Vec<String> {
    let Ok(base) = Url::parse(base_url) else { return Vec::new() };
    let mut sitemap_url = base.clone();
    sitemap_url.set_path("/sitemap.xml");
    sitemap_url.set_query(None);

    fetch_sitemap_recursive(client, sitemap_url.as_str(), 0).await.unwrap_or_default()
}

async fn fetch_sitemap_recursive(client: &reqwest::Client, url: &str, depth: u8) -> ScanResult<Vec<String>> {
    let response = client.get(url).send().await.map_err(|e| crate::error::ScanError::Fetch(e.to_string()))?;
    if !response.status().is_success() {
        return Ok(Vec::new());
    }
    let body = response.text().await.map_err(|e| crate::error::ScanError::Fetch(e.to_string()))?;

    let locations = extract_locations(&body);

    if depth == 0 && is_sitemap_index(&body) {
        let mut urls = Vec::new();
        for nested in locations.iter().take(50) {
            if let Ok(mut more) = Box::pin(fetch_sitemap_recursive(client, nested, 1)).await {
                urls.append(&mut more);
                if urls.len() >= MAX_SITEMAP_URLS {
                    break;
                }
            }
        }
        return Ok(urls);
    }

    Ok(locations.into_iter().take(MAX_SITEMAP_URLS).collect())
}

fn is_sitemap_index(body: &str) -> bool {
    body.contains("<sitemapindex")
}

fn extract_locations(body: &str) -> Vec<String> {
    let loc = Regex::new(r"<loc>\s*([^<\s]+)\s*</loc>").expect("static regex is valid");
    loc.captures_iter(body).map(|c| c[1].to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_locations_from_urlset() {
        let xml = "<urlset><url><loc>https://a.example/one</loc></url><url><loc>https://a.example/two</loc></url></urlset>";
        let locs = extract_locations(xml);
        assert_eq!(locs, vec!["https://a.example/one", "https://a.example/two"]);
    }

    #[test]
    fn detects_sitemap_index() {
        let xml = "<sitemapindex><sitemap><loc>https://a.example/sitemap-1.xml</loc></sitemap></sitemapindex>";
        assert!(is_sitemap_index(xml));
    }
}
