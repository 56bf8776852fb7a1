//! Discovery of market product URLs on the calendar page.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use reqwest::Url;
use scraper::{Html, Selector};

use crate::error::ScraperError;

static LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid link selector"));

/// Product slugs that are courses or online sessions rather than markets.
const EXCLUDED_KEYWORDS: &[&str] = &["workshop", "cursus", "training", "webinar"];

/// Collects the market product URLs linked from the calendar page.
///
/// Relative links are resolved against `calendar_url`. Only `/product/`
/// pages on the calendar's own host are kept; query strings and fragments
/// are dropped. The result is de-duplicated and sorted.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] if `calendar_url` cannot be parsed.
pub fn extract_market_urls(html: &str, calendar_url: &str) -> Result<Vec<String>, ScraperError> {
    let base = Url::parse(calendar_url).map_err(|e| ScraperError::InvalidUrl {
        url: calendar_url.to_owned(),
        reason: e.to_string(),
    })?;
    let document = Html::parse_document(html);

    let mut found = 0usize;
    let urls: BTreeSet<String> = document
        .select(&LINKS)
        .filter_map(|a| a.value().attr("href"))
        .inspect(|_| found += 1)
        .filter_map(|href| base.join(href.trim()).ok())
        .filter(|url| is_market_url(url, &base))
        .map(|url| strip_query(&url))
        .collect();

    tracing::info!(links = found, markets = urls.len(), "extracted market URLs");
    Ok(urls.into_iter().collect())
}

fn is_market_url(url: &Url, base: &Url) -> bool {
    if url.host_str() != base.host_str() {
        return false;
    }
    let path = url.path().to_lowercase();
    path.starts_with("/product/") && !EXCLUDED_KEYWORDS.iter().any(|kw| path.contains(kw))
}

fn strip_query(url: &Url) -> String {
    format!(
        "{}://{}{}",
        url.scheme(),
        url.host_str().unwrap_or_default(),
        url.path()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const CALENDAR: &str = "https://donevents.nl/marktkalender/";

    #[test]
    fn keeps_product_links_on_same_host() {
        let html = r#"
            <a href="https://donevents.nl/product/rommelmarkt-ahoy/">Ahoy</a>
            <a href="/product/vlooienmarkt-utrecht/">Utrecht</a>
            <a href="https://example.com/product/elders/">Elders</a>
            <a href="/contact/">Contact</a>
        "#;
        let urls = extract_market_urls(html, CALENDAR).unwrap();
        assert_eq!(
            urls,
            vec![
                "https://donevents.nl/product/rommelmarkt-ahoy/",
                "https://donevents.nl/product/vlooienmarkt-utrecht/",
            ]
        );
    }

    #[test]
    fn drops_courses_and_webinars() {
        let html = r#"
            <a href="/product/workshop-standbouw/">Workshop</a>
            <a href="/product/Webinar-verkopen/">Webinar</a>
            <a href="/product/markt-gouda/">Gouda</a>
        "#;
        let urls = extract_market_urls(html, CALENDAR).unwrap();
        assert_eq!(urls, vec!["https://donevents.nl/product/markt-gouda/"]);
    }

    #[test]
    fn strips_query_and_deduplicates() {
        let html = r#"
            <a href="/product/markt-gouda/?utm_source=x">Gouda</a>
            <a href="/product/markt-gouda/#datum">Gouda</a>
            <a href="https://donevents.nl/product/markt-gouda/">Gouda</a>
        "#;
        let urls = extract_market_urls(html, CALENDAR).unwrap();
        assert_eq!(urls, vec!["https://donevents.nl/product/markt-gouda/"]);
    }

    #[test]
    fn rejects_invalid_calendar_url() {
        assert!(matches!(
            extract_market_urls("", "not a url"),
            Err(ScraperError::InvalidUrl { .. })
        ));
    }
}
