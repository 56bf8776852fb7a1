//! `gather` and `scrape` command handlers.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;

use markt_core::{AppConfig, RunSummary};
use markt_scraper::{
    gather_market_urls, AddressMappings, AddressResolver, CachedGeocoder, DateNormalizer,
    GeocodeCache, MarketClient, MarketPipeline, NominatimClient,
};

use crate::store;

fn page_client(config: &AppConfig) -> anyhow::Result<MarketClient> {
    Ok(MarketClient::new(
        config.request_timeout_secs,
        &config.user_agent,
        config.max_retries,
        config.retry_backoff_base_secs,
    )?)
}

/// Fetches the calendar page and writes its market URLs to `output`.
///
/// # Errors
///
/// Returns an error if the calendar page cannot be fetched or the URL list
/// cannot be written.
pub(crate) async fn run_gather(config: &AppConfig, output: &Path) -> anyhow::Result<()> {
    let client = page_client(config)?;
    let urls = gather_market_urls(&client, &config.calendar_url).await?;
    if urls.is_empty() {
        tracing::warn!(calendar_url = %config.calendar_url, "no market URLs found");
    }
    store::write_urls(output, &urls)?;

    tracing::info!(count = urls.len(), path = %output.display(), "saved market URLs");
    println!("Found {} market URLs, saved to {}", urls.len(), output.display());
    Ok(())
}

/// Scrapes every URL in `urls_path` and writes records plus metadata to
/// `output`. Per-page failures are reported, never fatal.
///
/// # Errors
///
/// Returns an error if the URL list cannot be read, an HTTP client cannot
/// be built, or the results cannot be written.
pub(crate) async fn run_scrape(
    config: &AppConfig,
    urls_path: &Path,
    mappings_path: &Path,
    output: &Path,
) -> anyhow::Result<()> {
    let urls = store::read_urls(urls_path)?;
    if urls.is_empty() {
        anyhow::bail!(
            "URL list {} is empty; run `markt-cli gather` first",
            urls_path.display()
        );
    }
    tracing::info!(count = urls.len(), path = %urls_path.display(), "loaded market URLs");

    let mappings = AddressMappings::load_or_empty(mappings_path);
    let geocoder = NominatimClient::new(
        &config.geocoder_url,
        config.geocode_timeout_secs,
        &config.user_agent,
        config.max_retries,
        config.retry_backoff_base_secs,
    )?;

    let mut pipeline = MarketPipeline::new(
        page_client(config)?,
        DateNormalizer::new(config.reference_years),
        AddressResolver::new(mappings),
        CachedGeocoder::new(
            geocoder,
            GeocodeCache::default(),
            Duration::from_millis(config.geocode_delay_ms),
        ),
        Duration::from_millis(config.inter_request_delay_ms),
    );

    let report = pipeline.run(&urls).await;
    let summary = report.summary(Utc::now());
    let metadata = store::write_records(output, &report.records, &summary)?;
    tracing::info!(
        records = report.records.len(),
        path = %output.display(),
        metadata = %metadata.display(),
        "saved market records"
    );

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("Scraping complete");
    println!("  Total markets:       {}", summary.total);
    println!(
        "  Geocoded:            {} ({})",
        summary.successful_geocodes, summary.success_rate
    );
    println!("  Not geocoded:        {}", summary.failed_geocodes);
    println!("  Mapped addresses:    {}", summary.mapped_addresses);
    println!("  Failed pages:        {}", summary.failed_urls.len());
    for url in &summary.failed_urls {
        println!("    - {url}");
    }
}
