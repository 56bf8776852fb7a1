use chrono::{DateTime, Utc};

use markt_core::{GeocodeResult, MarketRecord, RawListing, ResolvedAddress, ValidationIssue};

/// Combines the normalized parts of one listing into a [`MarketRecord`],
/// stamped with the current time.
///
/// Never fails: each missing part is reported as a [`ValidationIssue`] and
/// the record is returned regardless.
#[must_use]
pub fn assemble(
    raw: RawListing,
    standardized_date: String,
    resolved_address: ResolvedAddress,
    coordinates: GeocodeResult,
    page_order: usize,
) -> MarketRecord {
    assemble_at(
        raw,
        standardized_date,
        resolved_address,
        coordinates,
        page_order,
        Utc::now(),
    )
}

/// [`assemble`] with an explicit timestamp.
#[must_use]
pub fn assemble_at(
    raw: RawListing,
    standardized_date: String,
    resolved_address: ResolvedAddress,
    coordinates: GeocodeResult,
    page_order: usize,
    scraped_at: DateTime<Utc>,
) -> MarketRecord {
    let validation_issues =
        validation_issues(&raw, &standardized_date, &resolved_address, coordinates);
    if !validation_issues.is_empty() {
        tracing::debug!(
            url = %raw.source_url,
            page_order,
            issues = ?validation_issues,
            "record has validation issues"
        );
    }

    MarketRecord {
        listing: raw,
        standardized_date,
        resolved_address,
        coordinates,
        page_order,
        validation_issues,
        scraped_at,
    }
}

fn validation_issues(
    raw: &RawListing,
    standardized_date: &str,
    address: &ResolvedAddress,
    coordinates: GeocodeResult,
) -> Vec<ValidationIssue> {
    let checks = [
        (raw.title.trim().is_empty(), ValidationIssue::MissingTitle),
        (standardized_date.trim().is_empty(), ValidationIssue::MissingDate),
        (address.venue.trim().is_empty(), ValidationIssue::MissingVenue),
        (address.city.trim().is_empty(), ValidationIssue::MissingCity),
        (!coordinates.is_resolved(), ValidationIssue::MissingCoordinates),
    ];
    checks
        .into_iter()
        .filter_map(|(missing, issue)| missing.then_some(issue))
        .collect()
}
