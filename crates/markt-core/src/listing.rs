use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Text fields extracted from one market page, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    pub title: String,
    pub raw_date_text: String,
    /// Non-empty text nodes of the location block, typically venue, street
    /// and `"<postcode> <city>"`.
    pub raw_location_lines: Vec<String>,
    pub source_url: String,
    /// `openingstijden` attribute, verbatim.
    #[serde(default)]
    pub opening_time: String,
    /// `toegangsprijs` attribute, verbatim.
    #[serde(default)]
    pub entry_fee: String,
}

impl RawListing {
    /// The location block as one string, the key used by the address
    /// mapping table.
    #[must_use]
    pub fn location_key(&self) -> String {
        location_key(&self.raw_location_lines)
    }
}

/// Joins location lines with `\n` and trims the result.
#[must_use]
pub fn location_key(lines: &[String]) -> String {
    lines.join("\n").trim().to_string()
}

/// A manually curated correction for a location block the geocoder cannot
/// resolve from its parsed parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressMapping {
    /// Free-text address submitted to the geocoder instead of the parsed one.
    pub corrected_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(
        default,
        rename = "location_address",
        alias = "street",
        skip_serializing_if = "Option::is_none"
    )]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Address fields of a listing after positional parsing and mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAddress {
    pub venue: String,
    #[serde(rename = "location_address")]
    pub street: String,
    pub postal_code: String,
    pub city: String,
    /// Empty when there is not enough information to geocode.
    pub geocode_query: String,
    #[serde(rename = "address_mapped")]
    pub was_manually_mapped: bool,
}

/// A resolved latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Outcome of a geocode lookup. Both fields are set or neither is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl GeocodeResult {
    #[must_use]
    pub fn found(coordinates: Coordinates) -> Self {
        Self {
            lat: Some(coordinates.lat),
            lng: Some(coordinates.lng),
        }
    }

    #[must_use]
    pub fn missing() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.coordinates().is_some()
    }
}

impl From<Option<Coordinates>> for GeocodeResult {
    fn from(value: Option<Coordinates>) -> Self {
        value.map_or_else(Self::missing, Self::found)
    }
}

/// Advisory problems found while assembling a [`MarketRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ValidationIssue {
    #[serde(rename = "Missing title")]
    MissingTitle,
    #[serde(rename = "Missing date")]
    MissingDate,
    #[serde(rename = "Missing venue")]
    MissingVenue,
    #[serde(rename = "Missing city")]
    MissingCity,
    #[serde(rename = "Missing coordinates")]
    MissingCoordinates,
}

impl ValidationIssue {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationIssue::MissingTitle => "Missing title",
            ValidationIssue::MissingDate => "Missing date",
            ValidationIssue::MissingVenue => "Missing venue",
            ValidationIssue::MissingCity => "Missing city",
            ValidationIssue::MissingCoordinates => "Missing coordinates",
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fully normalized market listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    #[serde(flatten)]
    pub listing: RawListing,
    /// Canonical `[weekday] [days] [month] year` form, or the raw text when
    /// nothing could be parsed.
    pub standardized_date: String,
    pub resolved_address: ResolvedAddress,
    pub coordinates: GeocodeResult,
    /// One-based position of the listing in the source calendar.
    pub page_order: usize,
    pub validation_issues: Vec<ValidationIssue>,
    pub scraped_at: DateTime<Utc>,
}

impl MarketRecord {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validation_issues.is_empty()
    }
}

/// Aggregate counts written next to the records of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub scraped_at: DateTime<Utc>,
    pub total: usize,
    pub successful_geocodes: usize,
    pub failed_geocodes: usize,
    pub mapped_addresses: usize,
    /// Percentage with one decimal, e.g. `"87.5%"`.
    pub success_rate: String,
    pub failed_urls: Vec<String>,
}

impl RunSummary {
    #[must_use]
    pub fn from_records(
        records: &[MarketRecord],
        failed_urls: Vec<String>,
        scraped_at: DateTime<Utc>,
    ) -> Self {
        let total = records.len();
        let successful_geocodes = records
            .iter()
            .filter(|r| r.coordinates.is_resolved())
            .count();
        let mapped_addresses = records
            .iter()
            .filter(|r| r.resolved_address.was_manually_mapped)
            .count();

        Self {
            scraped_at,
            total,
            successful_geocodes,
            failed_geocodes: total - successful_geocodes,
            mapped_addresses,
            success_rate: format_success_rate(successful_geocodes, total),
            failed_urls,
        }
    }
}

fn format_success_rate(successes: usize, total: usize) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    // Record counts stay far below f64's exact integer range.
    #[allow(clippy::cast_precision_loss)]
    let pct = successes as f64 / total as f64 * 100.0;
    format!("{pct:.1}%")
}
