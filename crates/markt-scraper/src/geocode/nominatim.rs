//! Nominatim (`OpenStreetMap`) search API client.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;

use markt_core::Coordinates;

use super::Geocoder;
use crate::client::ensure_success;
use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

/// One search hit. Nominatim sends coordinates as strings; numbers are
/// accepted too so compatible services work.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: serde_json::Value,
    lon: serde_json::Value,
}

/// Queries `<base_url>/search` for the single best match.
pub struct NominatimClient {
    client: Client,
    base_url: String,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl NominatimClient {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            max_retries,
            backoff_base_secs,
        })
    }

    fn search_url(&self, query: &str) -> Result<Url, ScraperError> {
        let base = format!("{}/search", self.base_url);
        let mut url = Url::parse(&base).map_err(|e| ScraperError::InvalidUrl {
            url: base.clone(),
            reason: e.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "json")
            .append_pair("limit", "1")
            .append_pair("addressdetails", "1");
        Ok(url)
    }
}

impl Geocoder for NominatimClient {
    async fn lookup(&self, query: &str) -> Result<Option<Coordinates>, ScraperError> {
        let url = self.search_url(query)?;
        let body = retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(url.clone())
                    .header(reqwest::header::ACCEPT, "application/json")
                    .send()
                    .await?;
                let response = ensure_success(response, url.as_str())?;
                Ok::<String, ScraperError>(response.text().await?)
            }
        })
        .await?;

        let places: Vec<NominatimPlace> =
            serde_json::from_str(&body).map_err(|e| ScraperError::Deserialize {
                context: format!("geocode response for \"{query}\""),
                source: e,
            })?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };
        let lat = parse_coordinate(&place.lat, "lat", query)?;
        let lng = parse_coordinate(&place.lon, "lon", query)?;
        Ok(Some(Coordinates { lat, lng }))
    }
}

fn parse_coordinate(value: &serde_json::Value, field: &str, query: &str) -> Result<f64, ScraperError> {
    let parsed = match value {
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        serde_json::Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| ScraperError::MalformedGeocode {
            query: query.to_owned(),
            reason: format!("{field} is not a number: {value}"),
        })
}
