use std::path::PathBuf;

use crate::calendar::ReferenceYearWindow;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    /// Market calendar page that lists every product URL.
    pub calendar_url: String,
    pub urls_path: PathBuf,
    pub mappings_path: PathBuf,
    pub output_path: PathBuf,
    /// Base URL of the Nominatim-compatible geocoding service.
    pub geocoder_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub geocode_timeout_secs: u64,
    /// Pause after each scraped listing page.
    pub inter_request_delay_ms: u64,
    /// Minimum spacing between two geocoding requests.
    pub geocode_delay_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    pub reference_years: ReferenceYearWindow,
}
