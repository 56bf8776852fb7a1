pub mod address;
pub mod assemble;
pub mod client;
pub mod date;
pub mod error;
pub mod extract;
pub mod gather;
pub mod geocode;
pub mod mapping;
pub mod pipeline;
pub mod rate_limit;
pub mod text;

pub use address::{parse_postal_city, AddressResolver};
pub use assemble::assemble;
pub use client::{MarketClient, PageSource};
pub use date::DateNormalizer;
pub use error::ScraperError;
pub use extract::extract_listing;
pub use gather::extract_market_urls;
pub use geocode::{cache_key, CachedGeocoder, GeocodeCache, Geocoder, NominatimClient};
pub use mapping::AddressMappings;
pub use pipeline::{gather_market_urls, MarketPipeline, RunReport};
pub use text::clean_text;
