//! Address resolution: positional parsing of the location block plus the
//! manual correction table.
//!
//! No network or cache access happens here; the output's `geocode_query`
//! is handed to [`crate::geocode::CachedGeocoder`] by the pipeline.

use std::sync::LazyLock;

use regex::Regex;

use markt_core::{location_key, ResolvedAddress};

use crate::mapping::AddressMappings;

/// Dutch postcode (`1234 AB` or `1234AB`) followed by the city name.
static POSTAL_CITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}\s?[A-Z]{2})\s+(.*)$").expect("valid postal code regex")
});

/// Splits a `"<postcode> <city>"` line. Returns `None` when the line does not
/// start with a Dutch postcode.
#[must_use]
pub fn parse_postal_city(line: &str) -> Option<(String, String)> {
    let caps = POSTAL_CITY.captures(line.trim())?;
    Some((caps[1].trim().to_string(), caps[2].trim().to_string()))
}

/// Turns raw location lines into a [`ResolvedAddress`].
#[derive(Debug, Clone, Default)]
pub struct AddressResolver {
    mappings: AddressMappings,
}

impl AddressResolver {
    #[must_use]
    pub fn new(mappings: AddressMappings) -> Self {
        Self { mappings }
    }

    #[must_use]
    pub fn mappings(&self) -> &AddressMappings {
        &self.mappings
    }

    /// Resolves `raw_location_lines` for the listing named by `context`.
    ///
    /// A mapping hit overrides every field the mapping provides and supplies
    /// the geocode query verbatim. Otherwise the query is
    /// `"<street>, <postal_code> <city>"` when street and city are both
    /// known, and empty when they are not.
    #[must_use]
    pub fn resolve(&self, raw_location_lines: &[String], context: &str) -> ResolvedAddress {
        let mut address = parse_location_lines(raw_location_lines);

        let key = location_key(raw_location_lines);
        if let Some(mapping) = self.mappings.get(&key) {
            tracing::info!(listing = context, "applying address mapping");
            if let Some(venue) = &mapping.venue {
                address.venue.clone_from(venue);
            }
            if let Some(street) = &mapping.street {
                address.street.clone_from(street);
            }
            if let Some(postal_code) = &mapping.postal_code {
                address.postal_code.clone_from(postal_code);
            }
            if let Some(city) = &mapping.city {
                address.city.clone_from(city);
            }
            address.geocode_query.clone_from(&mapping.corrected_address);
            address.was_manually_mapped = true;
            return address;
        }

        if !address.street.is_empty() && !address.city.is_empty() {
            address.geocode_query = format!(
                "{}, {} {}",
                address.street, address.postal_code, address.city
            );
        } else {
            tracing::debug!(
                listing = context,
                location = %key,
                "street or city unknown, geocoding will be skipped"
            );
        }
        address
    }
}

/// Positional parse: venue, street, `"<postcode> <city>"`. Blocks with fewer
/// than three lines are not in the source's address layout and stay empty.
fn parse_location_lines(lines: &[String]) -> ResolvedAddress {
    let mut address = ResolvedAddress::default();
    if lines.len() < 3 {
        return address;
    }
    address.venue = lines[0].trim().to_string();
    address.street = lines[1].trim().to_string();
    if let Some((postal_code, city)) = parse_postal_city(&lines[2]) {
        address.postal_code = postal_code;
        address.city = city;
    }
    address
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use markt_core::AddressMapping;

    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_owned()).collect()
    }

    fn resolver_with(key: &str, mapping: AddressMapping) -> AddressResolver {
        let mut entries = BTreeMap::new();
        entries.insert(key.to_owned(), mapping);
        AddressResolver::new(AddressMappings::new(entries))
    }

    #[test]
    fn parse_postal_city_splits_code_and_city() {
        assert_eq!(
            parse_postal_city("1234 AB Amsterdam"),
            Some(("1234 AB".to_owned(), "Amsterdam".to_owned()))
        );
    }

    #[test]
    fn parse_postal_city_accepts_code_without_space() {
        assert_eq!(
            parse_postal_city("3011AB Rotterdam"),
            Some(("3011AB".to_owned(), "Rotterdam".to_owned()))
        );
    }

    #[test]
    fn parse_postal_city_keeps_multi_word_city() {
        assert_eq!(
            parse_postal_city("2511 CV Den Haag"),
            Some(("2511 CV".to_owned(), "Den Haag".to_owned()))
        );
    }

    #[test]
    fn parse_postal_city_rejects_non_matching_line() {
        assert_eq!(parse_postal_city("Amsterdam"), None);
        assert_eq!(parse_postal_city("123 AB Amsterdam"), None);
        assert_eq!(parse_postal_city("1234 ab Amsterdam"), None);
    }

    #[test]
    fn resolves_three_line_block_into_query() {
        let resolver = AddressResolver::default();
        let address = resolver.resolve(
            &lines(&["Sporthal De Vliert", "Burg. Loeffplein 1", "5211 RX Den Bosch"]),
            "Rommelmarkt",
        );
        assert_eq!(address.venue, "Sporthal De Vliert");
        assert_eq!(address.street, "Burg. Loeffplein 1");
        assert_eq!(address.postal_code, "5211 RX");
        assert_eq!(address.city, "Den Bosch");
        assert_eq!(address.geocode_query, "Burg. Loeffplein 1, 5211 RX Den Bosch");
        assert!(!address.was_manually_mapped);
    }

    #[test]
    fn non_matching_postal_line_leaves_city_empty_and_skips_query() {
        let resolver = AddressResolver::default();
        let address = resolver.resolve(&lines(&["Hal 3", "Parkweg 4", "Gorinchem"]), "Markt");
        assert_eq!(address.venue, "Hal 3");
        assert_eq!(address.postal_code, "");
        assert_eq!(address.city, "");
        assert_eq!(address.geocode_query, "");
    }

    #[test]
    fn short_block_yields_empty_address() {
        let resolver = AddressResolver::default();
        let address = resolver.resolve(&lines(&["Alleen een naam"]), "Markt");
        assert_eq!(address, ResolvedAddress::default());
    }

    #[test]
    fn resolution_is_idempotent() {
        let resolver = AddressResolver::default();
        let raw = lines(&["Ahoy", "Ahoyweg 10", "3084 BA Rotterdam"]);
        assert_eq!(resolver.resolve(&raw, "Markt"), resolver.resolve(&raw, "Markt"));
    }

    #[test]
    fn mapping_query_wins_over_parsed_address() {
        let raw = lines(&["Ahoy", "Ahoyweg 10", "3084 BA Rotterdam"]);
        let resolver = resolver_with(
            "Ahoy\nAhoyweg 10\n3084 BA Rotterdam",
            AddressMapping {
                corrected_address: "Rotterdam Ahoy, Ahoy-weg 10, Rotterdam".to_owned(),
                ..AddressMapping::default()
            },
        );
        let address = resolver.resolve(&raw, "Markt");
        assert_eq!(address.geocode_query, "Rotterdam Ahoy, Ahoy-weg 10, Rotterdam");
        assert!(address.was_manually_mapped);
        // Fields the mapping omits fall back to the parsed values.
        assert_eq!(address.street, "Ahoyweg 10");
        assert_eq!(address.city, "Rotterdam");
    }

    #[test]
    fn mapping_fields_override_parsed_fields() {
        let raw = lines(&["Evenementenhal", "Hallenweg 1", "Gorinchem"]);
        let resolver = resolver_with(
            "Evenementenhal\nHallenweg 1\nGorinchem",
            AddressMapping {
                corrected_address: "Franklinweg 2, 4207 HX Gorinchem".to_owned(),
                venue: Some("Evenementenhal Gorinchem".to_owned()),
                street: Some("Franklinweg 2".to_owned()),
                postal_code: Some("4207 HX".to_owned()),
                city: Some("Gorinchem".to_owned()),
                note: None,
            },
        );
        let address = resolver.resolve(&raw, "Markt");
        assert_eq!(address.venue, "Evenementenhal Gorinchem");
        assert_eq!(address.street, "Franklinweg 2");
        assert_eq!(address.postal_code, "4207 HX");
        assert_eq!(address.city, "Gorinchem");
        assert_eq!(address.geocode_query, "Franklinweg 2, 4207 HX Gorinchem");
    }

    #[test]
    fn mapping_applies_to_blocks_the_parser_cannot_read() {
        let raw = lines(&["Marktplein"]);
        let resolver = resolver_with(
            "Marktplein",
            AddressMapping {
                corrected_address: "Markt, Gouda".to_owned(),
                city: Some("Gouda".to_owned()),
                ..AddressMapping::default()
            },
        );
        let address = resolver.resolve(&raw, "Markt");
        assert_eq!(address.geocode_query, "Markt, Gouda");
        assert_eq!(address.city, "Gouda");
        assert_eq!(address.venue, "");
    }
}
