//! Read-only inspection of the address mapping table.

use std::path::Path;

use clap::Subcommand;

use markt_core::MarketRecord;
use markt_scraper::AddressMappings;

use crate::store;

/// Sub-commands available under `mappings`.
#[derive(Debug, Subcommand)]
pub enum MappingsCommands {
    /// Print every configured address mapping
    List,
    /// Show scraped markets without coordinates that have no mapping yet
    Unmapped {
        /// Records file written by `scrape` (defaults to MARKT_OUTPUT_PATH)
        #[arg(long)]
        records: Option<std::path::PathBuf>,
    },
}

pub(crate) fn run_mappings_list(mappings_path: &Path) {
    let mappings = AddressMappings::load_or_empty(mappings_path);
    if mappings.is_empty() {
        println!("No address mappings in {}", mappings_path.display());
        return;
    }

    println!("{} address mappings:\n", mappings.len());
    for (raw, mapping) in mappings.iter() {
        println!("{}", raw.replace('\n', " | "));
        println!("  -> {}", mapping.corrected_address);
        if let Some(note) = &mapping.note {
            println!("     note: {note}");
        }
    }
}

/// # Errors
///
/// Returns an error if the records file cannot be read.
pub(crate) fn run_mappings_unmapped(
    records_path: &Path,
    mappings_path: &Path,
) -> anyhow::Result<()> {
    let records = store::read_records(records_path)?;
    let mappings = AddressMappings::load_or_empty(mappings_path);
    let unmapped = unmapped_records(&records, &mappings);

    if unmapped.is_empty() {
        println!("Every market without coordinates already has a mapping.");
        return Ok(());
    }

    println!("{} markets without coordinates need a mapping:\n", unmapped.len());
    for (i, record) in unmapped.iter().enumerate() {
        let address = &record.resolved_address;
        println!("{}. {}", i + 1, record.listing.title);
        println!("   Raw location: {}", record.listing.location_key().replace('\n', " | "));
        println!(
            "   Parsed: {} | {} | {} {}",
            address.venue, address.street, address.postal_code, address.city
        );
        println!("   Link: {}", record.listing.source_url);
        println!();
    }
    Ok(())
}

/// Records lacking coordinates whose raw location text is not a mapping key.
pub(crate) fn unmapped_records<'a>(
    records: &'a [MarketRecord],
    mappings: &AddressMappings,
) -> Vec<&'a MarketRecord> {
    records
        .iter()
        .filter(|r| !r.coordinates.is_resolved())
        .filter(|r| !mappings.contains(&r.listing.location_key()))
        .collect()
}
