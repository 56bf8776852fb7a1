//! JSON files exchanged between the CLI commands.
//!
//! `gather` writes a URL list, `scrape` reads it and writes the records plus
//! a `<name>_metadata.json` summary next to them.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;

use markt_core::{MarketRecord, RunSummary};

pub(crate) fn read_urls(path: &Path) -> anyhow::Result<Vec<String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read URL list {}", path.display()))?;
    let urls: Vec<String> = serde_json::from_str(&raw)
        .with_context(|| format!("URL list {} is not a JSON array of strings", path.display()))?;
    Ok(urls)
}

pub(crate) fn write_urls(path: &Path, urls: &[String]) -> anyhow::Result<()> {
    write_json(path, &urls)
}

pub(crate) fn read_records(path: &Path) -> anyhow::Result<Vec<MarketRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read records {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("records file {} is malformed", path.display()))
}

/// Writes `records` to `path` and `summary` to its metadata sibling.
/// Returns the metadata path.
pub(crate) fn write_records(
    path: &Path,
    records: &[MarketRecord],
    summary: &RunSummary,
) -> anyhow::Result<PathBuf> {
    write_json(path, &records)?;
    let metadata = metadata_path(path);
    write_json(&metadata, summary)?;
    Ok(metadata)
}

/// `data/markets.json` -> `data/markets_metadata.json`.
pub(crate) fn metadata_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map_or_else(|| "records".into(), |s| s.to_string_lossy());
    path.with_file_name(format!("{stem}_metadata.json"))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
