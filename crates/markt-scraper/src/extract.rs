//! Extraction of [`RawListing`] fields from a market product page.
//!
//! The source is a WooCommerce shop: the date, opening hours and entry fee
//! live in product attribute rows, the location in a Divi blurb block.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use markt_core::RawListing;

use crate::text::clean_text;

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1").expect("valid title selector"));

static DATE_CELL: LazyLock<Selector> = LazyLock::new(|| attribute_selector("attribute_datum"));

static OPENING_TIME_CELL: LazyLock<Selector> =
    LazyLock::new(|| attribute_selector("attribute_openingstijden"));

static ENTRY_FEE_CELL: LazyLock<Selector> =
    LazyLock::new(|| attribute_selector("attribute_toegangsprijs"));

static LOCATION_BLOCK: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.et_pb_blurb_description").expect("valid location selector")
});

fn attribute_selector(attribute: &str) -> Selector {
    Selector::parse(&format!(
        "tr.woocommerce-product-attributes-item--{attribute} td"
    ))
    .expect("valid attribute selector")
}

/// Extracts the listing fields from `html`. Missing elements yield empty
/// fields; validation happens later, at assembly.
#[must_use]
pub fn extract_listing(html: &str, source_url: &str) -> RawListing {
    let document = Html::parse_document(html);

    let title = first_text(&document, &TITLE);
    let raw_date_text = first_text(&document, &DATE_CELL);
    let opening_time = first_text(&document, &OPENING_TIME_CELL);
    let entry_fee = first_text(&document, &ENTRY_FEE_CELL);

    let raw_location_lines = document
        .select(&LOCATION_BLOCK)
        .next()
        .map(location_lines)
        .unwrap_or_default();

    if raw_location_lines.is_empty() {
        tracing::debug!(source_url, "no location block on page");
    }

    RawListing {
        title,
        raw_date_text,
        raw_location_lines,
        source_url: source_url.to_owned(),
        opening_time,
        entry_fee,
    }
}

fn first_text(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .next()
        .map(|el| clean_text(&el.text().collect::<String>()))
        .unwrap_or_default()
}

/// Every non-blank text node of the block, cleaned, in document order.
fn location_lines(block: ElementRef<'_>) -> Vec<String> {
    block
        .text()
        .map(clean_text)
        .filter(|line| !line.is_empty())
        .collect()
}
