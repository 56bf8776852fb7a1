//! Normalization of the free-text `datum` attribute into
//! `[weekday] [days] [month] year` form.
//!
//! Only the closed vocabulary the source calendar uses is recognised. Year
//! inference leans on the [`ReferenceYearWindow`] because most listings omit
//! the year entirely.

use std::fmt;
use std::sync::LazyLock;

use chrono::{Local, NaiveDate};
use regex::Regex;

use markt_core::{DateTokens, Month, ReferenceYearWindow, Weekday};

use crate::text::clean_text;

/// Full weekday names. They match as word prefixes so plural and compound
/// forms (`zondagen`, `zaterdagmiddag`) are recognised.
const WEEKDAY_NAMES: &[(&str, Weekday)] = &[
    ("maandag", Weekday::Maandag),
    ("dinsdag", Weekday::Dinsdag),
    ("woensdag", Weekday::Woensdag),
    ("donderdag", Weekday::Donderdag),
    ("vrijdag", Weekday::Vrijdag),
    ("zaterdag", Weekday::Zaterdag),
    ("zondag", Weekday::Zondag),
];

/// Weekday abbreviations, whole words only. `zat`/`zon` precede `za`/`zo`.
const WEEKDAY_ABBREVIATIONS: &[(&str, Weekday)] = &[
    ("zat", Weekday::Zaterdag),
    ("zon", Weekday::Zondag),
    ("ma", Weekday::Maandag),
    ("di", Weekday::Dinsdag),
    ("wo", Weekday::Woensdag),
    ("do", Weekday::Donderdag),
    ("vr", Weekday::Vrijdag),
    ("za", Weekday::Zaterdag),
    ("zo", Weekday::Zondag),
];

/// Full month names, matched as word prefixes.
const MONTH_NAMES: &[(&str, Month)] = &[
    ("januari", Month::Januari),
    ("februari", Month::Februari),
    ("maart", Month::Maart),
    ("april", Month::April),
    ("mei", Month::Mei),
    ("juni", Month::Juni),
    ("juli", Month::Juli),
    ("augustus", Month::Augustus),
    ("september", Month::September),
    ("oktober", Month::Oktober),
    ("november", Month::November),
    ("december", Month::December),
];

/// Month abbreviations, whole words only. `sept` precedes `sep`.
const MONTH_ABBREVIATIONS: &[(&str, Month)] = &[
    ("jan", Month::Januari),
    ("feb", Month::Februari),
    ("mrt", Month::Maart),
    ("apr", Month::April),
    ("jun", Month::Juni),
    ("jul", Month::Juli),
    ("aug", Month::Augustus),
    ("sept", Month::September),
    ("sep", Month::September),
    ("okt", Month::Oktober),
    ("nov", Month::November),
    ("dec", Month::December),
];

static DAY_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})\b").expect("valid day number regex"));

static FOUR_DIGIT_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})\b").expect("valid year regex"));

static DIGITS_THEN_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)([a-z]{3,})").expect("valid glued digits regex"));

static WORD_THEN_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z]{3,})(\d)").expect("valid glued word regex"));

/// Where the year of a [`DateParse`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearSource {
    DateText,
    Title,
    MonthHeuristic,
    Default,
}

/// Why a date string could not be turned into calendar tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateMiss {
    /// The attribute was empty or whitespace only.
    Empty,
    /// No weekday, day number or month was recognised.
    NoCalendarParts,
}

impl fmt::Display for DateMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateMiss::Empty => f.write_str("date text is empty"),
            DateMiss::NoCalendarParts => f.write_str("no weekday, day or month recognised"),
        }
    }
}

/// Structured result of [`DateNormalizer::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParse {
    pub tokens: DateTokens,
    pub year_source: YearSource,
    /// `true` when the inferred year was moved forward because the date had
    /// already passed.
    pub year_adjusted: bool,
    pub miss: Option<DateMiss>,
}

/// Parses the source's date attribute. Stateless apart from the reference
/// window and the date treated as "today".
#[derive(Debug, Clone, Copy)]
pub struct DateNormalizer {
    window: ReferenceYearWindow,
    today: NaiveDate,
}

impl DateNormalizer {
    /// Creates a normalizer that compares against the local calendar date.
    #[must_use]
    pub fn new(window: ReferenceYearWindow) -> Self {
        Self::with_today(window, Local::now().date_naive())
    }

    #[must_use]
    pub fn with_today(window: ReferenceYearWindow, today: NaiveDate) -> Self {
        Self { window, today }
    }

    /// Returns the canonical date string for `raw_date_text`, or the raw text
    /// unchanged when nothing could be recognised.
    ///
    /// `chronological_hint` is the listing's one-based position on the
    /// calendar page; it only enriches the log output.
    #[must_use]
    pub fn normalize(&self, raw_date_text: &str, title: &str, chronological_hint: usize) -> String {
        let parsed = self.parse(raw_date_text, title);
        match parsed.miss {
            None => {
                let standardized = parsed.tokens.render();
                tracing::debug!(
                    raw = raw_date_text,
                    standardized = %standardized,
                    year_source = ?parsed.year_source,
                    year_adjusted = parsed.year_adjusted,
                    chronological_hint,
                    "date standardized"
                );
                standardized
            }
            Some(DateMiss::Empty) => raw_date_text.to_string(),
            Some(miss) => {
                tracing::warn!(
                    raw = raw_date_text,
                    title,
                    chronological_hint,
                    reason = %miss,
                    "could not parse date, keeping original text"
                );
                raw_date_text.to_string()
            }
        }
    }

    /// Extracts calendar tokens and infers the year.
    #[must_use]
    pub fn parse(&self, raw_date_text: &str, title: &str) -> DateParse {
        let text = split_glued_runs(&clean_text(raw_date_text).to_lowercase());
        let words: Vec<&str> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        let weekday = match_vocabulary(WEEKDAY_NAMES, WEEKDAY_ABBREVIATIONS, &words);
        let month = match_vocabulary(MONTH_NAMES, MONTH_ABBREVIATIONS, &words);
        let day_numbers = extract_day_numbers(&text);
        let (inferred_year, year_source) = self.infer_year(&text, title, month);
        let year = self.adjust_year(inferred_year, month, day_numbers.first().copied());

        let tokens = DateTokens {
            weekday,
            day_numbers,
            month,
            year,
        };
        let miss = if text.is_empty() {
            Some(DateMiss::Empty)
        } else if tokens.has_calendar_parts() {
            None
        } else {
            Some(DateMiss::NoCalendarParts)
        };

        DateParse {
            tokens,
            year_source,
            year_adjusted: year != inferred_year,
            miss,
        }
    }

    /// Picks the year: explicit in-window year in the date text, then in the
    /// title, then the month heuristic, then the window start.
    fn infer_year(&self, text: &str, title: &str, month: Option<Month>) -> (i32, YearSource) {
        if let Some(year) = self.find_window_year(text) {
            return (year, YearSource::DateText);
        }
        if let Some(year) = self.find_window_year(&title.to_lowercase()) {
            tracing::debug!(year, title, "using year from title");
            return (year, YearSource::Title);
        }
        if month.is_some() {
            return (self.window.year_for_month(month), YearSource::MonthHeuristic);
        }
        (self.window.start_year(), YearSource::Default)
    }

    fn find_window_year(&self, text: &str) -> Option<i32> {
        FOUR_DIGIT_YEAR
            .captures_iter(text)
            .filter_map(|caps| caps[1].parse::<i32>().ok())
            .find(|year| self.window.contains(*year))
    }

    /// Moves `year` forward by one when `(year, month, day)` is strictly
    /// before today. Leaves it alone when month or day is unknown or the
    /// combination is not a real date.
    fn adjust_year(&self, year: i32, month: Option<Month>, day: Option<u32>) -> i32 {
        let (Some(month), Some(day)) = (month, day) else {
            return year;
        };
        match NaiveDate::from_ymd_opt(year, month.number(), day) {
            Some(date) if date < self.today => {
                tracing::info!(
                    %month,
                    day,
                    from = year,
                    to = year + 1,
                    "date has passed, moving to next year"
                );
                year + 1
            }
            Some(_) => year,
            None => {
                tracing::warn!(%month, day, year, "not a valid calendar date, keeping year");
                year
            }
        }
    }
}

/// Full names are tried first, as word prefixes, then abbreviations as
/// whole words. Table order breaks ties.
fn match_vocabulary<T: Copy>(
    names: &[(&str, T)],
    abbreviations: &[(&str, T)],
    words: &[&str],
) -> Option<T> {
    names
        .iter()
        .find(|(name, _)| words.iter().any(|word| word.starts_with(*name)))
        .or_else(|| abbreviations.iter().find(|(abbr, _)| words.contains(abbr)))
        .map(|(_, value)| *value)
}

/// Inserts a space where a number and a word are written together, so
/// `3mei` reads as `3 mei`.
fn split_glued_runs(text: &str) -> String {
    let text = DIGITS_THEN_WORD.replace_all(text, "$1 $2");
    WORD_THEN_DIGITS.replace_all(&text, "$1 $2").into_owned()
}

fn extract_day_numbers(text: &str) -> Vec<u32> {
    DAY_NUMBER
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .collect()
}

#[cfg(test)]
#[path = "date_test.rs"]
mod tests;
