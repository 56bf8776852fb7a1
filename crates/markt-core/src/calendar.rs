//! Dutch calendar vocabulary and the token form produced by date parsing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Day of the week, named the way the source site writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Maandag,
    Dinsdag,
    Woensdag,
    Donderdag,
    Vrijdag,
    Zaterdag,
    Zondag,
}

impl Weekday {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Maandag => "maandag",
            Weekday::Dinsdag => "dinsdag",
            Weekday::Woensdag => "woensdag",
            Weekday::Donderdag => "donderdag",
            Weekday::Vrijdag => "vrijdag",
            Weekday::Zaterdag => "zaterdag",
            Weekday::Zondag => "zondag",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar month with its Dutch name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Month {
    Januari,
    Februari,
    Maart,
    April,
    Mei,
    Juni,
    Juli,
    Augustus,
    September,
    Oktober,
    November,
    December,
}

impl Month {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Month::Januari => "januari",
            Month::Februari => "februari",
            Month::Maart => "maart",
            Month::April => "april",
            Month::Mei => "mei",
            Month::Juni => "juni",
            Month::Juli => "juli",
            Month::Augustus => "augustus",
            Month::September => "september",
            Month::Oktober => "oktober",
            Month::November => "november",
            Month::December => "december",
        }
    }

    /// One-based month number (`januari` = 1).
    #[must_use]
    pub fn number(self) -> u32 {
        match self {
            Month::Januari => 1,
            Month::Februari => 2,
            Month::Maart => 3,
            Month::April => 4,
            Month::Mei => 5,
            Month::Juni => 6,
            Month::Juli => 7,
            Month::Augustus => 8,
            Month::September => 9,
            Month::Oktober => 10,
            Month::November => 11,
            Month::December => 12,
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tokens extracted from a raw date string.
///
/// `year` is always populated: when the text carries no usable year it is
/// inferred from the title or the [`ReferenceYearWindow`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTokens {
    pub weekday: Option<Weekday>,
    /// Day-of-month candidates in order of appearance.
    pub day_numbers: Vec<u32>,
    pub month: Option<Month>,
    pub year: i32,
}

impl DateTokens {
    /// Returns `true` when at least one of weekday, day number or month was
    /// found. A bare inferred year does not count.
    #[must_use]
    pub fn has_calendar_parts(&self) -> bool {
        self.weekday.is_some() || !self.day_numbers.is_empty() || self.month.is_some()
    }

    /// Renders `[weekday] [d1 & d2 ...] [month] year`, skipping absent parts.
    #[must_use]
    pub fn render(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(4);
        if let Some(weekday) = self.weekday {
            parts.push(weekday.to_string());
        }
        if !self.day_numbers.is_empty() {
            let days: Vec<String> = self.day_numbers.iter().map(u32::to_string).collect();
            parts.push(days.join(" & "));
        }
        if let Some(month) = self.month {
            parts.push(month.to_string());
        }
        parts.push(self.year.to_string());
        parts.join(" ")
    }
}

/// The two-year publishing window the source calendar covers.
///
/// The source only ever lists markets for the current season and the first
/// months of the next one, so an explicit year is trusted only when it falls
/// inside the window, and a missing year is guessed from the month: January
/// and February belong to the later year, everything else to the earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceYearWindow {
    start_year: i32,
}

impl ReferenceYearWindow {
    #[must_use]
    pub const fn new(start_year: i32) -> Self {
        Self { start_year }
    }

    #[must_use]
    pub fn start_year(self) -> i32 {
        self.start_year
    }

    #[must_use]
    pub fn end_year(self) -> i32 {
        self.start_year + 1
    }

    #[must_use]
    pub fn contains(self, year: i32) -> bool {
        year == self.start_year || year == self.end_year()
    }

    /// Year assumed for a listing whose text names `month` but no year.
    #[must_use]
    pub fn year_for_month(self, month: Option<Month>) -> i32 {
        match month {
            Some(Month::Januari | Month::Februari) => self.end_year(),
            _ => self.start_year,
        }
    }
}

impl Default for ReferenceYearWindow {
    fn default() -> Self {
        Self::new(2025)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(weekday: Option<Weekday>, days: &[u32], month: Option<Month>) -> DateTokens {
        DateTokens {
            weekday,
            day_numbers: days.to_vec(),
            month,
            year: 2025,
        }
    }

    #[test]
    fn render_full_date() {
        let t = tokens(Some(Weekday::Zaterdag), &[3], Some(Month::Mei));
        assert_eq!(t.render(), "zaterdag 3 mei 2025");
    }

    #[test]
    fn render_two_days_joined_with_ampersand() {
        let t = tokens(None, &[16, 17], Some(Month::Augustus));
        assert_eq!(t.render(), "16 & 17 augustus 2025");
    }

    #[test]
    fn render_three_days_joined_with_ampersand() {
        let t = tokens(None, &[1, 8, 15], Some(Month::Juni));
        assert_eq!(t.render(), "1 & 8 & 15 juni 2025");
    }

    #[test]
    fn render_year_only_when_nothing_else_present() {
        let t = tokens(None, &[], None);
        assert!(!t.has_calendar_parts());
        assert_eq!(t.render(), "2025");
    }

    #[test]
    fn window_contains_start_and_end_year() {
        let w = ReferenceYearWindow::new(2025);
        assert!(w.contains(2025));
        assert!(w.contains(2026));
        assert!(!w.contains(2024));
        assert!(!w.contains(2027));
    }

    #[test]
    fn window_assigns_winter_months_to_end_year() {
        let w = ReferenceYearWindow::default();
        assert_eq!(w.year_for_month(Some(Month::Januari)), 2026);
        assert_eq!(w.year_for_month(Some(Month::Februari)), 2026);
        assert_eq!(w.year_for_month(Some(Month::Maart)), 2025);
        assert_eq!(w.year_for_month(Some(Month::December)), 2025);
        assert_eq!(w.year_for_month(None), 2025);
    }

    #[test]
    fn month_numbers_are_one_based() {
        assert_eq!(Month::Januari.number(), 1);
        assert_eq!(Month::December.number(), 12);
    }

    #[test]
    fn weekday_serializes_lowercase() {
        let json = serde_json::to_string(&Weekday::Zondag).unwrap();
        assert_eq!(json, "\"zondag\"");
    }
}
