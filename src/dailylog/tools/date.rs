use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

const ISO_FORMAT: &str = "%Y-%m-%d";

const KOREAN_WEEKDAYS: [&str; 7] = ["월", "화", "수", "목", "금", "토", "일"];
const ENGLISH_WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Weekday naming used in date labels, Monday first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekdayNames {
    #[default]
    Korean,
    English,
}

impl WeekdayNames {
    fn table(self) -> &'static [&'static str; 7] {
        match self {
            WeekdayNames::Korean => &KOREAN_WEEKDAYS,
            WeekdayNames::English => &ENGLISH_WEEKDAYS,
        }
    }

    pub fn name(self, date: NaiveDate) -> &'static str {
        self.table()[date.weekday().num_days_from_monday() as usize]
    }
}

/// Result of normalizing a loosely formatted date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDate {
    pub date: NaiveDate,
    /// Canonical `YYYY-MM-DD`.
    pub iso: String,
    /// `YYYY-MM-DD (weekday)`.
    pub label: String,
}

/// Turns user or spreadsheet input into a canonical date. Never fails:
/// anything unparseable resolves to "today".
#[derive(Debug, Clone, Copy, Default)]
pub struct DateNormalizer {
    weekdays: WeekdayNames,
}

impl DateNormalizer {
    pub fn new(weekdays: WeekdayNames) -> Self {
        Self { weekdays }
    }

    /// Normalizes `input` against the current local date.
    pub fn normalize(&self, input: &str) -> NormalizedDate {
        self.normalize_at(input, Local::now().date_naive())
    }

    /// Normalizes `input`, using `today` whenever the input is blank or
    /// cannot be read as a date.
    pub fn normalize_at(&self, input: &str, today: NaiveDate) -> NormalizedDate {
        let date = parse_loose(input).unwrap_or(today);
        self.label(date)
    }

    /// Builds the canonical representation of an already-parsed date.
    pub fn label(&self, date: NaiveDate) -> NormalizedDate {
        let iso = date.format(ISO_FORMAT).to_string();
        let label = format!("{iso} ({})", self.weekdays.name(date));
        NormalizedDate { date, iso, label }
    }

    /// Reads an already canonical `YYYY-MM-DD` date. Unlike
    /// [`DateNormalizer::normalize`] there is no fallback: loose separators,
    /// missing zero padding and trailing text are all rejected.
    pub fn parse_iso(&self, iso: &str) -> Option<NormalizedDate> {
        let date = NaiveDate::parse_from_str(iso, ISO_FORMAT).ok()?;
        let normalized = self.label(date);
        (normalized.iso == iso).then_some(normalized)
    }
}

/// Accepts `2024-03-04`, `2024.03.04`, `2024/03/04`, optionally followed by a
/// time of day or other tokens.
fn parse_loose(input: &str) -> Option<NaiveDate> {
    let token = input.split_whitespace().next()?;
    let token: String = token
        .chars()
        .map(|ch| if ch == '.' || ch == '/' { '-' } else { ch })
        .collect();

    if let Ok(date) = NaiveDate::parse_from_str(&token, ISO_FORMAT) {
        return Some(date);
    }
    let prefix: String = token.chars().take(10).collect();
    NaiveDate::parse_from_str(&prefix, ISO_FORMAT).ok()
}
