use serde::{Deserialize, Serialize};

/// Canonical `YYYY-MM-DD` date used as the primary key of an entry.
pub type DateIso = String;

/// The five free-text fields recorded for a day. Absent values are the empty
/// string, never a separate "missing" state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFields {
    pub daily_log: String,
    pub trades: String,
    pub holdings: String,
    pub considerations: String,
    pub interests: String,
}

impl EntryFields {
    /// Returns the value stored for `field`.
    pub fn get(&self, field: TextField) -> &str {
        match field {
            TextField::DailyLog => &self.daily_log,
            TextField::Trades => &self.trades,
            TextField::Holdings => &self.holdings,
            TextField::Considerations => &self.considerations,
            TextField::Interests => &self.interests,
        }
    }

    /// Replaces the value stored for `field`.
    pub fn set(&mut self, field: TextField, value: impl Into<String>) {
        let slot = match field {
            TextField::DailyLog => &mut self.daily_log,
            TextField::Trades => &mut self.trades,
            TextField::Holdings => &mut self.holdings,
            TextField::Considerations => &mut self.considerations,
            TextField::Interests => &mut self.interests,
        };
        *slot = value.into();
    }

    /// Builder-style variant of [`EntryFields::set`].
    pub fn with(mut self, field: TextField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Returns a copy with every field trimmed of surrounding whitespace.
    pub fn trimmed(&self) -> Self {
        let mut out = Self::default();
        for field in TextField::ALL {
            out.set(field, self.get(field).trim());
        }
        out
    }
}

/// Identifies one of the five free-text fields of an [`Entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    DailyLog,
    Trades,
    Holdings,
    Considerations,
    Interests,
}

impl TextField {
    /// Storage and display order of the text fields.
    pub const ALL: [TextField; 5] = [
        TextField::DailyLog,
        TextField::Trades,
        TextField::Holdings,
        TextField::Considerations,
        TextField::Interests,
    ];
}

/// One journal record. There is exactly one entry per `date_iso`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Primary key and the only ordering key.
    pub date_iso: DateIso,
    /// `YYYY-MM-DD (weekday)` display label.
    pub date_label: String,
    #[serde(flatten)]
    pub fields: EntryFields,
    /// Local timestamp of the last write, maintained by the store.
    pub updated_at: String,
}

impl Entry {
    /// Label followed by the five text fields, in spreadsheet column order.
    pub fn display_values(&self) -> [&str; 6] {
        [
            self.date_label.as_str(),
            self.fields.daily_log.as_str(),
            self.fields.trades.as_str(),
            self.fields.holdings.as_str(),
            self.fields.considerations.as_str(),
            self.fields.interests.as_str(),
        ]
    }

    /// Case-insensitive substring match over the label and text fields.
    /// `needle` must already be lower-cased.
    pub fn matches(&self, needle: &str) -> bool {
        self.display_values()
            .iter()
            .any(|value| value.to_lowercase().contains(needle))
    }
}

/// How a write combines new values with an existing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Append to existing content, newline-joined per field. Repeating a merge
    /// with the same non-empty values appends them again.
    Merge,
    /// Replace the label and every text field. Idempotent.
    Overwrite,
}

impl WriteMode {
    /// Computes the stored value for a field given the previous value.
    pub fn combine(self, old: &str, new: &str) -> String {
        match self {
            WriteMode::Overwrite => new.to_string(),
            WriteMode::Merge => merge_text(old, new),
        }
    }
}

/// Newline-joins two field values, each trimmed. Whitespace-only sides count
/// as empty so the result never starts or ends with a stray newline.
pub fn merge_text(old: &str, new: &str) -> String {
    let old = old.trim();
    let new = new.trim();
    match (old.is_empty(), new.is_empty()) {
        (false, false) => format!("{old}\n{new}"),
        (false, true) => old.to_string(),
        (true, false) => new.to_string(),
        (true, true) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_joins_trimmed_sides_with_single_newline() {
        assert_eq!(merge_text("  A \n", "\tB  "), "A\nB");
    }

    #[test]
    fn merge_with_one_empty_side_has_no_newline() {
        assert_eq!(merge_text("A", ""), "A");
        assert_eq!(merge_text("", " B "), "B");
        assert_eq!(merge_text("   ", "B"), "B");
        assert_eq!(merge_text("", ""), "");
    }

    #[test]
    fn overwrite_ignores_previous_value() {
        assert_eq!(WriteMode::Overwrite.combine("old", " new "), " new ");
        assert_eq!(WriteMode::Overwrite.combine("old", ""), "");
    }

    #[test]
    fn entry_search_covers_label_and_fields() {
        let entry = Entry {
            date_iso: "2024-03-04".into(),
            date_label: "2024-03-04 (월)".into(),
            fields: EntryFields::default().with(TextField::Interests, "Watch FOOBAR"),
            updated_at: String::new(),
        };
        assert!(entry.matches("foo"));
        assert!(entry.matches("(월)"));
        assert!(!entry.matches("bar baz"));
    }
}
