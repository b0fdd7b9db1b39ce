use crate::dailylog::tools::columns::Column;
use crate::dailylog::tools::model::Entry;

/// Sheet name used when none is configured.
pub const DEFAULT_SHEET_NAME: &str = "Daily Log-From July 21";

/// A table that will be materialised as an Excel sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Flattens entries into the six-column export layout, keeping the order in
/// which they are given.
pub fn build_sheet(entries: &[Entry], sheet_name: &str) -> SheetTable {
    let columns = Column::ALL
        .iter()
        .map(|column| column.display_name().to_string())
        .collect();

    let rows = entries
        .iter()
        .map(|entry| {
            entry
                .display_values()
                .iter()
                .map(|value| value.to_string())
                .collect()
        })
        .collect();

    SheetTable {
        sheet_name: sanitize_sheet_name(sheet_name),
        columns,
        rows,
    }
}

fn sanitize_sheet_name(raw: &str) -> String {
    let invalid = [':', '\\', '/', '?', '*', '[', ']'];
    let mut sanitized: String = raw
        .chars()
        .map(|ch| {
            if invalid.contains(&ch) || ch.is_control() {
                '_'
            } else {
                ch
            }
        })
        .collect();

    sanitized = sanitized.trim().trim_matches('\'').to_string();
    if sanitized.is_empty() {
        sanitized = DEFAULT_SHEET_NAME.to_string();
    }

    if sanitized.chars().count() > 31 {
        sanitized = sanitized.chars().take(31).collect();
    }

    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dailylog::tools::model::{EntryFields, TextField};

    #[test]
    fn rows_follow_column_order() {
        let entry = Entry {
            date_iso: "2024-03-04".into(),
            date_label: "2024-03-04 (월)".into(),
            fields: EntryFields::default()
                .with(TextField::DailyLog, "walk")
                .with(TextField::Interests, "AAPL"),
            updated_at: "2024-03-04 10:00:00".into(),
        };
        let table = build_sheet(&[entry], DEFAULT_SHEET_NAME);
        assert_eq!(table.columns[0], "날짜");
        assert_eq!(table.columns.len(), 6);
        assert_eq!(
            table.rows,
            vec![vec![
                "2024-03-04 (월)".to_string(),
                "walk".to_string(),
                String::new(),
                String::new(),
                String::new(),
                "AAPL".to_string(),
            ]]
        );
    }

    #[test]
    fn sheet_names_are_made_valid() {
        assert_eq!(sanitize_sheet_name("a/b:c"), "a_b_c");
        assert_eq!(sanitize_sheet_name("  "), DEFAULT_SHEET_NAME);
        assert_eq!(sanitize_sheet_name(&"가".repeat(40)).chars().count(), 31);
        assert_eq!(sanitize_sheet_name(DEFAULT_SHEET_NAME), DEFAULT_SHEET_NAME);
    }
}
