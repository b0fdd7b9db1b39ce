//! Spreadsheet column naming: the fixed header set written on export, the
//! alias table accepted on import, and header-row detection over a grid of
//! already-read cells.

use crate::dailylog::tools::model::TextField;

/// Default number of leading rows searched for a header row.
pub const DEFAULT_HEADER_SCAN_ROWS: usize = 15;

/// The six spreadsheet columns, in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Date,
    DailyLog,
    Trades,
    Holdings,
    Considerations,
    Interests,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Date,
        Column::DailyLog,
        Column::Trades,
        Column::Holdings,
        Column::Considerations,
        Column::Interests,
    ];

    /// Header text written on export.
    pub fn display_name(self) -> &'static str {
        match self {
            Column::Date => "날짜",
            Column::DailyLog => "Daily Log",
            Column::Trades => "주식 거래내역",
            Column::Holdings => "남은 주식 수(증권사별)",
            Column::Considerations => "주식 고려사항",
            Column::Interests => "관심 주",
        }
    }

    /// Alternative spellings accepted on import besides the display name.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::Date => &["date"],
            Column::DailyLog => &["daily_log"],
            Column::Trades => &["주식거래내역", "trades"],
            Column::Holdings => &["holdings"],
            Column::Considerations => &["considerations"],
            Column::Interests => &["관심주", "interests"],
        }
    }

    /// Text field stored under this column, `None` for the date column.
    pub fn text_field(self) -> Option<TextField> {
        match self {
            Column::Date => None,
            Column::DailyLog => Some(TextField::DailyLog),
            Column::Trades => Some(TextField::Trades),
            Column::Holdings => Some(TextField::Holdings),
            Column::Considerations => Some(TextField::Considerations),
            Column::Interests => Some(TextField::Interests),
        }
    }

    /// Resolves a raw header cell to a column.
    pub fn from_header(header: &str) -> Option<Column> {
        let key = canonicalize(header);
        if key.is_empty() {
            return None;
        }
        Column::ALL.into_iter().find(|column| {
            canonicalize(column.display_name()) == key
                || column
                    .aliases()
                    .iter()
                    .any(|alias| canonicalize(alias) == key)
        })
    }
}

/// Reduces a header to its comparison key: full-width parentheses become
/// ASCII, all whitespace (including non-breaking spaces) is removed, and the
/// result is lower-cased.
pub fn canonicalize(header: &str) -> String {
    header
        .chars()
        .filter_map(|ch| match ch {
            '（' => Some('('),
            '）' => Some(')'),
            '\u{00a0}' => None,
            ch if ch.is_whitespace() => None,
            ch => Some(ch),
        })
        .collect::<String>()
        .to_lowercase()
}

/// Column positions resolved from a header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    positions: [Option<usize>; 6],
}

impl ColumnMap {
    /// Maps each known column to the first cell naming it. Unknown headers
    /// are ignored.
    pub fn from_header_row(row: &[String]) -> Self {
        let mut positions = [None; 6];
        for (index, cell) in row.iter().enumerate() {
            if let Some(column) = Column::from_header(cell) {
                let slot = &mut positions[column as usize];
                if slot.is_none() {
                    *slot = Some(index);
                }
            }
        }
        Self { positions }
    }

    pub fn position(&self, column: Column) -> Option<usize> {
        self.positions[column as usize]
    }

    pub fn contains(&self, column: Column) -> bool {
        self.position(column).is_some()
    }

    /// Number of known columns present.
    pub fn hits(&self) -> usize {
        self.positions.iter().filter(|slot| slot.is_some()).count()
    }

    /// Reads `column` from a data row. Absent columns and short rows yield
    /// the empty string.
    pub fn cell<'a>(&self, row: &'a [String], column: Column) -> &'a str {
        self.position(column)
            .and_then(|index| row.get(index))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// A header row located in a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMatch {
    /// Zero-based index of the header row; data starts on the next row.
    pub row: usize,
    pub columns: ColumnMap,
}

/// Finds the header row of a sheet.
///
/// Row 0 is accepted outright when it names both the date and daily-log
/// columns. Otherwise the first `scan_rows` rows are scored by how many known
/// columns they name, considering only rows that include the date column; the
/// earliest row with the highest score wins.
pub fn locate_header(grid: &[Vec<String>], scan_rows: usize) -> Option<HeaderMatch> {
    if let Some(first) = grid.first() {
        let columns = ColumnMap::from_header_row(first);
        if columns.contains(Column::Date) && columns.contains(Column::DailyLog) {
            return Some(HeaderMatch { row: 0, columns });
        }
    }

    let mut best: Option<HeaderMatch> = None;
    for (row, cells) in grid.iter().enumerate().take(scan_rows) {
        let columns = ColumnMap::from_header_row(cells);
        if !columns.contains(Column::Date) {
            continue;
        }
        let better = best
            .as_ref()
            .is_none_or(|current| columns.hits() > current.columns.hits());
        if better {
            best = Some(HeaderMatch { row, columns });
        }
    }
    best
}
