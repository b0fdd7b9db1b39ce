use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, instrument};

use crate::dailylog::tools::date::{DateNormalizer, WeekdayNames};
use crate::dailylog::tools::error::{Result, ToolError};
use crate::dailylog::tools::model::{Entry, EntryFields, TextField, WriteMode};

const SCHEMA_SQL: &str = include_str!("schema.sql");

const SELECT_ENTRY: &str = "SELECT date_iso, COALESCE(date_label, ''), COALESCE(daily_log, ''),
        COALESCE(trades, ''), COALESCE(holdings, ''), COALESCE(considerations, ''),
        COALESCE(interests, ''), COALESCE(updated_at, '')
     FROM entries";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Single-table SQLite store holding one [`Entry`] per date.
///
/// The connection is opened in [`EntryStore::open`] and closed when the store
/// is dropped. Only one process is expected to hold the file at a time.
///
/// Date labels are never taken from callers: every write recomputes the label
/// from `date_iso` with the store's weekday names.
#[derive(Debug)]
pub struct EntryStore {
    conn: Connection,
    db_path: Option<PathBuf>,
    normalizer: DateNormalizer,
}

impl EntryStore {
    /// Opens (creating if needed) the store at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn,
            db_path: Some(path.to_path_buf()),
            normalizer: DateNormalizer::default(),
        };
        store.initialize()?;
        debug!(path = %path.display(), "opened entry store");
        Ok(store)
    }

    /// Opens a throwaway store that lives only as long as the value.
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
            db_path: None,
            normalizer: DateNormalizer::default(),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Uses `weekdays` for the labels of subsequent writes. Korean by default.
    pub fn with_weekday_names(mut self, weekdays: WeekdayNames) -> Self {
        self.normalizer = DateNormalizer::new(weekdays);
        self
    }

    /// Creates the `entries` table when missing. Never drops or alters data.
    pub fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    /// Backing file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// All entries, newest date first. A non-blank `search` keeps only entries
    /// whose label or text fields contain it, ignoring case.
    pub fn get_all(&self, search: Option<&str>) -> Result<Vec<Entry>> {
        let mut statement = self
            .conn
            .prepare(&format!("{SELECT_ENTRY} ORDER BY date_iso DESC"))?;
        let rows = statement.query_map([], parse_entry_row)?;

        let needle = search
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_lowercase);

        let mut result = Vec::new();
        for row in rows {
            let entry = row?;
            match &needle {
                Some(needle) if !entry.matches(needle) => {}
                _ => result.push(entry),
            }
        }
        Ok(result)
    }

    /// The entry stored under `date_iso`, or `None` when there is none.
    pub fn get_by_date(&self, date_iso: &str) -> Result<Option<Entry>> {
        let entry = self
            .conn
            .query_row(
                &format!("{SELECT_ENTRY} WHERE date_iso = ?1"),
                [date_iso],
                parse_entry_row,
            )
            .optional()?;
        Ok(entry)
    }

    /// Every date that has an entry, ascending.
    pub fn get_all_dates(&self) -> Result<Vec<String>> {
        let mut statement = self
            .conn
            .prepare("SELECT date_iso FROM entries ORDER BY date_iso ASC")?;
        let rows = statement.query_map([], |row| row.get::<_, String>(0))?;
        let mut dates = Vec::new();
        for row in rows {
            dates.push(row?);
        }
        Ok(dates)
    }

    /// Number of stored entries.
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Writes `values` for `date_iso` according to `mode`.
    ///
    /// `date_iso` must be a canonical `YYYY-MM-DD` date, otherwise
    /// [`ToolError::InvalidDate`] is returned and nothing is written. The label
    /// is recomputed from it on every write. A missing entry is inserted with
    /// `values` as given in either mode. For an existing entry each text field
    /// is combined with [`WriteMode::combine`].
    #[instrument(level = "debug", skip_all, fields(date = %date_iso, ?mode))]
    pub fn write(&self, date_iso: &str, values: &EntryFields, mode: WriteMode) -> Result<Entry> {
        let date = self
            .normalizer
            .parse_iso(date_iso)
            .ok_or_else(|| ToolError::InvalidDate(date_iso.to_string()))?;

        let fields = match self.get_by_date(date_iso)? {
            Some(existing) => {
                let mut merged = EntryFields::default();
                for field in TextField::ALL {
                    merged.set(
                        field,
                        mode.combine(existing.fields.get(field), values.get(field)),
                    );
                }
                merged
            }
            None => values.clone(),
        };

        let updated_at = Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.conn.execute(
            "INSERT INTO entries (
               date_iso, date_label, daily_log, trades, holdings, considerations, interests, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(date_iso) DO UPDATE SET
               date_label = excluded.date_label,
               daily_log = excluded.daily_log,
               trades = excluded.trades,
               holdings = excluded.holdings,
               considerations = excluded.considerations,
               interests = excluded.interests,
               updated_at = excluded.updated_at",
            params![
                date.iso,
                date.label,
                fields.daily_log,
                fields.trades,
                fields.holdings,
                fields.considerations,
                fields.interests,
                updated_at,
            ],
        )?;
        debug!("entry written");

        Ok(Entry {
            date_iso: date.iso,
            date_label: date.label,
            fields,
            updated_at,
        })
    }

    /// Appends `values` to the entry for `date_iso`, creating it if needed.
    ///
    /// This accumulates: merging the same non-empty text twice stores it twice.
    /// Merging all-empty values only trims what is already stored.
    pub fn upsert_merge(&self, date_iso: &str, values: &EntryFields) -> Result<Entry> {
        self.write(date_iso, values, WriteMode::Merge)
    }

    /// Replaces all text fields for `date_iso`.
    pub fn overwrite(&self, date_iso: &str, values: &EntryFields) -> Result<Entry> {
        self.write(date_iso, values, WriteMode::Overwrite)
    }

    /// Removes the entry for `date_iso`. Returns whether a row existed.
    pub fn delete(&self, date_iso: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM entries WHERE date_iso = ?1", [date_iso])?;
        Ok(removed > 0)
    }

    /// Removes every entry, returning how many were deleted.
    pub fn wipe_all(&self) -> Result<usize> {
        let removed = self.conn.execute("DELETE FROM entries", [])?;
        debug!(removed, "store wiped");
        Ok(removed)
    }
}

fn parse_entry_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Entry> {
    Ok(Entry {
        date_iso: row.get(0)?,
        date_label: row.get(1)?,
        fields: EntryFields {
            daily_log: row.get(2)?,
            trades: row.get(3)?,
            holdings: row.get(4)?,
            considerations: row.get(5)?,
            interests: row.get(6)?,
        },
        updated_at: row.get(7)?,
    })
}
