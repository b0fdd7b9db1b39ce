//! Exchange between the entry store and `.xlsx` files.
//!
//! Export writes every entry to a single named sheet. Import is a full
//! replace: the sheet's header row is located first, and only then is the
//! store wiped and rebuilt row by row with overwrite writes.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, info, instrument, warn};

use crate::dailylog::tools::columns::{Column, ColumnMap, locate_header};
use crate::dailylog::tools::config::SheetSettings;
use crate::dailylog::tools::error::{Result, ToolError};
use crate::dailylog::tools::flatten::build_sheet;
use crate::dailylog::tools::io::{excel_read, excel_write};
use crate::dailylog::tools::model::EntryFields;
use crate::dailylog::tools::store::EntryStore;

const BACKUP_PREFIX: &str = "Daily_Log_backup_";

/// Outcome of [`SpreadsheetReconciler::import_replace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    /// Data rows written to the store.
    pub rows_imported: usize,
    /// Zero-based header row within the sheet's used range.
    pub header_row: usize,
    /// Sheet the rows were read from.
    pub sheet_name: String,
    /// Backup written before the import, if any.
    pub backup_path: Option<PathBuf>,
    /// Why the backup could not be written. The import still ran.
    pub backup_warning: Option<String>,
}

/// Moves entries between an [`EntryStore`] and `.xlsx` files using one set of
/// [`SheetSettings`].
pub struct SpreadsheetReconciler<'a> {
    store: &'a EntryStore,
    settings: &'a SheetSettings,
}

impl<'a> SpreadsheetReconciler<'a> {
    /// Borrows `store` for the lifetime of the reconciler. Nothing is read or
    /// written until [`Self::export`] or [`Self::import_replace`] is called.
    pub fn new(store: &'a EntryStore, settings: &'a SheetSettings) -> Self {
        Self { store, settings }
    }

    /// Writes all entries, newest first, to `output`. Returns the row count.
    #[instrument(level = "info", skip_all, fields(output = %output.display()))]
    pub fn export(&self, output: &Path) -> Result<usize> {
        let entries = self.store.get_all(None)?;
        let table = build_sheet(&entries, &self.settings.sheet_name);
        debug!(sheet = %table.sheet_name, "sheet constructed");
        excel_write::write_sheet(output, &table)?;
        info!(row_count = entries.len(), "exported entries");
        Ok(entries.len())
    }

    /// Replaces the whole store with the rows of `input`.
    ///
    /// The store is only wiped once a header row has been found, so a
    /// [`ToolError::HeaderNotFound`] leaves it untouched. Rows are then written
    /// one at a time without a surrounding transaction: if a later row fails,
    /// the rows before it stay in the store.
    #[instrument(level = "info", skip_all, fields(input = %input.display()))]
    pub fn import_replace(&self, input: &Path) -> Result<ImportReport> {
        if !input.exists() {
            return Err(ToolError::MissingInput(input.to_path_buf()));
        }

        let (backup_path, backup_warning) = if self.settings.backup_on_import {
            match self.backup(input) {
                Ok(path) => (Some(path), None),
                Err(error) => {
                    warn!(%error, "backup failed, continuing with import");
                    (None, Some(error.to_string()))
                }
            }
        } else {
            (None, None)
        };

        let grid = excel_read::read_grid(input, &self.settings.sheet_name)?;
        let header = locate_header(&grid.rows, self.settings.header_scan_rows).ok_or_else(|| {
            ToolError::HeaderNotFound {
                sheet: grid.sheet_name.clone(),
                scanned: grid.rows.len().min(self.settings.header_scan_rows),
            }
        })?;
        debug!(
            header_row = header.row,
            matched_columns = header.columns.hits(),
            "header row located"
        );

        let removed = self.store.wipe_all()?;
        debug!(removed, "store cleared for import");

        let normalizer = self.settings.normalizer();
        let mut rows_imported = 0;
        for row in grid.rows.iter().skip(header.row + 1) {
            if row.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            let date = normalizer.normalize(header.columns.cell(row, Column::Date));
            let values = row_fields(&header.columns, row);
            self.store.overwrite(&date.iso, &values)?;
            rows_imported += 1;
        }

        info!(
            row_count = rows_imported,
            sheet = %grid.sheet_name,
            "imported entries"
        );

        Ok(ImportReport {
            rows_imported,
            header_row: header.row,
            sheet_name: grid.sheet_name,
            backup_path,
            backup_warning,
        })
    }

    /// Exports the current store under a timestamped name, into the
    /// configured backup directory or else next to `input`.
    fn backup(&self, input: &Path) -> Result<PathBuf> {
        let directory = match (&self.settings.backup_dir, input.parent()) {
            (Some(dir), _) => dir.clone(),
            (None, Some(parent)) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            (None, _) => std::env::current_dir()?,
        };
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = directory.join(format!("{BACKUP_PREFIX}{stamp}.xlsx"));
        let rows = self.export(&path)?;
        info!(path = %path.display(), row_count = rows, "backup written");
        Ok(path)
    }
}

/// Reads the five text fields of a data row. Columns missing from the header
/// read as empty.
fn row_fields(columns: &ColumnMap, row: &[String]) -> EntryFields {
    let mut values = EntryFields::default();
    for column in Column::ALL {
        if let Some(field) = column.text_field() {
            values.set(field, columns.cell(row, column));
        }
    }
    values
}
