use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};

use crate::dailylog::tools::error::Result;
use crate::dailylog::tools::flatten::SheetTable;

const COLUMN_WIDTH: f64 = 40.0;
const DATE_COLUMN_WIDTH: f64 = 18.0;

/// Writes `table` as the only sheet of a new workbook at `path`, replacing
/// any existing file.
pub fn write_sheet(path: &Path, table: &SheetTable) -> Result<()> {
    let mut workbook_writer = Workbook::new();
    let header_format = Format::new().set_bold();
    let cell_format = Format::new().set_text_wrap();

    let worksheet = workbook_writer.add_worksheet();
    worksheet.set_name(&table.sheet_name)?;

    for (col_idx, header) in table.columns.iter().enumerate() {
        let width = if col_idx == 0 {
            DATE_COLUMN_WIDTH
        } else {
            COLUMN_WIDTH
        };
        worksheet.set_column_width(col_idx as u16, width)?;
        worksheet.write_string_with_format(0, col_idx as u16, header, &header_format)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            worksheet.write_string_with_format(
                (row_idx + 1) as u32,
                col_idx as u16,
                cell,
                &cell_format,
            )?;
        }
    }

    if !table.columns.is_empty() {
        let col_end = (table.columns.len() as u16).saturating_sub(1);
        worksheet.autofilter(0, 0, table.rows.len() as u32, col_end)?;
    }

    workbook_writer.save(path)?;
    Ok(())
}
