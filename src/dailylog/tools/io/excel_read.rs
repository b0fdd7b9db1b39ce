use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use chrono::{NaiveDate, TimeDelta};
use tracing::warn;

use crate::dailylog::tools::error::{Result, ToolError};

/// Cell text of one worksheet, row-major. Rows keep their sheet order and
/// every cell is rendered as a string; blank cells are empty strings.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetGrid {
    /// Name of the sheet that was actually read.
    pub sheet_name: String,
    pub rows: Vec<Vec<String>>,
}

/// Reads `preferred_sheet` from the workbook at `path`, or the first sheet
/// when the workbook has no sheet by that name.
pub fn read_grid(path: &Path, preferred_sheet: &str) -> Result<SheetGrid> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let sheet_name = if workbook.sheet_names().iter().any(|name| name == preferred_sheet) {
        preferred_sheet.to_string()
    } else {
        let first = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ToolError::InvalidWorkbook("workbook has no sheets".into()))?;
        warn!(
            expected = preferred_sheet,
            found = %first,
            "sheet not found, reading first sheet instead"
        );
        first
    };

    let range = read_required_sheet(&mut workbook, &sheet_name)?;
    let rows = range
        .rows()
        .map(|row| row.iter().map(|cell| cell_to_string(Some(cell))).collect())
        .collect();

    Ok(SheetGrid { sheet_name, rows })
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<calamine::Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| ToolError::InvalidWorkbook(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(ToolError::from)?;
    Ok(range)
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => decode_ooxml_escapes(value),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::DateTime(serial)) => excel_serial_to_string(*serial),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Undoes the `_xHHHH_` escapes OOXML uses for characters that cannot appear
/// raw in shared strings (`\r`, control characters, and a literal `_x` run,
/// which is written as `_x005F_`). Unknown or malformed sequences are kept.
fn decode_ooxml_escapes(value: &str) -> String {
    if !value.contains("_x") {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("_x") {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];
        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.bytes().all(|byte| byte.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);
        match decoded {
            Some(ch) => {
                out.push(ch);
                rest = &candidate[7..];
            }
            None => {
                out.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Renders an Excel serial date (days since 1899-12-30) as `YYYY-MM-DD`,
/// adding `HH:MM:SS` when the serial carries a time of day. Serials outside
/// chrono's date range are rendered as the plain number.
fn excel_serial_to_string(serial: f64) -> String {
    let Some(epoch) = NaiveDate::from_ymd_opt(1899, 12, 30) else {
        return serial.to_string();
    };
    if !serial.is_finite() {
        return serial.to_string();
    }
    let days = serial.floor();
    let seconds = ((serial - days) * 86_400.0).round() as i64;
    let Some(date) = TimeDelta::try_days(days as i64)
        .and_then(|offset| epoch.checked_add_signed(offset))
    else {
        return serial.to_string();
    };
    if seconds == 0 {
        return date.format("%Y-%m-%d").to_string();
    }
    let timestamp = date.and_hms_opt(0, 0, 0).and_then(|midnight| {
        TimeDelta::try_seconds(seconds).and_then(|offset| midnight.checked_add_signed(offset))
    });
    match timestamp {
        Some(timestamp) => timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => date.format("%Y-%m-%d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_dates_render_as_iso() {
        assert_eq!(excel_serial_to_string(45_355.0), "2024-03-04");
        assert_eq!(excel_serial_to_string(45_355.5), "2024-03-04 12:00:00");
    }

    #[test]
    fn out_of_range_serials_render_as_numbers() {
        assert_eq!(excel_serial_to_string(1e300), 1e300_f64.to_string());
        assert_eq!(excel_serial_to_string(-1e300), (-1e300_f64).to_string());
        assert_eq!(excel_serial_to_string(f64::NAN), "NaN");
        assert_eq!(excel_serial_to_string(f64::INFINITY), "inf");
        assert_eq!(
            cell_to_string(Some(&DataType::DateTime(1e300))),
            1e300_f64.to_string()
        );
    }

    #[test]
    fn ooxml_escapes_are_decoded() {
        assert_eq!(decode_ooxml_escapes("a_x000D_\nb"), "a\r\nb");
        assert_eq!(decode_ooxml_escapes("lit _x005F_x000D_ end"), "lit _x000D_ end");
        assert_eq!(decode_ooxml_escapes("ctl_x0001_x"), "ctl\u{1}x");
        assert_eq!(
            cell_to_string(Some(&DataType::String("_x0009_tab".into()))),
            "\ttab"
        );
    }

    #[test]
    fn malformed_escapes_are_kept() {
        for text in ["_x", "_x12", "_x00zz_", "_x0041", "snake_x_case", "_xD800_"] {
            assert_eq!(decode_ooxml_escapes(text), text, "text {text:?}");
        }
        assert_eq!(decode_ooxml_escapes("__x0041_"), "_A");
    }

    #[test]
    fn cells_render_as_text() {
        assert_eq!(cell_to_string(Some(&DataType::Float(3.0))), "3");
        assert_eq!(cell_to_string(Some(&DataType::Int(7))), "7");
        assert_eq!(cell_to_string(Some(&DataType::Empty)), "");
        assert_eq!(cell_to_string(None), "");
    }
}
