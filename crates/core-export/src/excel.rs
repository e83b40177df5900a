use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::Workbook;
use serde_json::Value;
use snafu::ResultExt;

use core_schema::StatusTable;

use crate::error::{self, Result};

/// Name of the raw-values sheet paired with a formulas sheet.
#[must_use]
pub fn values_sheet_name(sheet_name: &str) -> String {
    format!("{sheet_name}_values")
}

/// Write the table as a two-sheet workbook: `<sheet>_values` holds raw cell
/// values, and the main sheet mirrors it cell-by-cell with cross-sheet
/// formulas (the layout the browser table and its lookup formulas expect).
/// Columns whose name contains `legend` are presentation-only and dropped.
/// Returns the number of data rows written.
pub fn write_excel(table: &StatusTable, path: &Path, sheet_name: &str) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context(error::CreateDirectorySnafu {
            path: parent.display().to_string(),
        })?;
    }
    let display = path.display().to_string();

    let kept: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, name)| !name.to_lowercase().contains("legend"))
        .map(|(index, _)| index)
        .collect();
    let values_sheet = values_sheet_name(sheet_name);

    let mut workbook = Workbook::new();

    let main = workbook.add_worksheet();
    main.set_name(sheet_name)
        .context(error::WriteExcelSnafu { path: display.clone() })?;
    for (out_col, &col) in kept.iter().enumerate() {
        let out_col = out_col as u16;
        main.write_string(0, out_col, &table.columns()[col])
            .context(error::WriteExcelSnafu { path: display.clone() })?;
        for row in 0..table.len() {
            let cell = cell_reference(&values_sheet, row as u32 + 1, out_col);
            main.write_formula(row as u32 + 1, out_col, cell.as_str())
                .context(error::WriteExcelSnafu { path: display.clone() })?;
        }
    }

    let values = workbook.add_worksheet();
    values
        .set_name(&values_sheet)
        .context(error::WriteExcelSnafu { path: display.clone() })?;
    for (out_col, &col) in kept.iter().enumerate() {
        let out_col = out_col as u16;
        values
            .write_string(0, out_col, &table.columns()[col])
            .context(error::WriteExcelSnafu { path: display.clone() })?;
        for (out_row, row) in table.rows().iter().enumerate() {
            let out_row = out_row as u32 + 1;
            match &row[col] {
                Value::Null => {}
                Value::Bool(b) => {
                    values
                        .write_boolean(out_row, out_col, *b)
                        .context(error::WriteExcelSnafu { path: display.clone() })?;
                }
                Value::Number(n) => {
                    values
                        .write_number(out_row, out_col, n.as_f64().unwrap_or(0.0))
                        .context(error::WriteExcelSnafu { path: display.clone() })?;
                }
                Value::String(s) => {
                    values
                        .write_string(out_row, out_col, s)
                        .context(error::WriteExcelSnafu { path: display.clone() })?;
                }
                other => {
                    values
                        .write_string(out_row, out_col, other.to_string())
                        .context(error::WriteExcelSnafu { path: display.clone() })?;
                }
            }
        }
    }

    workbook
        .save(path)
        .context(error::WriteExcelSnafu { path: display })?;
    Ok(table.len())
}

/// Read one sheet (header row + records) back into a table. The update path
/// reads the raw-values sheet; formula sheets written by us carry no cached
/// results, so they are not readable this way.
pub fn read_excel(path: &Path, sheet_name: &str) -> Result<StatusTable> {
    let display = path.display().to_string();
    let mut workbook: Xlsx<_> = open_workbook(path).context(error::ReadExcelSnafu {
        path: display.clone(),
    })?;
    let range = workbook
        .worksheet_range(sheet_name)
        .context(error::ReadExcelSnafu {
            path: display.clone(),
        })?;

    let mut rows = range.rows();
    let header = rows.next().ok_or_else(|| {
        error::EmptySheetSnafu {
            path: display.clone(),
            sheet: sheet_name.to_string(),
        }
        .build()
    })?;
    let columns: Vec<String> = header.iter().map(header_name).collect();

    let mut table = StatusTable::new(columns);
    for row in rows {
        table.push_row(row.iter().map(cell_to_value).collect());
    }
    Ok(table)
}

fn header_name(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Bool(b) => Value::Bool(*b),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => {
            // Excel hands integers back as floats; keep them integral.
            if f.fract() == 0.0 && f.abs() < 9e15 {
                Value::from(*f as i64)
            } else {
                Value::from(*f)
            }
        }
        Data::DateTime(dt) => dt.as_datetime().map_or(Value::Null, |naive| {
            Value::String(naive.format("%Y-%m-%dT%H:%M:%S").to_string())
        }),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
        Data::Error(e) => {
            tracing::warn!(cell_error = ?e, "excel error cell read as null");
            Value::Null
        }
    }
}

/// `A1`-style cross-sheet reference, quoted so sheet names with spaces work.
fn cell_reference(sheet: &str, row: u32, col: u16) -> String {
    format!("='{sheet}'!{}{}", column_letters(col), row + 1)
}

fn column_letters(mut col: u16) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_table() -> StatusTable {
        StatusTable::from_records(&json!([
            {"HUC8 ID": "07080101", "Area Name": "Turkey", "FRP % Complete": 40,
             "FRP_Perc_Complete_Legend": "green"},
            {"HUC8 ID": "07060004", "Area Name": "Maquoketa", "FRP % Complete": 12.5,
             "FRP_Perc_Complete_Legend": "red"}
        ]))
        .unwrap()
    }

    #[test]
    fn column_letters_cover_two_letter_range() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
    }

    #[test]
    fn write_then_read_values_sheet_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IA_BLE_Tracking.xlsx");
        let rows = write_excel(&sample_table(), &path, "Tracking_Main").unwrap();
        assert_eq!(rows, 2);

        let table = read_excel(&path, &values_sheet_name("Tracking_Main")).unwrap();
        // legend column dropped on write
        assert_eq!(table.columns(), ["HUC8 ID", "Area Name", "FRP % Complete"]);
        assert_eq!(table.cell(0, "HUC8 ID"), Some(&json!("07080101")));
        assert_eq!(table.cell(0, "FRP % Complete"), Some(&json!(40)));
        assert_eq!(table.cell(1, "FRP % Complete"), Some(&json!(12.5)));
    }

    #[test]
    fn read_missing_sheet_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IA_BLE_Tracking.xlsx");
        write_excel(&sample_table(), &path, "Tracking_Main").unwrap();
        assert!(read_excel(&path, "NoSuchSheet").is_err());
    }
}
