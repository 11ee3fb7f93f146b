//! Encode merged tables into a single output workbook
//!
//! The output is always the zip-based .xlsx container
//! (`application/vnd.openxmlformats-officedocument.spreadsheetml.sheet`),
//! built fully in memory.

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::merge::{CellValue, MergedTable};

/// Excel's limit on worksheet name length, in characters
pub const MAX_SHEET_NAME_CHARS: usize = 31;

/// Truncate an identity key to a legal worksheet name
///
/// Literal prefix cut on a character boundary. Collisions between keys that
/// only differ past the limit are not detected; the writer rejects the
/// duplicate name and the request fails.
pub fn sheet_name(key: &str) -> String {
    key.chars().take(MAX_SHEET_NAME_CHARS).collect()
}

/// Serialize merged tables into an in-memory workbook, one sheet per table
pub fn write_output(tables: &[MergedTable]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    for table in tables {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(sheet_name(&table.name))
            .with_context(|| format!("cannot use {:?} as an output sheet name", table.name))?;

        for (col, name) in table.columns.iter().enumerate() {
            worksheet.write_string(0, col as u16, name)?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            let row_num = (row_idx + 1) as u32;
            for (col_idx, value) in row.iter().enumerate() {
                write_value(worksheet, row_num, col_idx as u16, value)?;
            }
        }
    }

    workbook
        .save_to_buffer()
        .context("failed to serialize the output workbook")
}

fn write_value(ws: &mut Worksheet, row: u32, col: u16, value: &CellValue) -> Result<()> {
    match value {
        CellValue::Empty => { /* leave the cell empty */ }
        CellValue::String(s) => {
            ws.write_string(row, col, s)?;
        }
        CellValue::Int(i) => {
            ws.write_number(row, col, *i as f64)?;
        }
        CellValue::Float(f) => {
            ws.write_number(row, col, *f)?;
        }
        CellValue::Bool(b) => {
            ws.write_boolean(row, col, *b)?;
        }
        CellValue::DateTime(dt) => {
            ws.write_string(row, col, dt.to_string())?;
        }
        CellValue::Error(e) => {
            ws.write_string(row, col, e)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use calamine::Reader;

    fn merged(name: &str, columns: &[&str], rows: &[&[&str]]) -> MergedTable {
        MergedTable {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|v| CellValue::String(v.to_string()))
                        .collect()
                })
                .collect(),
        }
    }

    #[test]
    fn test_long_sheet_names_are_cut_to_31_chars() {
        let key = "a".repeat(40);
        let name = sheet_name(&key);
        assert_eq!(name.chars().count(), 31);
        assert_eq!(name, "a".repeat(31));
    }

    #[test]
    fn test_short_sheet_names_pass_through() {
        assert_eq!(sheet_name("Jan"), "Jan");
        assert_eq!(sheet_name(""), "");
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let key = "é".repeat(40);
        let name = sheet_name(&key);
        assert_eq!(name.chars().count(), 31);
        assert_eq!(name, "é".repeat(31));
    }

    #[test]
    fn test_one_sheet_per_table() {
        let bytes = write_output(&[
            merged("Jan", &["A"], &[&["a1"]]),
            merged("Feb", &["B"], &[&["b1"]]),
        ])
        .unwrap();

        let mut parsed = calamine::open_workbook_auto_from_rs(Cursor::new(bytes)).unwrap();
        assert_eq!(parsed.sheet_names(), vec!["Jan", "Feb"]);

        let feb = parsed.worksheet_range("Feb").unwrap();
        let rows: Vec<Vec<String>> = feb
            .rows()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect();
        assert_eq!(rows, vec![vec!["B"], vec!["b1"]]);
    }

    #[test]
    fn test_typed_cells_survive_serialization() {
        let table = MergedTable {
            name: "Mixed".to_string(),
            columns: vec!["V".to_string()],
            rows: vec![
                vec![CellValue::Int(7)],
                vec![CellValue::Float(2.5)],
                vec![CellValue::Bool(false)],
                vec![CellValue::Empty],
            ],
        };

        let bytes = write_output(&[table]).unwrap();
        let mut parsed = calamine::open_workbook_auto_from_rs(Cursor::new(bytes)).unwrap();
        let range = parsed.worksheet_range("Mixed").unwrap();

        assert_eq!(range.get_value((1, 0)), Some(&calamine::Data::Float(7.0)));
        assert_eq!(range.get_value((2, 0)), Some(&calamine::Data::Float(2.5)));
        assert_eq!(range.get_value((3, 0)), Some(&calamine::Data::Bool(false)));
    }

    #[test]
    fn test_colliding_truncated_names_fail_serialization() {
        let left = format!("{}-one", "x".repeat(31));
        let right = format!("{}-two", "x".repeat(31));
        let result = write_output(&[
            merged(&left, &["A"], &[]),
            merged(&right, &["A"], &[]),
        ]);
        assert!(result.is_err());
    }
}
