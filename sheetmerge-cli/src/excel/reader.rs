//! Decode workbook blobs into the engine's table model

use std::io::Cursor;

use anyhow::{Context, Result, bail};
use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};

use crate::merge::{CellValue, Table, Workbook};

/// Decode one uploaded workbook from raw bytes
///
/// Container detection (legacy .xls vs zip-based .xlsx) is calamine's; the
/// source id labels errors and the resulting workbook. A workbook without a
/// single sheet is rejected here so the engine never sees one.
pub fn read_workbook(source_id: &str, bytes: &[u8]) -> Result<Workbook> {
    let mut reader = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .with_context(|| format!("failed to open {} as a workbook", source_id))?;

    let sheet_names = reader.sheet_names();
    if sheet_names.is_empty() {
        bail!("{} contains no sheets", source_id);
    }

    let mut tables = Vec::with_capacity(sheet_names.len());
    for name in sheet_names {
        let range = reader
            .worksheet_range(&name)
            .with_context(|| format!("failed to read sheet {:?} of {}", name, source_id))?;
        tables.push(table_from_range(name, &range));
    }

    Ok(Workbook {
        source_id: source_id.to_string(),
        tables,
    })
}

/// First row of the used range is the header; everything below is data
fn table_from_range(name: String, range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let columns = match rows.next() {
        Some(header) => header.iter().map(header_name).collect(),
        None => Vec::new(),
    };
    let rows = rows
        .map(|row| row.iter().map(cell_value).collect())
        .collect();

    Table {
        name,
        columns,
        rows,
    }
}

fn header_name(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => naive.to_string(),
            None => dt.as_f64().to_string(),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
        Data::Empty => String::new(),
    }
}

/// Total conversion: no cell value can fail the sheet
fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => CellValue::DateTime(naive),
            // out-of-range serial dates keep their raw serial number
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}
