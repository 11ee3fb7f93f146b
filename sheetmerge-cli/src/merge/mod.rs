//! Sheet-wise workbook merging
//!
//! One request takes a set of named workbook blobs and produces a single
//! output workbook. Sheets that share a name across multi-sheet workbooks
//! are concatenated row-wise into one output sheet each; when only
//! single-sheet workbooks are supplied, all of them concatenate into one
//! pooled sheet with a column recording each row's source file. The engine
//! is stateless: every call builds its state fresh and discards it.

mod classify;
mod concat;
mod error;
mod table;

pub use classify::POOL_SHEET_NAME;
pub use concat::SOURCE_COLUMN;
pub use error::{FileError, MergeError};
pub use table::{CellValue, MergedTable, Table, Workbook};

use classify::{Classification, MergePlan};

use crate::excel;

/// Fixed download filename for the sheet-name branch
pub const MULTI_SHEET_FILENAME: &str = "merged_sheets.xlsx";
/// Fixed download filename for the lone-table-pool branch
pub const SINGLE_SHEET_FILENAME: &str = "merged_single_sheet.xlsx";

/// One input to a merge request: original filename plus raw workbook bytes
#[derive(Debug, Clone)]
pub struct MergeInput {
    pub source_id: String,
    pub bytes: Vec<u8>,
}

impl MergeInput {
    pub fn new(source_id: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            source_id: source_id.into(),
            bytes,
        }
    }
}

/// Result of a successful merge request
#[derive(Debug)]
pub struct MergeOutcome {
    /// Merged tables in output-sheet order, for preview display
    pub tables: Vec<MergedTable>,
    /// Serialized output workbook
    pub output: Vec<u8>,
    /// Fixed filename the output should be saved under
    pub filename: &'static str,
    /// Files skipped during parsing
    pub file_errors: Vec<FileError>,
}

/// Merge the supplied workbooks sheet-wise
///
/// A file that fails to decode is skipped and reported in the outcome's
/// `file_errors`; it never aborts the request. The request as a whole fails
/// only when nothing mergeable remains or the output cannot be serialized.
pub fn merge(inputs: Vec<MergeInput>) -> Result<MergeOutcome, MergeError> {
    let mut file_errors = Vec::new();
    let mut classification = Classification::default();

    for input in inputs {
        match excel::read_workbook(&input.source_id, &input.bytes) {
            Ok(workbook) => classification.add(workbook),
            Err(err) => {
                log::warn!("skipping {}: {:#}", input.source_id, err);
                file_errors.push(FileError::new(input.source_id, format!("{:#}", err)));
            }
        }
    }

    let plan = match classification.plan() {
        Some(plan) => plan,
        None => return Err(MergeError::NoMergeableData { file_errors }),
    };

    let (tables, filename) = match plan {
        MergePlan::BySheetName(groups) => {
            log::debug!("merging {} sheet-name group(s)", groups.len());
            let tables: Vec<MergedTable> = groups.iter().map(concat::concat_group).collect();
            (tables, MULTI_SHEET_FILENAME)
        }
        MergePlan::LoneTablePool(pool) => {
            log::debug!("merging lone-table pool of {} workbook(s)", pool.len());
            (vec![concat::concat_pool(&pool)], SINGLE_SHEET_FILENAME)
        }
    };

    let output = match excel::write_output(&tables) {
        Ok(bytes) => bytes,
        Err(err) => {
            return Err(MergeError::Serialize {
                message: format!("{:#}", err),
                file_errors,
            });
        }
    };

    log::info!(
        "merged {} sheet(s) into {} ({} bytes)",
        tables.len(),
        filename,
        output.len()
    );

    Ok(MergeOutcome {
        tables,
        output,
        filename,
        file_errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use calamine::Reader;

    /// Build workbook bytes with one sheet per (name, rows) entry; the first
    /// row of each sheet is its header.
    fn workbook_bytes(sheets: &[(&str, &[&[&str]])]) -> Vec<u8> {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        for (name, rows) in sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(*name).unwrap();
            for (r, row) in rows.iter().enumerate() {
                for (c, value) in row.iter().enumerate() {
                    worksheet.write_string(r as u32, c as u16, *value).unwrap();
                }
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    fn input(source_id: &str, sheets: &[(&str, &[&[&str]])]) -> MergeInput {
        MergeInput::new(source_id, workbook_bytes(sheets))
    }

    fn column(table: &MergedTable, name: &str) -> usize {
        table
            .columns
            .iter()
            .position(|c| c == name)
            .unwrap_or_else(|| panic!("no column {:?} in {:?}", name, table.columns))
    }

    #[test]
    fn test_merges_same_named_sheets_across_files() {
        let outcome = merge(vec![
            input(
                "a.xlsx",
                &[
                    ("Jan", &[&["Name", "Amount"], &["alice", "1"]]),
                    ("Feb", &[&["Name", "Amount"], &["bob", "2"]]),
                ],
            ),
            input(
                "b.xlsx",
                &[
                    ("Jan", &[&["Name", "Amount"], &["carol", "3"]]),
                    ("Feb", &[&["Name", "Amount"], &["dave", "4"]]),
                ],
            ),
        ])
        .unwrap();

        assert_eq!(outcome.filename, MULTI_SHEET_FILENAME);
        assert!(outcome.file_errors.is_empty());
        assert_eq!(outcome.tables.len(), 2);

        let jan = &outcome.tables[0];
        assert_eq!(jan.name, "Jan");
        assert_eq!(jan.columns, vec!["Name", "Amount"]);
        let names: Vec<String> = jan.rows.iter().map(|r| r[0].to_string()).collect();
        assert_eq!(names, vec!["alice", "carol"]);

        // no synthetic source column on the sheet-name branch
        assert!(!jan.columns.iter().any(|c| c == SOURCE_COLUMN));
    }

    #[test]
    fn test_single_sheet_files_merge_into_pool() {
        let outcome = merge(vec![
            input("c.xlsx", &[("Sheet1", &[&["X", "Y"], &["x1", "y1"]])]),
            input("d.xlsx", &[("Totals", &[&["Y", "Z"], &["y2", "z2"]])]),
        ])
        .unwrap();

        assert_eq!(outcome.filename, SINGLE_SHEET_FILENAME);
        assert_eq!(outcome.tables.len(), 1);

        let pooled = &outcome.tables[0];
        assert_eq!(pooled.name, POOL_SHEET_NAME);
        assert_eq!(pooled.columns, vec!["X", "Y", "Z", SOURCE_COLUMN]);

        let source = column(pooled, SOURCE_COLUMN);
        assert_eq!(pooled.rows[0][source].to_string(), "c.xlsx");
        assert_eq!(pooled.rows[1][source].to_string(), "d.xlsx");

        // column union fills the gaps with empties
        let z = column(pooled, "Z");
        assert!(pooled.rows[0][z].is_empty());
        let x = column(pooled, "X");
        assert!(pooled.rows[1][x].is_empty());
    }

    #[test]
    fn test_multi_sheet_workbook_suppresses_the_pool() {
        let outcome = merge(vec![
            input("solo.xlsx", &[("Data", &[&["A"], &["a1"]])]),
            input(
                "multi.xlsx",
                &[
                    ("Jan", &[&["A"], &["j1"]]),
                    ("Feb", &[&["A"], &["f1"]]),
                ],
            ),
        ])
        .unwrap();

        assert_eq!(outcome.filename, MULTI_SHEET_FILENAME);
        let names: Vec<&str> = outcome.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Jan", "Feb"]);
        assert!(outcome.tables.iter().all(|t| t.rows.len() == 1));
    }

    #[test]
    fn test_corrupt_file_is_skipped_and_reported() {
        let outcome = merge(vec![
            input("a.xlsx", &[("Jan", &[&["A"], &["a1"]]), ("Feb", &[&["A"], &["f1"]])]),
            MergeInput::new("broken.xlsx", b"this is not a workbook".to_vec()),
            input("b.xlsx", &[("Jan", &[&["A"], &["a2"]]), ("Feb", &[&["A"], &["f2"]])]),
        ])
        .unwrap();

        assert_eq!(outcome.file_errors.len(), 1);
        assert_eq!(outcome.file_errors[0].source_id, "broken.xlsx");

        let jan = &outcome.tables[0];
        assert_eq!(jan.rows.len(), 2);
    }

    #[test]
    fn test_no_inputs_is_no_mergeable_data() {
        match merge(Vec::new()) {
            Err(MergeError::NoMergeableData { file_errors }) => {
                assert!(file_errors.is_empty());
            }
            other => panic!("expected NoMergeableData, got {:?}", other),
        }
    }

    #[test]
    fn test_all_inputs_invalid_is_no_mergeable_data() {
        let result = merge(vec![
            MergeInput::new("one.xlsx", b"garbage".to_vec()),
            MergeInput::new("two.xlsx", Vec::new()),
        ]);

        match result {
            Err(MergeError::NoMergeableData { file_errors }) => {
                let names: Vec<&str> =
                    file_errors.iter().map(|e| e.source_id.as_str()).collect();
                assert_eq!(names, vec!["one.xlsx", "two.xlsx"]);
            }
            other => panic!("expected NoMergeableData, got {:?}", other),
        }
    }

    #[test]
    fn test_output_workbook_roundtrips() {
        let outcome = merge(vec![
            input("a.xlsx", &[("Jan", &[&["A"], &["a1"]]), ("Feb", &[&["B"], &["b1"]])]),
            input("b.xlsx", &[("Jan", &[&["A"], &["a2"]]), ("Feb", &[&["B"], &["b2"]])]),
        ])
        .unwrap();

        let mut parsed =
            calamine::open_workbook_auto_from_rs(Cursor::new(outcome.output)).unwrap();
        assert_eq!(parsed.sheet_names(), vec!["Jan", "Feb"]);

        let jan = parsed.worksheet_range("Jan").unwrap();
        let rows: Vec<Vec<String>> = jan
            .rows()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect();
        assert_eq!(rows, vec![vec!["A"], vec!["a1"], vec!["a2"]]);
    }
}
