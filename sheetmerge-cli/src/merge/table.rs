//! Table model shared by the merge engine and the Excel boundary

use chrono::NaiveDateTime;

/// A single cell value as decoded from a workbook
///
/// The engine never interprets cell contents; values pass through from the
/// reader to the writer unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Empty cell
    #[default]
    Empty,
    /// String value
    String(String),
    /// Whole number
    Int(i64),
    /// Floating point
    Float(f64),
    /// Boolean
    Bool(bool),
    /// Date and time (workbook cells carry no timezone)
    DateTime(NaiveDateTime),
    /// Error text carried over from the source cell (e.g. "#DIV/0!")
    Error(String),
}

impl CellValue {
    /// Check if this cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::String(s) => write!(f, "{}", s),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(fl) => write!(f, "{}", fl),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::DateTime(dt) => write!(f, "{}", dt),
            CellValue::Error(e) => write!(f, "{}", e),
        }
    }
}

/// One sheet's grid within a workbook
///
/// The first row of the sheet is the header; `columns` holds its cells
/// stringified. Data rows may be shorter than the header (trailing cells
/// missing in the source); the concatenation step fills those with empties.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Sheet name as it appeared in the source workbook
    pub name: String,
    /// Header row: column names in sheet order, not guaranteed unique
    pub columns: Vec<String>,
    /// Data rows below the header
    pub rows: Vec<Vec<CellValue>>,
}

/// One uploaded workbook after decoding
#[derive(Debug, Clone)]
pub struct Workbook {
    /// Original filename, used as the source identifier
    pub source_id: String,
    /// Sheets in workbook order, never empty
    pub tables: Vec<Table>,
}

/// The row-concatenated result of one merge group
#[derive(Debug, Clone, PartialEq)]
pub struct MergedTable {
    /// Identity key the group was merged under; becomes the output sheet name
    pub name: String,
    /// Ordered union of the group's column names
    pub columns: Vec<String>,
    /// All rows of the group, aligned to `columns`
    pub rows: Vec<Vec<CellValue>>,
}

impl MergedTable {
    /// First `n` rows, for preview display
    pub fn preview(&self, n: usize) -> &[Vec<CellValue>] {
        &self.rows[..self.rows.len().min(n)]
    }
}
