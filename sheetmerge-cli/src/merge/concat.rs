//! Row concatenation with explicit column union

use super::classify::{MergeGroup, POOL_SHEET_NAME, SourcedTable};
use super::table::{CellValue, MergedTable, Table};

/// Header of the synthetic source column appended to pool merges
pub const SOURCE_COLUMN: &str = "SourceFile";

/// Ordered union of column names, first-seen across the group
fn column_union<'a>(tables: impl Iterator<Item = &'a Table>) -> Vec<String> {
    let mut union: Vec<String> = Vec::new();
    for table in tables {
        for col in &table.columns {
            if !union.contains(col) {
                union.push(col.clone());
            }
        }
    }
    union
}

/// Reindex one table's rows against the union, inserting empties
///
/// When a table repeats a column name, the first occurrence supplies the
/// value for that name.
fn reindex(table: &Table, union: &[String]) -> Vec<Vec<CellValue>> {
    let positions: Vec<Option<usize>> = union
        .iter()
        .map(|name| table.columns.iter().position(|c| c == name))
        .collect();

    table
        .rows
        .iter()
        .map(|row| {
            positions
                .iter()
                .map(|pos| {
                    pos.and_then(|i| row.get(i))
                        .cloned()
                        .unwrap_or(CellValue::Empty)
                })
                .collect()
        })
        .collect()
}

/// Concatenate one same-named sheet group
///
/// Rows keep group order: workbook upload order, then intra-workbook table
/// order, then original row order. No deduplication, no sorting.
pub fn concat_group(group: &MergeGroup) -> MergedTable {
    let columns = column_union(group.tables.iter());
    let mut rows = Vec::new();
    for table in &group.tables {
        rows.extend(reindex(table, &columns));
    }
    MergedTable {
        name: group.key.clone(),
        columns,
        rows,
    }
}

/// Concatenate the lone-table pool, tagging each row with its source file
pub fn concat_pool(pool: &[SourcedTable]) -> MergedTable {
    let mut columns = column_union(pool.iter().map(|s| &s.table));
    let mut rows = Vec::new();
    for entry in pool {
        for mut row in reindex(&entry.table, &columns) {
            row.push(CellValue::String(entry.source_id.clone()));
            rows.push(row);
        }
    }
    columns.push(SOURCE_COLUMN.to_string());
    MergedTable {
        name: POOL_SHEET_NAME.to_string(),
        columns,
        rows,
    }
}
