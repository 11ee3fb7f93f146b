//! Workbook classification and the merge-branch decision

use std::collections::HashMap;

use super::table::{Table, Workbook};

/// Fixed output sheet name for the lone-table pool merge
pub const POOL_SHEET_NAME: &str = "MergedSheet";

/// A table tagged with the workbook it came from
#[derive(Debug, Clone)]
pub struct SourcedTable {
    pub source_id: String,
    pub table: Table,
}

/// All tables sharing one identity key, in arrival order
#[derive(Debug, Clone)]
pub struct MergeGroup {
    /// The shared sheet name, compared exactly and case-sensitively
    pub key: String,
    pub tables: Vec<Table>,
}

/// Result of classifying every successfully parsed workbook
///
/// Each workbook lands in exactly one bucket: its tables join the sheet-name
/// groups when it has more than one sheet, or its single table joins the
/// lone-table pool. Groups are kept in first-seen key order, the pool in
/// upload order.
#[derive(Debug, Default)]
pub struct Classification {
    groups: Vec<MergeGroup>,
    index: HashMap<String, usize>,
    pool: Vec<SourcedTable>,
}

impl Classification {
    /// Classify one parsed workbook
    ///
    /// The reader rejects workbooks with zero sheets, so `tables` is never
    /// empty here.
    pub fn add(&mut self, mut workbook: Workbook) {
        debug_assert!(!workbook.tables.is_empty());

        if workbook.tables.len() == 1 {
            if let Some(table) = workbook.tables.pop() {
                log::debug!("{}: single sheet {:?}, pooled", workbook.source_id, table.name);
                self.pool.push(SourcedTable {
                    source_id: workbook.source_id,
                    table,
                });
            }
            return;
        }

        for table in workbook.tables {
            match self.index.get(&table.name) {
                Some(&i) => self.groups[i].tables.push(table),
                None => {
                    self.index.insert(table.name.clone(), self.groups.len());
                    self.groups.push(MergeGroup {
                        key: table.name.clone(),
                        tables: vec![table],
                    });
                }
            }
        }
    }

    /// The single branch-decision point: sheet-name groups win over the
    /// lone-table pool, and an empty request has no plan.
    ///
    /// When any multi-sheet workbook was supplied, the pool is dropped even
    /// if non-empty. Changing that policy only touches this function.
    pub fn plan(self) -> Option<MergePlan> {
        if !self.groups.is_empty() {
            if !self.pool.is_empty() {
                log::debug!(
                    "dropping lone-table pool of {} workbook(s) in favor of {} sheet-name group(s)",
                    self.pool.len(),
                    self.groups.len()
                );
            }
            Some(MergePlan::BySheetName(self.groups))
        } else if !self.pool.is_empty() {
            Some(MergePlan::LoneTablePool(self.pool))
        } else {
            None
        }
    }
}

/// Which merge branch a request takes
#[derive(Debug)]
pub enum MergePlan {
    /// One merged table per same-named sheet group
    BySheetName(Vec<MergeGroup>),
    /// One merged table from all single-sheet workbooks
    LoneTablePool(Vec<SourcedTable>),
}
