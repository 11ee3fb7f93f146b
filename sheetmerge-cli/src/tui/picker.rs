//! Filesystem picker with fuzzy filtering

use std::fs;
use std::path::{Path, PathBuf};

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

/// Extensions accepted as workbooks
const WORKBOOK_EXTENSIONS: [&str; 2] = ["xls", "xlsx"];

/// Check whether a path looks like a workbook we can read
pub fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| WORKBOOK_EXTENSIONS.iter().any(|w| e.eq_ignore_ascii_case(w)))
        .unwrap_or(false)
}

/// One visible entry in the browser
#[derive(Debug, Clone)]
pub struct Entry {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
    /// File size in bytes; zero for directories
    pub size: u64,
}

/// Browser state: current directory, filter line, cursor
pub struct FilePicker {
    pub cwd: PathBuf,
    pub filter: String,
    pub cursor: usize,
    entries: Vec<Entry>,
    visible: Vec<Entry>,
}

impl FilePicker {
    pub fn new(cwd: PathBuf) -> Self {
        let mut picker = Self {
            cwd,
            filter: String::new(),
            cursor: 0,
            entries: Vec::new(),
            visible: Vec::new(),
        };
        picker.refresh();
        picker
    }

    /// Entries currently shown, after filtering
    pub fn visible(&self) -> &[Entry] {
        &self.visible
    }

    /// Re-read the current directory
    pub fn refresh(&mut self) {
        self.entries = read_entries(&self.cwd);
        self.apply_filter();
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.visible.len() {
            self.cursor += 1;
        }
    }

    /// Append a character to the filter line
    pub fn push_filter(&mut self, c: char) {
        self.filter.push(c);
        self.apply_filter();
    }

    /// Pop a filter character; true when something was removed
    pub fn pop_filter(&mut self) -> bool {
        if self.filter.pop().is_some() {
            self.apply_filter();
            true
        } else {
            false
        }
    }

    /// Pop a filter character, or ascend when the filter is already empty
    pub fn backspace(&mut self) {
        if !self.pop_filter() {
            self.ascend();
        }
    }

    /// Move to the parent directory
    pub fn ascend(&mut self) {
        if let Some(parent) = self.cwd.parent() {
            self.cwd = parent.to_path_buf();
            self.filter.clear();
            self.refresh();
        }
    }

    /// Enter on the cursor entry: descend into a directory, or yield a file
    pub fn activate(&mut self) -> Option<PathBuf> {
        let entry = self.visible.get(self.cursor)?.clone();
        if entry.is_dir {
            self.cwd = entry.path;
            self.filter.clear();
            self.refresh();
            None
        } else {
            Some(entry.path)
        }
    }

    /// Narrow `visible` to fuzzy matches of the filter, best score first
    fn apply_filter(&mut self) {
        if self.filter.is_empty() {
            self.visible = self.entries.clone();
        } else {
            let matcher = SkimMatcherV2::default();
            let mut scored: Vec<(Entry, i64)> = self
                .entries
                .iter()
                .filter_map(|entry| {
                    matcher
                        .fuzzy_match(&entry.name, &self.filter)
                        .map(|score| (entry.clone(), score))
                })
                .collect();
            scored.sort_by(|a, b| b.1.cmp(&a.1));
            self.visible = scored.into_iter().map(|(entry, _)| entry).collect();
        }

        if self.cursor >= self.visible.len() {
            self.cursor = self.visible.len().saturating_sub(1);
        }
    }
}

/// Directories first, then workbook files, both in name order; hidden
/// entries and non-workbook files are skipped
fn read_entries(dir: &Path) -> Vec<Entry> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();

    if let Ok(read_dir) = fs::read_dir(dir) {
        for entry in read_dir.flatten() {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            match entry.metadata() {
                Ok(meta) if meta.is_dir() => dirs.push(Entry {
                    path,
                    name,
                    is_dir: true,
                    size: 0,
                }),
                Ok(meta) if is_workbook(&path) => files.push(Entry {
                    path,
                    name,
                    is_dir: false,
                    size: meta.len(),
                }),
                _ => {}
            }
        }
    } else {
        log::warn!("cannot read directory {}", dir.display());
    }

    dirs.sort_by(|a, b| a.name.cmp(&b.name));
    files.sort_by(|a, b| a.name.cmp(&b.name));

    let mut entries = dirs;
    entries.extend(files);
    entries
}
