//! Shell state and key handling

use std::fs;
use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent};

use crate::merge::{self, FileError, MergeError, MergeInput, MergeOutcome};

use super::picker::FilePicker;

/// Launch options handed down from the command line
#[derive(Debug, Clone)]
pub struct Options {
    /// Files preloaded into the upload list
    pub preload: Vec<PathBuf>,
    /// Directory the merged workbook is saved into
    pub output_dir: PathBuf,
    /// Rows shown per merged sheet in the preview
    pub preview_rows: usize,
}

/// Which screen is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Picker,
    Results,
}

/// What the event loop should do after a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Outcome area of the results screen
pub enum RequestState {
    Done(MergeOutcome),
    Failed(MergeError),
}

pub struct App {
    pub options: Options,
    pub screen: Screen,
    pub picker: FilePicker,
    /// Upload list, in selection order
    pub selected: Vec<PathBuf>,
    /// Tab focus on the picker screen: browser or upload list
    pub list_focused: bool,
    pub list_cursor: usize,
    /// Typing goes to the picker filter while set (entered with '/')
    pub filter_active: bool,
    pub request: Option<RequestState>,
    /// Files the shell could not read before the engine ever saw them
    pub read_errors: Vec<FileError>,
    /// Active tab on the results screen
    pub active_table: usize,
    /// Transient one-line status message
    pub status: Option<String>,
}

impl App {
    pub fn new(options: Options) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            selected: options.preload.clone(),
            options,
            screen: Screen::Picker,
            picker: FilePicker::new(cwd),
            list_focused: false,
            list_cursor: 0,
            filter_active: false,
            request: None,
            read_errors: Vec::new(),
            active_table: 0,
            status: None,
        }
    }

    /// All per-file errors to display: shell-side read failures first, then
    /// whatever the engine reported
    pub fn file_errors(&self) -> Vec<&FileError> {
        let engine_errors = match &self.request {
            Some(RequestState::Done(outcome)) => outcome.file_errors.as_slice(),
            Some(RequestState::Failed(err)) => err.file_errors(),
            None => &[],
        };
        self.read_errors.iter().chain(engine_errors).collect()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        self.status = None;
        match self.screen {
            Screen::Picker => self.handle_picker_key(key),
            Screen::Results => self.handle_results_key(key),
        }
    }

    fn handle_picker_key(&mut self, key: KeyEvent) -> Flow {
        // filter editing captures plain typing until Enter/Esc
        if self.filter_active {
            match key.code {
                KeyCode::Char(c) => self.picker.push_filter(c),
                KeyCode::Backspace => {
                    self.picker.pop_filter();
                }
                KeyCode::Up => self.picker.move_up(),
                KeyCode::Down => self.picker.move_down(),
                KeyCode::Enter | KeyCode::Esc => self.filter_active = false,
                _ => {}
            }
            return Flow::Continue;
        }

        match key.code {
            KeyCode::Tab => {
                self.list_focused = !self.list_focused;
            }
            KeyCode::Up => {
                if self.list_focused {
                    self.list_cursor = self.list_cursor.saturating_sub(1);
                } else {
                    self.picker.move_up();
                }
            }
            KeyCode::Down => {
                if self.list_focused {
                    if self.list_cursor + 1 < self.selected.len() {
                        self.list_cursor += 1;
                    }
                } else {
                    self.picker.move_down();
                }
            }
            KeyCode::Enter => {
                if self.list_focused {
                    self.remove_selected(self.list_cursor);
                } else if let Some(path) = self.picker.activate() {
                    self.toggle(path);
                }
            }
            KeyCode::Backspace => {
                if !self.list_focused {
                    self.picker.backspace();
                }
            }
            KeyCode::Char('/') => {
                if !self.list_focused {
                    self.filter_active = true;
                }
            }
            KeyCode::Char('m') => {
                self.run_merge();
            }
            KeyCode::Char('q') | KeyCode::Esc => {
                return Flow::Exit;
            }
            _ => {}
        }
        Flow::Continue
    }

    fn handle_results_key(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Left => {
                self.active_table = self.active_table.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.active_table + 1 < self.table_count() {
                    self.active_table += 1;
                }
            }
            KeyCode::Char('s') => {
                self.save_output();
            }
            KeyCode::Char('r') => {
                self.reset();
            }
            KeyCode::Char('q') | KeyCode::Esc => {
                return Flow::Exit;
            }
            _ => {}
        }
        Flow::Continue
    }

    /// Add a file to the upload list, or drop it when already selected
    fn toggle(&mut self, path: PathBuf) {
        if let Some(pos) = self.selected.iter().position(|p| p == &path) {
            self.selected.remove(pos);
            self.status = Some(format!("removed {}", display_name(&path)));
        } else {
            self.status = Some(format!("added {}", display_name(&path)));
            self.selected.push(path);
        }
        self.clamp_list_cursor();
    }

    fn remove_selected(&mut self, index: usize) {
        if index < self.selected.len() {
            let path = self.selected.remove(index);
            self.status = Some(format!("removed {}", display_name(&path)));
            self.clamp_list_cursor();
        }
    }

    fn clamp_list_cursor(&mut self) {
        if self.list_cursor >= self.selected.len() {
            self.list_cursor = self.selected.len().saturating_sub(1);
        }
    }

    /// Read the selected files and run one merge request
    fn run_merge(&mut self) {
        if self.selected.is_empty() {
            self.status = Some("select at least one workbook first".to_string());
            return;
        }

        self.read_errors.clear();
        let mut inputs = Vec::with_capacity(self.selected.len());
        for path in &self.selected {
            let source_id = display_name(path);
            match fs::read(path) {
                Ok(bytes) => inputs.push(MergeInput::new(source_id, bytes)),
                Err(err) => {
                    log::warn!("cannot read {}: {}", path.display(), err);
                    self.read_errors
                        .push(FileError::new(source_id, format!("cannot read file: {}", err)));
                }
            }
        }

        self.request = Some(match merge::merge(inputs) {
            Ok(outcome) => RequestState::Done(outcome),
            Err(err) => RequestState::Failed(err),
        });
        self.active_table = 0;
        self.screen = Screen::Results;
    }

    /// Write the output blob under its fixed filename
    fn save_output(&mut self) {
        let Some(RequestState::Done(outcome)) = &self.request else {
            self.status = Some("nothing to save".to_string());
            return;
        };

        let path = self.options.output_dir.join(outcome.filename);
        match fs::write(&path, &outcome.output) {
            Ok(()) => {
                log::info!("saved {}", path.display());
                self.status = Some(format!("saved {}", path.display()));
            }
            Err(err) => {
                self.status = Some(format!("save failed: {}", err));
            }
        }
    }

    /// Discard all request state and re-arm the picker
    fn reset(&mut self) {
        self.selected.clear();
        self.read_errors.clear();
        self.request = None;
        self.active_table = 0;
        self.list_cursor = 0;
        self.list_focused = false;
        self.filter_active = false;
        self.status = None;
        self.screen = Screen::Picker;
        self.picker.refresh();
    }

    fn table_count(&self) -> usize {
        match &self.request {
            Some(RequestState::Done(outcome)) => outcome.tables.len(),
            _ => 0,
        }
    }
}

/// Filename component of a path, for display and as the source id
pub fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::merge::MergedTable;

    fn app() -> App {
        App::new(Options {
            preload: Vec::new(),
            output_dir: PathBuf::from("."),
            preview_rows: 5,
        })
    }

    fn fake_outcome() -> MergeOutcome {
        MergeOutcome {
            tables: vec![MergedTable {
                name: "Jan".to_string(),
                columns: vec!["A".to_string()],
                rows: Vec::new(),
            }],
            output: vec![1, 2, 3],
            filename: crate::merge::MULTI_SHEET_FILENAME,
            file_errors: Vec::new(),
        }
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut app = app();
        app.toggle(PathBuf::from("/tmp/a.xlsx"));
        assert_eq!(app.selected.len(), 1);
        app.toggle(PathBuf::from("/tmp/a.xlsx"));
        assert!(app.selected.is_empty());
    }

    #[test]
    fn test_reset_discards_request_state() {
        let mut app = app();
        app.selected.push(PathBuf::from("/tmp/a.xlsx"));
        app.request = Some(RequestState::Done(fake_outcome()));
        app.screen = Screen::Results;
        app.active_table = 1;

        app.reset();

        assert!(app.selected.is_empty());
        assert!(app.request.is_none());
        assert_eq!(app.active_table, 0);
        assert_eq!(app.screen, Screen::Picker);
    }

    #[test]
    fn test_merge_without_selection_stays_on_picker() {
        let mut app = app();
        app.run_merge();
        assert_eq!(app.screen, Screen::Picker);
        assert!(app.request.is_none());
        assert!(app.status.is_some());
    }

    #[test]
    fn test_unreadable_files_become_read_errors() {
        let mut app = app();
        app.selected.push(PathBuf::from("/nonexistent/a.xlsx"));
        app.run_merge();

        assert_eq!(app.read_errors.len(), 1);
        assert_eq!(app.read_errors[0].source_id, "a.xlsx");
        // the engine saw no inputs at all
        assert!(matches!(
            app.request,
            Some(RequestState::Failed(MergeError::NoMergeableData { .. }))
        ));
        assert_eq!(app.file_errors().len(), 1);
    }

    #[test]
    fn test_display_name_prefers_file_name() {
        assert_eq!(display_name(std::path::Path::new("/tmp/a.xlsx")), "a.xlsx");
    }
}
