//! Error taxonomy for the merge engine

/// A per-file failure: the workbook was skipped, the request continues
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    /// Source identifier of the offending file
    pub source_id: String,
    /// Human-readable reason
    pub message: String,
}

impl FileError {
    pub fn new(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.source_id, self.message)
    }
}

/// A request-terminal failure; no output workbook was produced
#[derive(Debug)]
pub enum MergeError {
    /// After classification there was nothing to merge
    NoMergeableData {
        /// Files skipped during parsing
        file_errors: Vec<FileError>,
    },
    /// Concatenation or serialization raised an unexpected condition
    Serialize {
        message: String,
        /// Files skipped during parsing, before the failure
        file_errors: Vec<FileError>,
    },
}

impl MergeError {
    /// Per-file errors accumulated before the request failed
    pub fn file_errors(&self) -> &[FileError] {
        match self {
            MergeError::NoMergeableData { file_errors } => file_errors,
            MergeError::Serialize { file_errors, .. } => file_errors,
        }
    }
}

impl std::fmt::Display for MergeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeError::NoMergeableData { .. } => {
                write!(f, "no mergeable data found in the uploaded workbooks")
            }
            MergeError::Serialize { message, .. } => {
                write!(f, "failed to merge sheets: {}", message)
            }
        }
    }
}

impl std::error::Error for MergeError {}
