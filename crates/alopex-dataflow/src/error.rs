use std::path::PathBuf;

/// Errors returned by `alopex-dataflow` graph construction and execution.
#[derive(Debug, thiserror::Error)]
pub enum DataflowError {
    /// OS-level I/O error (optionally associated with a path).
    #[error("I/O error{path}: {source}", path = path_display(.path))]
    Io {
        source: std::io::Error,
        path: Option<PathBuf>,
    },

    /// A row could not be parsed from or written as JSON.
    #[error("json error{line}: {source}", line = line_display(.line))]
    Json {
        source: serde_json::Error,
        line: Option<usize>,
    },

    /// A stage or operator referenced a column that is absent from the row.
    #[error("column not found: {name}")]
    ColumnNotFound { name: String },

    /// Value type mismatch (e.g. summing a text column).
    #[error(
        "type mismatch{column}: expected {expected}, got {actual}",
        column = column_display(.column)
    )]
    TypeMismatch {
        column: Option<String>,
        expected: String,
        actual: String,
    },

    /// The graph reads an input slot that was not bound for this run.
    #[error("no row source bound for input '{name}'")]
    SourceNotFound { name: String },

    /// A user-supplied operator failed; the run is aborted.
    #[error("operator '{operator}' failed: {message}")]
    Operator { operator: String, message: String },

    /// Invalid configuration option was provided.
    #[error("invalid configuration option '{option}': {message}")]
    Configuration { option: String, message: String },
}

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, DataflowError>;

impl DataflowError {
    /// Create an I/O error without a path.
    pub fn io(source: std::io::Error) -> Self {
        Self::Io { source, path: None }
    }

    /// Create an I/O error associated with a path.
    pub fn io_with_path(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: Some(path.into()),
        }
    }

    /// Create a JSON error, optionally tagged with a 1-based line number.
    pub fn json(source: serde_json::Error, line: Option<usize>) -> Self {
        Self::Json { source, line }
    }

    /// Create a missing column error.
    pub fn column_not_found(name: impl Into<String>) -> Self {
        Self::ColumnNotFound { name: name.into() }
    }

    /// Create a type mismatch error with optional column context.
    pub fn type_mismatch(
        column: impl Into<Option<String>>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            column: column.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an unbound input slot error.
    pub fn source_not_found(name: impl Into<String>) -> Self {
        Self::SourceNotFound { name: name.into() }
    }

    /// Create a user operator failure.
    pub fn operator(operator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Operator {
            operator: operator.into(),
            message: message.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn configuration(option: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            option: option.into(),
            message: message.into(),
        }
    }
}

fn column_display(column: &Option<String>) -> String {
    column
        .as_ref()
        .map(|c| format!(" for column '{c}'"))
        .unwrap_or_default()
}

fn path_display(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" for path '{}'", p.display()))
        .unwrap_or_default()
}

fn line_display(line: &Option<usize>) -> String {
    line.map(|l| format!(" at line {l}")).unwrap_or_default()
}
