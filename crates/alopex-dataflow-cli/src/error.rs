//! Error types for the alopex-dataflow CLI

use thiserror::Error;

/// CLI-specific error type.
#[derive(Error, Debug)]
pub enum CliError {
    /// An error from the dataflow engine.
    #[error("Dataflow error: {0}")]
    Dataflow(#[from] alopex_dataflow::DataflowError),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An invalid argument was provided.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    /// Whether the error is a write to a closed pipe (e.g. output piped to `head`).
    pub fn is_broken_pipe(&self) -> bool {
        let source = match self {
            CliError::Io(e) => e,
            CliError::Dataflow(alopex_dataflow::DataflowError::Io { source, .. }) => source,
            _ => return false,
        };
        source.kind() == std::io::ErrorKind::BrokenPipe
    }
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Print an error to stderr. Verbose mode uses the debug representation.
pub fn report_error(error: &CliError, verbose: bool) {
    if verbose {
        eprintln!("Error: {:?}", error);
    } else {
        eprintln!("Error: {}", error);
    }
}
