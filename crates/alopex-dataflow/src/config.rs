use std::path::PathBuf;

use crate::{DataflowError, Result};

/// Options for a Sort stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortOptions {
    /// Spill a sorted run to disk whenever this many rows are buffered.
    ///
    /// `None` keeps the whole input in memory.
    pub max_in_memory_rows: Option<usize>,
    /// Directory for spill files (defaults to the OS temp dir).
    pub spill_dir: Option<PathBuf>,
}

impl SortOptions {
    /// Set `max_in_memory_rows`.
    pub fn with_max_in_memory_rows(mut self, rows: usize) -> Self {
        self.max_in_memory_rows = Some(rows);
        self
    }

    /// Set `spill_dir`.
    pub fn with_spill_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.spill_dir = Some(dir.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_in_memory_rows == Some(0) {
            return Err(DataflowError::configuration(
                "max_in_memory_rows",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Options for reading line-delimited JSON rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonLinesOptions {
    /// Ignore lines that are empty or whitespace only.
    pub skip_blank_lines: bool,
    /// Capacity of the buffered reader, in bytes.
    pub buffer_capacity: usize,
}

impl Default for JsonLinesOptions {
    fn default() -> Self {
        Self {
            skip_blank_lines: true,
            buffer_capacity: 64 * 1024,
        }
    }
}

impl JsonLinesOptions {
    /// Set `skip_blank_lines`.
    pub fn with_skip_blank_lines(mut self, skip: bool) -> Self {
        self.skip_blank_lines = skip;
        self
    }

    /// Set `buffer_capacity`.
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.buffer_capacity == 0 {
            return Err(DataflowError::configuration(
                "buffer_capacity",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}
