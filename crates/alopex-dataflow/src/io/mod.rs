mod jsonl;

/// JSON-lines row I/O helpers.
pub use jsonl::{
    jsonl_source, parse_row, read_jsonl, read_jsonl_with_options, write_jsonl, write_jsonl_to,
    JsonLines,
};
