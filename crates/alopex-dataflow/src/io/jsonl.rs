use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::{Path, PathBuf};

use crate::config::JsonLinesOptions;
use crate::{DataflowError, Result, Row};

/// Parse one JSON object into a [`Row`].
pub fn parse_row(line: &str) -> Result<Row> {
    serde_json::from_str(line).map_err(|e| DataflowError::json(e, None))
}

/// Open a JSON-lines file for lazy reading using default `JsonLinesOptions`.
pub fn read_jsonl(path: impl AsRef<Path>) -> Result<JsonLines> {
    read_jsonl_with_options(path, &JsonLinesOptions::default())
}

/// Open a JSON-lines file for lazy reading using the provided options.
///
/// The file is opened immediately; rows are parsed one line at a time as the
/// returned iterator is pulled.
pub fn read_jsonl_with_options(
    path: impl AsRef<Path>,
    options: &JsonLinesOptions,
) -> Result<JsonLines> {
    options.validate()?;

    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DataflowError::io_with_path(source, path))?;
    Ok(JsonLines {
        lines: BufReader::with_capacity(options.buffer_capacity, file).lines(),
        path: path.to_path_buf(),
        line: 0,
        skip_blank_lines: options.skip_blank_lines,
        failed: false,
    })
}

/// A source factory that re-opens `path` on every call, for use with
/// [`Sources::with_source`](crate::Sources::with_source).
pub fn jsonl_source(path: impl Into<PathBuf>) -> impl Fn() -> Result<JsonLines> {
    let path = path.into();
    move || read_jsonl(&path)
}

/// Lazy iterator over the rows of a JSON-lines file.
///
/// Stops after the first I/O or parse error.
#[derive(Debug)]
pub struct JsonLines {
    lines: Lines<BufReader<File>>,
    path: PathBuf,
    line: usize,
    skip_blank_lines: bool,
    failed: bool,
}

impl Iterator for JsonLines {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(source) => {
                    self.failed = true;
                    return Some(Err(DataflowError::io_with_path(source, &self.path)));
                }
            };
            self.line += 1;
            if self.skip_blank_lines && text.trim().is_empty() {
                continue;
            }
            let row = serde_json::from_str(&text).map_err(|e| DataflowError::json(e, Some(self.line)));
            if row.is_err() {
                self.failed = true;
            }
            return Some(row);
        }
    }
}

/// Write rows to a file as JSON lines, replacing any existing content.
pub fn write_jsonl(path: impl AsRef<Path>, rows: &[Row]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| DataflowError::io_with_path(source, path))?;
    write_jsonl_to(BufWriter::new(file), rows.iter().cloned().map(Ok))?;
    Ok(())
}

/// Write a row stream to `writer` as JSON lines, returning the number of rows
/// written. The first error (from the stream or the writer) aborts.
pub fn write_jsonl_to<W, I>(mut writer: W, rows: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = Result<Row>>,
{
    let mut written = 0;
    for row in rows {
        serde_json::to_writer(&mut writer, &row?).map_err(|e| {
            if e.is_io() {
                DataflowError::io(e.into())
            } else {
                DataflowError::json(e, None)
            }
        })?;
        writer.write_all(b"\n").map_err(DataflowError::io)?;
        written += 1;
    }
    writer.flush().map_err(DataflowError::io)?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::{parse_row, read_jsonl, read_jsonl_with_options, write_jsonl_to};
    use crate::config::JsonLinesOptions;
    use crate::{row, DataflowError, Result, Value};

    #[test]
    fn parse_row_accepts_objects_only() {
        let row = parse_row(r#"{"a": 1, "b": [1.5, "x"], "c": null}"#).unwrap();
        assert_eq!(row.get("a").unwrap(), &Value::Int(1));
        assert_eq!(
            row.get("b").unwrap(),
            &Value::List(vec![Value::Float(1.5), Value::from("x")])
        );
        assert!(row.get("c").unwrap().is_null());
        assert!(matches!(parse_row("[1, 2]"), Err(DataflowError::Json { .. })));
    }

    #[test]
    fn blank_lines_are_skipped_and_errors_carry_line_numbers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"n": 1}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"n": 2}}"#).unwrap();
        writeln!(file, "not json").unwrap();
        writeln!(file, r#"{{"n": 3}}"#).unwrap();
        file.flush().unwrap();

        let mut rows = read_jsonl(file.path()).unwrap();
        assert_eq!(rows.next().unwrap().unwrap(), row! { "n" => 1 });
        assert_eq!(rows.next().unwrap().unwrap(), row! { "n" => 2 });
        let err = rows.next().unwrap().unwrap_err();
        assert!(matches!(err, DataflowError::Json { line: Some(4), .. }));
        assert!(rows.next().is_none());
    }

    #[test]
    fn blank_lines_can_be_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file).unwrap();
        file.flush().unwrap();

        let options = JsonLinesOptions::default().with_skip_blank_lines(false);
        let rows = read_jsonl_with_options(file.path(), &options)
            .unwrap()
            .collect::<Result<Vec<_>>>();
        assert!(rows.is_err());

        let options = JsonLinesOptions::default().with_buffer_capacity(0);
        assert!(matches!(
            read_jsonl_with_options(file.path(), &options),
            Err(DataflowError::Configuration { .. })
        ));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = read_jsonl("/definitely/not/here.jsonl").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.jsonl"));
    }

    #[test]
    fn write_counts_rows() {
        let mut buf = Vec::new();
        let n = write_jsonl_to(&mut buf, vec![Ok(row! { "a" => 1 }), Ok(row! { "b" => "x" })]).unwrap();
        assert_eq!(n, 2);
        assert_eq!(String::from_utf8(buf).unwrap(), "{\"a\":1}\n{\"b\":\"x\"}\n");
    }
}
