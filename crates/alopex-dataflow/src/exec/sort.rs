use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Seek, SeekFrom, Write};

use crate::config::SortOptions;
use crate::exec::RowStream;
use crate::{DataflowError, Result, Row, Value};

type Keyed = (Vec<Value>, Row);

/// Sort a row stream by the key tuple (ascending, stable).
///
/// Consumes the whole input before returning. With `max_in_memory_rows` set,
/// full buffers are sorted and written to anonymous temp files, then merged.
pub(crate) fn sort_rows<I>(input: I, keys: &[String], options: &SortOptions) -> Result<SortedRows>
where
    I: Iterator<Item = Result<Row>>,
{
    options.validate()?;

    // Keys are projected once per row instead of on every comparison.
    let mut buffer: Vec<Keyed> = Vec::new();
    let mut runs = Vec::new();
    for row in input {
        let row = row?;
        let key = row.project(keys)?;
        buffer.push((key, row));
        if let Some(limit) = options.max_in_memory_rows {
            if buffer.len() >= limit {
                runs.push(RunSource::Spilled(spill(&mut buffer, options)?));
            }
        }
    }
    sort_buffer(&mut buffer);

    if runs.is_empty() {
        return Ok(SortedRows::Memory(buffer.into_iter()));
    }

    runs.push(RunSource::Memory(buffer.into_iter()));
    tracing::debug!(runs = runs.len(), "merging sorted runs");
    Ok(SortedRows::Merged(RunMerge::new(runs, keys.to_vec())?))
}

fn sort_buffer(buffer: &mut [Keyed]) {
    buffer.sort_by(|a, b| a.0.cmp(&b.0));
}

fn spill(buffer: &mut Vec<Keyed>, options: &SortOptions) -> Result<SpillRun> {
    sort_buffer(buffer);

    let file = match &options.spill_dir {
        Some(dir) => tempfile::tempfile_in(dir).map_err(|e| DataflowError::io_with_path(e, dir))?,
        None => tempfile::tempfile().map_err(DataflowError::io)?,
    };

    let rows = buffer.len();
    let mut writer = BufWriter::new(file);
    for (_, row) in buffer.drain(..) {
        serde_json::to_writer(&mut writer, &row).map_err(|e| DataflowError::json(e, None))?;
        writer.write_all(b"\n").map_err(DataflowError::io)?;
    }
    let mut file = writer
        .into_inner()
        .map_err(|e| DataflowError::io(e.into_error()))?;
    file.seek(SeekFrom::Start(0)).map_err(DataflowError::io)?;

    tracing::debug!(rows, "spilled sorted run");
    Ok(SpillRun {
        lines: BufReader::new(file).lines(),
        line: 0,
    })
}

/// Output of [`sort_rows`].
pub(crate) enum SortedRows {
    Memory(std::vec::IntoIter<Keyed>),
    Merged(RunMerge),
}

impl Iterator for SortedRows {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            SortedRows::Memory(rows) => rows.next().map(|(_, row)| Ok(row)),
            SortedRows::Merged(merge) => merge.next(),
        }
    }
}

struct SpillRun {
    lines: Lines<BufReader<File>>,
    line: usize,
}

enum RunSource {
    Spilled(SpillRun),
    Memory(std::vec::IntoIter<Keyed>),
}

impl RunSource {
    fn next_entry(&mut self, keys: &[String]) -> Option<Result<Keyed>> {
        match self {
            RunSource::Memory(rows) => rows.next().map(Ok),
            RunSource::Spilled(run) => {
                let line = match run.lines.next()? {
                    Ok(line) => line,
                    Err(e) => return Some(Err(DataflowError::io(e))),
                };
                run.line += 1;
                let row: Row = match serde_json::from_str(&line) {
                    Ok(row) => row,
                    Err(e) => return Some(Err(DataflowError::json(e, Some(run.line)))),
                };
                Some(row.project(keys).map(|key| (key, row)))
            }
        }
    }
}

/// Head of one run inside the merge heap. Ties on the key go to the earlier run,
/// which keeps the merge stable.
struct HeapEntry {
    key: Vec<Value>,
    run: usize,
    row: Row,
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| self.run.cmp(&other.run))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

/// K-way merge over sorted runs.
pub(crate) struct RunMerge {
    runs: Vec<RunSource>,
    heap: BinaryHeap<Reverse<HeapEntry>>,
    keys: Vec<String>,
    failed: bool,
}

impl RunMerge {
    fn new(mut runs: Vec<RunSource>, keys: Vec<String>) -> Result<Self> {
        let mut heap = BinaryHeap::with_capacity(runs.len());
        for (run, source) in runs.iter_mut().enumerate() {
            if let Some(entry) = source.next_entry(&keys) {
                let (key, row) = entry?;
                heap.push(Reverse(HeapEntry { key, run, row }));
            }
        }
        Ok(Self {
            runs,
            heap,
            keys,
            failed: false,
        })
    }
}

impl Iterator for RunMerge {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let Reverse(head) = self.heap.pop()?;
        match self.runs[head.run].next_entry(&self.keys) {
            Some(Ok((key, row))) => self.heap.push(Reverse(HeapEntry {
                key,
                run: head.run,
                row,
            })),
            Some(Err(e)) => {
                self.failed = true;
                return Some(Err(e));
            }
            None => {}
        }
        Some(Ok(head.row))
    }
}

/// Lazy Sort stage: buffers the whole upstream on the first pull.
pub(crate) struct SortStream<'a> {
    input: Option<RowStream<'a>>,
    keys: Vec<String>,
    options: SortOptions,
    output: Option<SortedRows>,
}

impl<'a> SortStream<'a> {
    pub(crate) fn new(input: RowStream<'a>, keys: Vec<String>, options: SortOptions) -> Self {
        Self {
            input: Some(input),
            keys,
            options,
            output: None,
        }
    }
}

impl Iterator for SortStream<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.output.is_none() {
            let input = self.input.take()?;
            match sort_rows(input, &self.keys, &self.options) {
                Ok(sorted) => self.output = Some(sorted),
                Err(e) => return Some(Err(e)),
            }
        }
        self.output.as_mut()?.next()
    }
}
