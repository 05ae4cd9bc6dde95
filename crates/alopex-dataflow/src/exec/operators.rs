use std::sync::Arc;

use crate::exec::RowStream;
use crate::group::Groups;
use crate::operator::{Folder, Mapper, Reducer};
use crate::{Result, Row};

/// Apply a mapper to every row of a materialized input.
pub(crate) fn map_rows(rows: Vec<Row>, mapper: &dyn Mapper) -> Result<Vec<Row>> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        out.extend(mapper.map(row)?);
    }
    Ok(out)
}

/// Reduce a materialized, key-sorted input group by group.
pub(crate) fn reduce_rows(rows: Vec<Row>, keys: &[String], reducer: &dyn Reducer) -> Result<Vec<Row>> {
    let mut out = Vec::new();
    for group in Groups::new(rows.into_iter().map(Ok), keys.to_vec()) {
        out.extend(reducer.reduce(keys, group?)?);
    }
    Ok(out)
}

/// Fold a row stream into a single row. An empty stream yields `finish(initial)`.
pub(crate) fn fold_rows<I>(input: I, folder: &dyn Folder, initial: Row) -> Result<Row>
where
    I: Iterator<Item = Result<Row>>,
{
    let mut state = initial;
    for row in input {
        state = folder.fold(state, row?)?;
    }
    folder.finish(state)
}

/// Lazy Map stage: pulls one upstream row per expansion.
pub(crate) struct MapStream<'a> {
    input: RowStream<'a>,
    mapper: Arc<dyn Mapper>,
    pending: std::vec::IntoIter<Row>,
    done: bool,
}

impl<'a> MapStream<'a> {
    pub(crate) fn new(input: RowStream<'a>, mapper: Arc<dyn Mapper>) -> Self {
        Self {
            input,
            mapper,
            pending: Vec::new().into_iter(),
            done: false,
        }
    }
}

impl Iterator for MapStream<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.pending.next() {
                return Some(Ok(row));
            }
            if self.done {
                return None;
            }
            let mapped = match self.input.next() {
                Some(Ok(row)) => self.mapper.map(row),
                Some(Err(e)) => Err(e),
                None => {
                    self.done = true;
                    return None;
                }
            };
            match mapped {
                Ok(rows) => self.pending = rows.into_iter(),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Lazy Reduce stage: buffers one group at a time.
pub(crate) struct ReduceStream<'a> {
    groups: Groups<RowStream<'a>>,
    keys: Vec<String>,
    reducer: Arc<dyn Reducer>,
    pending: std::vec::IntoIter<Row>,
    done: bool,
}

impl<'a> ReduceStream<'a> {
    pub(crate) fn new(input: RowStream<'a>, keys: Vec<String>, reducer: Arc<dyn Reducer>) -> Self {
        Self {
            groups: Groups::new(input, keys.clone()),
            keys,
            reducer,
            pending: Vec::new().into_iter(),
            done: false,
        }
    }
}

impl Iterator for ReduceStream<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.pending.next() {
                return Some(Ok(row));
            }
            if self.done {
                return None;
            }
            let reduced = match self.groups.next() {
                Some(Ok(group)) => self.reducer.reduce(&self.keys, group),
                Some(Err(e)) => Err(e),
                None => {
                    self.done = true;
                    return None;
                }
            };
            match reduced {
                Ok(rows) => self.pending = rows.into_iter(),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Lazy Fold stage: consumes the whole upstream on the first pull, emits one row.
pub(crate) struct FoldStream<'a> {
    input: Option<RowStream<'a>>,
    folder: Arc<dyn Folder>,
    initial: Row,
}

impl<'a> FoldStream<'a> {
    pub(crate) fn new(input: RowStream<'a>, folder: Arc<dyn Folder>, initial: Row) -> Self {
        Self {
            input: Some(input),
            folder,
            initial,
        }
    }
}

impl Iterator for FoldStream<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let input = self.input.take()?;
        let initial = std::mem::take(&mut self.initial);
        Some(fold_rows(input, self.folder.as_ref(), initial))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{fold_rows, FoldStream, MapStream};
    use crate::exec::RowStream;
    use crate::operator::Mapper;
    use crate::ops::RowCount;
    use crate::{row, DataflowError, Result, Row};

    fn stream(rows: Vec<Row>) -> RowStream<'static> {
        Box::new(rows.into_iter().map(Ok))
    }

    #[test]
    fn fold_over_empty_input_emits_initial_state() {
        let folder = RowCount::new("n");
        let out = fold_rows(std::iter::empty(), &folder, row! { "n" => 0 }).unwrap();
        assert_eq!(out, row! { "n" => 0 });
    }

    #[test]
    fn fold_stream_emits_exactly_once() {
        let mut s = FoldStream::new(
            stream(vec![row! { "a" => 1 }, row! { "a" => 2 }]),
            Arc::new(RowCount::new("n")),
            row! { "n" => 0 },
        );
        assert_eq!(s.next().unwrap().unwrap(), row! { "n" => 2 });
        assert!(s.next().is_none());
    }

    #[test]
    fn map_stream_stops_after_operator_failure() {
        let failing = |row: Row| -> Result<Vec<Row>> {
            if row.contains("bad") {
                Err(DataflowError::operator("failing", "bad row"))
            } else {
                Ok(vec![row])
            }
        };
        let mapper: Arc<dyn Mapper> = Arc::new(failing);
        let mut s = MapStream::new(
            stream(vec![row! { "a" => 1 }, row! { "bad" => 1 }, row! { "a" => 2 }]),
            mapper,
        );
        assert!(s.next().unwrap().is_ok());
        assert!(matches!(s.next(), Some(Err(DataflowError::Operator { .. }))));
        assert!(s.next().is_none());
    }
}
