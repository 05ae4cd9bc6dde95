//! Splitting key-sorted rows into groups.
//!
//! Reduce and Join both consume their input through [`Groups`]. The input must
//! already be sorted by the key tuple; unsorted input is not detected and simply
//! yields fragmented groups.

use crate::{Result, Row, Value};

/// A maximal run of consecutive rows sharing the same key-tuple projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// The shared key values, in key-tuple order.
    pub key: Vec<Value>,
    /// The rows of the run, in input order.
    pub rows: Vec<Row>,
}

impl Group {
    /// Build a row holding only the key columns (`keys[i] => key[i]`).
    pub fn key_row(&self, keys: &[String]) -> Row {
        keys.iter()
            .cloned()
            .zip(self.key.iter().cloned())
            .collect()
    }

    /// Number of rows in the group.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always `false` for groups produced by [`Groups`].
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Lazy iterator of [`Group`]s over a key-sorted row stream.
///
/// At most one group plus one look-ahead row is held in memory.
#[derive(Debug)]
pub struct Groups<I> {
    input: I,
    keys: Vec<String>,
    lookahead: Option<(Vec<Value>, Row)>,
    done: bool,
}

impl<I> Groups<I>
where
    I: Iterator<Item = Result<Row>>,
{
    /// Group `input` by `keys`.
    pub fn new(input: I, keys: Vec<String>) -> Self {
        Self {
            input,
            keys,
            lookahead: None,
            done: false,
        }
    }

    fn pull(&mut self) -> Option<Result<(Vec<Value>, Row)>> {
        let row = match self.input.next()? {
            Ok(row) => row,
            Err(e) => return Some(Err(e)),
        };
        Some(row.project(&self.keys).map(|key| (key, row)))
    }

    fn fail(&mut self, err: crate::DataflowError) -> Option<Result<Group>> {
        self.done = true;
        self.lookahead = None;
        Some(Err(err))
    }
}

impl<I> Iterator for Groups<I>
where
    I: Iterator<Item = Result<Row>>,
{
    type Item = Result<Group>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let (key, first) = match self.lookahead.take() {
            Some(entry) => entry,
            None => match self.pull() {
                Some(Ok(entry)) => entry,
                Some(Err(e)) => return self.fail(e),
                None => {
                    self.done = true;
                    return None;
                }
            },
        };

        let mut rows = vec![first];
        loop {
            match self.pull() {
                Some(Ok((next_key, row))) => {
                    if next_key == key {
                        rows.push(row);
                    } else {
                        self.lookahead = Some((next_key, row));
                        break;
                    }
                }
                Some(Err(e)) => return self.fail(e),
                None => {
                    self.done = true;
                    break;
                }
            }
        }

        Some(Ok(Group { key, rows }))
    }
}

/// Group an infallible, key-sorted sequence of rows.
pub fn group_rows<I, S>(rows: I, keys: &[S]) -> Groups<impl Iterator<Item = Result<Row>>>
where
    I: IntoIterator<Item = Row>,
    S: AsRef<str>,
{
    Groups::new(
        rows.into_iter().map(Ok),
        keys.iter().map(|k| k.as_ref().to_string()).collect(),
    )
}
