use std::cmp::Ordering;
use std::sync::Arc;

use crate::group::{Group, Groups};
use crate::operator::{Combiner, JoinKind};
use crate::{Result, Row};

enum Cursor {
    Pending,
    Ready(Group),
    Exhausted,
}

enum Side {
    Left,
    Right,
}

enum Output {
    Empty,
    Unmatched {
        side: Side,
        rows: std::vec::IntoIter<Row>,
    },
    Cross {
        left: Vec<Row>,
        right: Vec<Row>,
        i: usize,
        j: usize,
    },
}

/// Sort-merge join over two inputs sorted by the same key tuple.
///
/// Holds one group per side; a matched group pair is emitted as the
/// cross product, left row major.
pub(crate) struct MergeJoin<L, R> {
    left: Groups<L>,
    right: Groups<R>,
    keys: Vec<String>,
    kind: JoinKind,
    combiner: Arc<dyn Combiner>,
    left_cursor: Cursor,
    right_cursor: Cursor,
    output: Output,
    done: bool,
}

impl<L, R> MergeJoin<L, R>
where
    L: Iterator<Item = Result<Row>>,
    R: Iterator<Item = Result<Row>>,
{
    pub(crate) fn new(
        left: L,
        right: R,
        keys: Vec<String>,
        kind: JoinKind,
        combiner: Arc<dyn Combiner>,
    ) -> Self {
        Self {
            left: Groups::new(left, keys.clone()),
            right: Groups::new(right, keys.clone()),
            keys,
            kind,
            combiner,
            left_cursor: Cursor::Pending,
            right_cursor: Cursor::Pending,
            output: Output::Empty,
            done: false,
        }
    }

    fn next_output(&mut self) -> Option<Result<Row>> {
        match &mut self.output {
            Output::Empty => None,
            Output::Unmatched { side, rows } => {
                let row = rows.next()?;
                Some(match side {
                    Side::Left => self.combiner.left_only(&self.keys, row),
                    Side::Right => self.combiner.right_only(&self.keys, row),
                })
            }
            Output::Cross { left, right, i, j } => {
                if *i >= left.len() {
                    return None;
                }
                let row = self.combiner.combine(&self.keys, &left[*i], &right[*j]);
                *j += 1;
                if *j == right.len() {
                    *j = 0;
                    *i += 1;
                }
                Some(row)
            }
        }
    }

    /// Advance the cursors by one decision and stage its output.
    fn step(&mut self) -> Result<()> {
        let left = take_group(&mut self.left_cursor, &mut self.left)?;
        let right = take_group(&mut self.right_cursor, &mut self.right)?;

        match (left, right) {
            (None, None) => self.done = true,
            // Once one side is exhausted the other is still pulled to its end,
            // so upstream failures surface whether or not its rows are kept.
            (Some(l), None) => {
                if self.kind.keeps_left() {
                    self.output = unmatched(Side::Left, l);
                }
            }
            (None, Some(r)) => {
                if self.kind.keeps_right() {
                    self.output = unmatched(Side::Right, r);
                }
            }
            (Some(l), Some(r)) => match l.key.cmp(&r.key) {
                Ordering::Less => {
                    if self.kind.keeps_left() {
                        self.output = unmatched(Side::Left, l);
                    }
                    self.right_cursor = Cursor::Ready(r);
                }
                Ordering::Greater => {
                    if self.kind.keeps_right() {
                        self.output = unmatched(Side::Right, r);
                    }
                    self.left_cursor = Cursor::Ready(l);
                }
                Ordering::Equal => {
                    self.output = Output::Cross {
                        left: l.rows,
                        right: r.rows,
                        i: 0,
                        j: 0,
                    };
                }
            },
        }
        Ok(())
    }

    fn fail(&mut self) {
        self.done = true;
        self.output = Output::Empty;
    }
}

impl<L, R> Iterator for MergeJoin<L, R>
where
    L: Iterator<Item = Result<Row>>,
    R: Iterator<Item = Result<Row>>,
{
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.next_output() {
                if item.is_err() {
                    self.fail();
                }
                return Some(item);
            }
            if self.done {
                return None;
            }
            self.output = Output::Empty;
            if let Err(e) = self.step() {
                self.fail();
                return Some(Err(e));
            }
        }
    }
}

fn unmatched(side: Side, group: Group) -> Output {
    Output::Unmatched {
        side,
        rows: group.rows.into_iter(),
    }
}

/// Take the cursor's group, pulling the next one from `groups` if needed.
fn take_group<I>(cursor: &mut Cursor, groups: &mut Groups<I>) -> Result<Option<Group>>
where
    I: Iterator<Item = Result<Row>>,
{
    match std::mem::replace(cursor, Cursor::Pending) {
        Cursor::Ready(group) => Ok(Some(group)),
        Cursor::Exhausted => {
            *cursor = Cursor::Exhausted;
            Ok(None)
        }
        Cursor::Pending => match groups.next().transpose()? {
            Some(group) => Ok(Some(group)),
            None => {
                *cursor = Cursor::Exhausted;
                Ok(None)
            }
        },
    }
}
