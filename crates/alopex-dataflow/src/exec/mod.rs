mod executor;
mod join;
mod operators;
mod sort;

pub(crate) use executor::{execute, stream};

use crate::{Result, Row};

/// A lazy, single-pass sequence of rows produced by a source or a graph run.
pub type RowStream<'a> = Box<dyn Iterator<Item = Result<Row>> + 'a>;
