//! Plug-in contracts for user-supplied operators.
//!
//! Each stage of a [`Graph`](crate::Graph) takes an opaque callable satisfying one
//! of these traits. Plain closures with the matching signature implement them
//! through blanket impls, so
//! `graph.map(|row: Row| Ok(vec![row]))` works without a wrapper type.

use std::fmt;

use crate::group::Group;
use crate::{Result, Row};

/// Row-at-a-time transform: one input row becomes zero, one, or many rows.
pub trait Mapper: Send + Sync {
    /// Transform one row.
    fn map(&self, row: Row) -> Result<Vec<Row>>;

    /// Name used when rendering plans.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// Per-group aggregation invoked once for every run of equal key values.
pub trait Reducer: Send + Sync {
    /// Reduce one group. `keys` are the grouping column names.
    fn reduce(&self, keys: &[String], group: Group) -> Result<Vec<Row>>;

    /// Name used when rendering plans.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// Whole-stream left-to-right accumulation producing exactly one row.
pub trait Folder: Send + Sync {
    /// Fold one row into the accumulator.
    fn fold(&self, state: Row, row: Row) -> Result<Row>;

    /// Turn the final accumulator into the emitted row.
    fn finish(&self, state: Row) -> Result<Row> {
        Ok(state)
    }

    /// Name used when rendering plans.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// Merges a left and a right row that share a join key.
pub trait Combiner: Send + Sync {
    /// Combine a matched pair.
    fn combine(&self, keys: &[String], left: &Row, right: &Row) -> Result<Row>;

    /// Representation of a left row with no right match (outer joins).
    fn left_only(&self, _keys: &[String], row: Row) -> Result<Row> {
        Ok(row)
    }

    /// Representation of a right row with no left match (outer joins).
    fn right_only(&self, _keys: &[String], row: Row) -> Result<Row> {
        Ok(row)
    }

    /// Name used when rendering plans.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// Which unmatched rows a join keeps.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum JoinKind {
    /// Only keys present on both sides.
    #[default]
    Inner,
    /// Matched rows plus unmatched left rows.
    Left,
    /// Matched rows plus unmatched right rows.
    Right,
    /// Matched rows plus unmatched rows from both sides.
    Outer,
}

impl JoinKind {
    /// Whether unmatched left rows are emitted.
    pub fn keeps_left(self) -> bool {
        matches!(self, JoinKind::Left | JoinKind::Outer)
    }

    /// Whether unmatched right rows are emitted.
    pub fn keeps_right(self) -> bool {
        matches!(self, JoinKind::Right | JoinKind::Outer)
    }

    fn as_str(self) -> &'static str {
        match self {
            JoinKind::Inner => "inner",
            JoinKind::Left => "left",
            JoinKind::Right => "right",
            JoinKind::Outer => "outer",
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<F> Mapper for F
where
    F: Fn(Row) -> Result<Vec<Row>> + Send + Sync,
{
    fn map(&self, row: Row) -> Result<Vec<Row>> {
        self(row)
    }
}

impl<F> Reducer for F
where
    F: Fn(&[String], Group) -> Result<Vec<Row>> + Send + Sync,
{
    fn reduce(&self, keys: &[String], group: Group) -> Result<Vec<Row>> {
        self(keys, group)
    }
}

impl<F> Folder for F
where
    F: Fn(Row, Row) -> Result<Row> + Send + Sync,
{
    fn fold(&self, state: Row, row: Row) -> Result<Row> {
        self(state, row)
    }
}

impl<F> Combiner for F
where
    F: Fn(&[String], &Row, &Row) -> Result<Row> + Send + Sync,
{
    fn combine(&self, keys: &[String], left: &Row, right: &Row) -> Result<Row> {
        self(keys, left, right)
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    match base.rsplit("::").next() {
        Some("{{closure}}") | None => "closure",
        Some(name) => name,
    }
}

#[cfg(test)]
mod tests {
    use super::{short_type_name, JoinKind, Mapper};
    use crate::{row, Result, Row};

    #[test]
    fn join_kind_flags() {
        assert!(!JoinKind::Inner.keeps_left() && !JoinKind::Inner.keeps_right());
        assert!(JoinKind::Left.keeps_left() && !JoinKind::Left.keeps_right());
        assert!(!JoinKind::Right.keeps_left() && JoinKind::Right.keeps_right());
        assert!(JoinKind::Outer.keeps_left() && JoinKind::Outer.keeps_right());
        assert_eq!(JoinKind::Outer.to_string(), "outer");
    }

    #[test]
    fn closures_are_mappers() {
        let dup = |row: Row| -> Result<Vec<Row>> { Ok(vec![row.clone(), row]) };
        let out = dup.map(row! { "a" => 1 }).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(Mapper::name(&dup), "closure");
    }

    #[test]
    fn short_names_drop_paths_and_generics() {
        assert_eq!(short_type_name("alopex_dataflow::ops::LowerCase"), "LowerCase");
        assert_eq!(short_type_name("a::b::Wrap<c::D>"), "Wrap");
        assert_eq!(short_type_name("x::y::{{closure}}"), "closure");
    }
}
