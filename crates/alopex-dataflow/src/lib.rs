//! `alopex-dataflow` is a small, lazily-evaluated dataflow engine for rows of
//! named columns.
//!
//! A [`Graph`] is a reusable chain of Map / Sort / Reduce / Fold / Join stages
//! over named input slots. Nothing runs until the graph is executed against a
//! set of [`Sources`], either eagerly ([`Graph::run`]) or as a pull-driven
//! stream ([`Graph::run_iter`]). Sort can spill sorted runs to temp files, and
//! JSON-lines I/O is provided via `serde_json`.

mod config;
mod error;
mod exec;
mod operator;
mod row;

/// Ready-made text-processing and road-graph pipelines.
pub mod graphs;
/// Graph construction and source bindings.
pub mod graph;
/// Splitting key-sorted rows into groups.
pub mod group;
/// JSON-lines I/O.
pub mod io;
/// Built-in operators.
pub mod ops;

/// Re-export of the option types.
pub use crate::config::{JsonLinesOptions, SortOptions};
/// Re-export of the crate error type and result alias.
pub use crate::error::{DataflowError, Result};
/// Re-export of the row stream type returned by lazy runs.
pub use crate::exec::RowStream;
/// Re-export of the primary graph types.
pub use crate::graph::{Graph, Sources};
/// Re-export of the grouping unit handed to reducers.
pub use crate::group::Group;
/// Re-export of the operator contracts.
pub use crate::operator::{Combiner, Folder, JoinKind, Mapper, Reducer};
/// Re-export of the data model.
pub use crate::row::{Row, Value};
