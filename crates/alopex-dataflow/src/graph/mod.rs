//! Graph construction: the persistent plan chain, its builder and source bindings.

#[allow(clippy::module_inception)]
mod graph;
mod plan;
mod sources;

pub use graph::Graph;
pub use plan::Plan;
pub use sources::Sources;
