use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::SortOptions;
use crate::exec::{self, RowStream};
use crate::graph::{Plan, Sources};
use crate::operator::{Combiner, Folder, JoinKind, Mapper, Reducer};
use crate::ops::SuffixCombiner;
use crate::{DataflowError, Result, Row};

/// A reusable, lazily-evaluated description of a row pipeline.
///
/// Builder methods never run anything and never modify `self`; they return a
/// new graph that shares the existing chain. Rows flow only when
/// [`Graph::run`] or [`Graph::run_iter`] is called with bound [`Sources`].
#[derive(Debug, Clone)]
pub struct Graph {
    plan: Arc<Plan>,
}

impl Graph {
    /// Start a graph that reads the input slot `name`.
    pub fn from_source(name: impl Into<String>) -> Self {
        Self {
            plan: Arc::new(Plan::Source { name: name.into() }),
        }
    }

    fn extend(&self, plan: Plan) -> Self {
        Self {
            plan: Arc::new(plan),
        }
    }

    /// Append a Map stage.
    pub fn map(&self, mapper: impl Mapper + 'static) -> Self {
        self.extend(Plan::Map {
            input: Arc::clone(&self.plan),
            mapper: Arc::new(mapper),
        })
    }

    /// Append an in-memory Sort stage.
    pub fn sort<S: AsRef<str>>(&self, keys: &[S]) -> Self {
        self.sort_with_options(keys, SortOptions::default())
    }

    /// Append a Sort stage with explicit buffering options.
    pub fn sort_with_options<S: AsRef<str>>(&self, keys: &[S], options: SortOptions) -> Self {
        self.extend(Plan::Sort {
            input: Arc::clone(&self.plan),
            keys: key_names(keys),
            options,
        })
    }

    /// Append a Reduce stage. The input must already be sorted by `keys`.
    pub fn reduce<S: AsRef<str>>(&self, reducer: impl Reducer + 'static, keys: &[S]) -> Self {
        self.extend(Plan::Reduce {
            input: Arc::clone(&self.plan),
            keys: key_names(keys),
            reducer: Arc::new(reducer),
        })
    }

    /// Append a Fold stage that collapses the whole stream into one row.
    pub fn fold(&self, folder: impl Folder + 'static, initial: Row) -> Self {
        self.extend(Plan::Fold {
            input: Arc::clone(&self.plan),
            folder: Arc::new(folder),
            initial,
        })
    }

    /// Join this graph (left) with `other` (right) using [`SuffixCombiner`].
    ///
    /// Both sides must already be sorted by `keys`.
    pub fn join<S: AsRef<str>>(&self, kind: JoinKind, other: &Graph, keys: &[S]) -> Self {
        self.join_with(kind, SuffixCombiner::default(), other, keys)
    }

    /// Join this graph (left) with `other` (right) using a custom combiner.
    pub fn join_with<S: AsRef<str>>(
        &self,
        kind: JoinKind,
        combiner: impl Combiner + 'static,
        other: &Graph,
        keys: &[S],
    ) -> Self {
        self.extend(Plan::Join {
            left: Arc::clone(&self.plan),
            right: Arc::clone(&other.plan),
            keys: key_names(keys),
            kind,
            combiner: Arc::new(combiner),
        })
    }

    /// Names of all input slots this graph reads (including joined graphs).
    pub fn inputs(&self) -> BTreeSet<String> {
        self.plan.inputs()
    }

    /// The root plan node.
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// Render the operation chain as a human-readable string.
    pub fn explain(&self) -> String {
        self.plan.display()
    }

    /// Run the graph eagerly, materializing each stage in turn.
    pub fn run(&self, sources: &Sources<'_>) -> Result<Vec<Row>> {
        self.check_bound(sources)?;
        let span = tracing::debug_span!("graph_run", mode = "eager");
        let _guard = span.enter();

        let rows = exec::execute(&self.plan, sources)?;
        tracing::debug!(rows = rows.len(), "graph run finished");
        Ok(rows)
    }

    /// Run the graph lazily. Rows are produced as the returned iterator is pulled.
    ///
    /// Source factories are opened before this returns. Errors raised while
    /// pulling end the stream after being yielded once.
    pub fn run_iter<'a>(&self, sources: &Sources<'a>) -> Result<RowStream<'a>> {
        self.check_bound(sources)?;
        let span = tracing::debug_span!("graph_run", mode = "lazy");
        let _guard = span.enter();

        exec::stream(&self.plan, sources)
    }

    fn check_bound(&self, sources: &Sources<'_>) -> Result<()> {
        match self.inputs().into_iter().find(|name| !sources.contains(name)) {
            Some(name) => Err(DataflowError::source_not_found(name)),
            None => Ok(()),
        }
    }
}

fn key_names<S: AsRef<str>>(keys: &[S]) -> Vec<String> {
    keys.iter().map(|k| k.as_ref().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::Graph;
    use crate::graph::Sources;
    use crate::operator::JoinKind;
    use crate::ops::{Count, LowerCase};
    use crate::{row, DataflowError, Result, Row};

    #[test]
    fn builders_do_not_modify_the_original_graph() {
        let base = Graph::from_source("docs");
        let before = base.explain();
        let _lowered = base.map(LowerCase::new("text"));
        let _sorted = base.sort(&["text"]);
        assert_eq!(base.explain(), before);
        assert_eq!(before, "source[docs]\n");
    }

    #[test]
    fn inputs_include_joined_graphs() {
        let left = Graph::from_source("a").sort(&["k"]);
        let right = Graph::from_source("b").sort(&["k"]);
        let joined = left.join(JoinKind::Inner, &right, &["k"]);
        let inputs: Vec<_> = joined.inputs().into_iter().collect();
        assert_eq!(inputs, vec!["a", "b"]);
    }

    #[test]
    fn unbound_input_fails_before_any_row_is_read() {
        let graph = Graph::from_source("a").join(JoinKind::Inner, &Graph::from_source("b"), &["k"]);
        let sources = Sources::new().with_rows("a", vec![row! { "k" => 1 }]);
        let err = graph.run(&sources).unwrap_err();
        assert!(matches!(err, DataflowError::SourceNotFound { ref name } if name == "b"));
        assert!(graph.run_iter(&sources).is_err());
    }

    #[test]
    fn eager_and_lazy_runs_agree() {
        let graph = Graph::from_source("words")
            .sort(&["w"])
            .reduce(Count::new("n"), &["w"])
            .sort(&["n", "w"]);
        let sources = Sources::new().with_rows(
            "words",
            ["b", "a", "b", "c", "b", "a"]
                .iter()
                .map(|w| row! { "w" => *w })
                .collect(),
        );

        let eager = graph.run(&sources).unwrap();
        let lazy = graph
            .run_iter(&sources)
            .unwrap()
            .collect::<Result<Vec<Row>>>()
            .unwrap();
        assert_eq!(eager, lazy);
        assert_eq!(
            eager,
            vec![
                row! { "w" => "c", "n" => 1 },
                row! { "w" => "a", "n" => 2 },
                row! { "w" => "b", "n" => 3 },
            ]
        );
    }

    #[test]
    fn graph_can_be_rerun() {
        let graph = Graph::from_source("in").map(LowerCase::new("t"));
        let sources = Sources::new().with_rows("in", vec![row! { "t" => "ABC" }]);
        let first = graph.run(&sources).unwrap();
        let second = graph.run(&sources).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, vec![row! { "t" => "abc" }]);
    }
}
