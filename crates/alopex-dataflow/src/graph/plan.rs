use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::config::SortOptions;
use crate::operator::{Combiner, Folder, JoinKind, Mapper, Reducer};
use crate::Row;

/// One node of a graph's operation chain.
///
/// Nodes are immutable and shared through `Arc`, so extending a graph never
/// changes the graphs it was built from.
#[derive(Clone)]
pub enum Plan {
    /// Read rows from a named input slot.
    Source { name: String },
    /// Row-at-a-time transform.
    Map {
        input: Arc<Plan>,
        mapper: Arc<dyn Mapper>,
    },
    /// Stable sort by a key tuple.
    Sort {
        input: Arc<Plan>,
        keys: Vec<String>,
        options: SortOptions,
    },
    /// Per-group reduction over key-sorted input.
    Reduce {
        input: Arc<Plan>,
        keys: Vec<String>,
        reducer: Arc<dyn Reducer>,
    },
    /// Whole-stream fold emitting one row.
    Fold {
        input: Arc<Plan>,
        folder: Arc<dyn Folder>,
        initial: Row,
    },
    /// Sort-merge join of two key-sorted inputs.
    Join {
        left: Arc<Plan>,
        right: Arc<Plan>,
        keys: Vec<String>,
        kind: JoinKind,
        combiner: Arc<dyn Combiner>,
    },
}

impl Plan {
    /// Names of all input slots read anywhere in this plan.
    pub fn inputs(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_inputs(&mut out);
        out
    }

    fn collect_inputs(&self, out: &mut BTreeSet<String>) {
        match self {
            Plan::Source { name } => {
                out.insert(name.clone());
            }
            Plan::Map { input, .. }
            | Plan::Sort { input, .. }
            | Plan::Reduce { input, .. }
            | Plan::Fold { input, .. } => input.collect_inputs(out),
            Plan::Join { left, right, .. } => {
                left.collect_inputs(out);
                right.collect_inputs(out);
            }
        }
    }

    /// Render this plan as a readable string (used by `explain()` and tests).
    pub fn display(&self) -> String {
        let mut out = String::new();
        self.fmt_into(&mut out, 0);
        out
    }

    fn fmt_into(&self, out: &mut String, indent: usize) {
        let pad = "  ".repeat(indent);
        match self {
            Plan::Source { name } => {
                out.push_str(&format!("{pad}source[{name}]\n"));
            }
            Plan::Map { input, mapper } => {
                out.push_str(&format!("{pad}map [{}]\n", mapper.name()));
                input.fmt_into(out, indent + 1);
            }
            Plan::Sort {
                input,
                keys,
                options,
            } => {
                out.push_str(&format!("{pad}sort by=[{}]", keys.join(", ")));
                if let Some(rows) = options.max_in_memory_rows {
                    out.push_str(&format!(" spill_after={rows}"));
                }
                out.push('\n');
                input.fmt_into(out, indent + 1);
            }
            Plan::Reduce {
                input,
                keys,
                reducer,
            } => {
                out.push_str(&format!(
                    "{pad}reduce [{}] by=[{}]\n",
                    reducer.name(),
                    keys.join(", ")
                ));
                input.fmt_into(out, indent + 1);
            }
            Plan::Fold { input, folder, .. } => {
                out.push_str(&format!("{pad}fold [{}]\n", folder.name()));
                input.fmt_into(out, indent + 1);
            }
            Plan::Join {
                left,
                right,
                keys,
                kind,
                combiner,
            } => {
                out.push_str(&format!(
                    "{pad}join[{kind}] [{}] on=[{}]\n",
                    combiner.name(),
                    keys.join(", ")
                ));
                left.fmt_into(out, indent + 1);
                right.fmt_into(out, indent + 1);
            }
        }
    }
}

impl fmt::Debug for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::Source { name } => f.debug_struct("Source").field("name", name).finish(),
            Plan::Map { input, mapper } => f
                .debug_struct("Map")
                .field("input", input)
                .field("mapper", &mapper.name())
                .finish(),
            Plan::Sort {
                input,
                keys,
                options,
            } => f
                .debug_struct("Sort")
                .field("input", input)
                .field("keys", keys)
                .field("options", options)
                .finish(),
            Plan::Reduce {
                input,
                keys,
                reducer,
            } => f
                .debug_struct("Reduce")
                .field("input", input)
                .field("keys", keys)
                .field("reducer", &reducer.name())
                .finish(),
            Plan::Fold {
                input,
                folder,
                initial,
            } => f
                .debug_struct("Fold")
                .field("input", input)
                .field("folder", &folder.name())
                .field("initial", initial)
                .finish(),
            Plan::Join {
                left,
                right,
                keys,
                kind,
                combiner,
            } => f
                .debug_struct("Join")
                .field("left", left)
                .field("right", right)
                .field("keys", keys)
                .field("kind", kind)
                .field("combiner", &combiner.name())
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::Plan;
    use crate::config::SortOptions;
    use crate::operator::JoinKind;
    use crate::ops::{LowerCase, SuffixCombiner};

    #[test]
    fn display_is_readable_and_stable() {
        let docs = Arc::new(Plan::Source {
            name: "docs".to_string(),
        });
        let plan = Plan::Join {
            left: Arc::new(Plan::Sort {
                input: Arc::new(Plan::Map {
                    input: docs,
                    mapper: Arc::new(LowerCase::new("text")),
                }),
                keys: vec!["id".to_string()],
                options: SortOptions::default().with_max_in_memory_rows(10),
            }),
            right: Arc::new(Plan::Source {
                name: "other".to_string(),
            }),
            keys: vec!["id".to_string()],
            kind: JoinKind::Left,
            combiner: Arc::new(SuffixCombiner::default()),
        };

        let s = plan.display();
        assert_eq!(
            s,
            "join[left] [SuffixCombiner] on=[id]\n  sort by=[id] spill_after=10\n    map [LowerCase]\n      source[docs]\n  source[other]\n"
        );
        let inputs: Vec<_> = plan.inputs().into_iter().collect();
        assert_eq!(inputs, vec!["docs", "other"]);
    }
}
