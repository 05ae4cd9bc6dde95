mod common;

use alopex_dataflow::group::group_rows;
use alopex_dataflow::ops::{Count, Identity};
use alopex_dataflow::{Graph, JoinKind, Result, Row, SortOptions, Sources};
use common::{ints, keyed_rows};
use proptest::prelude::*;

fn keys_strategy() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(0i64..6, 0..40)
}

fn lazy(graph: &Graph, sources: &Sources<'_>) -> Vec<Row> {
    graph
        .run_iter(sources)
        .expect("run_iter")
        .collect::<Result<Vec<_>>>()
        .expect("lazy rows")
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn sort_is_stable(keys in keys_strategy(), spill_after in prop::option::of(1usize..8)) {
        let mut options = SortOptions::default();
        if let Some(rows) = spill_after {
            options = options.with_max_in_memory_rows(rows);
        }
        let graph = Graph::from_source("in").sort_with_options(&["k"], options);
        let sources = Sources::new().with_rows("in", keyed_rows("k", &keys));
        let out = graph.run(&sources).expect("run");

        let mut expected: Vec<(i64, i64)> =
            keys.iter().enumerate().map(|(i, k)| (*k, i as i64)).collect();
        expected.sort_by_key(|(k, _)| *k);
        let actual: Vec<(i64, i64)> =
            ints(&out, "k").into_iter().zip(ints(&out, "seq")).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn groups_of_sorted_rows_concatenate_back(keys in keys_strategy()) {
        let sorted = Graph::from_source("in")
            .sort(&["k"])
            .run(&Sources::new().with_rows("in", keyed_rows("k", &keys)))
            .expect("run");

        let groups = group_rows(sorted.clone(), &["k"])
            .collect::<Result<Vec<_>>>()
            .expect("groups");
        for pair in groups.windows(2) {
            prop_assert!(pair[0].key < pair[1].key);
        }
        let rejoined: Vec<Row> = groups.into_iter().flat_map(|g| g.rows).collect();
        prop_assert_eq!(rejoined, sorted);
    }

    #[test]
    fn eager_and_lazy_agree(left in keys_strategy(), right in keys_strategy(), kind_idx in 0usize..4) {
        let kind = [JoinKind::Inner, JoinKind::Left, JoinKind::Right, JoinKind::Outer][kind_idx];
        let counted = Graph::from_source("r")
            .sort(&["k"])
            .reduce(Count::new("n"), &["k"]);
        let graph = Graph::from_source("l")
            .map(Identity)
            .sort(&["k"])
            .join(kind, &counted, &["k"]);
        let sources = Sources::new()
            .with_rows("l", keyed_rows("k", &left))
            .with_rows("r", keyed_rows("k", &right));

        prop_assert_eq!(graph.run(&sources).expect("run"), lazy(&graph, &sources));
    }

    #[test]
    fn join_sizes_follow_key_multiplicities(left in keys_strategy(), right in keys_strategy()) {
        let sources = Sources::new()
            .with_rows("l", keyed_rows("k", &left))
            .with_rows("r", keyed_rows("k", &right));
        let l = Graph::from_source("l").sort(&["k"]);
        let r = Graph::from_source("r").sort(&["k"]);

        let count = |keys: &[i64], k: i64| keys.iter().filter(|x| **x == k).count();
        let mut matched = 0;
        let mut left_only = 0;
        let mut right_only = 0;
        for k in 0..6 {
            let (m, n) = (count(&left, k), count(&right, k));
            matched += m * n;
            if n == 0 {
                left_only += m;
            }
            if m == 0 {
                right_only += n;
            }
        }

        let size = |kind| l.join(kind, &r, &["k"]).run(&sources).expect("run").len();
        prop_assert_eq!(size(JoinKind::Inner), matched);
        prop_assert_eq!(size(JoinKind::Left), matched + left_only);
        prop_assert_eq!(size(JoinKind::Right), matched + right_only);
        prop_assert_eq!(size(JoinKind::Outer), matched + left_only + right_only);
    }
}
