use std::sync::Arc;

use crate::exec::join::MergeJoin;
use crate::exec::operators::{
    fold_rows, map_rows, reduce_rows, FoldStream, MapStream, ReduceStream,
};
use crate::exec::sort::{sort_rows, SortStream};
use crate::exec::RowStream;
use crate::graph::{Plan, Sources};
use crate::{Result, Row};

/// Eager strategy: every stage materializes its complete output before the
/// next stage runs.
pub(crate) fn execute(plan: &Plan, sources: &Sources<'_>) -> Result<Vec<Row>> {
    match plan {
        Plan::Source { name } => sources.open(name)?.collect(),
        Plan::Map { input, mapper } => {
            let rows = execute(input, sources)?;
            map_rows(rows, mapper.as_ref())
        }
        Plan::Sort {
            input,
            keys,
            options,
        } => {
            let rows = execute(input, sources)?;
            sort_rows(rows.into_iter().map(Ok), keys, options)?.collect()
        }
        Plan::Reduce {
            input,
            keys,
            reducer,
        } => {
            let rows = execute(input, sources)?;
            reduce_rows(rows, keys, reducer.as_ref())
        }
        Plan::Fold {
            input,
            folder,
            initial,
        } => {
            let rows = execute(input, sources)?;
            let row = fold_rows(rows.into_iter().map(Ok), folder.as_ref(), initial.clone())?;
            Ok(vec![row])
        }
        Plan::Join {
            left,
            right,
            keys,
            kind,
            combiner,
        } => {
            let left = execute(left, sources)?;
            let right = execute(right, sources)?;
            MergeJoin::new(
                left.into_iter().map(Ok),
                right.into_iter().map(Ok),
                keys.clone(),
                *kind,
                Arc::clone(combiner),
            )
            .collect()
        }
    }
}

/// Lazy strategy: compose one pull-driven iterator per stage. Each stage owns
/// its upstream iterator.
pub(crate) fn stream<'a>(plan: &Plan, sources: &Sources<'a>) -> Result<RowStream<'a>> {
    let out: RowStream<'a> = match plan {
        Plan::Source { name } => sources.open(name)?,
        Plan::Map { input, mapper } => {
            Box::new(MapStream::new(stream(input, sources)?, Arc::clone(mapper)))
        }
        Plan::Sort {
            input,
            keys,
            options,
        } => Box::new(SortStream::new(
            stream(input, sources)?,
            keys.clone(),
            options.clone(),
        )),
        Plan::Reduce {
            input,
            keys,
            reducer,
        } => Box::new(ReduceStream::new(
            stream(input, sources)?,
            keys.clone(),
            Arc::clone(reducer),
        )),
        Plan::Fold {
            input,
            folder,
            initial,
        } => Box::new(FoldStream::new(
            stream(input, sources)?,
            Arc::clone(folder),
            initial.clone(),
        )),
        Plan::Join {
            left,
            right,
            keys,
            kind,
            combiner,
        } => Box::new(MergeJoin::new(
            stream(left, sources)?,
            stream(right, sources)?,
            keys.clone(),
            *kind,
            Arc::clone(combiner),
        )),
    };
    Ok(out)
}
