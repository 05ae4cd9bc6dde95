use std::collections::BTreeMap;

use crate::group::Group;
use crate::operator::Reducer;
use crate::ops::add_values;
use crate::{Result, Row, Value};

/// Emit the first row of every group.
#[derive(Debug, Clone, Copy, Default)]
pub struct First;

impl Reducer for First {
    fn reduce(&self, _keys: &[String], group: Group) -> Result<Vec<Row>> {
        Ok(group.rows.into_iter().take(1).collect())
    }
}

/// Emit the group's key columns plus the number of rows in `column`.
#[derive(Debug, Clone)]
pub struct Count {
    column: String,
}

impl Count {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl Reducer for Count {
    fn reduce(&self, keys: &[String], group: Group) -> Result<Vec<Row>> {
        let count = group.len();
        Ok(vec![group.key_row(keys).with(self.column.clone(), count)])
    }
}

/// Like [`Count`], but the count row is emitted once per input row, so that
/// downstream frequency computations still see every occurrence.
#[derive(Debug, Clone)]
pub struct CountPerRow {
    column: String,
}

impl CountPerRow {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl Reducer for CountPerRow {
    fn reduce(&self, keys: &[String], group: Group) -> Result<Vec<Row>> {
        let count = group.len();
        let row = group.key_row(keys).with(self.column.clone(), count);
        Ok(vec![row; count])
    }
}

/// Emit the group's key columns plus the sum of each listed column.
#[derive(Debug, Clone)]
pub struct Sum {
    columns: Vec<String>,
}

impl Sum {
    pub fn new<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
        }
    }
}

impl Reducer for Sum {
    fn reduce(&self, keys: &[String], group: Group) -> Result<Vec<Row>> {
        let mut out = group.key_row(keys);
        for column in &self.columns {
            let mut total = Value::Int(0);
            for row in &group.rows {
                total = add_values(column, &total, row.get(column)?)?;
            }
            out.insert(column.clone(), total);
        }
        Ok(vec![out])
    }
}

/// Emit the `n` rows with the largest `column` value, largest first.
///
/// Rows with equal values keep their input order.
#[derive(Debug, Clone)]
pub struct TopN {
    column: String,
    n: usize,
}

impl TopN {
    pub fn new(column: impl Into<String>, n: usize) -> Self {
        Self {
            column: column.into(),
            n,
        }
    }
}

impl Reducer for TopN {
    fn reduce(&self, _keys: &[String], group: Group) -> Result<Vec<Row>> {
        let mut ranked = group
            .rows
            .into_iter()
            .map(|row| -> Result<(Value, Row)> { Ok((row.get(&self.column)?.clone(), row)) })
            .collect::<Result<Vec<_>>>()?;
        ranked.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(ranked
            .into_iter()
            .take(self.n)
            .map(|(_, row)| row)
            .collect())
    }
}

/// Per-group relative frequency of each distinct `words_column` value.
///
/// Emits one row per distinct word in first-seen order, holding the key
/// columns, the word, and `count / group_len` as a float in `result_column`.
#[derive(Debug, Clone)]
pub struct TermFrequency {
    words_column: String,
    result_column: String,
}

impl TermFrequency {
    pub fn new(words_column: impl Into<String>, result_column: impl Into<String>) -> Self {
        Self {
            words_column: words_column.into(),
            result_column: result_column.into(),
        }
    }
}

impl Reducer for TermFrequency {
    fn reduce(&self, keys: &[String], group: Group) -> Result<Vec<Row>> {
        let total = group.len() as f64;
        let mut order: Vec<(Value, usize)> = Vec::new();
        let mut index: BTreeMap<Value, usize> = BTreeMap::new();
        for row in &group.rows {
            let word = row.get(&self.words_column)?;
            match index.get(word) {
                Some(&i) => order[i].1 += 1,
                None => {
                    index.insert(word.clone(), order.len());
                    order.push((word.clone(), 1));
                }
            }
        }

        let base = group.key_row(keys);
        Ok(order
            .into_iter()
            .map(|(word, count)| {
                base.clone()
                    .with(self.words_column.clone(), word)
                    .with(self.result_column.clone(), count as f64 / total)
            })
            .collect())
    }
}
