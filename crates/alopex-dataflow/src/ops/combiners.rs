use crate::operator::Combiner;
use crate::{Result, Row};

/// Merge matched rows column-wise.
///
/// Columns present on one side only are copied. Join key columns take the
/// left value. Other columns present on both sides are emitted twice, with
/// `left_suffix` and `right_suffix` appended to the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixCombiner {
    left_suffix: String,
    right_suffix: String,
}

impl Default for SuffixCombiner {
    fn default() -> Self {
        Self::new("_1", "_2")
    }
}

impl SuffixCombiner {
    pub fn new(left_suffix: impl Into<String>, right_suffix: impl Into<String>) -> Self {
        Self {
            left_suffix: left_suffix.into(),
            right_suffix: right_suffix.into(),
        }
    }
}

impl Combiner for SuffixCombiner {
    fn combine(&self, keys: &[String], left: &Row, right: &Row) -> Result<Row> {
        let mut out = Row::new();
        for (name, value) in left {
            match right.get_opt(name) {
                Some(_) if !keys.contains(name) => {
                    out.insert(format!("{name}{}", self.left_suffix), value.clone());
                }
                _ => {
                    out.insert(name.clone(), value.clone());
                }
            }
        }
        for (name, value) in right {
            if !left.contains(name) {
                out.insert(name.clone(), value.clone());
            } else if !keys.contains(name) {
                out.insert(format!("{name}{}", self.right_suffix), value.clone());
            }
        }
        Ok(out)
    }
}
