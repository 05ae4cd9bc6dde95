use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{DataflowError, Result, Value};

/// One record: a mapping from column name to [`Value`].
///
/// Columns are kept ordered by name, so two rows with the same columns and values
/// are equal regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    columns: BTreeMap<String, Value>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a column value, failing with `ColumnNotFound` when absent.
    pub fn get(&self, name: &str) -> Result<&Value> {
        self.columns
            .get(name)
            .ok_or_else(|| DataflowError::column_not_found(name))
    }

    /// Get a column value if present.
    pub fn get_opt(&self, name: &str) -> Option<&Value> {
        self.columns.get(name)
    }

    /// Get a text column, failing on a missing column or a non-text value.
    pub fn get_str(&self, name: &str) -> Result<&str> {
        let value = self.get(name)?;
        value
            .as_str()
            .ok_or_else(|| DataflowError::type_mismatch(name.to_string(), "text", value.type_name()))
    }

    /// Get a numeric column widened to `f64`.
    pub fn get_f64(&self, name: &str) -> Result<f64> {
        let value = self.get(name)?;
        value.as_f64().ok_or_else(|| {
            DataflowError::type_mismatch(name.to_string(), "number", value.type_name())
        })
    }

    /// Insert or overwrite a column, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.columns.insert(name.into(), value.into())
    }

    /// Builder-style [`Row::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Remove a column, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.columns.remove(name)
    }

    /// Return `true` if the column exists.
    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Return `true` if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate `(column, value)` pairs in column-name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.columns.iter()
    }

    /// Column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Project the key tuple `keys` out of this row.
    ///
    /// Two rows belong to the same group iff their projections are equal.
    pub fn project(&self, keys: &[String]) -> Result<Vec<Value>> {
        keys.iter().map(|k| self.get(k).cloned()).collect()
    }

    /// Build a new row holding only `columns` (all of which must exist).
    pub fn select<S: AsRef<str>>(&self, columns: &[S]) -> Result<Row> {
        columns
            .iter()
            .map(|c| {
                let c = c.as_ref();
                Ok((c.to_string(), self.get(c)?.clone()))
            })
            .collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Row {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.columns
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::Row;
    use crate::{row, DataflowError, Value};

    #[test]
    fn get_reports_missing_column() {
        let r = row! { "a" => 1 };
        assert_eq!(r.get("a").unwrap(), &Value::Int(1));
        let err = r.get("b").unwrap_err();
        assert!(matches!(err, DataflowError::ColumnNotFound { ref name } if name == "b"));
    }

    #[test]
    fn equality_ignores_insertion_order() {
        let a = row! { "x" => "a", "id" => 1 };
        let b = Row::new().with("id", 1).with("x", "a");
        assert_eq!(a, b);
        assert_eq!(a.columns().collect::<Vec<_>>(), vec!["id", "x"]);
    }

    #[test]
    fn project_follows_key_order() {
        let r = row! { "a" => 1, "b" => "x" };
        let keys = vec!["b".to_string(), "a".to_string()];
        assert_eq!(r.project(&keys).unwrap(), vec![Value::from("x"), Value::Int(1)]);
        assert!(r.project(&["c".to_string()]).is_err());
    }

    #[test]
    fn select_keeps_only_named_columns() {
        let r = row! { "a" => 1, "b" => 2, "c" => 3 };
        assert_eq!(r.select(&["a", "c"]).unwrap(), row! { "a" => 1, "c" => 3 });
        assert!(matches!(
            r.select(&["z"]).unwrap_err(),
            DataflowError::ColumnNotFound { .. }
        ));
    }

    #[test]
    fn typed_getters_report_mismatch() {
        let r = row! { "t" => "x", "n" => 2 };
        assert_eq!(r.get_str("t").unwrap(), "x");
        assert_eq!(r.get_f64("n").unwrap(), 2.0);
        assert!(matches!(
            r.get_f64("t").unwrap_err(),
            DataflowError::TypeMismatch { .. }
        ));
    }
}
