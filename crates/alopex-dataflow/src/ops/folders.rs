use crate::operator::Folder;
use crate::ops::add_values;
use crate::{Result, Row, Value};

/// Count rows into the integer column `column` of the accumulator.
///
/// A missing counter column starts at zero, so `Row::new()` is a valid
/// initial state.
#[derive(Debug, Clone)]
pub struct RowCount {
    column: String,
}

impl RowCount {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl Folder for RowCount {
    fn fold(&self, mut state: Row, _row: Row) -> Result<Row> {
        let current = state.get_opt(&self.column).cloned().unwrap_or(Value::Int(0));
        let next = add_values(&self.column, &current, &Value::Int(1))?;
        state.insert(self.column.clone(), next);
        Ok(state)
    }

    fn finish(&self, mut state: Row) -> Result<Row> {
        if !state.contains(&self.column) {
            state.insert(self.column.clone(), 0);
        }
        Ok(state)
    }
}

/// Sum the numeric column `column` of every row into the same column of the
/// accumulator.
#[derive(Debug, Clone)]
pub struct ColumnSum {
    column: String,
}

impl ColumnSum {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl Folder for ColumnSum {
    fn fold(&self, mut state: Row, row: Row) -> Result<Row> {
        let current = state.get_opt(&self.column).cloned().unwrap_or(Value::Int(0));
        let next = add_values(&self.column, &current, row.get(&self.column)?)?;
        state.insert(self.column.clone(), next);
        Ok(state)
    }

    fn finish(&self, mut state: Row) -> Result<Row> {
        if !state.contains(&self.column) {
            state.insert(self.column.clone(), 0);
        }
        Ok(state)
    }
}
