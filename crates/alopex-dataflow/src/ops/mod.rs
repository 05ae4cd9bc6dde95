//! Built-in operators for common text, aggregation and road-graph pipelines.

mod combiners;
mod folders;
mod mappers;
mod reducers;
mod roads;

pub use combiners::SuffixCombiner;
pub use folders::{ColumnSum, RowCount};
pub use mappers::{
    Filter, FilterPunctuation, Identity, Idf, LowerCase, Pmi, Product, Project, Split,
};
pub use reducers::{Count, CountPerRow, First, Sum, TermFrequency, TopN};
pub use roads::{EdgeLength, Speed, TravelTime};

use crate::{DataflowError, Result, Value};

/// Add two numeric values. Integers stay integers unless they overflow.
pub(crate) fn add_values(column: &str, lhs: &Value, rhs: &Value) -> Result<Value> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Ok(a
            .checked_add(*b)
            .map(Value::Int)
            .unwrap_or(Value::Float(*a as f64 + *b as f64))),
        _ => Ok(Value::Float(number(column, lhs)? + number(column, rhs)?)),
    }
}

/// Multiply two numeric values. Integers stay integers unless they overflow.
pub(crate) fn mul_values(column: &str, lhs: &Value, rhs: &Value) -> Result<Value> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Ok(a
            .checked_mul(*b)
            .map(Value::Int)
            .unwrap_or(Value::Float(*a as f64 * *b as f64))),
        _ => Ok(Value::Float(number(column, lhs)? * number(column, rhs)?)),
    }
}

fn number(column: &str, value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| DataflowError::type_mismatch(column.to_string(), "number", value.type_name()))
}

#[cfg(test)]
mod tests {
    use super::{add_values, mul_values};
    use crate::{DataflowError, Value};

    #[test]
    fn integer_arithmetic_stays_integral() {
        assert_eq!(add_values("c", &Value::Int(2), &Value::Int(3)).unwrap(), Value::Int(5));
        assert_eq!(mul_values("c", &Value::Int(2), &Value::Int(3)).unwrap(), Value::Int(6));
    }

    #[test]
    fn mixed_arithmetic_widens_to_float() {
        assert_eq!(
            mul_values("c", &Value::Int(2), &Value::Float(0.5)).unwrap(),
            Value::Float(1.0)
        );
        assert_eq!(
            add_values("c", &Value::Int(i64::MAX), &Value::Int(1)).unwrap(),
            Value::Float(i64::MAX as f64 + 1.0)
        );
    }

    #[test]
    fn text_is_not_a_number() {
        let err = add_values("c", &Value::Int(1), &Value::from("x")).unwrap_err();
        assert!(matches!(err, DataflowError::TypeMismatch { .. }));
        assert!(err.to_string().contains("'c'"));
    }
}
