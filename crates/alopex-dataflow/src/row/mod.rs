#[allow(clippy::module_inception)]
mod row;
mod value;

/// A single record.
pub use row::Row;
/// A single cell value.
pub use value::Value;

/// Build a [`Row`] from `column => value` pairs.
///
/// ```
/// use alopex_dataflow::{row, Value};
///
/// let r = row! { "text" => "a", "count" => 2 };
/// assert_eq!(r.get("count").unwrap(), &Value::Int(2));
/// ```
#[macro_export]
macro_rules! row {
    () => {
        $crate::Row::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut row = $crate::Row::new();
        $( row.insert($name, $value); )+
        row
    }};
}
