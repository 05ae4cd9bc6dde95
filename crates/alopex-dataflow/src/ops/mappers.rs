use crate::operator::Mapper;
use crate::ops::mul_values;
use crate::{DataflowError, Result, Row, Value};

/// Pass every row through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Mapper for Identity {
    fn map(&self, row: Row) -> Result<Vec<Row>> {
        Ok(vec![row])
    }
}

/// Strip ASCII punctuation from a text column.
#[derive(Debug, Clone)]
pub struct FilterPunctuation {
    column: String,
}

impl FilterPunctuation {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl Mapper for FilterPunctuation {
    fn map(&self, mut row: Row) -> Result<Vec<Row>> {
        let text: String = row
            .get_str(&self.column)?
            .chars()
            .filter(|c| !c.is_ascii_punctuation())
            .collect();
        row.insert(self.column.clone(), text);
        Ok(vec![row])
    }
}

/// Lowercase a text column.
#[derive(Debug, Clone)]
pub struct LowerCase {
    column: String,
}

impl LowerCase {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl Mapper for LowerCase {
    fn map(&self, mut row: Row) -> Result<Vec<Row>> {
        let text = row.get_str(&self.column)?.to_lowercase();
        row.insert(self.column.clone(), text);
        Ok(vec![row])
    }
}

/// Split a text column into one row per part; other columns are copied.
///
/// Without a separator the text is split on runs of whitespace and empty parts
/// are dropped. With a separator every part is kept, including empty ones.
#[derive(Debug, Clone)]
pub struct Split {
    column: String,
    separator: Option<String>,
}

impl Split {
    /// Split on whitespace.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            separator: None,
        }
    }

    /// Split on an explicit separator.
    pub fn with_separator(column: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            separator: Some(separator.into()),
        }
    }
}

impl Mapper for Split {
    fn map(&self, row: Row) -> Result<Vec<Row>> {
        let text = row.get_str(&self.column)?;
        let parts: Vec<&str> = match self.separator.as_deref() {
            None => text.split_whitespace().collect(),
            Some(sep) if sep.is_empty() => {
                return Err(DataflowError::operator("Split", "empty separator"))
            }
            Some(sep) => text.split(sep).collect(),
        };
        Ok(parts
            .into_iter()
            .map(|part| row.clone().with(self.column.clone(), part))
            .collect())
    }
}

/// Multiply numeric columns into `result_column`.
#[derive(Debug, Clone)]
pub struct Product {
    columns: Vec<String>,
    result_column: String,
}

impl Product {
    pub fn new<S: AsRef<str>>(columns: &[S], result_column: impl Into<String>) -> Self {
        Self {
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            result_column: result_column.into(),
        }
    }
}

impl Mapper for Product {
    fn map(&self, mut row: Row) -> Result<Vec<Row>> {
        let mut product = Value::Int(1);
        for column in &self.columns {
            product = mul_values(column, &product, row.get(column)?)?;
        }
        row.insert(self.result_column.clone(), product);
        Ok(vec![row])
    }
}

/// Keep only rows matching a predicate.
#[derive(Clone)]
pub struct Filter<F> {
    predicate: F,
}

impl<F> Filter<F>
where
    F: Fn(&Row) -> bool + Send + Sync,
{
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F> Mapper for Filter<F>
where
    F: Fn(&Row) -> bool + Send + Sync,
{
    fn map(&self, row: Row) -> Result<Vec<Row>> {
        if (self.predicate)(&row) {
            Ok(vec![row])
        } else {
            Ok(Vec::new())
        }
    }
}

/// Keep only the listed columns (all must be present).
#[derive(Debug, Clone)]
pub struct Project {
    columns: Vec<String>,
}

impl Project {
    pub fn new<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
        }
    }
}

impl Mapper for Project {
    fn map(&self, row: Row) -> Result<Vec<Row>> {
        Ok(vec![row.select(&self.columns)?])
    }
}

/// Inverse document frequency: `ln(doc_count / docs_with_word)`.
///
/// Emits a row with only `text_column` and `result_column`.
#[derive(Debug, Clone)]
pub struct Idf {
    doc_count_column: String,
    word_docs_column: String,
    text_column: String,
    result_column: String,
}

impl Idf {
    pub fn new(
        doc_count_column: impl Into<String>,
        word_docs_column: impl Into<String>,
        text_column: impl Into<String>,
        result_column: impl Into<String>,
    ) -> Self {
        Self {
            doc_count_column: doc_count_column.into(),
            word_docs_column: word_docs_column.into(),
            text_column: text_column.into(),
            result_column: result_column.into(),
        }
    }
}

impl Mapper for Idf {
    fn map(&self, row: Row) -> Result<Vec<Row>> {
        let total = row.get_f64(&self.doc_count_column)?;
        let with_word = row.get_f64(&self.word_docs_column)?;
        if with_word <= 0.0 {
            return Err(DataflowError::operator(
                "Idf",
                format!("'{}' must be positive", self.word_docs_column),
            ));
        }
        let word = row.get(&self.text_column)?.clone();
        Ok(vec![Row::new()
            .with(self.text_column.clone(), word)
            .with(self.result_column.clone(), (total / with_word).ln())])
    }
}

/// Pointwise mutual information: `ln(doc_freq / total_freq)` into `result_column`.
///
/// Both frequencies must be positive. All input columns are kept.
#[derive(Debug, Clone)]
pub struct Pmi {
    doc_freq_column: String,
    total_freq_column: String,
    result_column: String,
}

impl Pmi {
    pub fn new(
        doc_freq_column: impl Into<String>,
        total_freq_column: impl Into<String>,
        result_column: impl Into<String>,
    ) -> Self {
        Self {
            doc_freq_column: doc_freq_column.into(),
            total_freq_column: total_freq_column.into(),
            result_column: result_column.into(),
        }
    }
}

impl Mapper for Pmi {
    fn map(&self, mut row: Row) -> Result<Vec<Row>> {
        let doc_freq = row.get_f64(&self.doc_freq_column)?;
        let total_freq = row.get_f64(&self.total_freq_column)?;
        if doc_freq <= 0.0 || total_freq <= 0.0 {
            return Err(DataflowError::operator(
                "Pmi",
                format!(
                    "'{}' and '{}' must be positive",
                    self.doc_freq_column, self.total_freq_column
                ),
            ));
        }
        row.insert(self.result_column.clone(), (doc_freq / total_freq).ln());
        Ok(vec![row])
    }
}

#[cfg(test)]
mod tests {
    use super::{Filter, FilterPunctuation, Idf, LowerCase, Pmi, Product, Project, Split};
    use crate::operator::Mapper;
    use crate::{row, DataflowError, Row, Value};

    #[test]
    fn text_cleanup() {
        let row = row! { "doc" => 1, "text" => "Hello, World!" };
        let row = FilterPunctuation::new("text").map(row).unwrap().remove(0);
        let row = LowerCase::new("text").map(row).unwrap().remove(0);
        assert_eq!(row, row! { "doc" => 1, "text" => "hello world" });
    }

    #[test]
    fn cleanup_of_non_text_column_is_a_type_mismatch() {
        let err = LowerCase::new("n").map(row! { "n" => 3 }).unwrap_err();
        assert!(matches!(err, DataflowError::TypeMismatch { .. }));
    }

    #[test]
    fn split_on_whitespace_drops_empty_parts() {
        let out = Split::new("t").map(row! { "t" => "  a b\tc ", "k" => 1 }).unwrap();
        let parts: Vec<_> = out.iter().map(|r| r.get_str("t").unwrap().to_string()).collect();
        assert_eq!(parts, vec!["a", "b", "c"]);
        assert!(out.iter().all(|r| r.get("k").unwrap() == &Value::Int(1)));
    }

    #[test]
    fn split_on_separator_keeps_empty_parts() {
        let out = Split::with_separator("t", ",").map(row! { "t" => "a,,b" }).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[1], row! { "t" => "" });
        assert!(Split::with_separator("t", "").map(row! { "t" => "a" }).is_err());
    }

    #[test]
    fn product_and_project() {
        let row = row! { "a" => 2, "b" => 0.25, "c" => "x" };
        let row = Product::new(&["a", "b"], "p").map(row).unwrap().remove(0);
        assert_eq!(row.get("p").unwrap(), &Value::Float(0.5));
        let row = Project::new(&["p", "c"]).map(row).unwrap().remove(0);
        assert_eq!(row, row! { "c" => "x", "p" => 0.5 });
        assert!(Project::new(&["missing"]).map(row).is_err());
    }

    #[test]
    fn filter_drops_non_matching_rows() {
        let even = Filter::new(|r: &Row| r.get("n").ok().and_then(Value::as_i64).unwrap_or(1) % 2 == 0);
        assert_eq!(even.map(row! { "n" => 4 }).unwrap().len(), 1);
        assert!(even.map(row! { "n" => 3 }).unwrap().is_empty());
        assert_eq!(even.name(), "Filter");
    }

    #[test]
    fn idf_is_log_of_ratio() {
        let idf = Idf::new("docs", "with_word", "text", "idf");
        let out = idf
            .map(row! { "docs" => 4, "with_word" => 2, "text" => "w", "extra" => 1 })
            .unwrap();
        assert_eq!(out, vec![row! { "text" => "w", "idf" => 2f64.ln() }]);
        assert!(idf
            .map(row! { "docs" => 4, "with_word" => 0, "text" => "w" })
            .is_err());
    }

    #[test]
    fn pmi_keeps_the_row() {
        let pmi = Pmi::new("doc_tf", "total_tf", "pmi");
        let out = pmi
            .map(row! { "doc_tf" => 0.6, "total_tf" => 0.3, "text" => "world" })
            .unwrap();
        assert_eq!(
            out,
            vec![row! { "doc_tf" => 0.6, "total_tf" => 0.3, "text" => "world", "pmi" => 2f64.ln() }]
        );
        assert!(pmi.map(row! { "doc_tf" => 0.5, "total_tf" => 0 }).is_err());
    }
}
