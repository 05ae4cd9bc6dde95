use std::collections::BTreeMap;
use std::fmt;

use crate::exec::RowStream;
use crate::{DataflowError, Result, Row};

type Factory<'a> = Box<dyn Fn() -> Result<RowStream<'a>> + 'a>;

/// Bindings from input slot names to row-source factories.
///
/// A factory is called once per read of its slot, so a graph that reads the
/// same input twice (or is run twice) gets a fresh iterator each time.
#[derive(Default)]
pub struct Sources<'a> {
    factories: BTreeMap<String, Factory<'a>>,
}

impl<'a> Sources<'a> {
    /// Create an empty binding set.
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Bind `name` to a fixed list of rows (cloned on every open).
    pub fn with_rows(self, name: impl Into<String>, rows: Vec<Row>) -> Self {
        self.with_iter(name, move || rows.clone())
    }

    /// Bind `name` to an infallible row iterator factory.
    pub fn with_iter<F, I>(self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> I + 'a,
        I: IntoIterator<Item = Row>,
        I::IntoIter: 'a,
    {
        self.with_source(name, move || {
            Ok(factory().into_iter().map(Ok::<Row, DataflowError>))
        })
    }

    /// Bind `name` to a fallible factory of fallible rows (e.g. a file reader).
    pub fn with_source<F, I>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<I> + 'a,
        I: IntoIterator<Item = Result<Row>>,
        I::IntoIter: 'a,
    {
        let factory: Factory<'a> = Box::new(move || {
            let rows = factory()?;
            Ok(Box::new(rows.into_iter()) as RowStream<'a>)
        });
        self.factories.insert(name.into(), factory);
        self
    }

    /// Return `true` if `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Bound slot names, in order.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Open a fresh iterator over the rows bound to `name`.
    pub fn open(&self, name: &str) -> Result<RowStream<'a>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| DataflowError::source_not_found(name))?;
        tracing::trace!(source = name, "opening row source");
        factory()
    }
}

impl fmt::Debug for Sources<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sources")
            .field("names", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
