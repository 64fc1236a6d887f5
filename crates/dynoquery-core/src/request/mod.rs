//! Fluent read request builders.
//!
//! [`Query`] and [`Scan`] share the surface of [`ReadRequest`]: limits,
//! projections, filter conditions, raw expression overrides, consumed
//! capacity reporting and continuation. Builder state is held in typed
//! fields and only assembled into the wire input by `build_request`.

pub mod parallel;
pub mod query;
pub mod scan;

use dynoquery_model::AttributeValue;
use dynoquery_model::types::{
    ExpressionAttributeNames, ExpressionAttributeValues, Item, Key, ReturnConsumedCapacity, Select,
};

pub use self::parallel::ParallelScan;
pub use self::query::{KeyCondition, Query};
pub use self::scan::Scan;
use crate::condition::ConditionAccumulator;
use crate::error::{Error, Result};
use crate::expression::{Condition, Predicate};
use crate::table::Table;

/// Builder state shared by query and scan.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    pub(crate) conditions: ConditionAccumulator,
    pub(crate) limit: Option<i32>,
    pub(crate) projection: Option<String>,
    pub(crate) select: Option<Select>,
    pub(crate) return_consumed_capacity: Option<ReturnConsumedCapacity>,
    pub(crate) consistent_read: Option<bool>,
    pub(crate) index_name: Option<String>,
    pub(crate) start_key: Option<Key>,
    pub(crate) load_all: bool,
}

impl ReadOptions {
    /// Whether every page should be fetched.
    #[must_use]
    pub fn load_all(&self) -> bool {
        self.load_all
    }

    /// The accumulated conditions.
    #[must_use]
    pub fn conditions(&self) -> &ConditionAccumulator {
        &self.conditions
    }
}

/// Fluent surface shared by read builders.
///
/// Every method consumes and returns the builder.
pub trait ReadRequest: Sized {
    /// Shared builder state.
    fn options(&self) -> &ReadOptions;

    /// Shared builder state, mutably.
    fn options_mut(&mut self) -> &mut ReadOptions;

    /// The table the request reads.
    fn table(&self) -> &Table;

    /// Maximum number of items evaluated per page.
    ///
    /// Fails when `limit` is not positive.
    fn limit(mut self, limit: i32) -> Result<Self> {
        if limit <= 0 {
            return Err(Error::invalid_argument("Limit must be greater than 0"));
        }
        self.options_mut().limit = Some(limit);
        Ok(self)
    }

    /// Replace the filter expression with raw text.
    #[must_use]
    fn filter_expression(mut self, expression: impl Into<String>) -> Self {
        self.options_mut()
            .conditions
            .set_filter_expression(expression);
        self
    }

    /// Supply value placeholders used by raw expressions.
    #[must_use]
    fn expression_attribute_values(mut self, values: ExpressionAttributeValues) -> Self {
        self.options_mut().conditions.merge_values(values);
        self
    }

    /// Supply name placeholders used by raw expressions.
    #[must_use]
    fn expression_attribute_names(mut self, names: ExpressionAttributeNames) -> Self {
        self.options_mut().conditions.merge_names(names);
        self
    }

    /// Set the projection expression verbatim.
    #[must_use]
    fn projection_expression(mut self, expression: impl Into<String>) -> Self {
        self.options_mut().projection = Some(expression.into());
        self
    }

    /// Project the named top-level attributes, e.g. `#created,#email`.
    #[must_use]
    fn attributes<I, A>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        let mut placeholders = Vec::new();
        let mut names = ExpressionAttributeNames::new();
        for attribute in attributes {
            let attribute = attribute.into();
            let placeholder = format!("#{attribute}");
            placeholders.push(placeholder.clone());
            names.insert(placeholder, attribute);
        }
        let options = self.options_mut();
        options.projection = Some(placeholders.join(","));
        options.conditions.merge_names(names);
        self
    }

    /// Which attributes the store returns.
    #[must_use]
    fn select(mut self, select: Select) -> Self {
        self.options_mut().select = Some(select);
        self
    }

    /// Ask the store to report consumed capacity at `level`.
    #[must_use]
    fn return_consumed_capacity(mut self, level: ReturnConsumedCapacity) -> Self {
        self.options_mut().return_consumed_capacity = Some(level);
        self
    }

    /// Keep requesting pages until the store reports no continuation key.
    #[must_use]
    fn load_all(mut self) -> Self {
        self.options_mut().load_all = true;
        self
    }

    /// Resume after the item with the given primary key.
    fn start_key(
        mut self,
        hash: impl Into<AttributeValue>,
        range: Option<AttributeValue>,
    ) -> Result<Self> {
        let key = self.table().schema().build_key(hash, range)?;
        self.options_mut().start_key = Some(key);
        Ok(self)
    }

    /// Resume after `item`, e.g. the last item of a previous page.
    ///
    /// The key carries the index key attributes present in `item`, which
    /// index reads need to continue.
    fn start_after(mut self, item: &Item) -> Result<Self> {
        let key = self.table().schema().build_key_from_item(item)?;
        self.options_mut().start_key = Some(key);
        Ok(self)
    }

    /// Resume after a continuation key returned by a previous page.
    #[must_use]
    fn exclusive_start_key(mut self, key: Key) -> Self {
        self.options_mut().start_key = (!key.is_empty()).then_some(key);
        self
    }

    /// Start a filter condition on `path`.
    fn filter(self, path: impl Into<String>) -> FilterCondition<Self> {
        FilterCondition {
            builder: self,
            path: path.into(),
        }
    }
}

/// A filter condition waiting for its operator.
#[derive(Debug)]
#[must_use = "a filter condition does nothing until an operator is applied"]
pub struct FilterCondition<B> {
    builder: B,
    path: String,
}

impl<B: ReadRequest> FilterCondition<B> {
    fn apply(mut self, predicate: Predicate) -> B {
        let condition = Condition::new(self.path, predicate);
        self.builder
            .options_mut()
            .conditions
            .add_filter(&condition);
        self.builder
    }

    /// `path = value`
    pub fn eq(self, value: impl Into<AttributeValue>) -> B {
        self.apply(Predicate::Eq(value.into()))
    }

    /// Alias of [`eq`](Self::eq).
    pub fn equals(self, value: impl Into<AttributeValue>) -> B {
        self.eq(value)
    }

    /// `path <> value`
    pub fn ne(self, value: impl Into<AttributeValue>) -> B {
        self.apply(Predicate::Ne(value.into()))
    }

    /// `path < value`
    pub fn lt(self, value: impl Into<AttributeValue>) -> B {
        self.apply(Predicate::Lt(value.into()))
    }

    /// `path <= value`
    pub fn lte(self, value: impl Into<AttributeValue>) -> B {
        self.apply(Predicate::Le(value.into()))
    }

    /// `path > value`
    pub fn gt(self, value: impl Into<AttributeValue>) -> B {
        self.apply(Predicate::Gt(value.into()))
    }

    /// `path >= value`
    pub fn gte(self, value: impl Into<AttributeValue>) -> B {
        self.apply(Predicate::Ge(value.into()))
    }

    /// `path BETWEEN low AND high`
    pub fn between(self, low: impl Into<AttributeValue>, high: impl Into<AttributeValue>) -> B {
        self.apply(Predicate::Between(low.into(), high.into()))
    }

    /// `path IN (v1, v2, ...)`
    pub fn is_in<I, V>(self, values: I) -> B
    where
        I: IntoIterator<Item = V>,
        V: Into<AttributeValue>,
    {
        self.apply(Predicate::In(values.into_iter().map(Into::into).collect()))
    }

    /// `begins_with(path, prefix)`
    pub fn begins_with(self, prefix: impl Into<AttributeValue>) -> B {
        self.apply(Predicate::BeginsWith(prefix.into()))
    }

    /// `contains(path, value)`
    pub fn contains(self, value: impl Into<AttributeValue>) -> B {
        self.apply(Predicate::Contains(value.into()))
    }

    /// `NOT contains(path, value)`
    pub fn not_contains(self, value: impl Into<AttributeValue>) -> B {
        self.apply(Predicate::NotContains(value.into()))
    }

    /// `attribute_exists(path)` or `attribute_not_exists(path)`.
    pub fn exists(self, exists: bool) -> B {
        self.apply(Predicate::Exists(exists))
    }

    /// `attribute_not_exists(path)`
    pub fn null(self) -> B {
        self.exists(false)
    }

    /// `attribute_exists(path)`
    pub fn not_null(self) -> B {
        self.exists(true)
    }
}
