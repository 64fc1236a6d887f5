//! Partition-key queries.

use std::sync::Arc;

use async_trait::async_trait;
use dynoquery_model::input::QueryInput;
use dynoquery_model::types::Key;
use dynoquery_model::{AttributeValue, StoreError, StoreOperation};
use futures::stream::BoxStream;

use super::{ReadOptions, ReadRequest};
use crate::client::StoreClient;
use crate::error::Result;
use crate::expression::{Condition, Predicate};
use crate::paginate::{Page, PageSource, Paginator};
use crate::table::Table;

/// A query over one partition, optionally through an index.
///
/// The partition-key equality is appended when the query is executed, after
/// any key conditions added with [`Query::key_condition`].
#[derive(Debug, Clone)]
#[must_use = "a query does nothing until it is executed"]
pub struct Query {
    table: Table,
    hash_value: AttributeValue,
    options: ReadOptions,
    scan_index_forward: Option<bool>,
}

impl Query {
    pub(crate) fn new(table: Table, hash_value: AttributeValue) -> Self {
        Self {
            table,
            hash_value,
            options: ReadOptions::default(),
            scan_index_forward: None,
        }
    }

    /// Read through the named index.
    pub fn using_index(mut self, index_name: impl Into<String>) -> Self {
        self.options.index_name = Some(index_name.into());
        self
    }

    /// Request strongly (`true`) or eventually (`false`) consistent reads.
    pub fn consistent_read(mut self, consistent: bool) -> Self {
        self.options.consistent_read = Some(consistent);
        self
    }

    /// Return items in ascending sort-key order.
    pub fn ascending(mut self) -> Self {
        self.scan_index_forward = Some(true);
        self
    }

    /// Return items in descending sort-key order.
    pub fn descending(mut self) -> Self {
        self.scan_index_forward = Some(false);
        self
    }

    /// Start a key condition on `path`.
    pub fn key_condition(self, path: impl Into<String>) -> KeyCondition {
        KeyCondition {
            query: self,
            path: path.into(),
        }
    }

    /// The wire request as currently built, without the partition-key clause.
    #[must_use]
    pub fn build_request(&self) -> QueryInput {
        let options = &self.options;
        let conditions = &options.conditions;
        QueryInput {
            table_name: self.table.table_name().to_owned(),
            index_name: options.index_name.clone(),
            key_condition_expression: conditions.key_condition().map(str::to_owned),
            filter_expression: conditions.filter().map(str::to_owned),
            projection_expression: options.projection.clone(),
            expression_attribute_names: conditions.names().clone(),
            expression_attribute_values: conditions.values().clone(),
            scan_index_forward: self.scan_index_forward,
            limit: options.limit,
            exclusive_start_key: options.start_key.clone().unwrap_or_default(),
            select: options.select.clone(),
            consistent_read: options.consistent_read,
            return_consumed_capacity: options.return_consumed_capacity.clone(),
        }
    }

    /// Append the partition-key clause and return the final wire request.
    ///
    /// The key attribute comes from the global index in use, if any.
    #[must_use]
    pub fn into_request(mut self) -> QueryInput {
        let hash_key = self
            .table
            .schema()
            .hash_key_for(self.options.index_name.as_deref())
            .to_owned();
        let partition = Condition::new(hash_key, Predicate::Eq(self.hash_value.clone()));
        self.options.conditions.add_key_condition(&partition);
        self.build_request()
    }

    fn into_paginator(self) -> Paginator<QuerySource> {
        let client = Arc::clone(self.table.client());
        let config = self.table.config().clone();
        let load_all = self.options.load_all;
        let mut input = self.into_request();
        let start_key = std::mem::take(&mut input.exclusive_start_key);
        let source = QuerySource { client, input };
        Paginator::new(source, load_all, (!start_key.is_empty()).then_some(start_key), &config)
    }

    /// Run the query and deliver every fetched page merged into one.
    pub async fn execute_buffered(self) -> Result<Page> {
        self.into_paginator().execute_buffered().await
    }

    /// Run the query lazily, yielding pages as they arrive.
    pub fn execute_stream(self) -> BoxStream<'static, Result<Page>> {
        self.into_paginator().execute_stream()
    }
}

impl ReadRequest for Query {
    fn options(&self) -> &ReadOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut ReadOptions {
        &mut self.options
    }

    fn table(&self) -> &Table {
        &self.table
    }
}

/// A key condition waiting for its operator.
///
/// Only operators the store accepts in key conditions are offered.
#[derive(Debug)]
#[must_use = "a key condition does nothing until an operator is applied"]
pub struct KeyCondition {
    query: Query,
    path: String,
}

impl KeyCondition {
    fn apply(mut self, predicate: Predicate) -> Query {
        let condition = Condition::new(self.path, predicate);
        self.query
            .options
            .conditions
            .add_key_condition(&condition);
        self.query
    }

    /// `path = value`
    pub fn eq(self, value: impl Into<AttributeValue>) -> Query {
        self.apply(Predicate::Eq(value.into()))
    }

    /// Alias of [`eq`](Self::eq).
    pub fn equals(self, value: impl Into<AttributeValue>) -> Query {
        self.eq(value)
    }

    /// `path < value`
    pub fn lt(self, value: impl Into<AttributeValue>) -> Query {
        self.apply(Predicate::Lt(value.into()))
    }

    /// `path <= value`
    pub fn lte(self, value: impl Into<AttributeValue>) -> Query {
        self.apply(Predicate::Le(value.into()))
    }

    /// `path > value`
    pub fn gt(self, value: impl Into<AttributeValue>) -> Query {
        self.apply(Predicate::Gt(value.into()))
    }

    /// `path >= value`
    pub fn gte(self, value: impl Into<AttributeValue>) -> Query {
        self.apply(Predicate::Ge(value.into()))
    }

    /// `begins_with(path, prefix)`
    pub fn begins_with(self, prefix: impl Into<AttributeValue>) -> Query {
        self.apply(Predicate::BeginsWith(prefix.into()))
    }

    /// `path BETWEEN low AND high`
    pub fn between(self, low: impl Into<AttributeValue>, high: impl Into<AttributeValue>) -> Query {
        self.apply(Predicate::Between(low.into(), high.into()))
    }
}

/// Issues `Query` pages for the paginator.
#[derive(Debug)]
pub(crate) struct QuerySource {
    client: Arc<dyn StoreClient>,
    input: QueryInput,
}

#[async_trait]
impl PageSource for QuerySource {
    fn operation(&self) -> StoreOperation {
        StoreOperation::Query
    }

    fn table_name(&self) -> &str {
        &self.input.table_name
    }

    async fn fetch(&self, start_key: Option<&Key>) -> std::result::Result<Page, StoreError> {
        let mut input = self.input.clone();
        input.exclusive_start_key = start_key.cloned().unwrap_or_default();
        self.client.query(input).await.map(Page::from)
    }
}
