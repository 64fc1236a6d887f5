//! Table handle: the entry point for reads and conditional writes.

use std::sync::Arc;

use dynoquery_model::AttributeValue;
use dynoquery_model::output::{PutItemOutput, UpdateItemOutput};
use dynoquery_model::types::{Item, Key};

use crate::batch::{BatchGet, BatchGetOptions};
use crate::client::StoreClient;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::expression::UpdateAction;
use crate::request::{ParallelScan, Query, Scan};
use crate::schema::TableSchema;
use crate::write::{CreateOptions, UpdateOptions};

/// Largest `TotalSegments` the store accepts.
pub const MAX_TOTAL_SEGMENTS: i32 = 1_000_000;

/// A store client bound to one table.
///
/// Cloning is cheap; clones share the client, schema and configuration.
#[derive(Debug, Clone)]
pub struct Table {
    client: Arc<dyn StoreClient>,
    schema: Arc<TableSchema>,
    config: Arc<EngineConfig>,
}

impl Table {
    /// Bind `client` to the table described by `schema`.
    #[must_use]
    pub fn new(client: Arc<dyn StoreClient>, schema: TableSchema, config: EngineConfig) -> Self {
        Self {
            client,
            schema: Arc::new(schema),
            config: Arc::new(config),
        }
    }

    /// The store client.
    #[must_use]
    pub fn client(&self) -> &Arc<dyn StoreClient> {
        &self.client
    }

    /// The table's key layout.
    #[must_use]
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The table name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.schema.table_name
    }

    /// Query the partition identified by `hash_value`.
    #[must_use]
    pub fn query(&self, hash_value: impl Into<AttributeValue>) -> Query {
        Query::new(self.clone(), hash_value.into())
    }

    /// Scan the whole table.
    #[must_use]
    pub fn scan(&self) -> Scan {
        Scan::new(self.clone())
    }

    /// Scan the table as `total_segments` concurrent segments.
    pub fn parallel_scan(&self, total_segments: i32) -> Result<ParallelScan> {
        if !(1..=MAX_TOTAL_SEGMENTS).contains(&total_segments) {
            return Err(Error::invalid_argument(format!(
                "TotalSegments must be between 1 and {MAX_TOTAL_SEGMENTS}, got {total_segments}"
            )));
        }
        Ok(ParallelScan::new(self.scan(), total_segments))
    }

    /// Fetch items by primary key.
    #[must_use]
    pub fn batch_get(&self, keys: Vec<Key>, options: BatchGetOptions) -> BatchGet {
        BatchGet::new(self.clone(), keys, options)
    }

    /// Write `item`, guarded by `options`.
    pub async fn create(&self, item: Item, options: CreateOptions) -> Result<PutItemOutput> {
        crate::write::create(self, item, options).await
    }

    /// Apply an item diff to the item whose key attributes appear in `changes`.
    pub async fn update<I, K>(&self, changes: I, options: UpdateOptions) -> Result<UpdateItemOutput>
    where
        I: IntoIterator<Item = (K, UpdateAction)>,
        K: Into<String>,
    {
        crate::write::update(self, changes, options).await
    }
}
