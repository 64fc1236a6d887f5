//! The store client seam.
//!
//! The engine never talks to the network itself. Every builder holds an
//! `Arc<dyn StoreClient>` and issues one physical request per call.

use std::fmt::Debug;

use async_trait::async_trait;
use dynoquery_model::StoreError;
use dynoquery_model::input::{
    BatchGetItemInput, PutItemInput, QueryInput, ScanInput, UpdateItemInput,
};
use dynoquery_model::output::{
    BatchGetItemOutput, PutItemOutput, QueryOutput, ScanOutput, UpdateItemOutput,
};

/// Primitive operations of the remote store.
#[async_trait]
pub trait StoreClient: Send + Sync + Debug {
    /// Read one page of items sharing a partition key.
    async fn query(&self, input: QueryInput) -> Result<QueryOutput, StoreError>;

    /// Read one page of a full or segmented table scan.
    async fn scan(&self, input: ScanInput) -> Result<ScanOutput, StoreError>;

    /// Read up to 100 items by primary key.
    async fn batch_get_item(
        &self,
        input: BatchGetItemInput,
    ) -> Result<BatchGetItemOutput, StoreError>;

    /// Write a whole item, optionally guarded by a condition.
    async fn put_item(&self, input: PutItemInput) -> Result<PutItemOutput, StoreError>;

    /// Modify an item with an update expression.
    async fn update_item(&self, input: UpdateItemInput) -> Result<UpdateItemOutput, StoreError>;
}
