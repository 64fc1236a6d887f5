//! Test doubles shared by unit tests.

use async_trait::async_trait;
use dynoquery_model::input::{
    BatchGetItemInput, PutItemInput, QueryInput, ScanInput, UpdateItemInput,
};
use dynoquery_model::output::{
    BatchGetItemOutput, PutItemOutput, QueryOutput, ScanOutput, UpdateItemOutput,
};
use dynoquery_model::{StoreError, store_error};

use crate::client::StoreClient;

/// A client that rejects every request; for builder tests that never send.
#[derive(Debug, Default)]
pub(crate) struct NullClient;

#[async_trait]
impl StoreClient for NullClient {
    async fn query(&self, _: QueryInput) -> Result<QueryOutput, StoreError> {
        Err(store_error!(ValidationException, "query not expected"))
    }

    async fn scan(&self, _: ScanInput) -> Result<ScanOutput, StoreError> {
        Err(store_error!(ValidationException, "scan not expected"))
    }

    async fn batch_get_item(&self, _: BatchGetItemInput) -> Result<BatchGetItemOutput, StoreError> {
        Err(store_error!(ValidationException, "batch get not expected"))
    }

    async fn put_item(&self, _: PutItemInput) -> Result<PutItemOutput, StoreError> {
        Err(store_error!(ValidationException, "put not expected"))
    }

    async fn update_item(&self, _: UpdateItemInput) -> Result<UpdateItemOutput, StoreError> {
        Err(store_error!(ValidationException, "update not expected"))
    }
}
