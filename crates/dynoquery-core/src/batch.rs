//! Batch get: fetch many items by primary key.
//!
//! Keys are split into chunks of at most 100. Each chunk is requested
//! repeatedly until the store reports no unprocessed keys; chunks run
//! concurrently and their items are concatenated in chunk order. Within a
//! chunk, items come back in whatever order the store returns them.

use std::collections::HashMap;

use dynoquery_model::StoreOperation;
use dynoquery_model::input::BatchGetItemInput;
use dynoquery_model::types::{
    ExpressionAttributeNames, Item, Key, KeysAndAttributes, ReturnConsumedCapacity,
};
use futures::future::try_join_all;
use tracing::debug;

use crate::config::MAX_BATCH_GET_KEYS;
use crate::error::Result;
use crate::retry::{RetryPolicy, pause};
use crate::table::Table;

/// Per-request options for a batch get.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchGetOptions {
    /// Use strongly consistent reads.
    pub consistent_read: Option<bool>,
    /// Top-level attributes to project; all attributes when `None`.
    pub attributes: Option<Vec<String>>,
    /// Consumed capacity reporting level.
    pub return_consumed_capacity: Option<ReturnConsumedCapacity>,
}

/// A pending batch get.
#[derive(Debug, Clone)]
pub struct BatchGet {
    table: Table,
    keys: Vec<Key>,
    options: BatchGetOptions,
}

impl BatchGet {
    pub(crate) fn new(table: Table, keys: Vec<Key>, options: BatchGetOptions) -> Self {
        Self {
            table,
            keys,
            options,
        }
    }

    /// The per-chunk request template: keys plus projection and consistency.
    fn keys_and_attributes(&self, keys: Vec<Key>) -> KeysAndAttributes {
        let (projection, names) = match &self.options.attributes {
            Some(attributes) if !attributes.is_empty() => {
                let names: ExpressionAttributeNames = attributes
                    .iter()
                    .map(|a| (format!("#{a}"), a.clone()))
                    .collect();
                let projection = attributes
                    .iter()
                    .map(|a| format!("#{a}"))
                    .collect::<Vec<_>>()
                    .join(",");
                (Some(projection), Some(names))
            }
            _ => (None, None),
        };
        KeysAndAttributes {
            keys,
            projection_expression: projection,
            expression_attribute_names: names,
            consistent_read: self.options.consistent_read,
        }
    }

    /// Initial requests, one per chunk of keys.
    #[must_use]
    pub fn chunk_requests(&self) -> Vec<BatchGetItemInput> {
        let size = self
            .table
            .config()
            .batch_get_chunk_size
            .clamp(1, MAX_BATCH_GET_KEYS);
        self.keys
            .chunks(size)
            .map(|chunk| BatchGetItemInput {
                request_items: HashMap::from([(
                    self.table.table_name().to_owned(),
                    self.keys_and_attributes(chunk.to_vec()),
                )]),
                return_consumed_capacity: self.options.return_consumed_capacity.clone(),
            })
            .collect()
    }

    /// Fetch every key and return the items, chunk by chunk.
    pub async fn execute(self) -> Result<Vec<Item>> {
        let requests = self.chunk_requests();
        debug!(
            table = self.table.table_name(),
            keys = self.keys.len(),
            chunks = requests.len(),
            "Starting batch get"
        );
        let chunks = try_join_all(requests.into_iter().map(|input| self.run_chunk(input))).await?;
        Ok(chunks.into_iter().flatten().collect())
    }

    /// Drive one chunk until no unprocessed keys remain.
    async fn run_chunk(&self, input: BatchGetItemInput) -> Result<Vec<Item>> {
        let table_name = self.table.table_name();
        let retry = RetryPolicy::from_config(self.table.config());
        let client = self.table.client();
        let mut items = Vec::new();
        let mut request = Some(input);
        let mut round = 0;

        while let Some(input) = request.take() {
            let output = retry
                .run(StoreOperation::BatchGetItem, || {
                    client.batch_get_item(input.clone())
                })
                .await?;

            let mut responses = output.responses;
            items.extend(responses.remove(table_name).unwrap_or_default());

            let unprocessed = output
                .unprocessed_keys
                .into_iter()
                .filter(|(_, ka)| !ka.keys.is_empty())
                .collect::<HashMap<_, _>>();
            if !unprocessed.is_empty() {
                debug!(
                    table = table_name,
                    unprocessed = unprocessed.values().map(|ka| ka.keys.len()).sum::<usize>(),
                    round,
                    "Re-requesting unprocessed keys"
                );
                pause(retry.delay(round)).await;
                round += 1;
                request = Some(BatchGetItemInput {
                    request_items: unprocessed,
                    return_consumed_capacity: input.return_consumed_capacity,
                });
            }
        }

        Ok(items)
    }
}
