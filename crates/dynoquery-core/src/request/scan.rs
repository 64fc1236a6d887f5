//! Full-table and segmented scans.

use std::sync::Arc;

use async_trait::async_trait;
use dynoquery_model::input::ScanInput;
use dynoquery_model::types::Key;
use dynoquery_model::{StoreError, StoreOperation};
use futures::stream::BoxStream;

use super::{ReadOptions, ReadRequest};
use crate::client::StoreClient;
use crate::error::{Error, Result};
use crate::paginate::{Page, PageSource, Paginator};
use crate::table::{MAX_TOTAL_SEGMENTS, Table};

/// A scan over the whole table or one segment of it.
///
/// Scans have no key condition; every condition is a filter.
#[derive(Debug, Clone)]
#[must_use = "a scan does nothing until it is executed"]
pub struct Scan {
    table: Table,
    options: ReadOptions,
    segment: Option<(i32, i32)>,
}

impl Scan {
    pub(crate) fn new(table: Table) -> Self {
        Self {
            table,
            options: ReadOptions::default(),
            segment: None,
        }
    }

    /// Restrict the scan to `segment` of `total_segments`.
    pub fn segments(mut self, segment: i32, total_segments: i32) -> Result<Self> {
        if !(1..=MAX_TOTAL_SEGMENTS).contains(&total_segments) {
            return Err(Error::invalid_argument(format!(
                "TotalSegments must be between 1 and {MAX_TOTAL_SEGMENTS}, got {total_segments}"
            )));
        }
        if !(0..total_segments).contains(&segment) {
            return Err(Error::invalid_argument(format!(
                "Segment must be in 0..{total_segments}, got {segment}"
            )));
        }
        self.segment = Some((segment, total_segments));
        Ok(self)
    }

    /// Request strongly (`true`) or eventually (`false`) consistent reads.
    pub fn consistent_read(mut self, consistent: bool) -> Self {
        self.options.consistent_read = Some(consistent);
        self
    }

    /// The wire request as currently built.
    #[must_use]
    pub fn build_request(&self) -> ScanInput {
        let options = &self.options;
        let conditions = &options.conditions;
        ScanInput {
            table_name: self.table.table_name().to_owned(),
            index_name: options.index_name.clone(),
            filter_expression: conditions.filter().map(str::to_owned),
            projection_expression: options.projection.clone(),
            expression_attribute_names: conditions.names().clone(),
            expression_attribute_values: conditions.values().clone(),
            limit: options.limit,
            exclusive_start_key: options.start_key.clone().unwrap_or_default(),
            segment: self.segment.map(|(segment, _)| segment),
            total_segments: self.segment.map(|(_, total)| total),
            select: options.select.clone(),
            consistent_read: options.consistent_read,
            return_consumed_capacity: options.return_consumed_capacity.clone(),
        }
    }

    fn into_paginator(self) -> Paginator<ScanSource> {
        let client = Arc::clone(self.table.client());
        let mut input = self.build_request();
        let start_key = std::mem::take(&mut input.exclusive_start_key);
        let source = ScanSource { client, input };
        Paginator::new(
            source,
            self.options.load_all,
            (!start_key.is_empty()).then_some(start_key),
            self.table.config(),
        )
    }

    /// Run the scan and deliver every fetched page merged into one.
    pub async fn execute_buffered(self) -> Result<Page> {
        self.into_paginator().execute_buffered().await
    }

    /// Run the scan lazily, yielding pages as they arrive.
    pub fn execute_stream(self) -> BoxStream<'static, Result<Page>> {
        self.into_paginator().execute_stream()
    }
}

impl ReadRequest for Scan {
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

/// Issues `Scan` pages for the paginator.
#[derive(Debug)]
pub(crate) struct ScanSource {
    client: Arc<dyn StoreClient>,
    input: ScanInput,
}

#[async_trait]
impl PageSource for ScanSource {
    fn operation(&self) -> StoreOperation {
        StoreOperation::Scan
    }

    fn table_name(&self) -> &str {
        &self.input.table_name
    }

    async fn fetch(&self, start_key: Option<&Key>) -> std::result::Result<Page, StoreError> {
        let mut input = self.input.clone();
        input.exclusive_start_key = start_key.cloned().unwrap_or_default();
        self.client.scan(input).await.map(Page::from)
    }
}
