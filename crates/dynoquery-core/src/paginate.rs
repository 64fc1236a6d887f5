//! The pagination engine.
//!
//! One logical read is driven across as many physical requests as needed.
//! Each request resumes from the continuation key of the previous page. A
//! retryable error re-issues the same request with the same start key; any
//! other error ends the operation. Two consumption modes share that loop:
//! [`Paginator::execute_buffered`] merges every page into one result, and
//! [`Paginator::execute_stream`] yields pages lazily as they arrive.

use async_trait::async_trait;
use dynoquery_model::output::{QueryOutput, ScanOutput};
use dynoquery_model::types::{ConsumedCapacity, Item, Key};
use dynoquery_model::{StoreError, StoreOperation};
use futures::StreamExt;
use futures::stream::BoxStream;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::rate_limit::RateLimiter;
use crate::retry::{RetryPolicy, pause};

/// One physical response, or several merged into one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Items returned.
    pub items: Vec<Item>,
    /// Number of items returned after filtering.
    pub count: i64,
    /// Number of items evaluated before filtering.
    pub scanned_count: Option<i64>,
    /// Capacity the request consumed.
    pub consumed_capacity: Option<ConsumedCapacity>,
    /// Continuation key; `None` when the read is complete.
    pub last_evaluated_key: Option<Key>,
}

impl Page {
    /// Capacity units this page reports, zero when absent.
    #[must_use]
    pub fn capacity_units(&self) -> f64 {
        self.consumed_capacity
            .as_ref()
            .map_or(0.0, ConsumedCapacity::units)
    }

    /// Whether the store reported more data after this page.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.last_evaluated_key.is_some()
    }
}

fn continuation(key: Key) -> Option<Key> {
    (!key.is_empty()).then_some(key)
}

impl From<QueryOutput> for Page {
    fn from(out: QueryOutput) -> Self {
        Self {
            items: out.items,
            count: i64::from(out.count),
            scanned_count: out.scanned_count.map(i64::from),
            consumed_capacity: out.consumed_capacity,
            last_evaluated_key: continuation(out.last_evaluated_key),
        }
    }
}

impl From<ScanOutput> for Page {
    fn from(out: ScanOutput) -> Self {
        Self {
            items: out.items,
            count: i64::from(out.count),
            scanned_count: out.scanned_count.map(i64::from),
            consumed_capacity: out.consumed_capacity,
            last_evaluated_key: continuation(out.last_evaluated_key),
        }
    }
}

/// Merge pages into one result.
///
/// Items are concatenated in page order and counts summed. Scanned count and
/// consumed capacity are dropped when their sum is zero. The continuation key
/// is the one the final page reported, so it is `None` once the read is done.
#[must_use]
pub fn merge_pages<I>(pages: I, table_name: &str) -> Page
where
    I: IntoIterator<Item = Page>,
{
    let mut merged = Page::default();
    let mut scanned = 0_i64;
    let mut units = 0.0_f64;

    for page in pages {
        units += page.capacity_units();
        scanned += page.scanned_count.unwrap_or(0);
        merged.count += page.count;
        merged.items.extend(page.items);
        merged.last_evaluated_key = page.last_evaluated_key;
    }

    merged.scanned_count = (scanned != 0).then_some(scanned);
    merged.consumed_capacity = (units != 0.0).then(|| ConsumedCapacity {
        table_name: Some(table_name.to_owned()),
        capacity_units: Some(units),
        ..ConsumedCapacity::default()
    });
    merged
}

/// Something that can fetch one page of a read.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Operation name for logging.
    fn operation(&self) -> StoreOperation;

    /// Table the read targets.
    fn table_name(&self) -> &str;

    /// Issue one physical request resuming after `start_key`.
    async fn fetch(&self, start_key: Option<&Key>) -> std::result::Result<Page, StoreError>;
}

/// Drives one logical read across pages.
#[derive(Debug)]
pub struct Paginator<S> {
    source: S,
    load_all: bool,
    start_key: Option<Key>,
    retry: RetryPolicy,
    limiter: Option<RateLimiter>,
}

impl<S: PageSource> Paginator<S> {
    /// Create a paginator starting at `start_key`.
    ///
    /// Without `load_all` exactly one page is fetched.
    #[must_use]
    pub fn new(source: S, load_all: bool, start_key: Option<Key>, config: &EngineConfig) -> Self {
        Self {
            source,
            load_all,
            start_key,
            retry: RetryPolicy::from_config(config),
            limiter: RateLimiter::from_config(config),
        }
    }

    /// Fetch the next page, re-issuing the same request on retryable errors.
    async fn next_page(&mut self) -> Result<Page> {
        let operation = self.source.operation();
        let mut attempt = 0;
        loop {
            if let Some(limiter) = self.limiter.as_mut() {
                limiter.acquire().await;
            }
            match self.source.fetch(self.start_key.as_ref()).await {
                Ok(page) => {
                    if let Some(limiter) = self.limiter.as_mut() {
                        limiter.consume(page.capacity_units());
                    }
                    debug!(
                        %operation,
                        table = self.source.table_name(),
                        items = page.items.len(),
                        has_more = page.has_more(),
                        "Fetched page"
                    );
                    return Ok(page);
                }
                Err(err) => {
                    let delay = self.retry.on_error(operation, attempt, err)?;
                    pause(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Record the continuation key of `page`; returns whether to keep going.
    fn advance(&mut self, page: &Page) -> bool {
        self.start_key.clone_from(&page.last_evaluated_key);
        self.load_all && self.start_key.is_some()
    }

    /// Fetch every page and deliver one merged result.
    pub async fn execute_buffered(mut self) -> Result<Page> {
        let mut pages = Vec::new();
        loop {
            let page = self.next_page().await?;
            let more = self.advance(&page);
            pages.push(page);
            if !more {
                break;
            }
        }
        Ok(merge_pages(pages, self.source.table_name()))
    }

    /// Yield pages lazily.
    ///
    /// Nothing is requested until the stream is polled, and the next request
    /// is only issued once the previous page has been taken. Dropping the
    /// stream stops the read. The stream ends after the first error.
    pub fn execute_stream(self) -> BoxStream<'static, Result<Page>>
    where
        S: 'static,
    {
        futures::stream::unfold(Some(self), |state| async move {
            let mut paginator = state?;
            match paginator.next_page().await {
                Ok(page) => {
                    let more = paginator.advance(&page);
                    Some((Ok(page), more.then_some(paginator)))
                }
                Err(err) => Some((Err(err), None)),
            }
        })
        .boxed()
    }
}
