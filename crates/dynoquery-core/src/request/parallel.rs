//! Parallel scan: N segment scans run concurrently and merged.

use futures::future::{self, try_join_all};
use futures::stream::{self, BoxStream, StreamExt};
use tracing::debug;

use super::{ReadOptions, ReadRequest, Scan};
use crate::error::Result;
use crate::paginate::{Page, merge_pages};
use crate::table::Table;

/// A scan split into `total_segments` concurrently executed segments.
///
/// Conditions and options are set on a template scan; execution clones it
/// once per segment, pins the clone to its segment and loads every page.
#[derive(Debug, Clone)]
#[must_use = "a parallel scan does nothing until it is executed"]
pub struct ParallelScan {
    template: Scan,
    total_segments: i32,
}

impl ParallelScan {
    pub(crate) fn new(template: Scan, total_segments: i32) -> Self {
        Self {
            template,
            total_segments,
        }
    }

    /// Number of segments.
    #[must_use]
    pub fn total_segments(&self) -> i32 {
        self.total_segments
    }

    /// Request strongly (`true`) or eventually (`false`) consistent reads.
    pub fn consistent_read(mut self, consistent: bool) -> Self {
        self.template = self.template.consistent_read(consistent);
        self
    }

    /// One scan per segment, each loading all of its pages.
    pub fn segment_scans(&self) -> Result<Vec<Scan>> {
        (0..self.total_segments)
            .map(|segment| {
                self.template
                    .clone()
                    .segments(segment, self.total_segments)
                    .map(ReadRequest::load_all)
            })
            .collect()
    }

    /// Run every segment and merge their results.
    ///
    /// The first failing segment fails the whole scan; the other segments
    /// are abandoned.
    pub async fn execute_buffered(self) -> Result<Page> {
        let scans = self.segment_scans()?;
        debug!(
            table = self.template.table().table_name(),
            segments = self.total_segments,
            "Starting parallel scan"
        );
        let pages = try_join_all(scans.into_iter().map(Scan::execute_buffered)).await?;
        Ok(merge_pages(pages, self.template.table().table_name()))
    }

    /// Run every segment, relaying pages into one stream as they arrive.
    ///
    /// Pages from different segments interleave in arrival order. The stream
    /// ends when every segment has ended, or right after the first error.
    pub fn execute_stream(self) -> BoxStream<'static, Result<Page>> {
        let scans = match self.segment_scans() {
            Ok(scans) => scans,
            Err(err) => return stream::once(future::ready(Err(err))).boxed(),
        };
        stream::select_all(scans.into_iter().map(Scan::execute_stream))
            .scan(false, |failed, item| {
                if *failed {
                    return future::ready(None);
                }
                *failed = item.is_err();
                future::ready(Some(item))
            })
            .boxed()
    }
}

impl ReadRequest for ParallelScan {
    fn options(&self) -> &ReadOptions {
        self.template.options()
    }

    fn options_mut(&mut self) -> &mut ReadOptions {
        self.template.options_mut()
    }

    fn table(&self) -> &Table {
        self.template.table()
    }
}
