//! Parallel scan tests against the in-memory store.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use dynoquery_core::{EngineConfig, ReadRequest, TableSchema};
    use dynoquery_model::types::ReturnConsumedCapacity;
    use dynoquery_model::{Item, StoreError};
    use futures::TryStreamExt;

    use crate::{MemoryStore, UNITS_PER_ITEM, item, table, table_with};

    fn events(n: i32) -> Arc<MemoryStore> {
        let store = MemoryStore::new(TableSchema::new("events", "id"));
        store.seed((0..n).map(|i| item([("id", format!("evt-{i:03}").into()), ("n", i.into())])));
        store
    }

    fn ids(items: &[Item]) -> HashSet<String> {
        items
            .iter()
            .filter_map(|i| i["id"].as_s().map(str::to_owned))
            .collect()
    }

    #[tokio::test]
    async fn test_should_scan_every_segment_once() {
        let store = events(20);
        let page = table(&store)
            .parallel_scan(4)
            .unwrap()
            .limit(3)
            .unwrap()
            .return_consumed_capacity(ReturnConsumedCapacity::Total)
            .execute_buffered()
            .await
            .unwrap();

        assert_eq!(page.count, 20);
        assert_eq!(ids(&page.items).len(), 20);
        assert!(page.last_evaluated_key.is_none());
        let units = page.consumed_capacity.unwrap().units();
        assert!((units - 20.0 * UNITS_PER_ITEM).abs() < f64::EPSILON);

        let requests = store.requests();
        let segments: HashSet<i32> = requests.scans.iter().filter_map(|s| s.segment).collect();
        assert_eq!(segments, HashSet::from([0, 1, 2, 3]));
        assert!(requests.scans.iter().all(|s| s.total_segments == Some(4)));
    }

    #[tokio::test]
    async fn test_should_apply_filter_to_every_segment() {
        let store = events(12);
        let page = table(&store)
            .parallel_scan(3)
            .unwrap()
            .filter("n")
            .gte(6_i32)
            .execute_buffered()
            .await
            .unwrap();

        assert_eq!(page.count, 6);
        assert!(
            store
                .requests()
                .scans
                .iter()
                .all(|s| s.filter_expression.as_deref() == Some("(#n >= :n)"))
        );
    }

    #[tokio::test]
    async fn test_should_stream_pages_from_all_segments() {
        let store = events(10);
        let pages: Vec<_> = table(&store)
            .parallel_scan(2)
            .unwrap()
            .limit(2)
            .unwrap()
            .execute_stream()
            .try_collect()
            .await
            .unwrap();

        let items: Vec<Item> = pages.into_iter().flat_map(|p| p.items).collect();
        assert_eq!(ids(&items).len(), 10);
    }

    #[tokio::test]
    async fn test_should_throttle_each_segment_on_its_own_budget() {
        let store = events(12);
        let started = Instant::now();
        let page = table_with(&store, EngineConfig::immediate().with_read_capacity(0.8))
            .parallel_scan(3)
            .unwrap()
            .limit(2)
            .unwrap()
            .return_consumed_capacity(ReturnConsumedCapacity::Total)
            .execute_buffered()
            .await
            .unwrap();
        let elapsed = started.elapsed();

        assert_eq!(page.count, 12);
        assert_eq!(store.requests().scans.len(), 6);
        // every segment waits 250ms after its first page; a shared bucket
        // would owe several seconds
        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_should_survive_transient_segment_failure() {
        let store = events(8);
        store.fail_next(StoreError::internal_error("blip"));
        let page = table(&store)
            .parallel_scan(2)
            .unwrap()
            .execute_buffered()
            .await
            .unwrap();
        assert_eq!(page.count, 8);
    }

    #[tokio::test]
    async fn test_should_fail_whole_scan_on_permanent_error() {
        let store = events(8);
        store.fail_next(StoreError::validation("bad segment"));
        let result = table(&store)
            .parallel_scan(2)
            .unwrap()
            .execute_buffered()
            .await;
        assert!(result.is_err());
    }
}
