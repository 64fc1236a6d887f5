//! Scan builder tests against the in-memory store.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use chrono::{TimeZone, Utc};
    use dynoquery_core::{EngineConfig, Error, ReadRequest, TableSchema};
    use dynoquery_model::types::ReturnConsumedCapacity;
    use dynoquery_model::{AttributeValue, StoreError};
    use futures::TryStreamExt;

    use crate::{MemoryStore, item, table, table_with};

    fn users(n: i32) -> Arc<MemoryStore> {
        let store = MemoryStore::new(TableSchema::new("users", "id"));
        store.seed((0..n).map(|i| {
            item([
                ("id", format!("user-{i}").into()),
                ("age", (i * 10).into()),
                (
                    "profile",
                    AttributeValue::M([("tier".to_owned(), AttributeValue::from("gold"))].into()),
                ),
            ])
        }));
        store
    }

    #[tokio::test]
    async fn test_should_scan_whole_table() {
        let store = users(5);
        let page = table(&store).scan().load_all().execute_buffered().await.unwrap();
        assert_eq!(page.count, 5);
        assert_eq!(page.scanned_count, Some(5));
        assert!(page.last_evaluated_key.is_none());
    }

    #[tokio::test]
    async fn test_should_filter_with_combined_conditions() {
        let store = users(6);
        let page = table(&store)
            .scan()
            .filter("age")
            .gte(10_i32)
            .filter("age")
            .lt(40_i32)
            .filter("profile.tier")
            .eq("gold")
            .execute_buffered()
            .await
            .unwrap();

        assert_eq!(page.count, 3);
        let requests = store.requests();
        assert_eq!(
            requests.scans[0].filter_expression.as_deref(),
            Some("(#age >= :age) AND (#age < :age_2) AND (#profile.#tier = :profile_tier)")
        );
    }

    #[tokio::test]
    async fn test_should_filter_on_attribute_existence() {
        let store = users(2);
        store.seed([item([("id", "ghost".into())])]);

        let missing = table(&store)
            .scan()
            .filter("age")
            .null()
            .execute_buffered()
            .await
            .unwrap();
        assert_eq!(missing.count, 1);

        let present = table(&store)
            .scan()
            .filter("age")
            .not_null()
            .execute_buffered()
            .await
            .unwrap();
        assert_eq!(present.count, 2);
    }

    #[tokio::test]
    async fn test_should_page_scan_by_limit() {
        let store = users(5);
        let pages: Vec<_> = table(&store)
            .scan()
            .limit(2)
            .unwrap()
            .load_all()
            .execute_stream()
            .try_collect()
            .await
            .unwrap();

        let counts: Vec<i64> = pages.iter().map(|p| p.count).collect();
        assert_eq!(counts, vec![2, 2, 1]);
        assert!(pages[2].last_evaluated_key.is_none());
    }

    #[tokio::test]
    async fn test_should_filter_on_timestamps() -> anyhow::Result<()> {
        let store = MemoryStore::new(TableSchema::new("events", "id"));
        let base = Utc.with_ymd_and_hms(2013, 1, 1, 0, 0, 0).unwrap();
        store.seed((0..4).map(|day| {
            item([
                ("id", format!("evt-{day}").into()),
                ("created", (base + chrono::Duration::days(day)).into()),
            ])
        }));

        let page = table(&store)
            .scan()
            .filter("created")
            .gte(base + chrono::Duration::days(2))
            .execute_buffered()
            .await?;

        assert_eq!(page.count, 2);
        let requests = store.requests();
        assert_eq!(
            requests.scans[0].expression_attribute_values[":created"],
            AttributeValue::S("2013-01-03T00:00:00.000Z".to_owned())
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_should_scan_one_segment() {
        let store = users(6);
        let page = table(&store)
            .scan()
            .segments(1, 3)
            .unwrap()
            .execute_buffered()
            .await
            .unwrap();
        let ids: Vec<&str> = page
            .items
            .iter()
            .filter_map(|i| i["id"].as_s())
            .collect();
        assert_eq!(ids, vec!["user-1", "user-4"]);
    }

    #[tokio::test]
    async fn test_should_give_up_after_retry_budget() {
        let store = users(1);
        for _ in 0..3 {
            store.fail_next(StoreError::throughput_exceeded("busy"));
        }
        let table = table_with(&store, EngineConfig::immediate().with_max_retries(Some(2)));
        let err = table.scan().execute_buffered().await.unwrap_err();
        assert!(matches!(err, Error::RetriesExhausted { attempts: 3, .. }));
        assert_eq!(store.requests().scans.len(), 3);
    }

    #[tokio::test]
    async fn test_should_keep_retrying_without_budget() {
        let store = users(7);
        for _ in 0..11 {
            store.fail_next(StoreError::throughput_exceeded("busy"));
        }
        let page = table(&store).scan().execute_buffered().await.unwrap();
        assert_eq!(page.count, 7);
        assert_eq!(store.requests().scans.len(), 12);
    }

    #[tokio::test]
    async fn test_should_throttle_pages_to_read_capacity() {
        let store = users(4);
        let started = Instant::now();
        let page = table_with(&store, EngineConfig::immediate().with_read_capacity(0.8))
            .scan()
            .limit(2)
            .unwrap()
            .return_consumed_capacity(ReturnConsumedCapacity::Total)
            .load_all()
            .execute_buffered()
            .await
            .unwrap();

        assert_eq!(page.count, 4);
        assert_eq!(store.requests().scans.len(), 2);
        // the first page costs 1.0 unit against a 0.8 unit bucket
        assert!(started.elapsed() >= Duration::from_millis(200));
    }
}
