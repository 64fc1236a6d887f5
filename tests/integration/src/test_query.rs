//! Query builder tests against the in-memory store.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dynoquery_core::{Error, IndexKeys, ReadRequest, TableSchema};
    use dynoquery_model::types::ReturnConsumedCapacity;
    use dynoquery_model::{AttributeValue, StoreError};
    use futures::{StreamExt, TryStreamExt};

    use crate::{MemoryStore, UNITS_PER_ITEM, item, table};

    fn accounts() -> Arc<MemoryStore> {
        let store = MemoryStore::new(
            TableSchema::new("accounts", "name")
                .with_range_key("email")
                .with_global_index("UserAgeIndex", IndexKeys::new("age", Some("name"))),
        );
        store.seed([
            item([
                ("name", "tim".into()),
                ("email", "c@example.com".into()),
                ("age", 31_i32.into()),
            ]),
            item([
                ("name", "tim".into()),
                ("email", "a@example.com".into()),
                ("age", 18_i32.into()),
            ]),
            item([
                ("name", "bob".into()),
                ("email", "bob@example.com".into()),
                ("age", 18_i32.into()),
            ]),
            item([
                ("name", "tim".into()),
                ("email", "b@example.com".into()),
                ("age", 44_i32.into()),
            ]),
        ]);
        store
    }

    fn emails(items: &[dynoquery_model::Item]) -> Vec<&str> {
        items
            .iter()
            .filter_map(|i| i.get("email").and_then(AttributeValue::as_s))
            .collect()
    }

    #[tokio::test]
    async fn test_should_query_one_partition_in_sort_order() {
        let store = accounts();
        let page = table(&store).query("tim").execute_buffered().await.unwrap();

        assert_eq!(page.count, 3);
        assert_eq!(
            emails(&page.items),
            vec!["a@example.com", "b@example.com", "c@example.com"]
        );
        assert!(page.last_evaluated_key.is_none());
    }

    #[tokio::test]
    async fn test_should_apply_key_condition_and_filter() {
        let store = accounts();
        let page = table(&store)
            .query("tim")
            .key_condition("email")
            .gt("a@example.com")
            .filter("age")
            .lt(40_i32)
            .execute_buffered()
            .await
            .unwrap();

        assert_eq!(emails(&page.items), vec!["c@example.com"]);
        assert_eq!(page.scanned_count, Some(2));

        let requests = store.requests();
        let sent = &requests.queries[0];
        assert_eq!(
            sent.key_condition_expression.as_deref(),
            Some("(#email > :email) AND (#name = :name)")
        );
        assert_eq!(sent.filter_expression.as_deref(), Some("(#age < :age)"));
    }

    #[tokio::test]
    async fn test_should_query_descending() {
        let store = accounts();
        let page = table(&store)
            .query("tim")
            .descending()
            .execute_buffered()
            .await
            .unwrap();
        assert_eq!(
            emails(&page.items),
            vec!["c@example.com", "b@example.com", "a@example.com"]
        );
    }

    #[tokio::test]
    async fn test_should_return_one_page_with_continuation_key() {
        let store = accounts();
        let first = table(&store)
            .query("tim")
            .limit(2)
            .unwrap()
            .execute_buffered()
            .await
            .unwrap();
        assert_eq!(first.count, 2);
        let next = first.last_evaluated_key.clone().unwrap();
        assert_eq!(next["email"], AttributeValue::from("b@example.com"));

        let second = table(&store)
            .query("tim")
            .limit(2)
            .unwrap()
            .exclusive_start_key(next)
            .execute_buffered()
            .await
            .unwrap();
        assert_eq!(emails(&second.items), vec!["c@example.com"]);
        assert!(second.last_evaluated_key.is_none());
    }

    #[tokio::test]
    async fn test_should_load_all_pages_and_sum_capacity() {
        let store = accounts();
        let page = table(&store)
            .query("tim")
            .limit(1)
            .unwrap()
            .return_consumed_capacity(ReturnConsumedCapacity::Total)
            .load_all()
            .execute_buffered()
            .await
            .unwrap();

        assert_eq!(page.count, 3);
        assert_eq!(store.requests().queries.len(), 3);
        let capacity = page.consumed_capacity.unwrap();
        assert_eq!(capacity.table_name.as_deref(), Some("accounts"));
        assert!((capacity.units() - 3.0 * UNITS_PER_ITEM).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_should_query_global_index() {
        let store = accounts();
        let page = table(&store)
            .query(18_i32)
            .using_index("UserAgeIndex")
            .execute_buffered()
            .await
            .unwrap();

        assert_eq!(page.count, 2);
        let requests = store.requests();
        assert_eq!(requests.queries[0].index_name.as_deref(), Some("UserAgeIndex"));
        assert_eq!(
            requests.queries[0].key_condition_expression.as_deref(),
            Some("(#age = :age)")
        );
    }

    #[tokio::test]
    async fn test_should_resume_index_query_after_item() -> anyhow::Result<()> {
        let store = accounts();
        let first = table(&store)
            .query(18_i32)
            .using_index("UserAgeIndex")
            .limit(1)?
            .execute_buffered()
            .await?;
        assert_eq!(first.count, 1);

        let rest = table(&store)
            .query(18_i32)
            .using_index("UserAgeIndex")
            .start_after(&first.items[0])?
            .execute_buffered()
            .await?;
        assert_eq!(rest.count, 1);
        assert_ne!(rest.items[0]["name"], first.items[0]["name"]);

        let requests = store.requests();
        let resumed_from = &requests.queries[1].exclusive_start_key;
        assert_eq!(resumed_from["age"], AttributeValue::from(18_i32));
        assert!(resumed_from.contains_key("email"));
        Ok(())
    }

    #[tokio::test]
    async fn test_should_retry_throttled_query_from_same_key() {
        let store = accounts();
        store.fail_next(StoreError::throughput_exceeded("slow down"));
        let page = table(&store)
            .query("tim")
            .limit(2)
            .unwrap()
            .load_all()
            .execute_buffered()
            .await
            .unwrap();

        assert_eq!(page.count, 3);
        let requests = store.requests();
        assert_eq!(requests.queries.len(), 3);
        assert_eq!(
            requests.queries[0].exclusive_start_key,
            requests.queries[1].exclusive_start_key
        );
    }

    #[tokio::test]
    async fn test_should_surface_permanent_errors() {
        let store = accounts();
        store.fail_next(StoreError::resource_not_found("no such table"));
        let err = table(&store)
            .query("tim")
            .execute_buffered()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Store(ref e) if e.message == "no such table"));
        assert_eq!(store.requests().queries.len(), 1);
    }

    #[tokio::test]
    async fn test_should_stream_pages_lazily() {
        let store = accounts();
        let pages: Vec<_> = table(&store)
            .query("tim")
            .limit(1)
            .unwrap()
            .load_all()
            .execute_stream()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(pages.len(), 3);
        assert!(pages.iter().all(|p| p.count == 1));
    }

    #[tokio::test]
    async fn test_should_stop_streaming_when_consumer_stops() {
        let store = accounts();
        let first: Vec<_> = table(&store)
            .query("tim")
            .limit(1)
            .unwrap()
            .load_all()
            .execute_stream()
            .take(1)
            .collect()
            .await;
        assert_eq!(first.len(), 1);
        assert_eq!(store.requests().queries.len(), 1);
    }
}
