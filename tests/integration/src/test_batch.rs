//! Batch get tests against the in-memory store.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dynoquery_core::{BatchGetOptions, Error, TableSchema};
    use dynoquery_model::{AttributeValue, Key, StoreError};

    use crate::{MemoryStore, item, table};

    fn products(n: usize) -> Arc<MemoryStore> {
        let store = MemoryStore::new(TableSchema::new("products", "sku"));
        store.seed((0..n).map(|i| item([("sku", i.into()), ("name", format!("p{i}").into())])));
        store
    }

    fn keys(range: std::ops::Range<usize>) -> Vec<Key> {
        range
            .map(|i| Key::from([("sku".to_owned(), AttributeValue::from(i))]))
            .collect()
    }

    fn skus(items: &[dynoquery_model::Item]) -> Vec<String> {
        items
            .iter()
            .filter_map(|i| i["sku"].as_n().map(str::to_owned))
            .collect()
    }

    #[tokio::test]
    async fn test_should_split_large_batches_into_chunks() {
        let store = products(250);
        let items = table(&store)
            .batch_get(keys(0..250), BatchGetOptions::default())
            .execute()
            .await
            .unwrap();

        assert_eq!(items.len(), 250);
        let sizes: Vec<usize> = store
            .requests()
            .batch_gets
            .iter()
            .map(|r| r.request_items["products"].keys.len())
            .collect();
        let mut sorted = sizes.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![50, 100, 100]);
    }

    #[tokio::test]
    async fn test_should_keep_chunk_order() {
        let store = products(150);
        let items = table(&store)
            .batch_get(keys(0..150), BatchGetOptions::default())
            .execute()
            .await
            .unwrap();
        let expected: Vec<String> = (0..150).map(|i| i.to_string()).collect();
        assert_eq!(skus(&items), expected);
    }

    #[tokio::test]
    async fn test_should_drain_unprocessed_keys() {
        let store = products(10);
        store.serve_at_most(3);
        let items = table(&store)
            .batch_get(keys(0..10), BatchGetOptions::default())
            .execute()
            .await
            .unwrap();

        assert_eq!(items.len(), 10);
        assert_eq!(store.requests().batch_gets.len(), 4);
    }

    #[tokio::test]
    async fn test_should_skip_missing_items() {
        let store = products(3);
        let items = table(&store)
            .batch_get(keys(1..6), BatchGetOptions::default())
            .execute()
            .await
            .unwrap();
        assert_eq!(skus(&items), vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_should_send_projection_and_consistency() {
        let store = products(2);
        let options = BatchGetOptions {
            consistent_read: Some(true),
            attributes: Some(vec!["name".to_owned()]),
            ..BatchGetOptions::default()
        };
        table(&store)
            .batch_get(keys(0..2), options)
            .execute()
            .await
            .unwrap();

        let requests = store.requests();
        let sent = &requests.batch_gets[0].request_items["products"];
        assert_eq!(sent.projection_expression.as_deref(), Some("#name"));
        assert_eq!(sent.consistent_read, Some(true));
    }

    #[tokio::test]
    async fn test_should_fail_batch_on_permanent_error() {
        let store = products(2);
        store.fail_next(StoreError::validation("too many keys"));
        let err = table(&store)
            .batch_get(keys(0..2), BatchGetOptions::default())
            .execute()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }
}
