//! Conditional put and update tests against the in-memory store.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dynoquery_core::{CreateOptions, Error, TableSchema, UpdateAction, UpdateOptions};
    use dynoquery_model::types::ReturnValue;
    use dynoquery_model::{AttributeValue, StoreErrorCode};

    use crate::{MemoryStore, item, table};

    fn accounts() -> Arc<MemoryStore> {
        MemoryStore::new(TableSchema::new("accounts", "email"))
    }

    fn conditional_failure(err: &Error) -> bool {
        err.store_error()
            .is_some_and(|e| e.code == StoreErrorCode::ConditionalCheckFailedException)
    }

    #[tokio::test]
    async fn test_should_create_and_overwrite_by_default() {
        let store = accounts();
        let t = table(&store);
        t.create(
            item([("email", "a@x.io".into()), ("age", 1_i32.into())]),
            CreateOptions::default(),
        )
        .await
        .unwrap();
        t.create(
            item([("email", "a@x.io".into()), ("age", 2_i32.into())]),
            CreateOptions::default(),
        )
        .await
        .unwrap();

        let items = store.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["age"], AttributeValue::from(2_i32));
        assert!(store.requests().puts[0].condition_expression.is_none());
    }

    #[tokio::test]
    async fn test_should_refuse_overwrite_when_asked() {
        let store = accounts();
        let t = table(&store);
        let account = item([("email", "a@x.io".into())]);
        t.create(account.clone(), CreateOptions::default().no_overwrite())
            .await
            .unwrap();
        let err = t
            .create(account, CreateOptions::default().no_overwrite())
            .await
            .unwrap_err();

        assert!(conditional_failure(&err));
        assert_eq!(
            store.requests().puts[1].condition_expression.as_deref(),
            Some("(#email <> :email)")
        );
    }

    #[tokio::test]
    async fn test_should_check_expected_values_on_create() {
        let store = accounts();
        store.seed([item([("email", "a@x.io".into()), ("status", "active".into())])]);
        let t = table(&store);

        let err = t
            .create(
                item([("email", "a@x.io".into()), ("status", "closed".into())]),
                CreateOptions::default().expect_eq("status", "pending"),
            )
            .await
            .unwrap_err();
        assert!(conditional_failure(&err));

        t.create(
            item([("email", "a@x.io".into()), ("status", "closed".into())]),
            CreateOptions::default().expect_eq("status", "active"),
        )
        .await
        .unwrap();
        assert_eq!(store.items()[0]["status"], AttributeValue::from("closed"));
    }

    #[tokio::test]
    async fn test_should_update_from_item_diff() {
        let store = accounts();
        store.seed([item([
            ("email", "a@x.io".into()),
            ("name", "Tim".into()),
            ("nickname", "timmy".into()),
        ])]);

        let out = table(&store)
            .update(
                [
                    ("email", UpdateAction::Set("a@x.io".into())),
                    ("name", UpdateAction::Set("Tim Tester".into())),
                    ("nickname", UpdateAction::Remove),
                ],
                UpdateOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(out.attributes["name"], AttributeValue::from("Tim Tester"));
        assert!(!out.attributes.contains_key("nickname"));
        let requests = store.requests();
        let sent = &requests.updates[0];
        assert_eq!(sent.return_values, Some(ReturnValue::AllNew));
        assert!(!sent.expression_attribute_names.contains_key("#email"));
    }

    #[tokio::test]
    async fn test_should_merge_raw_update_expression() {
        let store = accounts();
        store.seed([item([("email", "a@x.io".into()), ("logins", 4_i32.into())])]);

        let options = UpdateOptions {
            update_expression: Some("ADD #logins :one".to_owned()),
            expression_attribute_names: [("#logins".to_owned(), "logins".to_owned())].into(),
            expression_attribute_values: [(":one".to_owned(), AttributeValue::from(1_i32))]
                .into(),
            ..UpdateOptions::default()
        };
        let out = table(&store)
            .update(
                [
                    ("email", UpdateAction::Set("a@x.io".into())),
                    ("seen", UpdateAction::Set(true.into())),
                ],
                options,
            )
            .await
            .unwrap();

        assert_eq!(out.attributes["logins"], AttributeValue::N("5".to_owned()));
        assert_eq!(out.attributes["seen"], AttributeValue::Bool(true));
        assert_eq!(
            store.requests().updates[0].update_expression.as_deref(),
            Some("SET #seen = :seen ADD #logins :one")
        );
    }

    #[tokio::test]
    async fn test_should_guard_update_with_conditions() {
        let store = accounts();
        store.seed([item([("email", "a@x.io".into()), ("version", 3_i32.into())])]);

        let options = UpdateOptions::default().expect_eq("version", 2_i32);
        let err = table(&store)
            .update(
                [
                    ("email", UpdateAction::Set("a@x.io".into())),
                    ("version", UpdateAction::Set(4_i32.into())),
                ],
                options,
            )
            .await
            .unwrap_err();
        assert!(conditional_failure(&err));
        assert_eq!(store.items()[0]["version"], AttributeValue::from(3_i32));
    }

    #[tokio::test]
    async fn test_should_reject_update_without_key() {
        let store = accounts();
        let err = table(&store)
            .update(
                [("name", UpdateAction::Set("x".into()))],
                UpdateOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(store.requests().updates.is_empty());
    }
}
