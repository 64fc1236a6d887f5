//! Conditional put and update-by-expression.

use std::collections::HashMap;

use dynoquery_model::input::{PutItemInput, UpdateItemInput};
use dynoquery_model::output::{PutItemOutput, UpdateItemOutput};
use dynoquery_model::types::{
    ExpressionAttributeNames, ExpressionAttributeValues, Item, Key, ReturnValue,
};
use dynoquery_model::{AttributeValue, StoreOperation};
use tracing::debug;

use crate::condition::and_join;
use crate::error::{Error, Result};
use crate::expression::{Condition, Predicate, UpdateAction, UpdateSpec, serialize_update};
use crate::table::Table;

/// Options for [`Table::create`].
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOptions {
    /// Conditions the stored item must satisfy for the put to succeed.
    pub expected: Vec<Condition>,
    /// When `false`, fail if an item with the same key already exists.
    pub overwrite: bool,
    /// Attributes to return.
    pub return_values: Option<ReturnValue>,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            expected: Vec::new(),
            overwrite: true,
            return_values: None,
        }
    }
}

impl CreateOptions {
    /// Require `attribute` to currently equal `value`.
    #[must_use]
    pub fn expect_eq(mut self, attribute: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.expected
            .push(Condition::new(attribute, Predicate::Eq(value.into())));
        self
    }

    /// Refuse to replace an existing item.
    #[must_use]
    pub fn no_overwrite(mut self) -> Self {
        self.overwrite = false;
        self
    }
}

/// Options for [`Table::update`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOptions {
    /// Conditions the stored item must satisfy for the update to succeed.
    pub expected: Vec<Condition>,
    /// Extra update clauses, merged after the ones derived from the diff.
    pub update_expression: Option<String>,
    /// Name placeholders used by `update_expression` or
    /// `condition_expression`.
    pub expression_attribute_names: ExpressionAttributeNames,
    /// Value placeholders used by `update_expression` or
    /// `condition_expression`.
    pub expression_attribute_values: ExpressionAttributeValues,
    /// Raw condition, combined with `expected`.
    pub condition_expression: Option<String>,
    /// Attributes to return; `ALL_NEW` when unset.
    pub return_values: Option<ReturnValue>,
}

impl UpdateOptions {
    /// Require `attribute` to currently equal `value`.
    #[must_use]
    pub fn expect_eq(mut self, attribute: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.expected
            .push(Condition::new(attribute, Predicate::Eq(value.into())));
        self
    }
}

/// Lower `expected` onto `condition`, minting values against `values`.
fn apply_expected(
    expected: &[Condition],
    mut condition: Option<String>,
    names: &mut ExpressionAttributeNames,
    values: &mut ExpressionAttributeValues,
) -> Option<String> {
    for cond in expected {
        let fragment = cond.to_fragment(values);
        names.extend(fragment.attribute_names);
        values.extend(fragment.attribute_values);
        condition = Some(and_join(condition, &fragment.statement));
    }
    condition
}

/// Assemble the `PutItem` request for `item`.
pub fn build_put(table: &Table, item: Item, options: &CreateOptions) -> PutItemInput {
    let schema = table.schema();
    let mut names = ExpressionAttributeNames::new();
    let mut values = ExpressionAttributeValues::new();

    let mut guards = options.expected.clone();
    if !options.overwrite {
        for key in schema.key_attributes() {
            if let Some(value) = item.get(key) {
                guards.push(Condition::new(key, Predicate::Ne(value.clone())));
            }
        }
    }
    let condition = apply_expected(&guards, None, &mut names, &mut values);

    PutItemInput {
        table_name: table.table_name().to_owned(),
        item,
        condition_expression: condition,
        expression_attribute_names: names,
        expression_attribute_values: values,
        return_values: options.return_values.clone(),
    }
}

/// Assemble the `UpdateItem` request for an item diff.
///
/// The diff must carry `Set` values for the table's key attributes; those
/// become the request key and are excluded from the update clauses.
pub fn build_update<I, K>(table: &Table, changes: I, options: UpdateOptions) -> Result<UpdateItemInput>
where
    I: IntoIterator<Item = (K, UpdateAction)>,
    K: Into<String>,
{
    let schema = table.schema();
    let key_attributes = schema.key_attributes();
    let changes: Vec<(String, UpdateAction)> =
        changes.into_iter().map(|(k, v)| (k.into(), v)).collect();

    let mut key = Key::new();
    for name in &key_attributes {
        match changes.iter().find(|(k, _)| k == name) {
            Some((k, UpdateAction::Set(v))) => {
                key.insert(k.clone(), v.clone());
            }
            _ => {
                return Err(Error::invalid_argument(format!(
                    "Update is missing a value for key attribute '{name}'"
                )));
            }
        }
    }

    let serialized = serialize_update(changes, &key_attributes);
    let mut spec = serialized.spec;
    let mut names = serialized.attribute_names;
    let mut values = serialized.attribute_values;

    if let Some(expr) = options.update_expression.as_deref() {
        spec.extend(UpdateSpec::parse(expr));
    }
    for (k, v) in options.expression_attribute_names {
        names.entry(k).or_insert(v);
    }
    for (k, v) in options.expression_attribute_values {
        values.entry(k).or_insert(v);
    }

    let condition = apply_expected(
        &options.expected,
        options.condition_expression.map(|c| format!("({c})")),
        &mut names,
        &mut values,
    );

    Ok(UpdateItemInput {
        table_name: table.table_name().to_owned(),
        key,
        update_expression: (!spec.is_empty()).then(|| spec.stringify()),
        condition_expression: condition,
        expression_attribute_names: names,
        expression_attribute_values: values,
        return_values: Some(options.return_values.unwrap_or(ReturnValue::AllNew)),
    })
}

pub(crate) async fn create(
    table: &Table,
    item: Item,
    options: CreateOptions,
) -> Result<PutItemOutput> {
    let input = build_put(table, item, &options);
    debug!(
        operation = %StoreOperation::PutItem,
        table = table.table_name(),
        conditional = input.condition_expression.is_some(),
        "Writing item"
    );
    Ok(table.client().put_item(input).await?)
}

pub(crate) async fn update<I, K>(
    table: &Table,
    changes: I,
    options: UpdateOptions,
) -> Result<UpdateItemOutput>
where
    I: IntoIterator<Item = (K, UpdateAction)>,
    K: Into<String>,
{
    let input = build_update(table, changes, options)?;
    debug!(
        operation = %StoreOperation::UpdateItem,
        table = table.table_name(),
        expression = input.update_expression.as_deref().unwrap_or_default(),
        "Updating item"
    );
    Ok(table.client().update_item(input).await?)
}

/// Split an item into `Set`/`Remove` actions, for callers holding a whole item.
#[must_use]
pub fn item_changes(item: Item) -> HashMap<String, UpdateAction> {
    item.into_iter()
        .map(|(k, v)| (k, UpdateAction::from(v)))
        .collect()
}
