//! Incremental merging of conditions into one request.
//!
//! A request carries at most one key-condition expression and one filter
//! expression. Every added condition is lowered against the placeholders the
//! request already holds, wrapped in parentheses and `AND`-joined onto the
//! matching expression.

use dynoquery_model::types::{ExpressionAttributeNames, ExpressionAttributeValues};

use crate::expression::{Condition, Fragment};

/// Composite key-condition and filter expressions with their placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionAccumulator {
    key_condition: Option<String>,
    filter: Option<String>,
    names: ExpressionAttributeNames,
    values: ExpressionAttributeValues,
}

impl ConditionAccumulator {
    /// Lower `condition` and append it to the key-condition expression.
    pub fn add_key_condition(&mut self, condition: &Condition) {
        let fragment = condition.to_fragment(&self.values);
        let statement = self.absorb(fragment);
        self.key_condition = Some(and_join(self.key_condition.take(), &statement));
    }

    /// Lower `condition` and append it to the filter expression.
    pub fn add_filter(&mut self, condition: &Condition) {
        let fragment = condition.to_fragment(&self.values);
        let statement = self.absorb(fragment);
        self.filter = Some(and_join(self.filter.take(), &statement));
    }

    /// Replace the filter expression with caller-written text.
    ///
    /// The caller is responsible for supplying any placeholders the text uses
    /// via [`merge_names`](Self::merge_names) and
    /// [`merge_values`](Self::merge_values).
    pub fn set_filter_expression(&mut self, expression: impl Into<String>) {
        self.filter = Some(expression.into());
    }

    /// Merge caller-supplied name placeholders. Existing entries are kept.
    pub fn merge_names(&mut self, names: ExpressionAttributeNames) {
        for (k, v) in names {
            self.names.entry(k).or_insert(v);
        }
    }

    /// Merge caller-supplied value placeholders. Existing entries are kept.
    pub fn merge_values(&mut self, values: ExpressionAttributeValues) {
        for (k, v) in values {
            self.values.entry(k).or_insert(v);
        }
    }

    /// The composite key-condition expression, if any.
    #[must_use]
    pub fn key_condition(&self) -> Option<&str> {
        self.key_condition.as_deref()
    }

    /// The composite filter expression, if any.
    #[must_use]
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// All name placeholders.
    #[must_use]
    pub fn names(&self) -> &ExpressionAttributeNames {
        &self.names
    }

    /// All value placeholders.
    #[must_use]
    pub fn values(&self) -> &ExpressionAttributeValues {
        &self.values
    }

    /// Merge the fragment's placeholders and return its statement.
    fn absorb(&mut self, fragment: Fragment) -> String {
        self.names.extend(fragment.attribute_names);
        self.values.extend(fragment.attribute_values);
        fragment.statement
    }
}

/// `(statement)` or `existing AND (statement)`.
pub(crate) fn and_join(existing: Option<String>, statement: &str) -> String {
    match existing {
        Some(prev) if !prev.is_empty() => format!("{prev} AND ({statement})"),
        _ => format!("({statement})"),
    }
}
