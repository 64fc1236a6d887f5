//! The update-expression mini-language.
//!
//! An update expression is up to four clause lists, one per action keyword:
//! `SET #a = :a, #b = :b ADD #c :c REMOVE #d DELETE #e :e`. [`UpdateSpec`]
//! holds the lists, parses raw expressions back into them and stringifies
//! them in canonical `SET`, `ADD`, `REMOVE`, `DELETE` order.

use std::fmt;
use std::sync::LazyLock;

use dynoquery_model::AttributeValue;
use dynoquery_model::types::{ExpressionAttributeNames, ExpressionAttributeValues};
use regex::Regex;

/// Update action keywords in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKeyword {
    /// `SET path = value`
    Set,
    /// `ADD path value`
    Add,
    /// `REMOVE path`
    Remove,
    /// `DELETE path value`
    Delete,
}

impl ActionKeyword {
    /// All keywords in canonical order.
    pub const ALL: [Self; 4] = [Self::Set, Self::Add, Self::Remove, Self::Delete];

    /// Returns the keyword text.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Set => "SET",
            Self::Add => "ADD",
            Self::Remove => "REMOVE",
            Self::Delete => "DELETE",
        }
    }
}

static ACTION_PATTERNS: LazyLock<[(ActionKeyword, Regex); 4]> = LazyLock::new(|| {
    ActionKeyword::ALL.map(|keyword| {
        let pattern = format!(
            r"{}\s*(.+?)\s*(SET|ADD|REMOVE|DELETE|$)",
            keyword.as_str()
        );
        let regex = Regex::new(&pattern).expect("action pattern is a valid regex");
        (keyword, regex)
    })
});

/// Parsed form of an update expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSpec {
    /// `SET` clauses, e.g. `#a = :a`.
    pub set: Vec<String>,
    /// `ADD` clauses, e.g. `#c :c`.
    pub add: Vec<String>,
    /// `REMOVE` clauses, e.g. `#d`.
    pub remove: Vec<String>,
    /// `DELETE` clauses, e.g. `#e :e`.
    pub delete: Vec<String>,
}

impl UpdateSpec {
    /// Reverse-parse a raw update expression.
    ///
    /// Each action captures everything up to the next action keyword; the
    /// capture is split on commas that are not inside parentheses, so
    /// `SET #a = list_append(#a, :v), #b = :b` yields two `SET` clauses.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut spec = Self::default();
        for (keyword, regex) in ACTION_PATTERNS.iter() {
            if let Some(captured) = regex.captures(text).and_then(|c| c.get(1)) {
                *spec.clauses_mut(*keyword) = split_top_level(captured.as_str());
            }
        }
        spec
    }

    /// The clause list for `keyword`.
    #[must_use]
    pub fn clauses(&self, keyword: ActionKeyword) -> &[String] {
        match keyword {
            ActionKeyword::Set => &self.set,
            ActionKeyword::Add => &self.add,
            ActionKeyword::Remove => &self.remove,
            ActionKeyword::Delete => &self.delete,
        }
    }

    fn clauses_mut(&mut self, keyword: ActionKeyword) -> &mut Vec<String> {
        match keyword {
            ActionKeyword::Set => &mut self.set,
            ActionKeyword::Add => &mut self.add,
            ActionKeyword::Remove => &mut self.remove,
            ActionKeyword::Delete => &mut self.delete,
        }
    }

    /// Append `clause` to the list for `keyword`.
    pub fn push(&mut self, keyword: ActionKeyword, clause: impl Into<String>) {
        self.clauses_mut(keyword).push(clause.into());
    }

    /// Append every clause of `other` after the existing clauses, per action.
    pub fn extend(&mut self, other: Self) {
        self.set.extend(other.set);
        self.add.extend(other.add);
        self.remove.extend(other.remove);
        self.delete.extend(other.delete);
    }

    /// `true` when no action has any clause.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        ActionKeyword::ALL
            .iter()
            .all(|k| self.clauses(*k).is_empty())
    }

    /// Render in canonical action order, skipping empty actions.
    #[must_use]
    pub fn stringify(&self) -> String {
        ActionKeyword::ALL
            .iter()
            .filter(|k| !self.clauses(**k).is_empty())
            .map(|k| format!("{} {}", k.as_str(), self.clauses(*k).join(", ")))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for UpdateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stringify())
    }
}

/// Split on commas at parenthesis depth zero, trimming each clause.
fn split_top_level(text: &str) -> Vec<String> {
    let mut clauses = Vec::new();
    let mut depth = 0_usize;
    let mut start = 0;
    for (idx, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                clauses.push(text[start..idx].trim().to_owned());
                start = idx + 1;
            }
            _ => {}
        }
    }
    clauses.push(text[start..].trim().to_owned());
    clauses
}

/// How one attribute of an item diff is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateAction {
    /// Overwrite the attribute.
    Set(AttributeValue),
    /// Add to a number or set attribute.
    Add(AttributeValue),
    /// Remove elements from a set attribute.
    Delete(AttributeValue),
    /// Remove the attribute entirely.
    Remove,
}

impl From<AttributeValue> for UpdateAction {
    /// `NULL` and empty strings remove the attribute; anything else sets it.
    fn from(value: AttributeValue) -> Self {
        if value.is_absent() {
            Self::Remove
        } else {
            Self::Set(value)
        }
    }
}

/// An item diff lowered into update clauses and their placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SerializedUpdate {
    /// Clause lists per action.
    pub spec: UpdateSpec,
    /// `#name` placeholders.
    pub attribute_names: ExpressionAttributeNames,
    /// `:name` placeholders.
    pub attribute_values: ExpressionAttributeValues,
}

/// Lower an item diff into update clauses.
///
/// Attributes named in `key_attributes` are skipped: primary-key attributes
/// cannot be updated. Clauses keep the iteration order of `changes`.
#[must_use]
pub fn serialize_update<I, K>(changes: I, key_attributes: &[&str]) -> SerializedUpdate
where
    I: IntoIterator<Item = (K, UpdateAction)>,
    K: Into<String>,
{
    let mut out = SerializedUpdate::default();

    for (name, action) in changes {
        let name: String = name.into();
        if key_attributes.contains(&name.as_str()) {
            continue;
        }
        let name_key = format!("#{name}");
        let value_key = format!(":{name}");

        match action {
            UpdateAction::Remove => out.spec.push(ActionKeyword::Remove, name_key.clone()),
            UpdateAction::Add(v) => {
                out.spec
                    .push(ActionKeyword::Add, format!("{name_key} {value_key}"));
                out.attribute_values.insert(value_key, v);
            }
            UpdateAction::Delete(v) => {
                out.spec
                    .push(ActionKeyword::Delete, format!("{name_key} {value_key}"));
                out.attribute_values.insert(value_key, v);
            }
            UpdateAction::Set(v) => {
                out.spec
                    .push(ActionKeyword::Set, format!("{name_key} = {value_key}"));
                out.attribute_values.insert(value_key, v);
            }
        }
        out.attribute_names.insert(name_key, name);
    }

    out
}
