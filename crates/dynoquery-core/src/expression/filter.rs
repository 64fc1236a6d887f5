//! Lowering of single conditions into expression fragments.
//!
//! A condition names an attribute path and a predicate. Lowering produces a
//! statement such as `#age BETWEEN :age AND :age_2` together with the
//! placeholder maps the statement references. Value placeholders are minted
//! against the placeholders already present in the request so that repeated
//! conditions on one attribute never collide.

use std::collections::HashMap;
use std::fmt;

use dynoquery_model::AttributeValue;
use dynoquery_model::types::{ExpressionAttributeNames, ExpressionAttributeValues};

/// Comparison and function operators of the wire expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<=`
    Le,
    /// `<`
    Lt,
    /// `>=`
    Ge,
    /// `>`
    Gt,
    /// `BETWEEN`
    Between,
    /// `IN`
    In,
    /// `begins_with`
    BeginsWith,
    /// `contains`
    Contains,
    /// `NOT contains`
    NotContains,
    /// `attribute_exists`
    AttributeExists,
    /// `attribute_not_exists`
    AttributeNotExists,
}

impl Operator {
    /// Returns the wire spelling of the operator.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Le => "<=",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Gt => ">",
            Self::Between => "BETWEEN",
            Self::In => "IN",
            Self::BeginsWith => "begins_with",
            Self::Contains => "contains",
            Self::NotContains => "NOT contains",
            Self::AttributeExists => "attribute_exists",
            Self::AttributeNotExists => "attribute_not_exists",
        }
    }

    /// Function operators render as `op(path[, :value])`.
    #[must_use]
    pub fn is_function(&self) -> bool {
        matches!(
            self,
            Self::BeginsWith
                | Self::Contains
                | Self::NotContains
                | Self::AttributeExists
                | Self::AttributeNotExists
        )
    }

    /// Operators allowed in a key-condition expression.
    #[must_use]
    pub fn is_key_condition(&self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Le | Self::Lt | Self::Ge | Self::Gt | Self::Between | Self::BeginsWith
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operator together with its operands.
///
/// The variant shape carries the operand arity: only `Between` has a second
/// operand, only `In` has a list, and `Exists` carries the existence intent
/// instead of a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `path = v`
    Eq(AttributeValue),
    /// `path <> v`
    Ne(AttributeValue),
    /// `path < v`
    Lt(AttributeValue),
    /// `path <= v`
    Le(AttributeValue),
    /// `path > v`
    Gt(AttributeValue),
    /// `path >= v`
    Ge(AttributeValue),
    /// `path BETWEEN lo AND hi`
    Between(AttributeValue, AttributeValue),
    /// `path IN (v1, v2, ...)`
    In(Vec<AttributeValue>),
    /// `begins_with(path, v)`
    BeginsWith(AttributeValue),
    /// `contains(path, v)`
    Contains(AttributeValue),
    /// `NOT contains(path, v)`
    NotContains(AttributeValue),
    /// `attribute_exists(path)` when `true`, `attribute_not_exists(path)` when
    /// `false`.
    Exists(bool),
}

impl Predicate {
    /// The operator this predicate lowers to.
    #[must_use]
    pub fn operator(&self) -> Operator {
        match self {
            Self::Eq(_) => Operator::Eq,
            Self::Ne(_) => Operator::Ne,
            Self::Lt(_) => Operator::Lt,
            Self::Le(_) => Operator::Le,
            Self::Gt(_) => Operator::Gt,
            Self::Ge(_) => Operator::Ge,
            Self::Between(..) => Operator::Between,
            Self::In(_) => Operator::In,
            Self::BeginsWith(_) => Operator::BeginsWith,
            Self::Contains(_) => Operator::Contains,
            Self::NotContains(_) => Operator::NotContains,
            Self::Exists(true) => Operator::AttributeExists,
            Self::Exists(false) => Operator::AttributeNotExists,
        }
    }
}

/// A lowered condition: the statement and every placeholder it references.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    /// Statement text, unparenthesized.
    pub statement: String,
    /// `#name` placeholders to attribute names.
    pub attribute_names: ExpressionAttributeNames,
    /// `:value` placeholders to values.
    pub attribute_values: ExpressionAttributeValues,
}

/// One attribute path constrained by one predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Dot-separated attribute path.
    pub path: String,
    /// The predicate applied to the path.
    pub predicate: Predicate,
}

impl Condition {
    /// Create a condition.
    #[must_use]
    pub fn new(path: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            path: path.into(),
            predicate,
        }
    }

    /// Lower into a fragment, minting value placeholders that do not collide
    /// with `existing`.
    #[must_use]
    pub fn to_fragment(&self, existing: &ExpressionAttributeValues) -> Fragment {
        build_filter_expression(&self.path, &self.predicate, existing)
    }
}

/// Lower `path` and `predicate` into a [`Fragment`].
///
/// Each dot-separated path segment gets its own `#segment` placeholder, so
/// `data.attr` addresses `#data.#attr`. Value placeholders derive from the
/// whole path (`:data_attr`) and take a `_2`, `_3`, ... suffix until they are
/// absent from `existing`.
#[must_use]
pub fn build_filter_expression(
    path: &str,
    predicate: &Predicate,
    existing: &ExpressionAttributeValues,
) -> Fragment {
    let segments: Vec<&str> = path.split('.').collect();
    let path_expr = segments
        .iter()
        .map(|s| format!("#{}", sanitize(s)))
        .collect::<Vec<_>>()
        .join(".");
    let attribute_names = segments
        .iter()
        .map(|s| (format!("#{}", sanitize(s)), (*s).to_owned()))
        .collect();

    let mut attribute_values = HashMap::new();
    let mut mint = |value: &AttributeValue| {
        let placeholder =
            unique_value_placeholder(path, |p| existing.contains_key(p) || attribute_values.contains_key(p));
        attribute_values.insert(placeholder.clone(), value.clone());
        placeholder
    };

    let operator = predicate.operator();
    let statement = match predicate {
        Predicate::Exists(_) => format!("{operator}({path_expr})"),
        Predicate::Between(lo, hi) => {
            let lo = mint(lo);
            let hi = mint(hi);
            format!("{path_expr} BETWEEN {lo} AND {hi}")
        }
        Predicate::In(values) => {
            let placeholders: Vec<String> = values.iter().map(&mut mint).collect();
            format!("{path_expr} IN ({})", placeholders.join(", "))
        }
        Predicate::BeginsWith(v) | Predicate::Contains(v) | Predicate::NotContains(v) => {
            let v = mint(v);
            format!("{operator}({path_expr}, {v})")
        }
        Predicate::Eq(v)
        | Predicate::Ne(v)
        | Predicate::Lt(v)
        | Predicate::Le(v)
        | Predicate::Gt(v)
        | Predicate::Ge(v) => {
            let v = mint(v);
            format!("{path_expr} {operator} {v}")
        }
    };

    Fragment {
        statement,
        attribute_names,
        attribute_values,
    }
}

/// Mint `:base`, `:base_2`, `:base_3`, ... for `path`, returning the first
/// candidate for which `is_taken` is false.
#[must_use]
pub fn unique_value_placeholder(path: &str, is_taken: impl Fn(&str) -> bool) -> String {
    let base = sanitize(&path.replace('.', "_"));
    let mut candidate = format!(":{base}");
    let mut idx = 1;
    while is_taken(&candidate) {
        idx += 1;
        candidate = format!(":{base}_{idx}");
    }
    candidate
}

/// Strip every character that cannot appear in a placeholder identifier.
fn sanitize(segment: &str) -> String {
    segment
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}
