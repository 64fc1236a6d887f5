//! Wire expression construction.
//!
//! Two halves: [`filter`] lowers one attribute condition into a statement
//! fragment with collision-free placeholders, and [`update`] parses and
//! renders the `SET`/`ADD`/`REMOVE`/`DELETE` update-expression language.

pub mod filter;
pub mod update;

pub use filter::{
    Condition, Fragment, Operator, Predicate, build_filter_expression, unique_value_placeholder,
};
pub use update::{ActionKeyword, SerializedUpdate, UpdateAction, UpdateSpec, serialize_update};
