//! Wire model types for the dynoquery client.
//!
//! These types mirror the store's JSON protocol: PascalCase field names,
//! single-key tagged `AttributeValue` objects and `__type`-coded errors. They
//! are hand-written because serde derives cover the protocol directly.
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
#![allow(missing_docs)]

pub mod attribute_value;
pub mod error;
pub mod input;
pub mod operations;
pub mod output;
pub mod types;

pub use attribute_value::AttributeValue;
pub use error::{StoreError, StoreErrorCode};
pub use operations::StoreOperation;
pub use types::{Item, Key};
