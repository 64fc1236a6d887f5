//! Query construction and pagination engine for dynoquery.
//!
//! A [`Table`] pairs a [`StoreClient`] transport with a [`TableSchema`] and
//! hands out request builders: [`Query`], [`Scan`], [`ParallelScan`], batch
//! gets and conditional writes. Builders accumulate expression fragments with
//! collision-free placeholders; executing them drives the pagination loop,
//! retrying transient store errors and optionally pacing reads against a
//! capacity budget.
#![allow(missing_docs, clippy::doc_markdown, clippy::module_name_repetitions)]

pub mod batch;
pub mod client;
pub mod condition;
pub mod config;
pub mod error;
pub mod expression;
pub mod paginate;
pub mod rate_limit;
pub mod request;
pub mod retry;
pub mod schema;
pub mod table;
pub mod write;

#[cfg(test)]
mod testing;

pub use batch::{BatchGet, BatchGetOptions};
pub use client::StoreClient;
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use expression::{Condition, Predicate, UpdateAction};
pub use paginate::Page;
pub use request::{ParallelScan, Query, ReadRequest, Scan};
pub use schema::{IndexKeys, TableSchema};
pub use table::Table;
pub use write::{CreateOptions, UpdateOptions};
