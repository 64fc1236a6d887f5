//! Store operation enum.

use std::fmt;

/// Store operations issued by this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// Put (insert or replace) an item, optionally conditional.
    PutItem,
    /// Update an item by update expression.
    UpdateItem,
    /// Query items by key condition.
    Query,
    /// Scan a table or one segment of it.
    Scan,
    /// Batch get items by primary key.
    BatchGetItem,
}

impl StoreOperation {
    /// Returns the wire operation name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PutItem => "PutItem",
            Self::UpdateItem => "UpdateItem",
            Self::Query => "Query",
            Self::Scan => "Scan",
            Self::BatchGetItem => "BatchGetItem",
        }
    }
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
