//! Key layout of a table and its global secondary indexes.

use std::collections::HashMap;

use dynoquery_model::AttributeValue;
use dynoquery_model::types::{Item, Key};

use crate::error::{Error, Result};

/// Key attributes of a global secondary index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexKeys {
    /// Partition key attribute of the index.
    pub hash_key: String,
    /// Sort key attribute of the index, if any.
    pub range_key: Option<String>,
}

impl IndexKeys {
    /// Create index keys.
    #[must_use]
    pub fn new(hash_key: impl Into<String>, range_key: Option<&str>) -> Self {
        Self {
            hash_key: hash_key.into(),
            range_key: range_key.map(str::to_owned),
        }
    }
}

/// Name and primary-key layout of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// Table name sent on every request.
    pub table_name: String,
    /// Partition key attribute.
    pub hash_key: String,
    /// Sort key attribute, if any.
    pub range_key: Option<String>,
    /// Global secondary indexes by name.
    pub global_indexes: HashMap<String, IndexKeys>,
}

impl TableSchema {
    /// A table keyed by `hash_key` only.
    #[must_use]
    pub fn new(table_name: impl Into<String>, hash_key: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            hash_key: hash_key.into(),
            range_key: None,
            global_indexes: HashMap::new(),
        }
    }

    /// Add a sort key.
    #[must_use]
    pub fn with_range_key(mut self, range_key: impl Into<String>) -> Self {
        self.range_key = Some(range_key.into());
        self
    }

    /// Register a global secondary index.
    #[must_use]
    pub fn with_global_index(mut self, name: impl Into<String>, keys: IndexKeys) -> Self {
        self.global_indexes.insert(name.into(), keys);
        self
    }

    /// Partition key used when querying `index`.
    ///
    /// Local indexes and unknown names share the table's partition key.
    #[must_use]
    pub fn hash_key_for(&self, index: Option<&str>) -> &str {
        index
            .and_then(|name| self.global_indexes.get(name))
            .map_or(self.hash_key.as_str(), |keys| keys.hash_key.as_str())
    }

    /// The table's primary-key attribute names.
    #[must_use]
    pub fn key_attributes(&self) -> Vec<&str> {
        std::iter::once(self.hash_key.as_str())
            .chain(self.range_key.as_deref())
            .collect()
    }

    /// Serialize a primary key from its components.
    ///
    /// The range value is ignored for tables without a sort key.
    pub fn build_key(
        &self,
        hash: impl Into<AttributeValue>,
        range: Option<AttributeValue>,
    ) -> Result<Key> {
        let mut key = Key::new();
        key.insert(self.hash_key.clone(), hash.into());
        match (&self.range_key, range) {
            (Some(name), Some(value)) => {
                key.insert(name.clone(), value);
            }
            (Some(name), None) => {
                return Err(Error::invalid_argument(format!(
                    "Missing value for range key '{name}'"
                )));
            }
            (None, _) => {}
        }
        Ok(key)
    }

    /// Extract table and global-index key attributes present in `item`.
    ///
    /// A continuation key for an index read needs the index keys as well as
    /// the table keys.
    pub fn build_key_from_item(&self, item: &Item) -> Result<Key> {
        let Some(hash) = item.get(&self.hash_key) else {
            return Err(Error::invalid_argument(format!(
                "Item is missing hash key '{}'",
                self.hash_key
            )));
        };

        let mut key = Key::new();
        key.insert(self.hash_key.clone(), hash.clone());
        if let Some(range_key) = &self.range_key {
            let Some(range) = item.get(range_key) else {
                return Err(Error::invalid_argument(format!(
                    "Item is missing range key '{range_key}'"
                )));
            };
            key.insert(range_key.clone(), range.clone());
        }

        for index in self.global_indexes.values() {
            for name in std::iter::once(&index.hash_key).chain(index.range_key.as_ref()) {
                if let Some(value) = item.get(name) {
                    key.entry(name.clone()).or_insert_with(|| value.clone());
                }
            }
        }
        Ok(key)
    }
}
