//! Database layer (Firestore, with an in-process fallback).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const RESTAURANTS: &str = "restaurants";
    pub const ORDERS: &str = "orders";
    pub const REVIEWS: &str = "reviews";
}

/// Sort direction for [`Query::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A single predicate on a top-level document field.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `field == value`
    Eq(String, String),
    /// `value` is an element of the array stored in `field`
    ArrayContains(String, String),
}

/// Conjunctive query over one collection.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<String>) -> Self {
        self.filters.push(Filter::Eq(field.to_string(), value.into()));
        self
    }

    pub fn array_contains(mut self, field: &str, value: impl Into<String>) -> Self {
        self.filters
            .push(Filter::ArrayContains(field.to_string(), value.into()));
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some((field.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Same filters, no ordering or windowing. Used for counting.
    pub fn unwindowed(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            ..Self::default()
        }
    }
}

/// Minimal projection used when only the document count matters.
#[derive(Debug, Deserialize)]
pub(crate) struct DocId {
    #[allow(dead_code)]
    pub id: String,
}

/// One write inside a [`WriteBatch`].
#[derive(Debug, Clone)]
pub enum Write {
    /// Create or replace the whole document.
    Set {
        collection: &'static str,
        id: String,
        doc: serde_json::Value,
    },
    /// Overwrite only the listed top-level fields.
    Patch {
        collection: &'static str,
        id: String,
        fields: Vec<String>,
        doc: serde_json::Value,
    },
    Delete {
        collection: &'static str,
        id: String,
    },
}

/// Writes committed together by [`FirestoreDb::commit`].
#[derive(Debug, Default)]
pub struct WriteBatch {
    writes: Vec<Write>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T: Serialize>(
        &mut self,
        collection: &'static str,
        id: &str,
        doc: &T,
    ) -> Result<(), AppError> {
        self.writes.push(Write::Set {
            collection,
            id: id.to_string(),
            doc: to_document(doc)?,
        });
        Ok(())
    }

    pub fn patch<T: Serialize>(
        &mut self,
        collection: &'static str,
        id: &str,
        fields: &[&str],
        doc: &T,
    ) -> Result<(), AppError> {
        self.writes.push(Write::Patch {
            collection,
            id: id.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            doc: to_document(doc)?,
        });
        Ok(())
    }

    pub fn delete(&mut self, collection: &'static str, id: &str) {
        self.writes.push(Write::Delete {
            collection,
            id: id.to_string(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn into_writes(self) -> Vec<Write> {
        self.writes
    }
}

/// Serialize a typed document into its stored JSON shape.
pub(crate) fn to_document<T: Serialize>(doc: &T) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(doc)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize document: {}", e)))
}
