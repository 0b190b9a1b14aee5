// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store used for local development and tests.
//!
//! Documents are kept as `serde_json::Value` objects so the query
//! semantics (field equality, array membership, ordering, windowing)
//! match what the Firestore backend does with the same serialized shape.

use super::{Direction, Filter, Query, Write};
use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

type Collections = HashMap<String, BTreeMap<String, Value>>;

/// Memory-backed collections. A single lock makes batch commits atomic.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collections>, AppError> {
        self.collections
            .read()
            .map_err(|_| AppError::Database("Memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>, AppError> {
        self.collections
            .write()
            .map_err(|_| AppError::Database("Memory store lock poisoned".to_string()))
    }

    pub fn get<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<Option<T>, AppError> {
        let guard = self.read()?;
        guard
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|doc| from_document(doc.clone()))
            .transpose()
    }

    pub fn set<T: Serialize>(&self, collection: &str, id: &str, doc: &T) -> Result<(), AppError> {
        let value = super::to_document(doc)?;
        let mut guard = self.write()?;
        guard
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), value);
        Ok(())
    }

    pub fn delete(&self, collection: &str, id: &str) -> Result<(), AppError> {
        let mut guard = self.write()?;
        if let Some(docs) = guard.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    pub fn query<T: DeserializeOwned>(&self, collection: &str, query: &Query) -> Result<Vec<T>, AppError> {
        let guard = self.read()?;
        let Some(docs) = guard.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<&Value> = docs
            .values()
            .filter(|doc| query.filters.iter().all(|f| matches_filter(doc, f)))
            .collect();

        if let Some((field, direction)) = &query.order_by {
            // Firestore omits documents that lack the ordering field.
            matched.retain(|doc| doc.get(field).is_some_and(|v| !v.is_null()));
            matched.sort_by(|a, b| {
                let ord = compare_values(&a[field.as_str()], &b[field.as_str()]);
                match direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }

        let offset = query.offset.unwrap_or(0) as usize;
        let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);

        matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|doc| from_document(doc.clone()))
            .collect()
    }

    /// Apply every write under one lock acquisition.
    ///
    /// Nothing is applied if a patch targets a missing document.
    pub fn commit(&self, writes: Vec<Write>) -> Result<(), AppError> {
        let mut guard = self.write()?;
        for write in &writes {
            if let Write::Patch { collection, id, .. } = write {
                let exists = guard.get(*collection).is_some_and(|docs| docs.contains_key(id));
                if !exists {
                    return Err(AppError::Database(format!(
                        "Patch target {}/{} does not exist",
                        collection, id
                    )));
                }
            }
        }
        for write in writes {
            apply(&mut guard, write);
        }
        Ok(())
    }
}

fn apply(collections: &mut Collections, write: Write) {
    match write {
        Write::Set { collection, id, doc } => {
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(id, doc);
        }
        Write::Patch {
            collection,
            id,
            fields,
            doc,
        } => {
            let Some(target) = collections
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(&id))
            else {
                return;
            };
            if let (Value::Object(target), Value::Object(source)) = (target, doc) {
                for field in fields {
                    match source.get(&field) {
                        Some(value) => {
                            target.insert(field, value.clone());
                        }
                        None => {
                            target.remove(&field);
                        }
                    }
                }
            }
        }
        Write::Delete { collection, id } => {
            if let Some(docs) = collections.get_mut(collection) {
                docs.remove(&id);
            }
        }
    }
}

fn matches_filter(doc: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::Eq(field, expected) => doc.get(field).and_then(Value::as_str) == Some(expected.as_str()),
        Filter::ArrayContains(field, expected) => doc
            .get(field)
            .and_then(Value::as_array)
            .is_some_and(|values| values.iter().any(|v| v.as_str() == Some(expected.as_str()))),
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn from_document<T: DeserializeOwned>(doc: Value) -> Result<T, AppError> {
    serde_json::from_value(doc)
        .map_err(|e| AppError::Database(format!("Failed to decode document: {}", e)))
}
