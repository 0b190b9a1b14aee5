// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed collection operations.
//!
//! Every service talks to the store through this type. It holds either a
//! real Firestore connection (production or emulator) or an in-process
//! [`MemoryStore`], and exposes the same operations for both:
//! - get / set / delete by document id
//! - filtered, ordered, windowed queries and counts
//! - atomic multi-document commits

use super::{DocId, Direction, Filter, MemoryStore, Query, Write, WriteBatch};
use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

#[derive(Clone)]
enum Backend {
    Firestore(firestore::FirestoreDb),
    Memory(Arc<MemoryStore>),
}

/// Document store client.
#[derive(Clone)]
pub struct FirestoreDb {
    backend: Backend,
}

fn db_error(e: impl std::fmt::Display) -> AppError {
    AppError::Database(e.to_string())
}

/// Firestore document ids are non-empty and may not contain `/`.
fn is_valid_doc_id(id: &str) -> bool {
    !id.is_empty() && !id.contains('/')
}

impl Direction {
    fn to_firestore(self) -> firestore::FirestoreQueryDirection {
        match self {
            Direction::Ascending => firestore::FirestoreQueryDirection::Ascending,
            Direction::Descending => firestore::FirestoreQueryDirection::Descending,
        }
    }
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create a client backed by process memory (local dev and tests).
    pub fn new_in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(MemoryStore::new())),
        }
    }

    // ─── Single Documents ────────────────────────────────────────

    /// Fetch a document by id.
    ///
    /// An id that cannot name a document (empty, or containing `/`) finds
    /// nothing rather than producing an invalid document path.
    pub async fn get<T>(&self, collection: &str, id: &str) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        if !is_valid_doc_id(id) {
            tracing::debug!(collection, id, "Lookup with unusable document id");
            return Ok(None);
        }

        match &self.backend {
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .by_id_in(collection)
                .obj()
                .one(id)
                .await
                .map_err(db_error),
            Backend::Memory(store) => store.get(collection, id),
        }
    }

    /// Create or replace a document.
    pub async fn set<T>(&self, collection: &str, id: &str, doc: &T) -> Result<(), AppError>
    where
        T: Serialize + DeserializeOwned + Sync + Send,
    {
        match &self.backend {
            Backend::Firestore(client) => {
                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collection)
                    .document_id(id)
                    .object(doc)
                    .execute()
                    .await
                    .map_err(db_error)?;
                Ok(())
            }
            Backend::Memory(store) => store.set(collection, id, doc),
        }
    }

    /// Delete a document. Deleting a missing document is not an error.
    pub async fn delete(&self, collection: &str, id: &str) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(id)
                    .execute()
                    .await
                    .map_err(db_error)?;
                Ok(())
            }
            Backend::Memory(store) => store.delete(collection, id),
        }
    }

    // ─── Queries ─────────────────────────────────────────────────

    /// Run a conjunctive query over one collection.
    pub async fn query<T>(&self, collection: &str, query: &Query) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        let client = match &self.backend {
            Backend::Firestore(client) => client,
            Backend::Memory(store) => return store.query(collection, query),
        };

        let filters = query.filters.clone();
        let mut select = client
            .fluent()
            .select()
            .from(collection)
            .filter(move |q| {
                q.for_all(filters.iter().map(|filter| match filter {
                    Filter::Eq(field, value) => q.field(field.as_str()).eq(value.clone()),
                    Filter::ArrayContains(field, value) => {
                        q.field(field.as_str()).array_contains(value.clone())
                    }
                }))
            });

        if let Some((field, direction)) = &query.order_by {
            select = select.order_by([(field.as_str(), direction.to_firestore())]);
        }
        if let Some(offset) = query.offset {
            select = select.offset(offset);
        }
        if let Some(limit) = query.limit {
            select = select.limit(limit);
        }

        select.obj().query().await.map_err(db_error)
    }

    /// Count documents matching the query's filters.
    // TODO: switch to a Firestore aggregation (COUNT) query; this reads every matching document.
    pub async fn count(&self, collection: &str, query: &Query) -> Result<u64, AppError> {
        let docs: Vec<DocId> = self.query(collection, &query.unwindowed()).await?;
        Ok(docs.len() as u64)
    }

    // ─── Atomic Batches ─────────────────────────────────────────

    /// Commit every write in the batch atomically.
    ///
    /// On Firestore this is a single transaction; the memory backend applies
    /// the writes under one lock. A patch requires its document to exist, so
    /// a batch that patches a deleted document fails as a whole.
    pub async fn commit(&self, batch: WriteBatch) -> Result<(), AppError> {
        if batch.is_empty() {
            return Ok(());
        }
        let write_count = batch.len();

        let client = match &self.backend {
            Backend::Firestore(client) => client,
            Backend::Memory(store) => return store.commit(batch.into_writes()),
        };

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        for write in batch.into_writes() {
            match write {
                Write::Set {
                    collection,
                    id,
                    doc,
                } => {
                    client
                        .fluent()
                        .update()
                        .in_col(collection)
                        .document_id(&id)
                        .object(&doc)
                        .add_to_transaction(&mut transaction)
                        .map_err(|e| {
                            AppError::Database(format!(
                                "Failed to add {} write to transaction: {}",
                                collection, e
                            ))
                        })?;
                }
                Write::Patch {
                    collection,
                    id,
                    fields,
                    doc,
                } => {
                    client
                        .fluent()
                        .update()
                        .fields(fields.iter().map(String::as_str))
                        .in_col(collection)
                        .precondition(firestore::FirestoreWritePrecondition::Exists(true))
                        .document_id(&id)
                        .object(&doc)
                        .add_to_transaction(&mut transaction)
                        .map_err(|e| {
                            AppError::Database(format!(
                                "Failed to add {} patch to transaction: {}",
                                collection, e
                            ))
                        })?;
                }
                Write::Delete { collection, id } => {
                    client
                        .fluent()
                        .delete()
                        .from(collection)
                        .document_id(&id)
                        .add_to_transaction(&mut transaction)
                        .map_err(|e| {
                            AppError::Database(format!(
                                "Failed to add {} deletion to transaction: {}",
                                collection, e
                            ))
                        })?;
                }
            }
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::debug!(writes = write_count, "Committed write batch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_id_validity() {
        assert!(is_valid_doc_id("3f0c2a"));
        assert!(!is_valid_doc_id(""));
        assert!(!is_valid_doc_id("restaurants/abc"));
    }
}
