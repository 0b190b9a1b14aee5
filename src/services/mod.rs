// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod catalog;
pub mod orders;
pub mod reviews;
pub mod users;

pub use catalog::CatalogService;
pub use orders::OrderService;
pub use reviews::ReviewService;
pub use users::UserService;

use crate::db::FirestoreDb;
use crate::error::AppError;
use dashmap::DashMap;
use futures_util::future::try_join_all;
use serde::de::DeserializeOwned;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Async locks keyed by document id.
///
/// The restaurant map is shared by the catalog and review services: every
/// write to a restaurant document, and every rating recomputation, runs
/// under that restaurant's lock.
pub type KeyedLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// The lock for `key`, created on first use.
pub(crate) fn lock_for(locks: &KeyedLocks, key: &str) -> Arc<Mutex<()>> {
    locks
        .entry(key.to_string())
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}

/// Fetch the distinct documents referenced by `ids`, keyed by id.
///
/// Ids whose document no longer exists are absent from the map.
pub(crate) async fn fetch_by_ids<'a, T, I>(
    db: &FirestoreDb,
    collection: &str,
    ids: I,
) -> Result<HashMap<String, T>, AppError>
where
    T: DeserializeOwned + Send,
    I: IntoIterator<Item = &'a str>,
{
    let ids: BTreeSet<&str> = ids.into_iter().collect();

    let docs = try_join_all(ids.iter().map(|id| db.get::<T>(collection, id))).await?;

    Ok(ids
        .into_iter()
        .zip(docs)
        .filter_map(|(id, doc)| doc.map(|doc| (id.to_string(), doc)))
        .collect())
}
