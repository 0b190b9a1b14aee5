// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Food ordering API: restaurants, menus, orders and reviews
//!
//! This crate provides the backend for a food delivery storefront. Restaurant
//! ratings are derived from reviews and kept consistent with them.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{CatalogService, KeyedLocks, OrderService, ReviewService, UserService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub users: UserService,
    pub catalog: CatalogService,
    pub orders: OrderService,
    pub reviews: ReviewService,
}

impl AppState {
    /// Wire every service to one database client.
    pub fn new(config: Config, db: FirestoreDb) -> Self {
        let restaurant_locks = KeyedLocks::default();

        Self {
            users: UserService::new(db.clone(), config.clone()),
            catalog: CatalogService::new(db.clone(), restaurant_locks.clone()),
            orders: OrderService::new(db.clone()),
            reviews: ReviewService::new(db.clone(), restaurant_locks),
            config,
            db,
        }
    }
}
