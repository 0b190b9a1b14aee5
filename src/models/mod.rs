// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod order;
pub mod patch;
pub mod restaurant;
pub mod review;
pub mod user;

pub use order::{Order, OrderItem, OrderStatus, OrderView, PaymentResult, ShippingAddress};
pub use restaurant::{MenuItem, Restaurant, RestaurantRef};
pub use review::{RatingAggregate, Review, ReviewReply, ReviewView};
pub use user::{Address, User, UserProfile, UserRef};

/// Generate a new document id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
