// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running and
//! `FIRESTORE_EMULATOR_HOST` to point at it; otherwise they are skipped.
//!
//! Every test works on freshly generated document IDs, so runs against a
//! long-lived emulator do not interfere with each other.

use food_order_api::db::{collections, Direction, Query, WriteBatch};
use food_order_api::models::{new_id, Order, OrderStatus, RatingAggregate, Restaurant, Review, User};

mod common;
use common::{test_address, test_db, ts};

fn test_user(email: &str) -> User {
    User {
        id: new_id(),
        name: "Test User".to_string(),
        email: email.to_string(),
        password_hash: "hash".to_string(),
        phone: "555-0100".to_string(),
        address: None,
        is_admin: false,
        favorites: vec![],
        created_at: ts(0),
        updated_at: ts(0),
    }
}

fn test_restaurant() -> Restaurant {
    Restaurant {
        id: new_id(),
        name: "Emulator Eats".to_string(),
        description: None,
        cuisine: vec!["thai".to_string(), "noodles".to_string()],
        address: None,
        phone: None,
        email: None,
        opening_hours: None,
        rating: 0.0,
        num_reviews: 0,
        delivery_time: None,
        minimum_order: None,
        delivery_fee: Some(1.5),
        images: vec![],
        menu: vec![],
        is_active: true,
        created_at: ts(0),
        updated_at: ts(0),
    }
}

fn test_order(user_id: &str, restaurant_id: &str, created_at: String) -> Order {
    Order {
        id: new_id(),
        user: user_id.to_string(),
        restaurant: restaurant_id.to_string(),
        order_items: vec![],
        shipping_address: test_address(),
        payment_method: "card".to_string(),
        payment_result: None,
        items_price: 10.0,
        delivery_fee: 1.5,
        total_price: 11.5,
        status: OrderStatus::Pending,
        delivered_at: None,
        rider: None,
        special_instructions: None,
        created_at: created_at.clone(),
        updated_at: created_at,
    }
}

fn test_review(user_id: &str, restaurant_id: &str, rating: u8) -> Review {
    Review {
        id: new_id(),
        user: user_id.to_string(),
        restaurant: restaurant_id.to_string(),
        rating,
        comment: "Fine".to_string(),
        order: new_id(),
        images: vec![],
        likes: vec![],
        reply: None,
        created_at: ts(0),
        updated_at: ts(0),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// DOCUMENT CRUD
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_user_roundtrip_and_delete() {
    require_emulator!();

    let db = test_db().await;
    let email = format!("{}@example.com", new_id());
    let user = test_user(&email);

    let before: Option<User> = db.get(collections::USERS, &user.id).await.unwrap();
    assert!(before.is_none(), "User should not exist before creation");

    db.set(collections::USERS, &user.id, &user).await.unwrap();
    let fetched: User = db
        .get(collections::USERS, &user.id)
        .await
        .unwrap()
        .expect("User should exist after creation");
    assert_eq!(fetched.email, email);
    assert_eq!(fetched.password_hash, "hash");

    let by_email: Vec<User> = db
        .query(collections::USERS, &Query::new().eq("email", email.as_str()))
        .await
        .unwrap();
    assert_eq!(by_email.len(), 1);

    db.delete(collections::USERS, &user.id).await.unwrap();
    let after: Option<User> = db.get(collections::USERS, &user.id).await.unwrap();
    assert!(after.is_none());
}

#[tokio::test]
async fn test_unusable_ids_find_nothing() {
    require_emulator!();

    let db = test_db().await;
    for id in ["", "restaurants/abc", "a/b/c"] {
        let found: Option<Restaurant> = db.get(collections::RESTAURANTS, id).await.unwrap();
        assert!(found.is_none(), "id {:?} should find nothing", id);
    }
}

#[tokio::test]
async fn test_patch_on_missing_document_fails() {
    require_emulator!();

    let db = test_db().await;
    let missing_id = new_id();

    let mut batch = WriteBatch::new();
    batch
        .patch(
            collections::RESTAURANTS,
            &missing_id,
            &["rating", "numReviews"],
            &RatingAggregate::default(),
        )
        .unwrap();
    assert!(db.commit(batch).await.is_err());

    let stub: Option<Restaurant> =
        db.get(collections::RESTAURANTS, &missing_id).await.unwrap();
    assert!(stub.is_none());
}

#[tokio::test]
async fn test_cuisine_array_contains() {
    require_emulator!();

    let db = test_db().await;
    let restaurant = test_restaurant();
    db.set(collections::RESTAURANTS, &restaurant.id, &restaurant)
        .await
        .unwrap();

    let matches: Vec<Restaurant> = db
        .query(
            collections::RESTAURANTS,
            &Query::new().array_contains("cuisine", "noodles"),
        )
        .await
        .unwrap();
    assert!(matches.iter().any(|r| r.id == restaurant.id));

    db.delete(collections::RESTAURANTS, &restaurant.id).await.unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════
// QUERIES AND COUNTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_orders_newest_first_with_window() {
    require_emulator!();

    let db = test_db().await;
    let user_id = new_id();
    let restaurant_id = new_id();
    for i in 0..5 {
        let order = test_order(&user_id, &restaurant_id, ts(i));
        db.set(collections::ORDERS, &order.id, &order).await.unwrap();
    }

    let query = Query::new().eq("user", user_id.as_str());
    assert_eq!(db.count(collections::ORDERS, &query).await.unwrap(), 5);

    let window: Vec<Order> = db
        .query(
            collections::ORDERS,
            &query
                .clone()
                .order_by("createdAt", Direction::Descending)
                .offset(1)
                .limit(2),
        )
        .await
        .unwrap();
    let created: Vec<&str> = window.iter().map(|o| o.created_at.as_str()).collect();
    assert_eq!(created, [ts(3), ts(2)]);
}

// ═══════════════════════════════════════════════════════════════════════════
// BATCHED WRITES
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_review_and_rating_commit_together() {
    require_emulator!();

    let db = test_db().await;
    let restaurant = test_restaurant();
    db.set(collections::RESTAURANTS, &restaurant.id, &restaurant)
        .await
        .unwrap();

    let review = test_review(&new_id(), &restaurant.id, 4);
    let aggregate = RatingAggregate::from_reviews([&review]);

    let mut batch = WriteBatch::new();
    batch.set(collections::REVIEWS, &review.id, &review).unwrap();
    batch
        .patch(
            collections::RESTAURANTS,
            &restaurant.id,
            &["rating", "numReviews"],
            &aggregate,
        )
        .unwrap();
    db.commit(batch).await.unwrap();

    let stored: Restaurant = db
        .get(collections::RESTAURANTS, &restaurant.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.rating, 4.0);
    assert_eq!(stored.num_reviews, 1);
    // Fields outside the mask are untouched
    assert_eq!(stored.name, "Emulator Eats");
    assert_eq!(stored.delivery_fee, Some(1.5));

    let saved: Option<Review> = db.get(collections::REVIEWS, &review.id).await.unwrap();
    assert!(saved.is_some());
}

#[tokio::test]
async fn test_batch_delete_and_patch() {
    require_emulator!();

    let db = test_db().await;
    let restaurant = test_restaurant();
    let review = test_review(&new_id(), &restaurant.id, 2);
    db.set(collections::RESTAURANTS, &restaurant.id, &restaurant)
        .await
        .unwrap();
    db.set(collections::REVIEWS, &review.id, &review).await.unwrap();

    let mut batch = WriteBatch::new();
    batch.delete(collections::REVIEWS, &review.id);
    batch
        .patch(
            collections::RESTAURANTS,
            &restaurant.id,
            &["rating", "numReviews"],
            &RatingAggregate::default(),
        )
        .unwrap();
    db.commit(batch).await.unwrap();

    let gone: Option<Review> = db.get(collections::REVIEWS, &review.id).await.unwrap();
    assert!(gone.is_none());

    let remaining = db
        .count(
            collections::REVIEWS,
            &Query::new().eq("restaurant", restaurant.id.as_str()),
        )
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}
