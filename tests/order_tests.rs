// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Order placement, visibility and status changes.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;
use common::{create_test_app, seed_order, seed_restaurant, seed_user, send, test_address, ts};

fn order_body(restaurant_id: &str) -> Value {
    json!({
        "restaurant": restaurant_id,
        "orderItems": [{"name": "Pad Thai", "qty": 1, "price": 11.0, "item": "m1"}],
        "shippingAddress": test_address(),
        "paymentMethod": "card",
        "itemsPrice": 11.0,
        "deliveryFee": 2.5,
        "totalPrice": 99.0,
        "specialInstructions": "Ring twice"
    })
}

#[tokio::test]
async fn test_create_order() {
    let (app, state) = create_test_app();
    let (user, token) = seed_user(&state, "Ada", false).await;
    let restaurant = seed_restaurant(&state, "Thai Garden", &["thai"], 4.0).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(&token),
        Some(order_body(&restaurant.id)),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"], user.id);
    assert_eq!(body["status"], "Pending");
    // Client totals are stored as sent
    assert_eq!(body["totalPrice"], 99.0);
    assert_eq!(body["specialInstructions"], "Ring twice");
    assert!(body.get("deliveredAt").is_none());
}

#[tokio::test]
async fn test_empty_items_checked_before_restaurant() {
    let (app, state) = create_test_app();
    let (_, token) = seed_user(&state, "Ada", false).await;

    let mut body = order_body("missing");
    body["orderItems"] = json!([]);
    let (status, response) = send(&app, Method::POST, "/api/orders", Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "No order items");

    // Without the field the restaurant check decides
    let mut body = order_body("missing");
    body.as_object_mut().unwrap().remove("orderItems");
    let (status, _) = send(&app, Method::POST, "/api/orders", Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_restaurant_field_not_found() {
    let (app, state) = create_test_app();
    let (_, token) = seed_user(&state, "Ada", false).await;

    let mut body = order_body("unused");
    body.as_object_mut().unwrap().remove("restaurant");
    let (status, response) =
        send(&app, Method::POST, "/api/orders", Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["message"], "Restaurant not found");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(&token),
        Some(order_body("restaurants/abc")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_body_is_json_bad_request() {
    let (app, state) = create_test_app();
    let (_, token) = seed_user(&state, "Ada", false).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(&token),
        Some(json!({"orderItems": "not-a-list"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/orders")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_missing_order_items_accepted() {
    let (app, state) = create_test_app();
    let (_, token) = seed_user(&state, "Ada", false).await;
    let restaurant = seed_restaurant(&state, "Thai Garden", &["thai"], 4.0).await;

    let mut body = order_body(&restaurant.id);
    body.as_object_mut().unwrap().remove("orderItems");
    let (status, order) = send(&app, Method::POST, "/api/orders", Some(&token), Some(body)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["orderItems"], json!([]));
}

#[tokio::test]
async fn test_get_order_visibility() {
    let (app, state) = create_test_app();
    let (owner, owner_token) = seed_user(&state, "Owner", false).await;
    let (_, other_token) = seed_user(&state, "Other", false).await;
    let (_, admin_token) = seed_user(&state, "Boss", true).await;
    let restaurant = seed_restaurant(&state, "Thai Garden", &["thai"], 4.0).await;
    let order = seed_order(&state, &owner.id, &restaurant.id, ts(1)).await;
    let uri = format!("/api/orders/{}", order.id);

    let (status, body) = send(&app, Method::GET, &uri, Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userDetail"]["name"], "Owner");
    assert_eq!(body["userDetail"]["email"], owner.email);
    assert_eq!(body["restaurantDetail"]["name"], "Thai Garden");

    let (status, body) = send(&app, Method::GET, &uri, Some(&other_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Order not found");

    let (status, _) = send(&app, Method::GET, &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_status() {
    let (app, state) = create_test_app();
    let (owner, owner_token) = seed_user(&state, "Owner", false).await;
    let (_, admin_token) = seed_user(&state, "Boss", true).await;
    let restaurant = seed_restaurant(&state, "Thai Garden", &["thai"], 4.0).await;
    let order = seed_order(&state, &owner.id, &restaurant.id, ts(1)).await;
    let uri = format!("/api/orders/{}", order.id);

    // Missing order is reported before the admin check
    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/orders/missing",
        Some(&owner_token),
        Some(json!({"status": "Confirmed"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&owner_token),
        Some(json!({"status": "Confirmed"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&admin_token),
        Some(json!({"status": "Out for Delivery"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Out for Delivery");
    assert!(body.get("deliveredAt").is_none());

    // Empty status keeps the current one
    let (_, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&admin_token),
        Some(json!({"status": ""})),
    )
    .await;
    assert_eq!(body["status"], "Out for Delivery");

    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&admin_token),
        Some(json!({"status": "Teleported"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&admin_token),
        Some(json!({"status": "Delivered"})),
    )
    .await;
    assert_eq!(body["status"], "Delivered");
    assert!(body["deliveredAt"].is_string());

    // No transition table: a delivered order can go back to Pending
    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&admin_token),
        Some(json!({"status": "Pending"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Pending");
}

#[tokio::test]
async fn test_my_orders_newest_first() {
    let (app, state) = create_test_app();
    let (owner, owner_token) = seed_user(&state, "Owner", false).await;
    let (other, _) = seed_user(&state, "Other", false).await;
    let restaurant = seed_restaurant(&state, "Thai Garden", &["thai"], 4.0).await;
    let older = seed_order(&state, &owner.id, &restaurant.id, ts(1)).await;
    let newer = seed_order(&state, &owner.id, &restaurant.id, ts(2)).await;
    seed_order(&state, &other.id, &restaurant.id, ts(3)).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/orders/myorders",
        Some(&owner_token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["id"], newer.id);
    assert_eq!(orders[1]["id"], older.id);
    assert_eq!(orders[0]["restaurantDetail"]["name"], "Thai Garden");
    assert!(orders[0].get("userDetail").is_none());
}

#[tokio::test]
async fn test_all_orders_paginated() {
    let (app, state) = create_test_app();
    let (owner, owner_token) = seed_user(&state, "Owner", false).await;
    let (_, admin_token) = seed_user(&state, "Boss", true).await;
    let restaurant = seed_restaurant(&state, "Thai Garden", &["thai"], 4.0).await;
    for i in 0..21 {
        seed_order(&state, &owner.id, &restaurant.id, ts(i)).await;
    }

    let (status, _) = send(&app, Method::GET, "/api/orders", Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, first) = send(&app, Method::GET, "/api/orders", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["items"].as_array().unwrap().len(), 20);
    assert_eq!(first["pages"], 2);
    assert_eq!(first["items"][0]["createdAt"], ts(20));
    assert_eq!(first["items"][0]["userDetail"]["name"], "Owner");
    assert!(first["items"][0]["userDetail"].get("email").is_none());

    let (_, second) = send(
        &app,
        Method::GET,
        "/api/orders?page=2",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(second["items"].as_array().unwrap().len(), 1);
    assert_eq!(second["items"][0]["createdAt"], ts(0));
}

#[tokio::test]
async fn test_restaurant_orders() {
    let (app, state) = create_test_app();
    let (owner, owner_token) = seed_user(&state, "Owner", false).await;
    let (_, admin_token) = seed_user(&state, "Boss", true).await;
    let thai = seed_restaurant(&state, "Thai Garden", &["thai"], 4.0).await;
    let pizza = seed_restaurant(&state, "Pizza Place", &["pizza"], 4.0).await;
    seed_order(&state, &owner.id, &thai.id, ts(1)).await;
    seed_order(&state, &owner.id, &pizza.id, ts(2)).await;

    // Existence is checked before the admin check
    let (status, _) = send(
        &app,
        Method::GET,
        "/api/orders/restaurant/missing",
        Some(&owner_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/orders/restaurant/{}", thai.id);
    let (status, _) = send(&app, Method::GET, &uri, Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, Method::GET, &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["restaurant"], thai.id);
    assert_eq!(body["items"][0]["userDetail"]["name"], "Owner");
    assert_eq!(body["pages"], 1);
}
