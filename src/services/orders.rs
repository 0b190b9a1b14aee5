// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Order placement, lookup and status changes.

use super::fetch_by_ids;
use crate::db::{collections, Direction, FirestoreDb, Query};
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{
    new_id, Order, OrderItem, OrderStatus, OrderView, Restaurant, RestaurantRef, ShippingAddress,
    User, UserRef,
};
use crate::pagination::{offset_for, Page, ORDERS_PAGE_SIZE};
use crate::time_utils::now_rfc3339;
use serde::Deserialize;
use std::collections::HashMap;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub restaurant: String,
    /// `None` when the field is absent, which is accepted
    pub order_items: Option<Vec<OrderItem>>,
    #[validate(required(message = "Shipping address is required"))]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Payment method is required"))]
    pub payment_method: String,
    #[serde(default)]
    pub items_price: f64,
    #[serde(default)]
    pub delivery_fee: f64,
    #[serde(default)]
    pub total_price: f64,
    pub special_instructions: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

/// Which user fields an order listing joins in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UserJoin {
    Skip,
    NameOnly,
    WithEmail,
}

/// Orders backed by the `orders` collection.
#[derive(Clone)]
pub struct OrderService {
    db: FirestoreDb,
}

impl OrderService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Place an order. Prices are stored as supplied by the client.
    pub async fn create(&self, user_id: &str, req: CreateOrderRequest) -> Result<Order> {
        if req.order_items.as_ref().is_some_and(Vec::is_empty) {
            return Err(AppError::BadRequest("No order items".to_string()));
        }

        let restaurant: Option<Restaurant> =
            self.db.get(collections::RESTAURANTS, &req.restaurant).await?;
        if restaurant.is_none() {
            return Err(AppError::NotFound("Restaurant not found".to_string()));
        }

        req.validate()?;
        let shipping_address = req
            .shipping_address
            .ok_or_else(|| AppError::BadRequest("Shipping address is required".to_string()))?;

        let now = now_rfc3339();
        let order = Order {
            id: new_id(),
            user: user_id.to_string(),
            restaurant: req.restaurant,
            order_items: req.order_items.unwrap_or_default(),
            shipping_address,
            payment_method: req.payment_method,
            payment_result: None,
            items_price: req.items_price,
            delivery_fee: req.delivery_fee,
            total_price: req.total_price,
            status: OrderStatus::Pending,
            delivered_at: None,
            rider: None,
            special_instructions: req.special_instructions,
            created_at: now.clone(),
            updated_at: now,
        };

        self.db.set(collections::ORDERS, &order.id, &order).await?;
        tracing::info!(
            order_id = %order.id,
            user_id,
            restaurant_id = %order.restaurant,
            total_price = order.total_price,
            "Order placed"
        );

        Ok(order)
    }

    /// Fetch one order. Someone else's order looks the same as a missing one.
    pub async fn get(&self, id: &str, requester: &AuthUser) -> Result<OrderView> {
        let order = self.find(id).await?;
        if !requester.can_access(&order.user) {
            tracing::debug!(order_id = id, user_id = %requester.user_id, "Order hidden from non-owner");
            return Err(not_found());
        }

        let mut views = self.join(vec![order], UserJoin::WithEmail, true).await?;
        views.pop().ok_or_else(not_found)
    }

    /// Set a new status (admins only). Any status may follow any other.
    pub async fn update_status(
        &self,
        id: &str,
        requester: &AuthUser,
        req: UpdateStatusRequest,
    ) -> Result<Order> {
        let mut order = self.find(id).await?;
        if !requester.is_admin {
            return Err(AppError::Unauthorized("Not authorized".to_string()));
        }

        if let Some(raw) = req.status.filter(|s| !s.is_empty()) {
            let status: OrderStatus = raw.parse().map_err(AppError::BadRequest)?;
            order.status = status;
            if status == OrderStatus::Delivered {
                order.delivered_at = Some(now_rfc3339());
            }
        }
        order.updated_at = now_rfc3339();

        self.db.set(collections::ORDERS, &order.id, &order).await?;
        tracing::info!(order_id = %order.id, status = %order.status, "Order status updated");

        Ok(order)
    }

    /// The caller's orders, newest first, with restaurant names.
    pub async fn list_mine(&self, user_id: &str) -> Result<Vec<OrderView>> {
        let orders: Vec<Order> = self
            .db
            .query(
                collections::ORDERS,
                &Query::new()
                    .eq("user", user_id)
                    .order_by("createdAt", Direction::Descending),
            )
            .await?;

        self.join(orders, UserJoin::Skip, true).await
    }

    /// Every order, newest first (admin view).
    pub async fn list_all(&self, page: u32) -> Result<Page<OrderView>> {
        let (orders, total) = self.page_of(Query::new(), page).await?;
        let views = self.join(orders, UserJoin::NameOnly, true).await?;
        Ok(Page::new(views, page, total, ORDERS_PAGE_SIZE))
    }

    /// Orders placed with one restaurant (admins only).
    pub async fn list_for_restaurant(
        &self,
        restaurant_id: &str,
        requester: &AuthUser,
        page: u32,
    ) -> Result<Page<OrderView>> {
        let restaurant: Option<Restaurant> =
            self.db.get(collections::RESTAURANTS, restaurant_id).await?;
        if restaurant.is_none() {
            return Err(AppError::NotFound("Restaurant not found".to_string()));
        }
        if !requester.is_admin {
            return Err(AppError::Unauthorized("Not authorized".to_string()));
        }

        let (orders, total) = self
            .page_of(Query::new().eq("restaurant", restaurant_id), page)
            .await?;
        let views = self.join(orders, UserJoin::NameOnly, false).await?;
        Ok(Page::new(views, page, total, ORDERS_PAGE_SIZE))
    }

    async fn find(&self, id: &str) -> Result<Order> {
        self.db
            .get(collections::ORDERS, id)
            .await?
            .ok_or_else(not_found)
    }

    /// One newest-first page of `query` plus the total match count.
    async fn page_of(&self, query: Query, page: u32) -> Result<(Vec<Order>, u64)> {
        let total = self.db.count(collections::ORDERS, &query).await?;

        let orders = match offset_for(page, ORDERS_PAGE_SIZE) {
            Some(offset) => {
                let windowed = query
                    .order_by("createdAt", Direction::Descending)
                    .offset(offset)
                    .limit(ORDERS_PAGE_SIZE);
                self.db.query(collections::ORDERS, &windowed).await?
            }
            None => Vec::new(),
        };

        Ok((orders, total))
    }

    async fn join(
        &self,
        orders: Vec<Order>,
        user_join: UserJoin,
        with_restaurant: bool,
    ) -> Result<Vec<OrderView>> {
        let users: HashMap<String, User> = if user_join == UserJoin::Skip {
            HashMap::new()
        } else {
            fetch_by_ids(&self.db, collections::USERS, orders.iter().map(|o| o.user.as_str()))
                .await?
        };

        let restaurants: HashMap<String, Restaurant> = if with_restaurant {
            fetch_by_ids(
                &self.db,
                collections::RESTAURANTS,
                orders.iter().map(|o| o.restaurant.as_str()),
            )
            .await?
        } else {
            HashMap::new()
        };

        Ok(orders
            .into_iter()
            .map(|order| {
                let user_detail = users.get(&order.user).map(|user| match user_join {
                    UserJoin::WithEmail => UserRef::with_email(user),
                    _ => UserRef::name_only(user),
                });
                let restaurant_detail = restaurants.get(&order.restaurant).map(RestaurantRef::from);

                OrderView {
                    order,
                    user_detail,
                    restaurant_detail,
                }
            })
            .collect())
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Order not found".to_string())
}
