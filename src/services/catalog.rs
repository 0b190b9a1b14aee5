// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Restaurant catalog and embedded menus.

use super::{lock_for, KeyedLocks};
use crate::db::{collections, Direction, FirestoreDb, Query, WriteBatch};
use crate::error::{AppError, Result};
use crate::models::patch::{overwrite_if_truthy, overwrite_opt_if_truthy};
use crate::models::restaurant::{DeliveryTime, OpeningHours, RestaurantAddress};
use crate::models::{new_id, MenuItem, Restaurant};
use crate::pagination::{Page, RESTAURANTS_PAGE_SIZE};
use crate::time_utils::now_rfc3339;
use serde::Deserialize;
use validator::Validate;

/// Fields written by catalog edits. `rating` and `numReviews` belong to the
/// review service and are left out so an edit never rolls them back.
const CATALOG_FIELDS: &[&str] = &[
    "name",
    "description",
    "cuisine",
    "address",
    "phone",
    "email",
    "openingHours",
    "deliveryTime",
    "minimumOrder",
    "deliveryFee",
    "images",
    "menu",
    "isActive",
    "updatedAt",
];

/// `GET /api/restaurants` filters.
#[derive(Debug, Default, Deserialize)]
pub struct RestaurantFilter {
    /// Case-insensitive substring of the name
    pub keyword: Option<String>,
    /// Cuisine tag the restaurant must carry
    pub cuisine: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRestaurantRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Restaurant name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub cuisine: Vec<String>,
    pub address: Option<RestaurantAddress>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub opening_hours: Option<OpeningHours>,
    pub delivery_time: Option<DeliveryTime>,
    pub minimum_order: Option<f64>,
    pub delivery_fee: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Partial restaurant update. `rating` and `numReviews` are not accepted.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRestaurantRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub cuisine: Option<Vec<String>>,
    pub address: Option<RestaurantAddress>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub opening_hours: Option<OpeningHours>,
    pub delivery_time: Option<DeliveryTime>,
    pub minimum_order: Option<f64>,
    pub delivery_fee: Option<f64>,
    pub images: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct MenuItemRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Menu item name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(
        required(message = "Menu item price is required"),
        range(min = 0.0, message = "Price cannot be negative")
    )]
    pub price: Option<f64>,
    pub category: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMenuItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub is_available: Option<bool>,
}

/// Restaurant CRUD backed by the `restaurants` collection.
///
/// Edits and deletes hold the restaurant's lock from the read to the write,
/// so a field-masked save can never land on a document deleted in between.
#[derive(Clone)]
pub struct CatalogService {
    db: FirestoreDb,
    restaurant_locks: KeyedLocks,
}

impl CatalogService {
    pub fn new(db: FirestoreDb, restaurant_locks: KeyedLocks) -> Self {
        Self {
            db,
            restaurant_locks,
        }
    }

    /// One page of restaurants, best rated first.
    ///
    /// The cuisine filter and the ordering run in the store. The keyword is
    /// matched here because Firestore has no substring operator, so the page
    /// is cut from the full matching set.
    pub async fn list(&self, filter: &RestaurantFilter, page: u32) -> Result<Page<Restaurant>> {
        let mut query = Query::new().order_by("rating", Direction::Descending);
        if let Some(cuisine) = filter.cuisine.as_deref().filter(|c| !c.is_empty()) {
            query = query.array_contains("cuisine", cuisine);
        }

        let mut restaurants: Vec<Restaurant> =
            self.db.query(collections::RESTAURANTS, &query).await?;

        if let Some(keyword) = filter.keyword.as_deref().filter(|k| !k.is_empty()) {
            restaurants.retain(|r| r.name_matches(keyword));
        }

        tracing::debug!(
            keyword = ?filter.keyword,
            cuisine = ?filter.cuisine,
            page,
            matched = restaurants.len(),
            "Listing restaurants"
        );

        Ok(Page::from_all(restaurants, page, RESTAURANTS_PAGE_SIZE))
    }

    pub async fn get(&self, id: &str) -> Result<Restaurant> {
        self.db
            .get(collections::RESTAURANTS, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Restaurant not found".to_string()))
    }

    pub async fn create(&self, req: CreateRestaurantRequest) -> Result<Restaurant> {
        req.validate()?;

        let now = now_rfc3339();
        let restaurant = Restaurant {
            id: new_id(),
            name: req.name,
            description: req.description,
            cuisine: req.cuisine,
            address: req.address,
            phone: req.phone,
            email: req.email,
            opening_hours: req.opening_hours,
            rating: 0.0,
            num_reviews: 0,
            delivery_time: req.delivery_time,
            minimum_order: req.minimum_order,
            delivery_fee: req.delivery_fee,
            images: req.images,
            menu: Vec::new(),
            is_active: true,
            created_at: now.clone(),
            updated_at: now,
        };

        self.db
            .set(collections::RESTAURANTS, &restaurant.id, &restaurant)
            .await?;
        tracing::info!(restaurant_id = %restaurant.id, name = %restaurant.name, "Restaurant created");

        Ok(restaurant)
    }

    pub async fn update(&self, id: &str, req: UpdateRestaurantRequest) -> Result<Restaurant> {
        let lock = lock_for(&self.restaurant_locks, id);
        let _guard = lock.lock().await;
        let mut restaurant = self.get(id).await?;

        overwrite_if_truthy(&mut restaurant.name, req.name);
        overwrite_opt_if_truthy(&mut restaurant.description, req.description);
        overwrite_if_truthy(&mut restaurant.cuisine, req.cuisine);
        overwrite_opt_if_truthy(&mut restaurant.address, req.address);
        overwrite_opt_if_truthy(&mut restaurant.phone, req.phone);
        overwrite_opt_if_truthy(&mut restaurant.email, req.email);
        overwrite_opt_if_truthy(&mut restaurant.opening_hours, req.opening_hours);
        overwrite_opt_if_truthy(&mut restaurant.delivery_time, req.delivery_time);
        overwrite_opt_if_truthy(&mut restaurant.minimum_order, req.minimum_order);
        overwrite_opt_if_truthy(&mut restaurant.delivery_fee, req.delivery_fee);
        overwrite_if_truthy(&mut restaurant.images, req.images);
        if let Some(is_active) = req.is_active {
            restaurant.is_active = is_active;
        }

        self.save(restaurant).await
    }

    /// Hard delete. Orders, reviews and favorites that reference it are kept.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let lock = lock_for(&self.restaurant_locks, id);
        let _guard = lock.lock().await;
        let restaurant = self.get(id).await?;
        self.db
            .delete(collections::RESTAURANTS, &restaurant.id)
            .await?;
        tracing::info!(restaurant_id = %restaurant.id, "Restaurant removed");
        Ok(())
    }

    pub async fn add_menu_item(&self, id: &str, req: MenuItemRequest) -> Result<Restaurant> {
        let lock = lock_for(&self.restaurant_locks, id);
        let _guard = lock.lock().await;
        let mut restaurant = self.get(id).await?;
        req.validate()?;

        restaurant.menu.push(MenuItem {
            id: new_id(),
            name: req.name,
            description: req.description,
            price: req.price.unwrap_or_default(),
            category: req.category,
            image: req.image,
            is_available: true,
        });

        self.save(restaurant).await
    }

    pub async fn update_menu_item(
        &self,
        id: &str,
        item_id: &str,
        req: UpdateMenuItemRequest,
    ) -> Result<Restaurant> {
        let lock = lock_for(&self.restaurant_locks, id);
        let _guard = lock.lock().await;
        let mut restaurant = self.get(id).await?;
        let item = restaurant
            .menu_item_mut(item_id)
            .ok_or_else(|| AppError::NotFound("Menu item not found".to_string()))?;

        overwrite_if_truthy(&mut item.name, req.name);
        overwrite_opt_if_truthy(&mut item.description, req.description);
        overwrite_if_truthy(&mut item.price, req.price);
        overwrite_opt_if_truthy(&mut item.category, req.category);
        overwrite_opt_if_truthy(&mut item.image, req.image);
        if let Some(is_available) = req.is_available {
            item.is_available = is_available;
        }

        self.save(restaurant).await
    }

    pub async fn delete_menu_item(&self, id: &str, item_id: &str) -> Result<Restaurant> {
        let lock = lock_for(&self.restaurant_locks, id);
        let _guard = lock.lock().await;
        let mut restaurant = self.get(id).await?;
        if restaurant.menu_item(item_id).is_none() {
            return Err(AppError::NotFound("Menu item not found".to_string()));
        }
        restaurant.menu.retain(|item| item.id != item_id);

        self.save(restaurant).await
    }

    /// Caller must hold the restaurant's lock.
    async fn save(&self, mut restaurant: Restaurant) -> Result<Restaurant> {
        restaurant.updated_at = now_rfc3339();

        let mut batch = WriteBatch::new();
        batch.patch(
            collections::RESTAURANTS,
            &restaurant.id,
            CATALOG_FIELDS,
            &restaurant,
        )?;
        self.db.commit(batch).await?;
        tracing::debug!(restaurant_id = %restaurant.id, "Restaurant saved");
        Ok(restaurant)
    }
}
