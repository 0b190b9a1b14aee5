// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reviews and the restaurant rating derived from them.
//!
//! Every review write is committed in the same batch as the recomputed
//! `rating` / `numReviews` of its restaurant. Writers for one restaurant are
//! serialized by a per-restaurant lock, so the review set read for the
//! recomputation cannot change before the batch lands.

use super::{fetch_by_ids, lock_for, KeyedLocks};
use crate::db::{collections, Direction, FirestoreDb, Query, WriteBatch};
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{
    new_id, Order, RatingAggregate, Restaurant, Review, ReviewReply, ReviewView, User, UserRef,
};
use crate::models::patch::overwrite_if_truthy;
use crate::pagination::{offset_for, Page, REVIEWS_PAGE_SIZE};
use crate::time_utils::now_rfc3339;
use serde::Deserialize;
use std::collections::HashMap;
use validator::Validate;

/// Restaurant fields written after a review is created or deleted.
const RATING_FIELDS: &[&str] = &["rating", "numReviews"];
/// An edited review keeps its place in the count.
const RATING_ONLY: &[&str] = &["rating"];

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[serde(default)]
    pub restaurant: String,
    #[validate(
        required(message = "Rating is required"),
        range(min = 1, max = 5, message = "Rating must be between 1 and 5")
    )]
    pub rating: Option<u8>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Comment is required"))]
    pub comment: String,
    #[serde(default)]
    pub order: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Review edits; empty values (and a rating of 0) leave the stored field alone.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateReviewRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<u8>,
    pub comment: Option<String>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReplyRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Reply comment is required"))]
    pub comment: String,
}

/// The review-set change a batch is about to commit.
enum Pending<'a> {
    Upsert(&'a Review),
    Remove(&'a str),
}

/// Reviews backed by the `reviews` collection.
#[derive(Clone)]
pub struct ReviewService {
    db: FirestoreDb,
    /// Shared with the catalog service.
    restaurant_locks: KeyedLocks,
    /// Serializes the one-review-per-order check.
    order_locks: KeyedLocks,
}

impl ReviewService {
    pub fn new(db: FirestoreDb, restaurant_locks: KeyedLocks) -> Self {
        Self {
            db,
            restaurant_locks,
            order_locks: KeyedLocks::default(),
        }
    }

    /// Review an order the caller placed. One review per order.
    pub async fn create(&self, user_id: &str, req: CreateReviewRequest) -> Result<Review> {
        req.validate()?;

        // Order lock first, then the restaurant lock; nothing takes them the
        // other way round.
        let order_lock = lock_for(&self.order_locks, &req.order);
        let _order_guard = order_lock.lock().await;
        let lock = lock_for(&self.restaurant_locks, &req.restaurant);
        let _guard = lock.lock().await;

        let restaurant: Option<Restaurant> =
            self.db.get(collections::RESTAURANTS, &req.restaurant).await?;
        if restaurant.is_none() {
            return Err(AppError::NotFound("Restaurant not found".to_string()));
        }

        let order: Option<Order> = self.db.get(collections::ORDERS, &req.order).await?;
        if !order.is_some_and(|o| o.user == user_id) {
            return Err(AppError::BadRequest("Invalid order".to_string()));
        }

        let existing: Vec<Review> = self
            .db
            .query(
                collections::REVIEWS,
                &Query::new()
                    .eq("user", user_id)
                    .eq("order", req.order.as_str())
                    .limit(1),
            )
            .await?;
        if !existing.is_empty() {
            return Err(AppError::BadRequest("Order already reviewed".to_string()));
        }

        let now = now_rfc3339();
        let review = Review {
            id: new_id(),
            user: user_id.to_string(),
            restaurant: req.restaurant,
            rating: req.rating.unwrap_or_default(),
            comment: req.comment,
            order: req.order,
            images: req.images,
            likes: Vec::new(),
            reply: None,
            created_at: now.clone(),
            updated_at: now,
        };

        let mut batch = WriteBatch::new();
        batch.set(collections::REVIEWS, &review.id, &review)?;
        self.commit_with_rating(
            &review.restaurant,
            batch,
            Pending::Upsert(&review),
            RATING_FIELDS,
        )
        .await?;

        tracing::info!(
            review_id = %review.id,
            restaurant_id = %review.restaurant,
            rating = review.rating,
            "Review created"
        );
        Ok(review)
    }

    /// Edit a review. Only its author may do this, admins included.
    pub async fn update(
        &self,
        id: &str,
        requester: &AuthUser,
        mut req: UpdateReviewRequest,
    ) -> Result<Review> {
        let review = self.find(id).await?;
        if review.user != requester.user_id {
            return Err(AppError::Unauthorized("Not authorized".to_string()));
        }
        req.rating = req.rating.filter(|rating| *rating != 0);
        req.validate()?;

        let lock = lock_for(&self.restaurant_locks, &review.restaurant);
        let _guard = lock.lock().await;
        let mut review = self.find(id).await?;

        overwrite_if_truthy(&mut review.rating, req.rating);
        overwrite_if_truthy(&mut review.comment, req.comment);
        overwrite_if_truthy(&mut review.images, req.images);
        review.updated_at = now_rfc3339();

        let mut batch = WriteBatch::new();
        batch.patch(
            collections::REVIEWS,
            &review.id,
            &["rating", "comment", "images", "updatedAt"],
            &review,
        )?;
        self.commit_with_rating(
            &review.restaurant,
            batch,
            Pending::Upsert(&review),
            RATING_ONLY,
        )
        .await?;

        tracing::info!(review_id = %review.id, rating = review.rating, "Review updated");
        Ok(review)
    }

    /// Remove a review (its author or an admin).
    pub async fn delete(&self, id: &str, requester: &AuthUser) -> Result<()> {
        let review = self.find(id).await?;
        if !requester.can_access(&review.user) {
            return Err(AppError::Unauthorized("Not authorized".to_string()));
        }

        let lock = lock_for(&self.restaurant_locks, &review.restaurant);
        let _guard = lock.lock().await;

        let mut batch = WriteBatch::new();
        batch.delete(collections::REVIEWS, &review.id);
        self.commit_with_rating(
            &review.restaurant,
            batch,
            Pending::Remove(&review.id),
            RATING_FIELDS,
        )
        .await?;

        tracing::info!(
            review_id = %review.id,
            restaurant_id = %review.restaurant,
            deleted_by = %requester.user_id,
            "Review removed"
        );
        Ok(())
    }

    /// Set the admin reply, replacing any earlier one.
    pub async fn reply(&self, id: &str, req: ReplyRequest) -> Result<Review> {
        let review = self.find(id).await?;
        req.validate()?;

        let lock = lock_for(&self.restaurant_locks, &review.restaurant);
        let _guard = lock.lock().await;
        let mut review = self.find(id).await?;

        let now = now_rfc3339();
        review.reply = Some(ReviewReply {
            comment: req.comment,
            created_at: now.clone(),
        });
        review.updated_at = now;

        self.patch(&review, &["reply", "updatedAt"]).await?;
        tracing::info!(review_id = %review.id, "Review reply set");
        Ok(review)
    }

    /// Like the review, or take the like back if the caller already liked it.
    pub async fn toggle_like(&self, id: &str, requester: &AuthUser) -> Result<Review> {
        let review = self.find(id).await?;

        let lock = lock_for(&self.restaurant_locks, &review.restaurant);
        let _guard = lock.lock().await;
        let mut review = self.find(id).await?;

        let before = review.likes.len();
        review.likes.retain(|user_id| *user_id != requester.user_id);
        if review.likes.len() == before {
            review.likes.push(requester.user_id.clone());
        }
        review.updated_at = now_rfc3339();

        self.patch(&review, &["likes", "updatedAt"]).await?;
        tracing::debug!(review_id = %review.id, likes = review.likes.len(), "Review like toggled");
        Ok(review)
    }

    /// Newest-first page of a restaurant's reviews with author names.
    pub async fn list_for_restaurant(
        &self,
        restaurant_id: &str,
        page: u32,
    ) -> Result<Page<ReviewView>> {
        let query = Query::new().eq("restaurant", restaurant_id);
        let total = self.db.count(collections::REVIEWS, &query).await?;

        let reviews: Vec<Review> = match offset_for(page, REVIEWS_PAGE_SIZE) {
            Some(offset) => {
                let windowed = query
                    .order_by("createdAt", Direction::Descending)
                    .offset(offset)
                    .limit(REVIEWS_PAGE_SIZE);
                self.db.query(collections::REVIEWS, &windowed).await?
            }
            None => Vec::new(),
        };

        let authors: HashMap<String, User> = fetch_by_ids(
            &self.db,
            collections::USERS,
            reviews.iter().map(|r| r.user.as_str()),
        )
        .await?;

        let views = reviews
            .into_iter()
            .map(|review| ReviewView {
                author: authors.get(&review.user).map(UserRef::name_only),
                review,
            })
            .collect();

        Ok(Page::new(views, page, total, REVIEWS_PAGE_SIZE))
    }

    async fn find(&self, id: &str) -> Result<Review> {
        self.db
            .get(collections::REVIEWS, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Review not found".to_string()))
    }

    async fn patch(&self, review: &Review, fields: &[&str]) -> Result<()> {
        let mut batch = WriteBatch::new();
        batch.patch(collections::REVIEWS, &review.id, fields, review)?;
        self.db.commit(batch).await
    }

    /// Recompute the restaurant's rating with `pending` applied and commit it
    /// together with `batch`. Caller must hold the restaurant's lock.
    async fn commit_with_rating(
        &self,
        restaurant_id: &str,
        mut batch: WriteBatch,
        pending: Pending<'_>,
        fields: &[&str],
    ) -> Result<RatingAggregate> {
        let mut reviews: Vec<Review> = self
            .db
            .query(
                collections::REVIEWS,
                &Query::new().eq("restaurant", restaurant_id),
            )
            .await?;

        match pending {
            Pending::Upsert(review) => {
                reviews.retain(|r| r.id != review.id);
                reviews.push(review.clone());
            }
            Pending::Remove(id) => reviews.retain(|r| r.id != id),
        }
        let aggregate = RatingAggregate::from_reviews(&reviews);

        // Patches need an existing document; a deleted restaurant has no rating to keep.
        let restaurant: Option<Restaurant> =
            self.db.get(collections::RESTAURANTS, restaurant_id).await?;
        if restaurant.is_some() {
            batch.patch(collections::RESTAURANTS, restaurant_id, fields, &aggregate)?;
        } else {
            tracing::warn!(restaurant_id, "Restaurant gone; review written without rating update");
        }

        self.db.commit(batch).await?;
        tracing::debug!(
            restaurant_id,
            rating = aggregate.rating,
            num_reviews = aggregate.num_reviews,
            "Restaurant rating recomputed"
        );

        Ok(aggregate)
    }
}
