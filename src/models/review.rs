//! Review model and restaurant rating aggregate.

use super::UserRef;
use serde::{Deserialize, Serialize};

/// Review stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Document ID
    pub id: String,
    /// Author user ID
    pub user: String,
    /// Restaurant ID
    pub restaurant: String,
    /// 1 to 5
    pub rating: u8,
    pub comment: String,
    /// Order this review is about; one review per (user, order)
    pub order: String,
    #[serde(default)]
    pub images: Vec<String>,
    /// User IDs that liked the review
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<ReviewReply>,
    pub created_at: String,
    pub updated_at: String,
}

/// Admin reply; a newer reply replaces the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReply {
    pub comment: String,
    pub created_at: String,
}

/// Review with the author joined in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: Review,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<UserRef>,
}

/// Restaurant rating derived from its reviews.
///
/// Serialized as the `rating` / `numReviews` patch written to the restaurant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingAggregate {
    pub rating: f64,
    pub num_reviews: u32,
}

impl RatingAggregate {
    /// Unweighted arithmetic mean of the ratings; zero when there are none.
    pub fn from_ratings<I>(ratings: I) -> Self
    where
        I: IntoIterator<Item = u8>,
    {
        let (sum, count) = ratings
            .into_iter()
            .fold((0u64, 0u32), |(sum, count), r| (sum + u64::from(r), count + 1));

        if count == 0 {
            return Self::default();
        }

        Self {
            rating: sum as f64 / f64::from(count),
            num_reviews: count,
        }
    }

    pub fn from_reviews<'a, I>(reviews: I) -> Self
    where
        I: IntoIterator<Item = &'a Review>,
    {
        Self::from_ratings(reviews.into_iter().map(|r| r.rating))
    }
}
