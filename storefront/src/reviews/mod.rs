//! Reviews
//!
//! Post-fulfillment feedback. A user may review a product only from a
//! completed order, holds at most one live review per product, and
//! resubmitting replaces the previous rating and comment.

use crate::auth::SessionProvider;
use crate::backend::PersistenceBackend;
use crate::orders::normalize_status;
use shared::models::{Order, OrderStatus, Review};
use shared::util::{now_millis, snowflake_id};
use shared::{AppError, AppResult, ErrorCode};
use std::collections::HashMap;
use std::sync::Arc;

pub struct ReviewService {
    backend: Arc<dyn PersistenceBackend>,
    session: Arc<dyn SessionProvider>,
}

impl ReviewService {
    pub fn new(backend: Arc<dyn PersistenceBackend>, session: Arc<dyn SessionProvider>) -> Self {
        Self { backend, session }
    }

    /// Whether an order's products are open for review
    pub fn is_eligible(order: &Order) -> bool {
        normalize_status(&order.status) == OrderStatus::Completed
    }

    /// Submit or replace the review for a product bought in `order`.
    ///
    /// Rating must be 1 to 5 and the comment non-blank. If the user has
    /// already reviewed this product the existing row is overwritten.
    pub async fn submit(
        &self,
        order: &Order,
        product_id: &str,
        rating: u8,
        comment: &str,
    ) -> AppResult<Review> {
        let user = self.session.require_user()?;

        if !Self::is_eligible(order) {
            return Err(AppError::new(ErrorCode::ReviewNotEligible)
                .with_detail("status", normalize_status(&order.status).display_name()));
        }
        if !order.lines.iter().any(|l| l.product_id == product_id) {
            return Err(
                AppError::with_message(
                    ErrorCode::ReviewNotEligible,
                    "Product is not part of this order",
                )
                .with_detail("product_id", product_id),
            );
        }
        if !(1..=5).contains(&rating) {
            return Err(AppError::new(ErrorCode::RatingOutOfRange)
                .with_detail("rating", rating));
        }
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(AppError::new(ErrorCode::CommentEmpty));
        }

        let review = match self.backend.find_review(&user.id, product_id).await? {
            Some(existing) => {
                let review = Review {
                    rating,
                    comment: comment.to_string(),
                    created_at: now_millis(),
                    ..existing
                };
                self.backend.update_review(review.clone()).await?;
                tracing::info!(product_id = %product_id, user_id = %user.id, "Review replaced");
                review
            }
            None => {
                let review = Review {
                    id: snowflake_id(),
                    product_id: product_id.to_string(),
                    user_id: user.id.clone(),
                    rating,
                    comment: comment.to_string(),
                    created_at: now_millis(),
                };
                self.backend.insert_review(review.clone()).await?;
                tracing::info!(product_id = %product_id, user_id = %user.id, "Review submitted");
                review
            }
        };

        Ok(review)
    }

    /// The user's newest review per product, for the given products.
    /// Older duplicate rows are discarded in favor of the most recent.
    pub async fn load_latest_for(
        &self,
        product_ids: &[String],
    ) -> AppResult<HashMap<String, Review>> {
        let user = self.session.require_user()?;

        let rows = self.backend.fetch_reviews(&user.id, product_ids).await?;
        let mut latest: HashMap<String, Review> = HashMap::new();
        for review in rows {
            match latest.get(&review.product_id) {
                Some(existing) if existing.created_at >= review.created_at => {}
                _ => {
                    latest.insert(review.product_id.clone(), review);
                }
            }
        }
        Ok(latest)
    }
}
