pub mod models;
pub mod repository;

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use ezbook_db::InsertResult;
use ezbook_http::{error::AppError, extract::AppJson};
use ezbook_kernel::{InitCtx, Module};
use serde_json::json;

use crate::utils::store_failure;
use models::{parse_post_time, NewReview, Review};
use repository::DynReviewRepository;

/// Reviews module: post a review, read them per room or all at once
pub struct ReviewsModule {
    reviews: DynReviewRepository,
}

impl ReviewsModule {
    pub fn new(reviews: DynReviewRepository) -> Self {
        Self { reviews }
    }
}

#[async_trait]
impl Module for ReviewsModule {
    fn name(&self) -> &'static str {
        "reviews"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "reviews module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/rooms/{id}/reviews", get(list_room_reviews))
            .route("/reviews", get(list_all_reviews).post(create_review))
            .route("/allReviews", get(list_all_reviews))
            .with_state(self.reviews.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let review_list = json!({
            "type": "array",
            "items": { "$ref": "#/components/schemas/Review" }
        });

        Some(json!({
            "paths": {
                "/rooms/{id}/reviews": {
                    "get": {
                        "summary": "Reviews of one room, newest first",
                        "tags": ["Reviews"],
                        "responses": {
                            "200": { "description": "Reviews", "content": { "application/json": { "schema": review_list.clone() } } }
                        }
                    }
                },
                "/reviews": {
                    "get": {
                        "summary": "All reviews, oldest first",
                        "tags": ["Reviews"],
                        "responses": {
                            "200": { "description": "Reviews", "content": { "application/json": { "schema": review_list.clone() } } }
                        }
                    },
                    "post": {
                        "summary": "Post a review",
                        "tags": ["Reviews"],
                        "responses": {
                            "200": { "description": "Insert acknowledgement" },
                            "422": { "description": "Unknown fields or unparseable postTime" }
                        }
                    }
                },
                "/allReviews": {
                    "get": {
                        "summary": "All reviews, oldest first (legacy path)",
                        "tags": ["Reviews"],
                        "responses": {
                            "200": { "description": "Reviews", "content": { "application/json": { "schema": review_list.clone() } } }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Review": {
                        "type": "object",
                        "properties": {
                            "_id": { "type": "string" },
                            "roomId": { "type": "string" },
                            "postTime": { "type": "string" },
                            "comment": { "type": "string" },
                            "rating": { "type": "integer" },
                            "username": { "type": "string" },
                            "userImage": { "type": "string" }
                        },
                        "required": ["_id", "roomId", "postTime", "comment"]
                    }
                }
            }
        }))
    }
}

async fn create_review(
    State(reviews): State<DynReviewRepository>,
    AppJson(review): AppJson<NewReview>,
) -> Result<Json<InsertResult>, AppError> {
    // Listings sort on the derived date, so every stored postTime must parse.
    if parse_post_time(&review.post_time).is_none() {
        return Err(AppError::validation(
            vec![json!({"field": "postTime", "error": "not a recognised date or timestamp"})],
            "postTime must be an RFC 3339 timestamp or a YYYY-MM-DD date",
        ));
    }

    let room_id = review.room_id.clone();
    let result = reviews.create(review).await.map_err(store_failure)?;
    tracing::info!(review_id = %result.inserted_id, %room_id, "review posted");
    Ok(Json(result))
}

async fn list_room_reviews(
    State(reviews): State<DynReviewRepository>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<Review>>, AppError> {
    let reviews = reviews
        .list_for_room(&room_id)
        .await
        .map_err(store_failure)?;
    Ok(Json(reviews))
}

async fn list_all_reviews(
    State(reviews): State<DynReviewRepository>,
) -> Result<Json<Vec<Review>>, AppError> {
    let reviews = reviews.list_all().await.map_err(store_failure)?;
    Ok(Json(reviews))
}

/// Create a new instance of the reviews module
pub fn create_module(reviews: DynReviewRepository) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(ReviewsModule::new(reviews))
}
