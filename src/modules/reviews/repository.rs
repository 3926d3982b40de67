//! Review storage: the repository contract plus MongoDB and in-memory drivers.

use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, from_document, oid::ObjectId, Document};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::RwLock;

use ezbook_db::{collections, InsertResult, RecordId, Store, StoreError, StoreResult};

use super::models::{parse_post_time, NewReview, PostOrder, Review};

pub type DynReviewRepository = Arc<dyn ReviewRepository>;

/// Review repository trait
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn create(&self, review: NewReview) -> StoreResult<InsertResult>;

    /// Reviews of one room, newest first
    async fn list_for_room(&self, room_id: &str) -> StoreResult<Vec<Review>>;

    /// Every review, oldest first
    async fn list_all(&self) -> StoreResult<Vec<Review>>;
}

#[derive(Debug, Serialize, Deserialize)]
struct ReviewDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(rename = "roomId")]
    room_id: String,
    #[serde(rename = "postTime")]
    post_time: String,
    comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(rename = "userImage", default, skip_serializing_if = "Option::is_none")]
    user_image: Option<String>,
}

impl From<Review> for ReviewDocument {
    fn from(review: Review) -> Self {
        Self {
            id: review.id.object_id(),
            room_id: review.room_id,
            post_time: review.post_time,
            comment: review.comment,
            rating: review.rating,
            username: review.username,
            user_image: review.user_image,
        }
    }
}

impl From<ReviewDocument> for Review {
    fn from(document: ReviewDocument) -> Self {
        Self {
            id: document.id.into(),
            room_id: document.room_id,
            post_time: document.post_time,
            comment: document.comment,
            rating: document.rating,
            username: document.username,
            user_image: document.user_image,
        }
    }
}

/// Aggregation that derives `postTimeDate` from `postTime` and sorts on it.
fn post_time_pipeline(room_id: Option<&str>, order: PostOrder) -> Vec<Document> {
    let direction = match order {
        PostOrder::NewestFirst => -1,
        PostOrder::OldestFirst => 1,
    };

    let mut pipeline = Vec::with_capacity(3);
    if let Some(room_id) = room_id {
        pipeline.push(doc! { "$match": { "roomId": room_id } });
    }
    pipeline.push(doc! { "$addFields": { "postTimeDate": { "$toDate": "$postTime" } } });
    pipeline.push(doc! { "$sort": { "postTimeDate": direction } });
    pipeline
}

/// Reviews stored in the `reviews` collection
pub struct MongoReviewRepository {
    store: Store,
}

impl MongoReviewRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    async fn aggregate(&self, pipeline: Vec<Document>) -> StoreResult<Vec<Review>> {
        let documents: Vec<Document> = self
            .store
            .collection::<Document>(collections::REVIEWS)
            .aggregate(pipeline)
            .await?
            .try_collect()
            .await?;

        documents
            .into_iter()
            .map(|document| -> StoreResult<Review> {
                Ok(from_document::<ReviewDocument>(document)?.into())
            })
            .collect()
    }
}

#[async_trait]
impl ReviewRepository for MongoReviewRepository {
    async fn create(&self, review: NewReview) -> StoreResult<InsertResult> {
        let document = ReviewDocument::from(review.into_review(RecordId::new()));
        let result = self
            .store
            .collection::<ReviewDocument>(collections::REVIEWS)
            .insert_one(document)
            .await?;
        Ok(result.into())
    }

    async fn list_for_room(&self, room_id: &str) -> StoreResult<Vec<Review>> {
        self.aggregate(post_time_pipeline(Some(room_id), PostOrder::NewestFirst))
            .await
    }

    async fn list_all(&self) -> StoreResult<Vec<Review>> {
        self.aggregate(post_time_pipeline(None, PostOrder::OldestFirst))
            .await
    }
}

/// Process-local reviews, in insertion order
#[derive(Default)]
pub struct MemoryReviewRepository {
    reviews: RwLock<Vec<Review>>,
}

impl MemoryReviewRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Stable sort on the derived post date; ties keep insertion order.
fn sort_by_post_time(reviews: Vec<Review>, order: PostOrder) -> StoreResult<Vec<Review>> {
    let mut keyed: Vec<(OffsetDateTime, Review)> = reviews
        .into_iter()
        .map(|review| match parse_post_time(&review.post_time) {
            Some(posted) => Ok((posted, review)),
            None => Err(StoreError::Corrupt(format!(
                "review {} has unparseable postTime '{}'",
                review.id, review.post_time
            ))),
        })
        .collect::<StoreResult<_>>()?;

    match order {
        PostOrder::NewestFirst => keyed.sort_by(|a, b| b.0.cmp(&a.0)),
        PostOrder::OldestFirst => keyed.sort_by(|a, b| a.0.cmp(&b.0)),
    }
    Ok(keyed.into_iter().map(|(_, review)| review).collect())
}

#[async_trait]
impl ReviewRepository for MemoryReviewRepository {
    async fn create(&self, review: NewReview) -> StoreResult<InsertResult> {
        let id = RecordId::new();
        self.reviews.write().await.push(review.into_review(id));
        Ok(InsertResult::new(id.to_hex()))
    }

    async fn list_for_room(&self, room_id: &str) -> StoreResult<Vec<Review>> {
        let matching: Vec<Review> = self
            .reviews
            .read()
            .await
            .iter()
            .filter(|review| review.room_id == room_id)
            .cloned()
            .collect();
        sort_by_post_time(matching, PostOrder::NewestFirst)
    }

    async fn list_all(&self) -> StoreResult<Vec<Review>> {
        let all = self.reviews.read().await.clone();
        sort_by_post_time(all, PostOrder::OldestFirst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn new_review(room_id: &str, post_time: &str) -> NewReview {
        NewReview {
            room_id: room_id.to_string(),
            post_time: post_time.to_string(),
            comment: format!("stayed {post_time}"),
            rating: Some(4),
            username: None,
            user_image: None,
        }
    }

    fn posted(reviews: &[Review]) -> Vec<OffsetDateTime> {
        reviews
            .iter()
            .map(|review| parse_post_time(&review.post_time).unwrap())
            .collect()
    }

    #[test]
    fn room_pipeline_matches_then_sorts_descending() {
        let pipeline = post_time_pipeline(Some("r1"), PostOrder::NewestFirst);
        assert_eq!(pipeline.len(), 3);
        assert_eq!(pipeline[0], doc! { "$match": { "roomId": "r1" } });
        assert_eq!(
            pipeline[1],
            doc! { "$addFields": { "postTimeDate": { "$toDate": "$postTime" } } }
        );
        assert_eq!(pipeline[2], doc! { "$sort": { "postTimeDate": -1 } });
    }

    #[test]
    fn global_pipeline_has_no_match_and_sorts_ascending() {
        let pipeline = post_time_pipeline(None, PostOrder::OldestFirst);
        assert_eq!(pipeline.len(), 2);
        assert_eq!(pipeline[1], doc! { "$sort": { "postTimeDate": 1 } });
    }

    #[tokio::test]
    async fn room_listing_is_newest_first_and_scoped() {
        let repo = MemoryReviewRepository::new();
        repo.create(new_review("r1", "2024-01-01")).await.unwrap();
        repo.create(new_review("r2", "2024-03-01")).await.unwrap();
        repo.create(new_review("r1", "2024-02-01")).await.unwrap();

        let reviews = repo.list_for_room("r1").await.unwrap();
        let times: Vec<&str> = reviews.iter().map(|r| r.post_time.as_str()).collect();
        assert_eq!(times, vec!["2024-02-01", "2024-01-01"]);
    }

    #[tokio::test]
    async fn global_listing_is_oldest_first() {
        let repo = MemoryReviewRepository::new();
        repo.create(new_review("r1", "2024-02-01T10:00:00Z")).await.unwrap();
        repo.create(new_review("r2", "2024-01-15")).await.unwrap();
        repo.create(new_review("r1", "2024-03-01")).await.unwrap();

        let reviews = repo.list_all().await.unwrap();
        let times: Vec<&str> = reviews.iter().map(|r| r.post_time.as_str()).collect();
        assert_eq!(times, vec!["2024-01-15", "2024-02-01T10:00:00Z", "2024-03-01"]);
    }

    #[test]
    fn unparseable_post_time_fails_the_listing() {
        let review = new_review("r1", "whenever").into_review(RecordId::new());
        let err = sort_by_post_time(vec![review], PostOrder::OldestFirst).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn listings_are_monotonic_in_post_time(
            days in prop::collection::vec((0u8..3, 1u32..=28, 1u8..=12), 0..24),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let repo = MemoryReviewRepository::new();
            runtime.block_on(async {
                for (room, day, month) in &days {
                    let post_time = format!("2024-{month:02}-{day:02}");
                    repo.create(new_review(&format!("r{room}"), &post_time)).await.unwrap();
                }
            });

            let per_room = runtime.block_on(repo.list_for_room("r0")).unwrap();
            let per_room = posted(&per_room);
            prop_assert!(per_room.windows(2).all(|w| w[0] >= w[1]));

            let all = runtime.block_on(repo.list_all()).unwrap();
            prop_assert_eq!(all.len(), days.len());
            let all = posted(&all);
            prop_assert!(all.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
