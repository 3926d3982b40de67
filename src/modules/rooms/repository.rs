//! Room storage: the repository contract plus MongoDB and in-memory drivers.

use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use ezbook_db::{collections, RecordId, Store, StoreResult, UpdateResult};

use super::models::{Availability, Room, RoomSort};

pub type DynRoomRepository = Arc<dyn RoomRepository>;

/// Room repository trait
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// All rooms, in store order unless a sort is given
    async fn list(&self, sort: Option<RoomSort>) -> StoreResult<Vec<Room>>;

    /// Get a room by ID
    async fn get(&self, id: &RecordId) -> StoreResult<Option<Room>>;

    /// Overwrite the availability flag and nothing else
    async fn update_availability(
        &self,
        id: &RecordId,
        availability: Availability,
    ) -> StoreResult<UpdateResult>;
}

#[derive(Debug, Serialize, Deserialize)]
struct RoomDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    price_per_night: f64,
    availability: Availability,
    #[serde(default)]
    room_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    room_size: Option<String>,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    special_offer: Option<String>,
}

impl From<RoomDocument> for Room {
    fn from(document: RoomDocument) -> Self {
        Self {
            id: document.id.into(),
            price_per_night: document.price_per_night,
            availability: document.availability,
            room_name: document.room_name,
            description: document.description,
            room_size: document.room_size,
            images: document.images,
            special_offer: document.special_offer,
        }
    }
}

/// Rooms stored in the `rooms` collection
pub struct MongoRoomRepository {
    store: Store,
}

impl MongoRoomRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RoomRepository for MongoRoomRepository {
    async fn list(&self, sort: Option<RoomSort>) -> StoreResult<Vec<Room>> {
        let collection = self.store.collection::<RoomDocument>(collections::ROOMS);
        let mut find = collection.find(doc! {});
        if let Some(sort) = sort {
            let direction = match sort {
                RoomSort::PriceAsc => 1,
                RoomSort::PriceDesc => -1,
            };
            find = find.sort(doc! { "price_per_night": direction });
        }

        let documents: Vec<RoomDocument> = find.await?.try_collect().await?;
        Ok(documents.into_iter().map(Room::from).collect())
    }

    async fn get(&self, id: &RecordId) -> StoreResult<Option<Room>> {
        let document = self
            .store
            .collection::<RoomDocument>(collections::ROOMS)
            .find_one(doc! { "_id": id.object_id() })
            .await?;
        Ok(document.map(Room::from))
    }

    async fn update_availability(
        &self,
        id: &RecordId,
        availability: Availability,
    ) -> StoreResult<UpdateResult> {
        let result = self
            .store
            .collection::<Document>(collections::ROOMS)
            .update_one(
                doc! { "_id": id.object_id() },
                doc! { "$set": { "availability": availability.as_bool() } },
            )
            .await?;
        Ok(result.into())
    }
}

/// Process-local rooms, in insertion order
#[derive(Default)]
pub struct MemoryRoomRepository {
    rooms: RwLock<Vec<Room>>,
}

impl MemoryRoomRepository {
    pub fn new(rooms: Vec<Room>) -> Self {
        Self {
            rooms: RwLock::new(rooms),
        }
    }
}

#[async_trait]
impl RoomRepository for MemoryRoomRepository {
    async fn list(&self, sort: Option<RoomSort>) -> StoreResult<Vec<Room>> {
        let mut rooms = self.rooms.read().await.clone();
        match sort {
            Some(RoomSort::PriceAsc) => {
                rooms.sort_by(|a, b| a.price_per_night.total_cmp(&b.price_per_night))
            }
            Some(RoomSort::PriceDesc) => {
                rooms.sort_by(|a, b| b.price_per_night.total_cmp(&a.price_per_night))
            }
            None => {}
        }
        Ok(rooms)
    }

    async fn get(&self, id: &RecordId) -> StoreResult<Option<Room>> {
        let rooms = self.rooms.read().await;
        Ok(rooms.iter().find(|room| room.id == *id).cloned())
    }

    async fn update_availability(
        &self,
        id: &RecordId,
        availability: Availability,
    ) -> StoreResult<UpdateResult> {
        let mut rooms = self.rooms.write().await;
        let Some(room) = rooms.iter_mut().find(|room| room.id == *id) else {
            return Ok(UpdateResult::new(0, 0));
        };

        // Writing the current value matches but does not modify.
        if room.availability == availability {
            return Ok(UpdateResult::new(1, 0));
        }
        room.availability = availability;
        Ok(UpdateResult::new(1, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn room(price: f64) -> Room {
        Room {
            id: RecordId::new(),
            price_per_night: price,
            availability: Availability::Available,
            room_name: None,
            description: None,
            room_size: None,
            images: Vec::new(),
            special_offer: None,
        }
    }

    fn prices(rooms: &[Room]) -> Vec<f64> {
        rooms.iter().map(|room| room.price_per_night).collect()
    }

    #[tokio::test]
    async fn sorts_by_price_in_both_directions() {
        let repo = MemoryRoomRepository::new(vec![room(200.0), room(80.0), room(150.0)]);

        let asc = repo.list(Some(RoomSort::PriceAsc)).await.unwrap();
        assert_eq!(prices(&asc), vec![80.0, 150.0, 200.0]);

        let desc = repo.list(Some(RoomSort::PriceDesc)).await.unwrap();
        assert_eq!(prices(&desc), vec![200.0, 150.0, 80.0]);

        let natural = repo.list(None).await.unwrap();
        assert_eq!(prices(&natural), vec![200.0, 80.0, 150.0]);
    }

    #[tokio::test]
    async fn update_on_unknown_room_never_reports_success() {
        let repo = MemoryRoomRepository::new(vec![room(100.0)]);
        let result = repo
            .update_availability(&RecordId::new(), Availability::Unavailable)
            .await
            .unwrap();
        assert_eq!(result.matched_count, 0);
        assert!(!result.modified_one());
    }

    #[tokio::test]
    async fn update_changes_only_availability() {
        let original = room(100.0);
        let id = original.id;
        let repo = MemoryRoomRepository::new(vec![original.clone()]);

        let result = repo
            .update_availability(&id, Availability::Unavailable)
            .await
            .unwrap();
        assert!(result.modified_one());

        let updated = repo.get(&id).await.unwrap().unwrap();
        assert_eq!(updated.availability, Availability::Unavailable);
        assert_eq!(
            Room {
                availability: Availability::Available,
                ..updated
            },
            original
        );

        let again = repo
            .update_availability(&id, Availability::Unavailable)
            .await
            .unwrap();
        assert_eq!(again.matched_count, 1);
        assert_eq!(again.modified_count, 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn unknown_sort_values_keep_store_order(
            raw_prices in prop::collection::vec(0.0f64..1000.0, 0..20),
            sort_by in "[a-z_]{0,12}",
        ) {
            prop_assume!(sort_by != "price_asc" && sort_by != "price_desc");
            let rooms: Vec<Room> = raw_prices.iter().copied().map(room).collect();
            let repo = MemoryRoomRepository::new(rooms.clone());

            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let listed = runtime.block_on(repo.list(RoomSort::parse(&sort_by))).unwrap();
            prop_assert_eq!(listed, rooms);
        }
    }
}
