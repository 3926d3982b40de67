//! Booking storage: the repository contract plus MongoDB and in-memory drivers.

use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use ezbook_db::{collections, DeleteResult, InsertResult, RecordId, Store, StoreResult, UpdateResult};

use super::models::{Booking, NewBooking};

pub type DynBookingRepository = Arc<dyn BookingRepository>;

/// Booking repository trait
///
/// No operation checks ownership; callers decide who may see or change what.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, booking: NewBooking) -> StoreResult<InsertResult>;

    /// Bookings of `user_mail`, or every booking when `None`
    async fn list(&self, user_mail: Option<&str>) -> StoreResult<Vec<Booking>>;

    /// Overwrite `formattedDate` only
    async fn update_date(&self, id: &RecordId, formatted_date: &str) -> StoreResult<UpdateResult>;

    async fn delete(&self, id: &RecordId) -> StoreResult<DeleteResult>;
}

#[derive(Debug, Serialize, Deserialize)]
struct BookingDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(rename = "userMail")]
    user_mail: String,
    #[serde(alias = "roomId")]
    room: String,
    #[serde(rename = "formattedDate")]
    formatted_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    price_per_night: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    room_name: Option<String>,
}

impl From<Booking> for BookingDocument {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id.object_id(),
            user_mail: booking.user_mail,
            room: booking.room,
            formatted_date: booking.formatted_date,
            price_per_night: booking.price_per_night,
            room_name: booking.room_name,
        }
    }
}

impl From<BookingDocument> for Booking {
    fn from(document: BookingDocument) -> Self {
        Self {
            id: document.id.into(),
            user_mail: document.user_mail,
            room: document.room,
            formatted_date: document.formatted_date,
            price_per_night: document.price_per_night,
            room_name: document.room_name,
        }
    }
}

/// Bookings stored in the `bookings` collection
pub struct MongoBookingRepository {
    store: Store,
}

impl MongoBookingRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BookingRepository for MongoBookingRepository {
    async fn create(&self, booking: NewBooking) -> StoreResult<InsertResult> {
        let document = BookingDocument::from(booking.into_booking(RecordId::new()));
        let result = self
            .store
            .collection::<BookingDocument>(collections::BOOKINGS)
            .insert_one(document)
            .await?;
        Ok(result.into())
    }

    async fn list(&self, user_mail: Option<&str>) -> StoreResult<Vec<Booking>> {
        let filter = match user_mail {
            Some(mail) => doc! { "userMail": mail },
            None => doc! {},
        };
        let documents: Vec<BookingDocument> = self
            .store
            .collection::<BookingDocument>(collections::BOOKINGS)
            .find(filter)
            .await?
            .try_collect()
            .await?;
        Ok(documents.into_iter().map(Booking::from).collect())
    }

    async fn update_date(&self, id: &RecordId, formatted_date: &str) -> StoreResult<UpdateResult> {
        let result = self
            .store
            .collection::<Document>(collections::BOOKINGS)
            .update_one(
                doc! { "_id": id.object_id() },
                doc! { "$set": { "formattedDate": formatted_date } },
            )
            .await?;
        Ok(result.into())
    }

    async fn delete(&self, id: &RecordId) -> StoreResult<DeleteResult> {
        let result = self
            .store
            .collection::<Document>(collections::BOOKINGS)
            .delete_one(doc! { "_id": id.object_id() })
            .await?;
        Ok(result.into())
    }
}

/// Process-local bookings, in insertion order
#[derive(Default)]
pub struct MemoryBookingRepository {
    bookings: RwLock<Vec<Booking>>,
}

impl MemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for MemoryBookingRepository {
    async fn create(&self, booking: NewBooking) -> StoreResult<InsertResult> {
        let id = RecordId::new();
        self.bookings.write().await.push(booking.into_booking(id));
        Ok(InsertResult::new(id.to_hex()))
    }

    async fn list(&self, user_mail: Option<&str>) -> StoreResult<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings
            .iter()
            .filter(|booking| user_mail.map_or(true, |mail| booking.user_mail == mail))
            .cloned()
            .collect())
    }

    async fn update_date(&self, id: &RecordId, formatted_date: &str) -> StoreResult<UpdateResult> {
        let mut bookings = self.bookings.write().await;
        let Some(booking) = bookings.iter_mut().find(|booking| booking.id == *id) else {
            return Ok(UpdateResult::new(0, 0));
        };

        if booking.formatted_date == formatted_date {
            return Ok(UpdateResult::new(1, 0));
        }
        booking.formatted_date = formatted_date.to_string();
        Ok(UpdateResult::new(1, 1))
    }

    async fn delete(&self, id: &RecordId) -> StoreResult<DeleteResult> {
        let mut bookings = self.bookings.write().await;
        let before = bookings.len();
        bookings.retain(|booking| booking.id != *id);
        Ok(DeleteResult::new((before - bookings.len()) as u64))
    }
}
