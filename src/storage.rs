//! Storage driver selection.
//!
//! `mongodb` opens one shared [`Store`] and hands it to every Mongo repository.
//! `memory` keeps everything in process, optionally seeding rooms from a JSON
//! file, and is what the test suites run against.

use std::{path::Path, sync::Arc};

use anyhow::Context;
use ezbook_db::Store;
use ezbook_kernel::settings::{DatabaseSettings, StoreDriver};

use crate::modules::{
    bookings::repository::{DynBookingRepository, MemoryBookingRepository, MongoBookingRepository},
    reviews::repository::{DynReviewRepository, MemoryReviewRepository, MongoReviewRepository},
    rooms::{
        models::Room,
        repository::{DynRoomRepository, MemoryRoomRepository, MongoRoomRepository},
    },
};

/// One repository per collection
#[derive(Clone)]
pub struct Repositories {
    pub rooms: DynRoomRepository,
    pub bookings: DynBookingRepository,
    pub reviews: DynReviewRepository,
}

pub struct Storage {
    pub repositories: Repositories,
    store: Option<Store>,
}

impl Storage {
    pub async fn open(settings: &DatabaseSettings) -> anyhow::Result<Self> {
        match settings.driver {
            StoreDriver::Mongodb => {
                let store = Store::connect(settings)
                    .await
                    .context("failed to create document store client")?;

                // The driver reconnects on demand, so an unreachable server is
                // not fatal at boot.
                match store.ping().await {
                    Ok(()) => tracing::info!(database = %settings.name, "document store reachable"),
                    Err(e) => tracing::warn!(error = %e, "document store ping failed"),
                }

                Ok(Self {
                    repositories: Repositories {
                        rooms: Arc::new(MongoRoomRepository::new(store.clone())),
                        bookings: Arc::new(MongoBookingRepository::new(store.clone())),
                        reviews: Arc::new(MongoReviewRepository::new(store.clone())),
                    },
                    store: Some(store),
                })
            }
            StoreDriver::Memory => {
                let rooms = match &settings.seed_path {
                    Some(path) => load_seed(path)?,
                    None => Vec::new(),
                };
                tracing::info!(rooms = rooms.len(), "using in-memory storage");
                Ok(Self::memory(rooms))
            }
        }
    }

    /// In-process storage with the given rooms and empty bookings and reviews
    pub fn memory(rooms: Vec<Room>) -> Self {
        Self {
            repositories: Repositories {
                rooms: Arc::new(MemoryRoomRepository::new(rooms)),
                bookings: Arc::new(MemoryBookingRepository::new()),
                reviews: Arc::new(MemoryReviewRepository::new()),
            },
            store: None,
        }
    }

    pub async fn close(self) {
        if let Some(store) = self.store {
            store.close().await;
        }
    }
}

fn load_seed(path: &Path) -> anyhow::Result<Vec<Room>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read room seed {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse room seed {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_driver_loads_seed_rooms() {
        let dir = tempfile::tempdir().unwrap();
        let seed = dir.path().join("rooms.json");
        std::fs::write(
            &seed,
            r#"[{"_id":"65a1b2c3d4e5f60718293a4b","price_per_night":120,"availability":true,"room_name":"Harbor"}]"#,
        )
        .unwrap();

        let settings = DatabaseSettings {
            driver: StoreDriver::Memory,
            seed_path: Some(seed),
            ..DatabaseSettings::default()
        };
        let storage = Storage::open(&settings).await.unwrap();
        let rooms = storage.repositories.rooms.list(None).await.unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].room_name.as_deref(), Some("Harbor"));
        storage.close().await;
    }

    #[tokio::test]
    async fn unreadable_seed_is_an_error() {
        let settings = DatabaseSettings {
            driver: StoreDriver::Memory,
            seed_path: Some("/nonexistent/rooms.json".into()),
            ..DatabaseSettings::default()
        };
        assert!(Storage::open(&settings).await.is_err());
    }
}
