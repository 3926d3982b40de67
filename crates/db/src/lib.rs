//! Document store plumbing for EZ Booking.
//!
//! The [`Store`] wraps a single long-lived MongoDB client. It is opened once at
//! startup, cloned into each repository, and closed explicitly at shutdown.

pub mod id;
pub mod outcome;

use mongodb::{
    bson::doc,
    options::{ClientOptions, Credential, ServerApi, ServerApiVersion},
    Client, Collection, Database,
};
use thiserror::Error;

use ezbook_kernel::settings::DatabaseSettings;

pub use id::RecordId;
pub use outcome::{DeleteResult, InsertResult, UpdateResult};

/// Collection names shared by every storage driver.
pub mod collections {
    pub const ROOMS: &str = "rooms";
    pub const BOOKINGS: &str = "bookings";
    pub const REVIEWS: &str = "reviews";
}

/// Errors raised at the store boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid record id '{0}'")]
    InvalidId(String),

    #[error("store operation failed: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("failed to decode stored document: {0}")]
    Decode(#[from] mongodb::bson::de::Error),

    #[error("failed to encode document: {0}")]
    Encode(#[from] mongodb::bson::ser::Error),

    #[error("invalid stored value: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Shared handle to the configured MongoDB database.
#[derive(Clone, Debug)]
pub struct Store {
    client: Client,
    database: Database,
}

impl Store {
    /// Build the client and select the configured database.
    ///
    /// The driver connects lazily, so this succeeds without a reachable server
    /// as long as the URI parses. Call [`Store::ping`] to check reachability.
    pub async fn connect(settings: &DatabaseSettings) -> StoreResult<Self> {
        let mut options = ClientOptions::parse(&settings.uri).await?;
        options.app_name = Some(settings.app_name.clone());
        options.server_api = Some(
            ServerApi::builder()
                .version(ServerApiVersion::V1)
                .strict(true)
                .deprecation_errors(true)
                .build(),
        );
        if let Some(username) = &settings.username {
            options.credential = Some(
                Credential::builder()
                    .username(username.clone())
                    .password(settings.password.clone())
                    .build(),
            );
        }

        let client = Client::with_options(options)?;
        let database = client.database(&settings.name);

        tracing::info!(
            target: "ezbook-db",
            database = %settings.name,
            "document store client created"
        );

        Ok(Self { client, database })
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Typed handle to one collection.
    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.database.collection::<T>(name)
    }

    /// Round-trip a `ping` command to the server.
    pub async fn ping(&self) -> StoreResult<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    /// Close every pooled connection. Outstanding operations are awaited.
    pub async fn close(self) {
        self.client.shutdown().await;
        tracing::info!(target: "ezbook-db", "document store client closed");
    }
}
