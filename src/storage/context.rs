use crate::config::{DatabaseBackend, DatabaseConfig};
use crate::storage::collection::DocumentCollection;
use crate::storage::memory::MemoryCollection;
use crate::storage::mongo::MongoCollection;
use anyhow::{Context, Result};
use mongodb::{
    Client,
    bson::doc,
    options::{ClientOptions, ServerApi, ServerApiVersion},
};
use std::sync::{Arc, OnceLock};
use tracing::{error, info};

/// Handles to the two collections the API serves.
#[derive(Clone)]
pub struct Collections {
    pub properties: Arc<dyn DocumentCollection>,
    pub ratings: Arc<dyn DocumentCollection>,
}

impl Collections {
    pub fn in_memory() -> Self {
        Self {
            properties: Arc::new(MemoryCollection::new("properties")),
            ratings: Arc::new(MemoryCollection::new("ratings")),
        }
    }
}

/// Storage handles shared with every request.
///
/// Starts empty and is filled at most once, when the background connection
/// completes. Handlers only ever read it.
#[derive(Default)]
pub struct StorageContext {
    collections: OnceLock<Collections>,
}

impl StorageContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that is already connected, for callers that own their stores.
    pub fn ready(collections: Collections) -> Self {
        let context = Self::new();
        context.install(collections);
        context
    }

    pub fn install(&self, collections: Collections) -> bool {
        self.collections.set(collections).is_ok()
    }

    pub fn collections(&self) -> Option<&Collections> {
        self.collections.get()
    }

    pub fn is_ready(&self) -> bool {
        self.collections.get().is_some()
    }

    /// Connect using `config` and install the collections.
    ///
    /// Failures are logged and leave the context not ready; there is no retry.
    pub async fn connect(&self, config: &DatabaseConfig) {
        match open(config).await {
            Ok(collections) => {
                self.install(collections);
                info!(database = %config.name, "✅ Database connected");
            }
            Err(e) => error!("❌ Database connection failed: {:#}", e),
        }
    }
}

async fn open(config: &DatabaseConfig) -> Result<Collections> {
    match config.backend {
        DatabaseBackend::Memory => {
            info!("💾 Using in-memory document store");
            Ok(Collections {
                properties: Arc::new(MemoryCollection::new(&config.properties_collection)),
                ratings: Arc::new(MemoryCollection::new(&config.ratings_collection)),
            })
        }
        DatabaseBackend::Mongodb => {
            let mut options = ClientOptions::parse(config.connection_uri())
                .await
                .context("Invalid MongoDB connection string")?;
            options.server_api = Some(
                ServerApi::builder()
                    .version(ServerApiVersion::V1)
                    .strict(true)
                    .deprecation_errors(true)
                    .build(),
            );

            let client = Client::with_options(options).context("Failed to create MongoDB client")?;
            client
                .database("admin")
                .run_command(doc! { "ping": 1 })
                .await
                .context("MongoDB ping failed")?;

            let database = client.database(&config.name);
            Ok(Collections {
                properties: Arc::new(MongoCollection::new(
                    database.collection(&config.properties_collection),
                )),
                ratings: Arc::new(MongoCollection::new(
                    database.collection(&config.ratings_collection),
                )),
            })
        }
    }
}
