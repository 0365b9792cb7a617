pub mod assets;
pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod draft;
pub mod error;
pub mod models;
pub mod redis_client;
pub mod services;
pub mod store;

use std::sync::Arc;
use tokio::task;

// Shared state for the whole application
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub redis: redis_client::RedisClient,
    pub cache: cache::CacheService,
    pub config: config::Config,
    pub store: Arc<dyn store::EventStore>,
    pub assets: Arc<dyn assets::AssetStore>,
}

impl AppState {
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let db = database::Database::new(&config.database.url, config.database.pool_size).await?;

        db.run_migrations().await?;

        let redis = redis_client::RedisClient::new(&config.redis.url).await?;
        let store: Arc<dyn store::EventStore> =
            Arc::new(store::PostgresEventStore::new(db.pool.clone()));
        let assets: Arc<dyn assets::AssetStore> = Arc::new(assets::FsAssetStore::new(
            &config.uploads.dir,
            &config.uploads.base_url,
        ));
        let cache = cache::CacheService::new(
            redis.clone(),
            store.clone(),
            config.cache.events_ttl_seconds,
        );

        let state = Arc::new(Self {
            db,
            redis,
            cache,
            config,
            store,
            assets,
        });

        // Warm the listing cache in the background
        let state_for_bg = state.clone();
        task::spawn(async move {
            state_for_bg.cache.warmup_cache().await;
        });

        Ok(state)
    }
}
