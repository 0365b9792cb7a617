use std::sync::Arc;

use tracing::info;

use crate::redis_client::RedisClient;
use crate::store::EventStore;

pub mod events;

// Time-based read-through cache in front of the event store. A create
// never purges entries; they simply expire, so the listing may lag a
// fresh event by up to the TTL.
#[derive(Clone)]
pub struct CacheService {
    redis: RedisClient,
    store: Arc<dyn EventStore>,
    events_ttl: u64,
}

impl CacheService {
    pub fn new(redis: RedisClient, store: Arc<dyn EventStore>, events_ttl: u64) -> Self {
        Self {
            redis,
            store,
            events_ttl,
        }
    }

    pub async fn warmup_cache(&self) {
        info!("Starting cache warmup...");
        let events = self.get_events().await;
        info!("Cache warmup done, {} events loaded", events.len());
    }
}
