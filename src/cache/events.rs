use redis::AsyncCommands;

use crate::cache::CacheService;
use crate::models::Event;

const EVENTS_KEY: &str = "events:list";

impl CacheService {
    // Listing read path: cache first, store on a miss, empty on total
    // failure (the listing page degrades, it never errors).
    pub async fn get_events(&self) -> Vec<Event> {
        if let Ok(events) = self.get_events_from_cache().await {
            return events;
        }

        match self.store.list_all().await {
            Ok(events) => {
                let _ = self.save_events_to_cache(&events).await;
                events
            }
            Err(e) => {
                tracing::error!("failed to load events from store: {:?}", e);
                vec![]
            }
        }
    }

    async fn get_events_from_cache(&self) -> Result<Vec<Event>, redis::RedisError> {
        let mut conn = self.redis.conn.clone();
        let data: String = conn.get(EVENTS_KEY).await?;
        let events: Vec<Event> = serde_json::from_str(&data)
            .map_err(|_| redis::RedisError::from((redis::ErrorKind::TypeError, "Parse error")))?;
        Ok(events)
    }

    async fn save_events_to_cache(&self, events: &[Event]) -> Result<(), redis::RedisError> {
        let data = serde_json::to_string(events)
            .map_err(|_| redis::RedisError::from((redis::ErrorKind::TypeError, "Serialize error")))?;
        let mut conn = self.redis.conn.clone();
        conn.set_ex(EVENTS_KEY, data, self.events_ttl).await
    }
}
