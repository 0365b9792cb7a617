use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::{EventStore, NewEvent, StoreError};
use crate::models::Event;

const EVENT_COLUMNS: &str = "id, title, organizer, overview, description, date, time, mode, \
     venue, location, audience, tags, agenda, image, slug, created_at";

#[derive(Clone)]
pub struct PostgresEventStore {
    pool: Pool<Postgres>,
}

impl PostgresEventStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for PostgresEventStore {
    async fn create(&self, event: NewEvent) -> Result<Event, StoreError> {
        let query = format!(
            "INSERT INTO events \
             (title, organizer, overview, description, date, time, mode, \
              venue, location, audience, tags, agenda, image, slug) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {EVENT_COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(&event.title)
            .bind(&event.organizer)
            .bind(&event.overview)
            .bind(&event.description)
            .bind(&event.date)
            .bind(&event.time)
            .bind(event.mode.as_str())
            .bind(&event.venue)
            .bind(&event.location)
            .bind(&event.audience)
            .bind(&event.tags)
            .bind(&event.agenda)
            .bind(&event.image)
            .bind(&event.slug)
            .fetch_one(&self.pool)
            .await
            .map_err(map_create_err)
    }

    async fn list_all(&self) -> Result<Vec<Event>, StoreError> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Event>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>, StoreError> {
        let query = format!("SELECT {EVENT_COLUMNS} FROM events WHERE slug = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn find_similar(&self, slug: &str) -> Result<Vec<Event>, StoreError> {
        let Some(source) = self.find_by_slug(slug).await? else {
            return Ok(vec![]);
        };
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE slug <> $1 AND tags && $2 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(slug)
            .bind(&source.tags)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

fn map_create_err(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return StoreError::DuplicateSlug;
        }
    }
    StoreError::Backend(err.to_string())
}
