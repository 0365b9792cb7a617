use async_trait::async_trait;

use crate::models::{Event, EventMode};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryEventStore;
pub use postgres::PostgresEventStore;

// Input for a create; id and created_at are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub organizer: String,
    pub overview: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub mode: EventMode,
    pub venue: String,
    pub location: String,
    pub audience: String,
    pub tags: Vec<String>,
    pub agenda: Vec<String>,
    pub image: String,
    pub slug: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("an event with this slug already exists")]
    DuplicateSlug,
    #[error("event store unavailable: {0}")]
    Backend(String),
}

// Document-store capability over Event records. Slug uniqueness is the
// store's responsibility, which keeps concurrent creates race-free
// without check-then-act code in the handlers.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn create(&self, event: NewEvent) -> Result<Event, StoreError>;

    // Newest first; an empty store yields an empty vec, not an error.
    async fn list_all(&self) -> Result<Vec<Event>, StoreError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>, StoreError>;

    // Every other event sharing at least one tag with the source event;
    // an unresolved source slug yields an empty vec.
    async fn find_similar(&self, slug: &str) -> Result<Vec<Event>, StoreError>;
}
