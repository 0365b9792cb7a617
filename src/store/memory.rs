use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use super::{EventStore, NewEvent, StoreError};
use crate::models::Event;

// In-memory stand-in for the Postgres store. Backs the test suite and
// keeps the ingestion/query pipeline exercisable without a database.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: Mutex<Vec<Event>>,
    next_id: AtomicI64,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn create(&self, event: NewEvent) -> Result<Event, StoreError> {
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        if events.iter().any(|e| e.slug == event.slug) {
            return Err(StoreError::DuplicateSlug);
        }
        let stored = Event {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            title: event.title,
            organizer: event.organizer,
            overview: event.overview,
            description: event.description,
            date: event.date,
            time: event.time,
            mode: event.mode,
            venue: event.venue,
            location: event.location,
            audience: event.audience,
            tags: event.tags,
            agenda: event.agenda,
            image: event.image,
            slug: event.slug,
            created_at: Utc::now(),
        };
        events.push(stored.clone());
        Ok(stored)
    }

    async fn list_all(&self) -> Result<Vec<Event>, StoreError> {
        let events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        let mut all = events.clone();
        // id breaks ties when two creates land on the same timestamp
        all.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(all)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>, StoreError> {
        let events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(events.iter().find(|e| e.slug == slug).cloned())
    }

    async fn find_similar(&self, slug: &str) -> Result<Vec<Event>, StoreError> {
        let events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(source) = events.iter().find(|e| e.slug == slug) else {
            return Ok(vec![]);
        };
        let mut similar: Vec<Event> = events
            .iter()
            .filter(|e| e.slug != slug && e.tags.iter().any(|t| source.tags.contains(t)))
            .cloned()
            .collect();
        similar.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(similar)
    }
}
