use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::assets::AssetStore;
use crate::error::AppError;
use crate::models::{event::slugify, Event, EventMode, EventSubmission};
use crate::store::{EventStore, NewEvent, StoreError};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/{slug}", get(get_event))
        .route("/events/{slug}/similar", get(similar_events))
}

/* ---------- READS ---------- */

// GET /api/events: full listing through the TTL cache; degrades to an
// empty list rather than erroring.
async fn list_events(State(state): State<Arc<AppState>>) -> Json<Vec<Event>> {
    Json(state.cache.get_events().await)
}

// GET /api/events/{slug}
async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Event>, AppError> {
    match state.store.find_by_slug(&slug).await {
        Ok(Some(event)) => Ok(Json(event)),
        Ok(None) => Err(AppError::NotFound),
        Err(e) => {
            tracing::error!("event lookup failed for {}: {:?}", slug, e);
            Err(AppError::NotFound)
        }
    }
}

// GET /api/events/{slug}/similar: events sharing at least one tag.
// Always 200; an unknown slug or a store failure yields an empty list.
async fn similar_events(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Json<Vec<Event>> {
    match state.store.find_similar(&slug).await {
        Ok(events) => Json(events),
        Err(e) => {
            tracing::error!("similarity lookup failed for {}: {:?}", slug, e);
            Json(vec![])
        }
    }
}

/* ---------- INGESTION ---------- */

// POST /api/events, multipart body: the ten scalar fields plus `tags` and
// `agenda` as JSON arrays of strings and one binary `image` part.
async fn create_event(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let raw = collect_multipart(&mut multipart).await?;
    let slug = process_submission(state.store.as_ref(), state.assets.as_ref(), raw).await?;
    // The listing cache is not purged here; it expires on its own
    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "created", "slug": slug })),
    ))
}

#[derive(Debug, Default)]
struct RawSubmission {
    submission: EventSubmission,
    tags_json: Option<String>,
    agenda_json: Option<String>,
    image: Option<ImagePart>,
}

#[derive(Debug)]
struct ImagePart {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

async fn collect_multipart(multipart: &mut Multipart) -> Result<RawSubmission, AppError> {
    let mut raw = RawSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::MalformedPayload(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == "image" {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::MalformedPayload(e.to_string()))?;
            raw.image = Some(ImagePart {
                filename,
                content_type,
                bytes: bytes.to_vec(),
            });
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::MalformedPayload(e.to_string()))?;
            raw.set_text_field(&name, text);
        }
    }

    Ok(raw)
}

impl RawSubmission {
    // Unknown part names are ignored; absent scalars stay empty and get
    // reported per field by validation.
    fn set_text_field(&mut self, name: &str, value: String) {
        match name {
            "title" => self.submission.title = value,
            "organizer" => self.submission.organizer = value,
            "overview" => self.submission.overview = value,
            "description" => self.submission.description = value,
            "date" => self.submission.date = value,
            "time" => self.submission.time = value,
            "mode" => self.submission.mode = value,
            "venue" => self.submission.venue = value,
            "location" => self.submission.location = value,
            "audience" => self.submission.audience = value,
            "tags" => self.tags_json = Some(value),
            "agenda" => self.agenda_json = Some(value),
            _ => {}
        }
    }
}

// The ingestion pipeline behind the extractor: revalidate, decode the
// list fields, require the image, store the asset, derive the slug,
// persist. Kept free of axum types so it runs against the in-memory
// fakes in tests.
async fn process_submission(
    store: &dyn EventStore,
    assets: &dyn AssetStore,
    raw: RawSubmission,
) -> Result<String, AppError> {
    raw.submission
        .validate()
        .map_err(AppError::ValidationFailed)?;

    let mode: EventMode = raw
        .submission
        .mode
        .parse()
        .map_err(|_| AppError::MalformedPayload("mode must be online, offline or hybrid".into()))?;

    let tags = dedup_preserving_order(decode_list("tags", raw.tags_json)?);
    let agenda = decode_list("agenda", raw.agenda_json)?;

    let image = raw
        .image
        .filter(|part| !part.bytes.is_empty())
        .ok_or(AppError::MissingImage)?;

    let image_url = assets
        .store(&image.filename, &image.content_type, &image.bytes)
        .await
        .map_err(|e| AppError::Unexpected(e.into()))?;

    let submission = raw.submission;
    let mut slug = slugify(&submission.title);
    if slug.is_empty() {
        slug = slug_suffix();
    }

    let new_event = NewEvent {
        title: submission.title,
        organizer: submission.organizer,
        overview: submission.overview,
        description: submission.description,
        date: submission.date,
        time: submission.time,
        mode,
        venue: submission.venue,
        location: submission.location,
        audience: submission.audience,
        tags,
        agenda,
        image: image_url,
        slug,
    };

    match store.create(new_event.clone()).await {
        Ok(event) => Ok(event.slug),
        // One suffixed retry on a slug collision; the unique constraint
        // arbitrates concurrent submissions with the same title
        Err(StoreError::DuplicateSlug) => {
            let mut retry = new_event;
            retry.slug = format!("{}-{}", retry.slug, slug_suffix());
            match store.create(retry).await {
                Ok(event) => Ok(event.slug),
                Err(e) => Err(AppError::PersistenceFailed(e.to_string())),
            }
        }
        Err(e) => Err(AppError::PersistenceFailed(e.to_string())),
    }
}

fn decode_list(field: &str, value: Option<String>) -> Result<Vec<String>, AppError> {
    let raw =
        value.ok_or_else(|| AppError::MalformedPayload(format!("missing {field} field")))?;
    let entries: Vec<String> = serde_json::from_str(&raw).map_err(|_| {
        AppError::MalformedPayload(format!("{field} must be a JSON array of strings"))
    })?;
    if entries.is_empty() {
        return Err(AppError::MalformedPayload(format!(
            "{field} must contain at least one entry"
        )));
    }
    Ok(entries)
}

// First occurrence wins; order is otherwise untouched
fn dedup_preserving_order(entries: Vec<String>) -> Vec<String> {
    let mut deduped: Vec<String> = Vec::with_capacity(entries.len());
    for entry in entries {
        if !deduped.contains(&entry) {
            deduped.push(entry);
        }
    }
    deduped
}

fn slug_suffix() -> String {
    let mut suffix = uuid::Uuid::new_v4().simple().to_string();
    suffix.truncate(6);
    suffix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::InMemoryAssetStore;
    use crate::store::InMemoryEventStore;

    fn valid_raw() -> RawSubmission {
        RawSubmission {
            submission: EventSubmission {
                title: "Next.js Conf 2026".into(),
                organizer: "Vercel".into(),
                overview: "A catchy one-sentence summary of the event".into(),
                description: "Detailed breakdown of the schedule, speakers, and highlights".into(),
                date: "2026-10-01".into(),
                time: "09:00".into(),
                mode: "online".into(),
                venue: "Moscone Center".into(),
                location: "San Francisco, CA".into(),
                audience: "Web Developers".into(),
            },
            tags_json: Some(r#"["nextjs","react"]"#.into()),
            agenda_json: Some(
                r#"["9:00 AM - Check-in","10:00 AM - Keynote","12:00 PM - Lunch"]"#.into(),
            ),
            image: Some(ImagePart {
                filename: "poster.png".into(),
                content_type: "image/png".into(),
                bytes: vec![0x89, 0x50, 0x4e, 0x47],
            }),
        }
    }

    #[tokio::test]
    async fn full_submission_creates_the_event() {
        let store = InMemoryEventStore::new();
        let assets = InMemoryAssetStore::default();

        let slug = process_submission(&store, &assets, valid_raw()).await.unwrap();
        assert_eq!(slug, "nextjs-conf-2026");
        assert_eq!(assets.stored_count(), 1);

        let all = store.list_all().await.unwrap();
        assert_eq!(all.first().map(|e| e.slug.as_str()), Some("nextjs-conf-2026"));
        assert_eq!(all[0].tags, vec!["nextjs", "react"]);
        assert_eq!(all[0].agenda.len(), 3);
        assert!(all[0].image.starts_with("/uploads/"));
    }

    #[tokio::test]
    async fn new_event_lists_first() {
        let store = InMemoryEventStore::new();
        let assets = InMemoryAssetStore::default();

        let mut earlier = valid_raw();
        earlier.submission.title = "RustConf 2025".into();
        process_submission(&store, &assets, earlier).await.unwrap();
        process_submission(&store, &assets, valid_raw()).await.unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all.first().map(|e| e.slug.as_str()), Some("nextjs-conf-2026"));
    }

    #[tokio::test]
    async fn missing_image_is_rejected() {
        let store = InMemoryEventStore::new();
        let assets = InMemoryAssetStore::default();

        let mut raw = valid_raw();
        raw.image = None;
        let err = process_submission(&store, &assets, raw).await.unwrap_err();
        assert!(matches!(err, AppError::MissingImage));
        assert_eq!(assets.stored_count(), 0);
    }

    #[tokio::test]
    async fn empty_image_part_is_rejected() {
        let store = InMemoryEventStore::new();
        let assets = InMemoryAssetStore::default();

        let mut raw = valid_raw();
        raw.image = Some(ImagePart {
            filename: "poster.png".into(),
            content_type: "image/png".into(),
            bytes: vec![],
        });
        let err = process_submission(&store, &assets, raw).await.unwrap_err();
        assert!(matches!(err, AppError::MissingImage));
    }

    #[tokio::test]
    async fn invalid_scalars_are_revalidated_server_side() {
        let store = InMemoryEventStore::new();
        let assets = InMemoryAssetStore::default();

        let mut raw = valid_raw();
        raw.submission.title = "Con".into();
        let err = process_submission(&store, &assets, raw).await.unwrap_err();
        let AppError::ValidationFailed(errors) = err else {
            panic!("expected validation failure");
        };
        assert!(errors.field_errors().contains_key("title"));
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn undecodable_tags_are_malformed() {
        let store = InMemoryEventStore::new();
        let assets = InMemoryAssetStore::default();

        let mut raw = valid_raw();
        raw.tags_json = Some("not json".into());
        let err = process_submission(&store, &assets, raw).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedPayload(_)));
    }

    #[tokio::test]
    async fn non_string_array_tags_are_malformed() {
        let store = InMemoryEventStore::new();
        let assets = InMemoryAssetStore::default();

        let mut raw = valid_raw();
        raw.tags_json = Some("[1, 2, 3]".into());
        let err = process_submission(&store, &assets, raw).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedPayload(_)));
    }

    #[tokio::test]
    async fn empty_agenda_is_malformed() {
        let store = InMemoryEventStore::new();
        let assets = InMemoryAssetStore::default();

        let mut raw = valid_raw();
        raw.agenda_json = Some("[]".into());
        let err = process_submission(&store, &assets, raw).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedPayload(_)));
    }

    #[tokio::test]
    async fn duplicate_tags_from_a_nonconforming_client_are_dropped() {
        let store = InMemoryEventStore::new();
        let assets = InMemoryAssetStore::default();

        let mut raw = valid_raw();
        raw.tags_json = Some(r#"["react","nextjs","react"]"#.into());
        let slug = process_submission(&store, &assets, raw).await.unwrap();

        let event = store.find_by_slug(&slug).await.unwrap().unwrap();
        assert_eq!(event.tags, vec!["react", "nextjs"]);
    }

    #[tokio::test]
    async fn colliding_title_gets_a_suffixed_slug() {
        let store = InMemoryEventStore::new();
        let assets = InMemoryAssetStore::default();

        let first = process_submission(&store, &assets, valid_raw()).await.unwrap();
        let second = process_submission(&store, &assets, valid_raw()).await.unwrap();

        assert_eq!(first, "nextjs-conf-2026");
        assert!(second.starts_with("nextjs-conf-2026-"));
        assert_ne!(first, second);
        assert!(store.find_by_slug(&second).await.unwrap().is_some());
    }
}
