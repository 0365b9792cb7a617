use std::time::Duration;

use serde::Deserialize;
use tracing::error;
use validator::Validate;

use crate::draft::EventDraft;
use crate::models::submission::validation_message;
use crate::models::EventSubmission;

const GENERIC_FAILURE: &str = "Failed to create event";
const UNEXPECTED_FAILURE: &str = "An unexpected error occurred";

// --- Wire mirrors of the ingestion endpoint's responses ---

#[derive(Debug, Deserialize)]
struct CreatedResponse {
    #[allow(dead_code)]
    status: String,
    slug: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

// Client for the ingestion endpoint. Gathers the validated scalars and
// the draft's list/image state into one multipart request and drives
// the draft's submission state machine through the attempt.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    http_client: reqwest::Client,
    endpoint: String,
}

impl EventPublisher {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            endpoint: endpoint.into(),
        }
    }

    // Commit the draft. Preconditions are settled locally before any
    // network call: scalar validation, then image, tags, agenda. The
    // returned state is a copy of the draft's state after the attempt;
    // while a previous attempt is in flight the call is a no-op.
    pub async fn publish(
        &self,
        submission: &EventSubmission,
        draft: &mut EventDraft,
    ) -> crate::draft::SubmissionState {
        if draft.state().is_in_flight() {
            return draft.state().clone();
        }

        if let Err(errors) = submission.validate() {
            draft.state_mut().fail(validation_message(&errors));
            return draft.state().clone();
        }

        let image = match draft.ready() {
            Ok(image) => image.clone(),
            Err(reason) => {
                draft.state_mut().fail(reason.to_string());
                return draft.state().clone();
            }
        };

        draft.state_mut().begin();

        let form = match build_form(submission, draft, &image) {
            Ok(form) => form,
            Err(err) => {
                error!("failed to assemble multipart payload: {:?}", err);
                draft.state_mut().fail(UNEXPECTED_FAILURE);
                return draft.state().clone();
            }
        };

        match self.http_client.post(&self.endpoint).multipart(form).send().await {
            Ok(response) if response.status().is_success() => {
                match response.json::<CreatedResponse>().await {
                    Ok(body) => {
                        let slug = body.slug.unwrap_or_default();
                        draft.state_mut().succeed(slug);
                    }
                    Err(err) => {
                        error!("unreadable success response: {:?}", err);
                        draft.state_mut().fail(UNEXPECTED_FAILURE);
                    }
                }
            }
            Ok(response) => {
                // The server's message is surfaced verbatim when present
                let message = response
                    .json::<ErrorResponse>()
                    .await
                    .ok()
                    .and_then(|body| body.message)
                    .unwrap_or_else(|| GENERIC_FAILURE.to_string());
                draft.state_mut().fail(message);
            }
            Err(err) => {
                error!("event submission failed: {:?}", err);
                draft.state_mut().fail(UNEXPECTED_FAILURE);
            }
        }

        draft.state().clone()
    }
}

fn build_form(
    submission: &EventSubmission,
    draft: &EventDraft,
    image: &crate::draft::ImageAttachment,
) -> Result<reqwest::multipart::Form, reqwest::Error> {
    let part = reqwest::multipart::Part::bytes(image.bytes().to_vec())
        .file_name(image.filename().to_string())
        .mime_str(image.content_type())?;

    Ok(reqwest::multipart::Form::new()
        .text("title", submission.title.clone())
        .text("organizer", submission.organizer.clone())
        .text("overview", submission.overview.clone())
        .text("description", submission.description.clone())
        .text("date", submission.date.clone())
        .text("time", submission.time.clone())
        .text("mode", submission.mode.clone())
        .text("venue", submission.venue.clone())
        .text("location", submission.location.clone())
        .text("audience", submission.audience.clone())
        .text("tags", draft.tags.to_json())
        .text("agenda", draft.agenda.to_json())
        .part("image", part))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{ImageAttachment, SubmissionState};

    // Unroutable endpoint: any accidental network call turns into a
    // transport failure, which these tests would catch as the wrong
    // failure message.
    fn publisher() -> EventPublisher {
        EventPublisher::new("http://127.0.0.1:9/api/events")
    }

    fn valid_submission() -> EventSubmission {
        EventSubmission {
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
        }
    }

    #[tokio::test]
    async fn no_image_aborts_before_any_network_call() {
        let mut draft = EventDraft::new();
        draft.tags.add("rust");
        draft.agenda.add("9:00 AM - Check-in");

        let state = publisher().publish(&valid_submission(), &mut draft).await;
        assert_eq!(
            state,
            SubmissionState::Failed {
                message: "Please upload an event image".into()
            }
        );
    }

    #[tokio::test]
    async fn precondition_precedence_is_image_tags_agenda() {
        let mut draft = EventDraft::new();
        let state = publisher().publish(&valid_submission(), &mut draft).await;
        assert_eq!(state.failure_message(), Some("Please upload an event image"));

        draft.attach_image(ImageAttachment::new("poster.png", "image/png", vec![1]));
        let state = publisher().publish(&valid_submission(), &mut draft).await;
        assert_eq!(state.failure_message(), Some("Please add at least one tag"));

        draft.tags.add("rust");
        let state = publisher().publish(&valid_submission(), &mut draft).await;
        assert_eq!(
            state.failure_message(),
            Some("Please add at least one agenda item")
        );
    }

    #[tokio::test]
    async fn invalid_scalars_block_the_commit() {
        let mut draft = EventDraft::new();
        draft.attach_image(ImageAttachment::new("poster.png", "image/png", vec![1]));
        draft.tags.add("rust");
        draft.agenda.add("9:00 AM - Check-in");

        let mut submission = valid_submission();
        submission.title = "Con".into();

        let state = publisher().publish(&submission, &mut draft).await;
        assert_eq!(
            state.failure_message(),
            Some("title: Title must be at least 5 characters")
        );
    }

    #[tokio::test]
    async fn in_flight_draft_is_not_resubmitted() {
        let mut draft = EventDraft::new();
        draft.state_mut().begin();

        let state = publisher().publish(&valid_submission(), &mut draft).await;
        assert_eq!(state, SubmissionState::Submitting);
    }
}
