//! Client-side draft state for the publish form: the two list fields,
//! the selected image, and the submission lifecycle. Scalar fields are
//! validated separately by [`crate::models::EventSubmission`]; the
//! draft owns everything the declarative schema cannot express.

pub mod agenda;
pub mod image;
pub mod state;
pub mod tags;

pub use agenda::AgendaList;
pub use image::ImageAttachment;
pub use state::SubmissionState;
pub use tags::TagList;

// Commit preconditions, checked in fixed order: image, then tags, then
// agenda. The messages are exactly what the form shows the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CommitError {
    #[error("Please upload an event image")]
    MissingImage,
    #[error("Please add at least one tag")]
    MissingTags,
    #[error("Please add at least one agenda item")]
    MissingAgenda,
}

#[derive(Debug, Clone, Default)]
pub struct EventDraft {
    pub tags: TagList,
    pub agenda: AgendaList,
    image: Option<ImageAttachment>,
    state: SubmissionState,
}

impl EventDraft {
    pub fn new() -> Self {
        Self::default()
    }

    // Replaces any previously selected file
    pub fn attach_image(&mut self, image: ImageAttachment) {
        self.image = Some(image);
    }

    pub fn image(&self) -> Option<&ImageAttachment> {
        self.image.as_ref()
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SubmissionState {
        &mut self.state
    }

    // Gate before any network call; first failing precondition wins.
    pub fn ready(&self) -> Result<&ImageAttachment, CommitError> {
        let image = self.image.as_ref().ok_or(CommitError::MissingImage)?;
        if self.tags.is_empty() {
            return Err(CommitError::MissingTags);
        }
        if self.agenda.is_empty() {
            return Err(CommitError::MissingAgenda);
        }
        Ok(image)
    }

    // Back to a blank form
    pub fn reset(&mut self) {
        self.tags.clear();
        self.agenda.clear();
        self.image = None;
        self.state = SubmissionState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poster() -> ImageAttachment {
        ImageAttachment::new("poster.png", "image/png", vec![1, 2, 3])
    }

    #[test]
    fn missing_image_wins_over_other_preconditions() {
        let draft = EventDraft::new();
        assert_eq!(draft.ready().unwrap_err(), CommitError::MissingImage);
    }

    #[test]
    fn missing_tags_is_reported_after_image() {
        let mut draft = EventDraft::new();
        draft.attach_image(poster());
        assert_eq!(draft.ready().unwrap_err(), CommitError::MissingTags);
    }

    #[test]
    fn missing_agenda_is_reported_last() {
        let mut draft = EventDraft::new();
        draft.attach_image(poster());
        draft.tags.add("rust");
        assert_eq!(draft.ready().unwrap_err(), CommitError::MissingAgenda);
    }

    #[test]
    fn complete_draft_is_ready() {
        let mut draft = EventDraft::new();
        draft.attach_image(poster());
        draft.tags.add("rust");
        draft.agenda.add("9:00 AM - Check-in");
        assert!(draft.ready().is_ok());
    }

    #[test]
    fn reset_returns_to_a_blank_idle_form() {
        let mut draft = EventDraft::new();
        draft.attach_image(poster());
        draft.tags.add("rust");
        draft.agenda.add("9:00 AM - Check-in");
        draft.state_mut().fail("Failed to create event");

        draft.reset();
        assert!(draft.image().is_none());
        assert!(draft.tags.is_empty());
        assert!(draft.agenda.is_empty());
        assert_eq!(*draft.state(), SubmissionState::Idle);
    }
}
