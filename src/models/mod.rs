pub mod event;
pub mod submission;

pub use event::{Event, EventMode};
pub use submission::EventSubmission;
