// Submission lifecycle, one explicit machine instead of an in-flight
// flag plus an error string. Only `Submitting` blocks a new attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Succeeded {
        slug: String,
    },
    Failed {
        message: String,
    },
}

impl SubmissionState {
    // Transition into Submitting; refused while a request is in flight.
    pub fn begin(&mut self) -> bool {
        if self.is_in_flight() {
            return false;
        }
        *self = Self::Submitting;
        true
    }

    pub fn succeed(&mut self, slug: impl Into<String>) {
        *self = Self::Succeeded { slug: slug.into() };
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        *self = Self::Failed {
            message: message.into(),
        };
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Failed { message } => Some(message),
            _ => None,
        }
    }
}
