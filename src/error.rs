use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("teacher name required")]
    MissingTeacherName,
    #[error("subject required")]
    MissingSubject,
    #[error("all ratings required")]
    MissingRatings,
    #[error("comments required")]
    MissingComments,
}

impl ValidationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::MissingTeacherName => "Please enter teacher name!",
            ValidationError::MissingSubject => "Please select a subject!",
            ValidationError::MissingRatings => "Please rate all categories!",
            ValidationError::MissingComments => "Please provide comments!",
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage quota exceeded: {requested} bytes requested, limit is {limit}")]
    QuotaExceeded { requested: usize, limit: usize },
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to persist feedback: {0}")]
    Storage(#[from] StorageError),
    #[error("failed to encode feedback: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CorruptStateError {
    #[error("malformed feedback blob: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
