pub mod aggregate;
pub mod board;
pub mod error;
pub mod import;
pub mod models;
pub mod render;
pub mod report;
pub mod store;
pub mod validate;

pub use aggregate::{aggregate, TeacherAggregate};
pub use board::{Confirm, FeedbackBoard, Notification, NotificationKind};
pub use error::{CorruptStateError, PersistenceError, StorageError, SubmitError, ValidationError};
pub use models::{Category, FeedbackRecord, Rating, RatingField, RawSubmission};
pub use render::{render, RenderTree};
pub use store::{BlobStorage, FileStorage, MemoryStorage, RecordStore};
pub use validate::Validator;
