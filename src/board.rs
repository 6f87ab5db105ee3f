use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::aggregate::{aggregate, summarize_by_subject, SubjectSummary};
use crate::error::SubmitError;
use crate::models::{FeedbackRecord, RawSubmission};
use crate::render::{render, RenderTree};
use crate::store::{BlobStorage, RecordStore};
use crate::validate::Validator;

pub const CLEAR_ALL_PROMPT: &str =
    "Are you sure you want to delete all feedbacks? This action cannot be undone.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    pub fn icon(self) -> &'static str {
        match self {
            NotificationKind::Success => "check-circle",
            NotificationKind::Warning => "exclamation-triangle",
            NotificationKind::Error => "times-circle",
            NotificationKind::Info => "info-circle",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn new(message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, NotificationKind::Info)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, NotificationKind::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NotificationKind::Error)
    }

    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}

pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

pub struct FeedbackBoard<S> {
    store: RecordStore<S>,
    validator: Validator,
}

impl<S: BlobStorage> FeedbackBoard<S> {
    pub fn open(storage: S) -> Self {
        Self::from_store(RecordStore::load(storage))
    }

    pub fn from_store(store: RecordStore<S>) -> Self {
        let last_id = store.records().iter().map(|record| record.id).max();
        Self {
            store,
            validator: Validator::starting_after(last_id),
        }
    }

    pub fn store(&self) -> &RecordStore<S> {
        &self.store
    }

    pub fn records(&self) -> &[FeedbackRecord] {
        self.store.records()
    }

    pub fn into_store(self) -> RecordStore<S> {
        self.store
    }

    pub fn accept(&mut self, payload: &RawSubmission) -> Result<FeedbackRecord, SubmitError> {
        self.accept_at(payload, Local::now())
    }

    pub fn accept_at(
        &mut self,
        payload: &RawSubmission,
        now: DateTime<Local>,
    ) -> Result<FeedbackRecord, SubmitError> {
        let record = self.validator.validate_at(payload, now)?;
        self.store.append(record.clone())?;
        debug!(id = record.id, teacher = %record.teacher_name, "submission accepted");
        Ok(record)
    }

    pub fn submit(&mut self, payload: &RawSubmission) -> Notification {
        self.submit_at(payload, Local::now())
    }

    pub fn submit_at(&mut self, payload: &RawSubmission, now: DateTime<Local>) -> Notification {
        match self.accept_at(payload, now) {
            Ok(_) => Notification::success("🎉 Thank you for your valuable feedback!"),
            Err(SubmitError::Invalid(reason)) => Notification::error(reason.user_message()),
            Err(SubmitError::Persistence(_)) => Notification::error("Error saving feedback!"),
        }
    }

    pub fn clear_form(&self) -> Notification {
        Notification::info("Form cleared successfully!")
    }

    pub fn clear_all(&mut self, gate: &mut impl Confirm) -> Option<Notification> {
        if !gate.confirm(CLEAR_ALL_PROMPT) {
            debug!("clear-all declined");
            return None;
        }
        Some(match self.store.clear() {
            Ok(()) => Notification::info("All feedbacks cleared successfully!"),
            Err(_) => Notification::error("Error clearing feedbacks!"),
        })
    }

    pub fn render(&self) -> RenderTree {
        render(&aggregate(self.store.records()))
    }

    pub fn subject_mix(&self) -> Vec<SubjectSummary> {
        summarize_by_subject(self.store.records())
    }
}
