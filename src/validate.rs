use chrono::{DateTime, Local, Utc};

use crate::error::ValidationError;
use crate::models::{Category, FeedbackRecord, RatingField, RawSubmission, Rating};

#[derive(Debug, Default)]
pub struct Validator {
    last_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedSubmission {
    pub teacher_name: String,
    pub subject: String,
    pub categories: [Rating; 7],
    pub satisfaction: Rating,
    pub comments: String,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    // Ids issued in an earlier run may already be ahead of the clock.
    pub fn starting_after(last_id: Option<i64>) -> Self {
        Self {
            last_id: last_id.unwrap_or_default(),
        }
    }

    pub fn validate(&mut self, payload: &RawSubmission) -> Result<FeedbackRecord, ValidationError> {
        self.validate_at(payload, Local::now())
    }

    pub fn validate_at(
        &mut self,
        payload: &RawSubmission,
        now: DateTime<Local>,
    ) -> Result<FeedbackRecord, ValidationError> {
        let checked = check(payload)?;
        let id = self.next_id(now.timestamp_millis());
        Ok(checked.into_record(id, now))
    }

    fn next_id(&mut self, now_ms: i64) -> i64 {
        let id = now_ms.max(self.last_id + 1);
        self.last_id = id;
        id
    }
}

pub fn check(payload: &RawSubmission) -> Result<CheckedSubmission, ValidationError> {
    let teacher_name = non_blank(payload.teacher_name.as_deref())
        .ok_or(ValidationError::MissingTeacherName)?;

    let subject = payload
        .subject
        .as_deref()
        .filter(|subject| !subject.is_empty())
        .ok_or(ValidationError::MissingSubject)?;

    let mut categories = [Rating::LOWEST; 7];
    for (slot, category) in categories.iter_mut().zip(Category::ALL) {
        *slot = payload
            .selected(RatingField::Category(category))
            .ok_or(ValidationError::MissingRatings)?;
    }
    let satisfaction = payload
        .selected(RatingField::Satisfaction)
        .ok_or(ValidationError::MissingRatings)?;

    let comments =
        non_blank(payload.comments.as_deref()).ok_or(ValidationError::MissingComments)?;

    Ok(CheckedSubmission {
        teacher_name: teacher_name.to_string(),
        subject: subject.to_string(),
        categories,
        satisfaction,
        comments: comments.to_string(),
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

impl CheckedSubmission {
    pub fn into_record(self, id: i64, now: DateTime<Local>) -> FeedbackRecord {
        let [effectiveness, communication, knowledge, management, punctuality, support, aids] =
            self.categories;
        FeedbackRecord {
            id,
            teacher_name: self.teacher_name,
            subject: self.subject,
            effectiveness,
            communication,
            knowledge,
            management,
            punctuality,
            support,
            aids,
            satisfaction: self.satisfaction,
            comments: self.comments,
            date: display_date(now),
            time: display_time(now),
            timestamp: now.with_timezone(&Utc),
        }
    }
}

pub fn display_date(now: DateTime<Local>) -> String {
    now.format("%-d/%-m/%Y").to_string()
}

pub fn display_time(now: DateTime<Local>) -> String {
    now.format("%I:%M %P").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn complete_payload() -> RawSubmission {
        RawSubmission::new()
            .with_teacher_name("  Asha Rao ")
            .with_subject("Mathematics")
            .select_all("4")
            .with_comments(" Explains proofs clearly. ")
    }

    fn noon() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 1, 5, 12, 0, 0)
            .earliest()
            .unwrap()
    }

    #[test]
    fn valid_payload_builds_trimmed_record() {
        let mut validator = Validator::new();
        let record = validator.validate_at(&complete_payload(), noon()).unwrap();

        assert_eq!(record.teacher_name, "Asha Rao");
        assert_eq!(record.subject, "Mathematics");
        assert_eq!(record.comments, "Explains proofs clearly.");
        assert_eq!(record.satisfaction.value(), 4);
        for category in Category::ALL {
            assert_eq!(record.rating(category).value(), 4);
        }
        assert_eq!(record.id, noon().timestamp_millis());
        assert_eq!(record.date, "5/1/2026");
        assert_eq!(record.time, "12:00 pm");
        assert_eq!(record.timestamp, noon().with_timezone(&Utc));
    }

    #[test]
    fn ids_increase_within_the_same_millisecond() {
        let mut validator = Validator::new();
        let first = validator.validate_at(&complete_payload(), noon()).unwrap();
        let second = validator.validate_at(&complete_payload(), noon()).unwrap();
        let third = validator.validate(&complete_payload()).unwrap();

        assert!(first.id < second.id);
        assert!(second.id < third.id);
    }

    #[test]
    fn seeded_validator_never_reissues_earlier_ids() {
        let later = noon().timestamp_millis() + 5;
        let mut validator = Validator::starting_after(Some(later));
        let record = validator.validate_at(&complete_payload(), noon()).unwrap();
        assert_eq!(record.id, later + 1);
    }

    #[test]
    fn blank_teacher_name_fails_first() {
        let payload = RawSubmission::new().with_teacher_name("   ");
        assert_eq!(check(&payload), Err(ValidationError::MissingTeacherName));
    }

    #[test]
    fn missing_subject_is_reported_before_ratings() {
        let payload = RawSubmission::new().with_teacher_name("Ravi");
        let err = check(&payload).unwrap_err();
        assert_eq!(err, ValidationError::MissingSubject);
        assert_eq!(err.to_string(), "subject required");
    }

    #[test]
    fn one_missing_rating_rejects_the_form() {
        let mut payload = complete_payload();
        payload
            .selections
            .remove(&RatingField::Category(Category::Punctuality));
        assert_eq!(check(&payload), Err(ValidationError::MissingRatings));
    }

    #[test]
    fn out_of_range_or_double_selection_counts_as_missing() {
        let mut out_of_range = complete_payload();
        out_of_range
            .selections
            .insert(RatingField::Satisfaction, vec!["7".to_string()]);
        assert_eq!(check(&out_of_range), Err(ValidationError::MissingRatings));

        let doubled = complete_payload().select(RatingField::Category(Category::Aids), "2");
        assert_eq!(check(&doubled), Err(ValidationError::MissingRatings));
    }

    #[test]
    fn blank_comments_fail_last() {
        let payload = complete_payload().with_comments("\n\t ");
        assert_eq!(check(&payload), Err(ValidationError::MissingComments));
    }

    #[test]
    fn every_rating_stays_in_range() {
        let mut validator = Validator::new();
        for value in ["1", "2", "3", "4", "5"] {
            let payload = RawSubmission::new()
                .with_teacher_name("Ravi")
                .with_subject("Physics")
                .select_all(value)
                .with_comments("ok");
            let record = validator.validate(&payload).unwrap();
            for category in Category::ALL {
                let rating = record.rating(category).value();
                assert!((Rating::MIN..=Rating::MAX).contains(&rating));
            }
        }
    }
}
