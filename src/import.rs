use std::io::Read;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::{info, warn};

use crate::board::FeedbackBoard;
use crate::error::SubmitError;
use crate::models::{Category, RatingField, RawSubmission};
use crate::store::BlobStorage;

#[derive(Debug, Deserialize)]
struct CsvRow {
    teacher_name: Option<String>,
    subject: Option<String>,
    effectiveness: Option<String>,
    communication: Option<String>,
    knowledge: Option<String>,
    management: Option<String>,
    punctuality: Option<String>,
    support: Option<String>,
    aids: Option<String>,
    satisfaction: Option<String>,
    comments: Option<String>,
}

impl From<CsvRow> for RawSubmission {
    fn from(row: CsvRow) -> Self {
        let ratings = [
            (RatingField::Category(Category::Effectiveness), row.effectiveness),
            (RatingField::Category(Category::Communication), row.communication),
            (RatingField::Category(Category::Knowledge), row.knowledge),
            (RatingField::Category(Category::Management), row.management),
            (RatingField::Category(Category::Punctuality), row.punctuality),
            (RatingField::Category(Category::Support), row.support),
            (RatingField::Category(Category::Aids), row.aids),
            (RatingField::Satisfaction, row.satisfaction),
        ];

        let mut payload = RawSubmission {
            teacher_name: row.teacher_name,
            subject: row.subject,
            comments: row.comments,
            ..RawSubmission::default()
        };
        for (field, value) in ratings {
            if let Some(value) = value.filter(|value| !value.trim().is_empty()) {
                payload = payload.select(field, value);
            }
        }
        payload
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub skipped: usize,
}

pub fn import_csv<S: BlobStorage>(
    board: &mut FeedbackBoard<S>,
    csv_path: &Path,
) -> anyhow::Result<ImportSummary> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    import_reader(board, file)
}

pub fn import_reader<S: BlobStorage, R: Read>(
    board: &mut FeedbackBoard<S>,
    source: R,
) -> anyhow::Result<ImportSummary> {
    let mut reader = csv::Reader::from_reader(source);
    let mut summary = ImportSummary::default();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let line = index + 2;
        let row = result.with_context(|| format!("malformed CSV row on line {line}"))?;
        match board.accept(&RawSubmission::from(row)) {
            Ok(_) => summary.inserted += 1,
            Err(SubmitError::Invalid(reason)) => {
                warn!(line, %reason, "skipping feedback row");
                summary.skipped += 1;
            }
            Err(SubmitError::Persistence(err)) => {
                return Err(err).with_context(|| format!("stopped importing at line {line}"));
            }
        }
    }

    info!(
        inserted = summary.inserted,
        skipped = summary.skipped,
        "feedback import finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStorage;

    const HEADER: &str = "teacher_name,subject,effectiveness,communication,knowledge,management,punctuality,support,aids,satisfaction,comments\n";

    #[test]
    fn imports_valid_rows_and_skips_invalid_ones() {
        let data = format!(
            "{HEADER}\
             Asha Rao,Mathematics,5,4,5,4,3,4,4,4,Patient with questions\n\
             Ravi,,3,3,3,3,3,3,3,3,No subject given\n\
             Ravi,Physics,3,3,3,3,3,3,3,,Missing satisfaction\n\
             Ravi,Physics,2,3,3,4,5,3,2,3,Labs run late\n"
        );
        let mut board = FeedbackBoard::open(MemoryStorage::new());
        let summary = import_reader(&mut board, data.as_bytes()).unwrap();

        assert_eq!(summary, ImportSummary { inserted: 2, skipped: 2 });
        let names: Vec<&str> = board
            .records()
            .iter()
            .map(|record| record.teacher_name.as_str())
            .collect();
        assert_eq!(names, vec!["Asha Rao", "Ravi"]);
        assert!(board.records()[0].id < board.records()[1].id);
    }

    #[test]
    fn storage_failure_aborts_the_import() {
        let data = format!("{HEADER}Ravi,Physics,2,3,3,4,5,3,2,3,Labs run late\n");
        let mut board = FeedbackBoard::open(MemoryStorage::with_quota(16));
        let err = import_reader(&mut board, data.as_bytes()).unwrap_err();

        assert!(err.to_string().contains("line 2"));
        assert!(board.records().is_empty());
    }

    #[test]
    fn import_csv_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.csv");
        std::fs::write(
            &path,
            format!("{HEADER}Zara Khan,Biology,4,4,4,4,4,4,4,5,Great field trips\n"),
        )
        .unwrap();

        let mut board = FeedbackBoard::open(MemoryStorage::new());
        let summary = import_csv(&mut board, &path).unwrap();
        assert_eq!(summary.inserted, 1);
        assert_eq!(board.records()[0].satisfaction.value(), 5);
    }
}
