use std::io::Read;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;

use crate::db::GradeStore;
use crate::error::TrackerError;
use crate::notify::NotificationSink;
use crate::tracker::GradeTracker;
use crate::validation;

#[derive(Debug, Deserialize)]
struct CsvRow {
    subject: String,
    term: String,
    assessment_type: String,
    value: String,
    date: NaiveDate,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub skipped: usize,
}

pub async fn import_csv<S, N>(
    tracker: &GradeTracker<S, N>,
    csv_path: &Path,
) -> anyhow::Result<ImportSummary>
where
    S: GradeStore,
    N: NotificationSink,
{
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    import_grades(tracker, file).await
}

/// Records every row as if it had been entered by hand. Rows with bad input
/// or a repeated assessment are skipped; store failures abort the import.
pub async fn import_grades<S, N, R>(
    tracker: &GradeTracker<S, N>,
    reader: R,
) -> anyhow::Result<ImportSummary>
where
    S: GradeStore,
    N: NotificationSink,
    R: Read,
{
    let mut reader = csv::Reader::from_reader(reader);
    let mut summary = ImportSummary::default();

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("malformed CSV record {}", line + 1))?;

        match import_row(tracker, &row).await {
            Ok(()) => summary.inserted += 1,
            Err(err @ (TrackerError::Validation(_) | TrackerError::DuplicateAssessment { .. })) => {
                warn!(record = line + 1, reason = %err, "skipping CSV record");
                summary.skipped += 1;
            }
            Err(err) => return Err(err).context("import aborted"),
        }
    }

    Ok(summary)
}

async fn import_row<S, N>(tracker: &GradeTracker<S, N>, row: &CsvRow) -> Result<(), TrackerError>
where
    S: GradeStore,
    N: NotificationSink,
{
    let name = validation::validate_subject_name(&row.subject)?;
    let term = validation::validate_term(&row.term)?;
    // A rejected row must not leave a freshly created subject behind.
    validation::validate_grade_text(&row.value)?;
    validation::validate_assessment_type(&row.assessment_type)?;

    let subject = match tracker.store().find_subject(&name, &term).await? {
        Some(subject) => subject,
        None => tracker.add_subject(&name, &term).await?,
    };

    tracker
        .record_grade(subject.id, &row.assessment_type, &row.value, row.date)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteStore;
    use crate::notify::{Notification, RecordingSink};
    use std::io::Write;

    const SAMPLE: &str = "\
subject,term,assessment_type,value,date
Algebra,Fall 2024,Prelim,55,2024-09-15
Algebra,Fall 2024,Midterm,82.5,2024-10-20
Algebra,Fall 2024,Midterm,90,2024-10-21
Chemistry,Fall 2024,Prelim,abc,2024-09-16
Chemistry,Fall 2024,Final,77,2024-12-10
";

    #[tokio::test]
    async fn imports_valid_rows_and_skips_the_rest() {
        let sink = RecordingSink::new();
        let store = SqliteStore::in_memory().await.unwrap();
        let tracker = GradeTracker::new(store, &sink);

        let summary = import_grades(&tracker, SAMPLE.as_bytes()).await.unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                inserted: 3,
                skipped: 2
            }
        );

        let subjects = tracker.subjects().await.unwrap();
        assert_eq!(subjects.len(), 2);
        let algebra = &subjects[0];
        assert_eq!(algebra.name, "Algebra");
        assert_eq!(tracker.grades_for_subject(algebra.id).await.unwrap().len(), 2);

        assert_eq!(
            sink.sent(),
            vec![Notification::LowGrade {
                subject_name: "Algebra".to_string(),
                value: 55.0
            }]
        );
    }

    #[tokio::test]
    async fn rejected_row_does_not_create_its_subject() {
        let store = SqliteStore::in_memory().await.unwrap();
        let tracker = GradeTracker::new(store, RecordingSink::new());
        let csv = "\
subject,term,assessment_type,value,date
Physics,Fall 2024,Prelim,abc,2024-09-16
Biology,Fall 2024,Prelim,140,2024-09-16
Geology,Fall 2024,  ,70,2024-09-16
";

        let summary = import_grades(&tracker, csv.as_bytes()).await.unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                inserted: 0,
                skipped: 3
            }
        );
        assert!(tracker.subjects().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_dates_abort_the_import() {
        let store = SqliteStore::in_memory().await.unwrap();
        let tracker = GradeTracker::new(store, RecordingSink::new());
        let csv = "subject,term,assessment_type,value,date\nAlgebra,Fall 2024,Prelim,80,yesterday\n";

        let err = import_grades(&tracker, csv.as_bytes()).await.unwrap_err();
        assert!(err.to_string().contains("malformed CSV record 1"));
    }

    #[tokio::test]
    async fn reads_from_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let store = SqliteStore::in_memory().await.unwrap();
        let tracker = GradeTracker::new(store, RecordingSink::new());
        let summary = import_csv(&tracker, file.path()).await.unwrap();
        assert_eq!(summary.inserted, 3);
    }
}
