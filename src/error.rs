use thiserror::Error;
use uuid::Uuid;

use crate::validation::ValidationError;

/// Failures raised by the persistence store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// True when the database exists but its tables have not been created yet.
    pub fn is_missing_schema(&self) -> bool {
        match self {
            StoreError::Database(sqlx::Error::Database(db)) => {
                db.message().contains("no such table")
            }
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Uuid },

    #[error("a {assessment_type} grade already exists for {subject_name}")]
    DuplicateAssessment {
        subject_name: String,
        assessment_type: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TrackerError {
    pub(crate) fn not_found(kind: &'static str, id: Uuid) -> Self {
        TrackerError::NotFound { kind, id }
    }

    /// Text safe to show to the user. Store failures stay generic; the details
    /// belong in the log.
    pub fn user_message(&self) -> String {
        match self {
            TrackerError::Validation(err) => err.to_string(),
            TrackerError::NotFound { kind, .. } => {
                format!("The selected {kind} no longer exists")
            }
            TrackerError::DuplicateAssessment {
                subject_name,
                assessment_type,
            } => format!("Grade for {assessment_type} already exists in {subject_name}"),
            TrackerError::Store(err) if err.is_missing_schema() => {
                "The grade database has not been set up yet. Run `grade-tracker init-db` first."
                    .to_string()
            }
            TrackerError::Store(_) => {
                "Something went wrong while saving your changes. Please try again.".to_string()
            }
        }
    }
}

impl From<sqlx::Error> for TrackerError {
    fn from(err: sqlx::Error) -> Self {
        TrackerError::Store(StoreError::Database(err))
    }
}
