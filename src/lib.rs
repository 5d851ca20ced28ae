//! Personal academic record keeping: subjects per term, graded assessments,
//! target-grade goals, averages and trends.
//!
//! The rule modules (`validation`, `aggregate`, `goals`, `alerts`) are pure
//! functions. [`tracker::GradeTracker`] strings them together with a
//! [`db::GradeStore`] and a [`notify::NotificationSink`].

pub mod aggregate;
pub mod alerts;
pub mod config;
pub mod db;
pub mod error;
pub mod goals;
pub mod import;
pub mod models;
pub mod notify;
pub mod report;
pub mod tracker;
pub mod validation;

pub use db::{GradeStore, SqliteStore};
pub use error::{StoreError, TrackerError};
pub use notify::{ConsoleSink, Notification, NotificationSink, RecordingSink};
pub use tracker::GradeTracker;
pub use validation::ValidationError;
