use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

/// Assessment labels offered by default when recording a grade.
pub const DEFAULT_ASSESSMENT_TYPES: [&str; 3] = ["Prelim", "Midterm", "Final"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subject {
    pub id: Uuid,
    pub name: String,
    pub term: String,
}

impl Subject {
    pub fn new(name: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            term: term.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grade {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub value: f64,
    pub date: NaiveDate,
    pub assessment_type: String,
}

impl Grade {
    pub fn new(
        subject_id: Uuid,
        assessment_type: impl Into<String>,
        value: f64,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id,
            value,
            date,
            assessment_type: assessment_type.into(),
        }
    }
}

/// At most one goal exists per subject; `subject_id` is its key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Goal {
    pub subject_id: Uuid,
    pub target_value: f64,
}

/// Read model joining a goal with the name of its subject.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalWithSubject {
    pub goal: Goal,
    pub subject_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalDisplay {
    pub subject_id: Uuid,
    pub subject_name: String,
    pub target: f64,
    pub current_average: f64,
    pub achieved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub index: usize,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectSummary {
    pub subject_id: Uuid,
    pub subject_name: String,
    pub term: String,
    pub average: f64,
    pub grade_count: usize,
    pub lowest: Option<f64>,
    pub highest: Option<f64>,
    pub latest: Option<f64>,
}

/// Everything the subject detail view renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectOverview {
    pub subject: Subject,
    pub grades: Vec<Grade>,
    pub average: f64,
    pub trend: Vec<TrendPoint>,
    pub goal: Option<GoalDisplay>,
}
