use chrono::NaiveDate;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::aggregate;
use crate::alerts::{self, LOW_GRADE_THRESHOLD};
use crate::db::GradeStore;
use crate::error::TrackerError;
use crate::goals;
use crate::models::{Goal, GoalDisplay, Grade, Subject, SubjectOverview, TrendPoint};
use crate::notify::NotificationSink;
use crate::validation;

/// Runs each user action as validate, persist, recompute, notify.
///
/// Holds no state of its own besides the collaborators; everything derived is
/// recomputed from the store on every call.
pub struct GradeTracker<S, N> {
    store: S,
    sink: N,
    low_grade_threshold: f64,
}

impl<S: GradeStore, N: NotificationSink> GradeTracker<S, N> {
    pub fn new(store: S, sink: N) -> Self {
        Self {
            store,
            sink,
            low_grade_threshold: LOW_GRADE_THRESHOLD,
        }
    }

    pub fn with_low_grade_threshold(mut self, threshold: f64) -> Self {
        self.low_grade_threshold = threshold;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn add_subject(&self, name: &str, term: &str) -> Result<Subject, TrackerError> {
        let name = validation::validate_subject_name(name)?;
        let term = validation::validate_term(term)?;

        let subject = Subject::new(name, term);
        self.store.insert_subject(&subject).await?;
        info!(subject_id = %subject.id, name = %subject.name, "subject added");
        Ok(subject)
    }

    pub async fn update_subject(
        &self,
        id: Uuid,
        name: &str,
        term: &str,
    ) -> Result<Subject, TrackerError> {
        let subject = Subject {
            id,
            name: validation::validate_subject_name(name)?,
            term: validation::validate_term(term)?,
        };

        if !self.store.update_subject(&subject).await? {
            return Err(TrackerError::not_found("subject", id));
        }
        info!(subject_id = %id, "subject updated");
        Ok(subject)
    }

    /// Deletes the subject along with its grades and goal.
    pub async fn delete_subject(&self, id: Uuid) -> Result<(), TrackerError> {
        if !self.store.delete_subject(id).await? {
            return Err(TrackerError::not_found("subject", id));
        }
        info!(subject_id = %id, "subject deleted");
        Ok(())
    }

    pub async fn subjects(&self) -> Result<Vec<Subject>, TrackerError> {
        Ok(self.store.subjects().await?)
    }

    pub async fn subject(&self, id: Uuid) -> Result<Subject, TrackerError> {
        self.store
            .subject(id)
            .await?
            .ok_or_else(|| TrackerError::not_found("subject", id))
    }

    /// Records a new assessment. A low-grade alert is raised for the new value
    /// and the subject's goal, if any, is re-checked.
    pub async fn record_grade(
        &self,
        subject_id: Uuid,
        assessment_type: &str,
        value_text: &str,
        date: NaiveDate,
    ) -> Result<Grade, TrackerError> {
        let value = validation::validate_grade_text(value_text)?;
        let assessment_type = validation::validate_assessment_type(assessment_type)?;
        let subject = self.subject(subject_id).await?;

        let existing = self.store.grades_for_subject(subject_id).await?;
        if existing
            .iter()
            .any(|grade| grade.assessment_type == assessment_type)
        {
            return Err(TrackerError::DuplicateAssessment {
                subject_name: subject.name,
                assessment_type,
            });
        }

        let grade = Grade::new(subject_id, assessment_type, value, date);
        self.store.insert_grade(&grade).await?;
        info!(
            grade_id = %grade.id,
            subject = %subject.name,
            assessment_type = %grade.assessment_type,
            value,
            "grade recorded"
        );

        if alerts::is_low_grade(value, self.low_grade_threshold) {
            warn!(subject = %subject.name, value, "low grade");
            self.sink.notify_low_grade(&subject.name, value);
        }

        self.check_goal_after_save(&subject).await;
        Ok(grade)
    }

    /// Changes the value of an existing grade. Edits never raise alerts.
    pub async fn edit_grade(&self, grade_id: Uuid, value_text: &str) -> Result<Grade, TrackerError> {
        let value = validation::validate_grade_text(value_text)?;

        let mut grade = self
            .store
            .grade(grade_id)
            .await?
            .ok_or_else(|| TrackerError::not_found("grade", grade_id))?;

        if !self.store.update_grade_value(grade_id, value).await? {
            return Err(TrackerError::not_found("grade", grade_id));
        }
        info!(grade_id = %grade_id, from = grade.value, to = value, "grade edited");

        grade.value = value;
        Ok(grade)
    }

    pub async fn delete_grade(&self, grade_id: Uuid) -> Result<(), TrackerError> {
        if !self.store.delete_grade(grade_id).await? {
            return Err(TrackerError::not_found("grade", grade_id));
        }
        info!(grade_id = %grade_id, "grade deleted");
        Ok(())
    }

    pub async fn grades_for_subject(&self, subject_id: Uuid) -> Result<Vec<Grade>, TrackerError> {
        self.subject(subject_id).await?;
        Ok(self.store.grades_for_subject(subject_id).await?)
    }

    /// Sets the subject's goal, replacing any previous target.
    pub async fn set_goal(&self, subject_id: Uuid, target_text: &str) -> Result<Goal, TrackerError> {
        let target_value = validation::validate_goal_target_text(target_text)?;
        let subject = self.subject(subject_id).await?;

        let goal = Goal {
            subject_id,
            target_value,
        };
        self.store.set_goal(&goal).await?;
        info!(subject = %subject.name, target = target_value, "goal set");

        self.check_goal_after_save(&subject).await;
        Ok(goal)
    }

    /// Changes an existing goal's target without re-checking achievement.
    pub async fn update_goal(
        &self,
        subject_id: Uuid,
        target_text: &str,
    ) -> Result<Goal, TrackerError> {
        let target_value = validation::validate_goal_target_text(target_text)?;

        if !self.store.update_goal(subject_id, target_value).await? {
            return Err(TrackerError::not_found("goal", subject_id));
        }
        info!(subject_id = %subject_id, target = target_value, "goal updated");
        Ok(Goal {
            subject_id,
            target_value,
        })
    }

    pub async fn delete_goal(&self, subject_id: Uuid) -> Result<(), TrackerError> {
        if !self.store.delete_goal(subject_id).await? {
            return Err(TrackerError::not_found("goal", subject_id));
        }
        info!(subject_id = %subject_id, "goal deleted");
        Ok(())
    }

    pub async fn goal_displays(&self) -> Result<Vec<GoalDisplay>, TrackerError> {
        let goals = self.store.goals_with_subjects().await?;

        let mut displays = Vec::with_capacity(goals.len());
        for entry in goals {
            let grades = self.store.grades_for_subject(entry.goal.subject_id).await?;
            displays.push(goals::goal_display(
                entry.goal.subject_id,
                &entry.subject_name,
                entry.goal.target_value,
                &grades,
            ));
        }
        debug!(count = displays.len(), "goal displays computed");
        Ok(displays)
    }

    pub async fn subject_overview(&self, subject_id: Uuid) -> Result<SubjectOverview, TrackerError> {
        let subject = self.subject(subject_id).await?;
        let grades = self.store.grades_for_subject(subject_id).await?;
        let goal = self
            .store
            .goal_for_subject(subject_id)
            .await?
            .map(|goal| goals::goal_display(subject_id, &subject.name, goal.target_value, &grades));

        Ok(SubjectOverview {
            average: aggregate::average_for_subject(&grades),
            trend: aggregate::trend_series(&grades),
            subject,
            grades,
            goal,
        })
    }

    pub async fn all_grades(&self) -> Result<Vec<Grade>, TrackerError> {
        Ok(self.store.all_grades().await?)
    }

    pub async fn overall_gpa(&self) -> Result<f64, TrackerError> {
        let grades = self.store.all_grades().await?;
        Ok(aggregate::overall_gpa(&grades))
    }

    pub async fn overall_trend(&self) -> Result<Vec<TrendPoint>, TrackerError> {
        let grades = self.store.all_grades().await?;
        Ok(aggregate::trend_series(&grades))
    }

    /// The write has already been committed at this point, so a failed goal
    /// read is logged rather than reported as a failed save.
    async fn check_goal_after_save(&self, subject: &Subject) {
        if let Err(err) = self.check_goal(subject).await {
            warn!(subject = %subject.name, error = %err, "goal check skipped");
        }
    }

    async fn check_goal(&self, subject: &Subject) -> Result<(), TrackerError> {
        let Some(goal) = self.store.goal_for_subject(subject.id).await? else {
            return Ok(());
        };

        let grades = self.store.grades_for_subject(subject.id).await?;
        if grades.is_empty() {
            return Ok(());
        }

        let current = aggregate::average_for_subject(&grades);
        if goals::is_newly_achieved(current, goal.target_value) {
            info!(subject = %subject.name, current, target = goal.target_value, "goal achieved");
            self.sink
                .notify_goal_achieved(&subject.name, goal.target_value);
        }
        Ok(())
    }
}
