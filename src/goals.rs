use serde::Serialize;
use uuid::Uuid;

use crate::aggregate::average_for_subject;
use crate::models::{Grade, GoalDisplay};

/// Fraction of the target at which a goal counts as close.
pub const CLOSE_RATIO: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GoalStatus {
    Achieved,
    Close,
    Below,
}

impl GoalStatus {
    pub fn label(self) -> &'static str {
        match self {
            GoalStatus::Achieved => "Achieved",
            GoalStatus::Close => "Close",
            GoalStatus::Below => "Below",
        }
    }
}

pub fn status(current: f64, target: f64) -> GoalStatus {
    if current >= target {
        GoalStatus::Achieved
    } else if current >= target * CLOSE_RATIO {
        GoalStatus::Close
    } else {
        GoalStatus::Below
    }
}

/// Whether a goal-achieved event should fire. Nothing is remembered between
/// calls, so every qualifying save fires again.
pub fn is_newly_achieved(current: f64, target: f64) -> bool {
    current >= target
}

pub fn goal_display(
    subject_id: Uuid,
    subject_name: &str,
    target: f64,
    grades: &[Grade],
) -> GoalDisplay {
    let current_average = average_for_subject(grades);
    GoalDisplay {
        subject_id,
        subject_name: subject_name.to_string(),
        target,
        current_average,
        achieved: current_average >= target,
    }
}

impl GoalDisplay {
    pub fn status(&self) -> GoalStatus {
        status(self.current_average, self.target)
    }

    /// Progress towards the target, capped at 100.
    pub fn progress_percent(&self) -> f64 {
        if self.target <= 0.0 {
            return 100.0;
        }
        (self.current_average / self.target * 100.0).min(100.0)
    }
}
