use std::cell::RefCell;

use serde::Serialize;
use tracing::info;

/// Receives the events produced by the alert and goal rules. Delivery,
/// channels and permissions are the sink's business.
pub trait NotificationSink {
    fn notify_low_grade(&self, subject_name: &str, value: f64);
    fn notify_goal_achieved(&self, subject_name: &str, target: f64);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Notification {
    LowGrade { subject_name: String, value: f64 },
    GoalAchieved { subject_name: String, target: f64 },
}

impl Notification {
    pub fn title(&self) -> &'static str {
        match self {
            Notification::LowGrade { .. } => "Low Grade Alert",
            Notification::GoalAchieved { .. } => "Goal Achieved!",
        }
    }

    pub fn body(&self) -> String {
        match self {
            Notification::LowGrade {
                subject_name,
                value,
            } => format!("Your grade in {subject_name} is {value:?}"),
            Notification::GoalAchieved {
                subject_name,
                target,
            } => format!("You've reached your target grade of {target:?} in {subject_name}"),
        }
    }
}

/// Prints notifications to stdout for the command line front end.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    fn emit(&self, notification: Notification) {
        info!(title = notification.title(), "notification sent");
        println!("{}: {}", notification.title(), notification.body());
    }
}

impl NotificationSink for ConsoleSink {
    fn notify_low_grade(&self, subject_name: &str, value: f64) {
        self.emit(Notification::LowGrade {
            subject_name: subject_name.to_string(),
            value,
        });
    }

    fn notify_goal_achieved(&self, subject_name: &str, target: f64) {
        self.emit(Notification::GoalAchieved {
            subject_name: subject_name.to_string(),
            target,
        });
    }
}

/// Keeps notifications in memory so an embedding front end can drain them.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: RefCell<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.borrow().clone()
    }

    pub fn take(&self) -> Vec<Notification> {
        self.sent.take()
    }
}

impl NotificationSink for RecordingSink {
    fn notify_low_grade(&self, subject_name: &str, value: f64) {
        self.sent.borrow_mut().push(Notification::LowGrade {
            subject_name: subject_name.to_string(),
            value,
        });
    }

    fn notify_goal_achieved(&self, subject_name: &str, target: f64) {
        self.sent.borrow_mut().push(Notification::GoalAchieved {
            subject_name: subject_name.to_string(),
            target,
        });
    }
}

impl<T: NotificationSink + ?Sized> NotificationSink for &T {
    fn notify_low_grade(&self, subject_name: &str, value: f64) {
        (**self).notify_low_grade(subject_name, value);
    }

    fn notify_goal_achieved(&self, subject_name: &str, target: f64) {
        (**self).notify_goal_achieved(subject_name, target);
    }
}
