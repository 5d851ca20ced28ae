use std::collections::HashSet;
use std::fmt::Write;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::aggregate;
use crate::models::{GoalDisplay, Grade, Subject};

pub fn build_report(
    term: Option<&str>,
    generated_on: NaiveDate,
    subjects: &[Subject],
    grades: &[Grade],
    goals: &[GoalDisplay],
) -> String {
    let subjects: Vec<Subject> = subjects
        .iter()
        .filter(|subject| term.map_or(true, |term| subject.term == term))
        .cloned()
        .collect();
    let in_scope: HashSet<Uuid> = subjects.iter().map(|subject| subject.id).collect();
    let grades: Vec<Grade> = grades
        .iter()
        .filter(|grade| in_scope.contains(&grade.subject_id))
        .cloned()
        .collect();
    let summaries = aggregate::subject_summaries(&subjects, &grades);

    let mut output = String::new();
    let term_label = term.unwrap_or("all terms");

    let _ = writeln!(output, "# Grade Report");
    let _ = writeln!(output, "Generated for {} on {}", term_label, generated_on);
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "Overall GPA: {:.2} across {} grades",
        aggregate::overall_gpa(&grades),
        grades.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Subjects");

    if summaries.is_empty() {
        let _ = writeln!(output, "No subjects recorded.");
    } else {
        for summary in summaries.iter() {
            match (summary.lowest, summary.highest) {
                (Some(lowest), Some(highest)) => {
                    let _ = writeln!(
                        output,
                        "- {} ({}): average {:.2} across {} grades (low {:.1}, high {:.1})",
                        summary.subject_name,
                        summary.term,
                        summary.average,
                        summary.grade_count,
                        lowest,
                        highest
                    );
                }
                _ => {
                    let _ = writeln!(
                        output,
                        "- {} ({}): no grades yet",
                        summary.subject_name, summary.term
                    );
                }
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Goals");

    let goals: Vec<&GoalDisplay> = goals
        .iter()
        .filter(|goal| in_scope.contains(&goal.subject_id))
        .collect();
    if goals.is_empty() {
        let _ = writeln!(output, "No goals set.");
    } else {
        for goal in goals {
            let _ = writeln!(
                output,
                "- {}: {} (current {:.2}, target {:.2}, {:.0}% of target)",
                goal.subject_name,
                goal.status().label(),
                goal.current_average,
                goal.target,
                goal.progress_percent()
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Trends");

    let mut wrote_trend = false;
    for subject in subjects.iter() {
        let subject_grades: Vec<Grade> = grades
            .iter()
            .filter(|grade| grade.subject_id == subject.id)
            .cloned()
            .collect();
        let trend = aggregate::trend_series(&subject_grades);
        if trend.is_empty() {
            continue;
        }

        let line = trend
            .iter()
            .map(|point| format!("{:.1}", point.value))
            .collect::<Vec<_>>()
            .join(" -> ");
        let _ = writeln!(output, "- {}: {}", subject.name, line);
        wrote_trend = true;
    }

    if !wrote_trend {
        let _ = writeln!(output, "No grades recorded.");
    }

    output
}
