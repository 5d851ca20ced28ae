use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{Grade, Subject, SubjectSummary, TrendPoint};

/// Mean of the subject's grade values; 0 when nothing has been recorded yet.
pub fn average_for_subject(grades: &[Grade]) -> f64 {
    mean(grades.iter().map(|grade| grade.value))
}

/// Unweighted mean of every recorded grade across all subjects.
///
/// Each grade counts once regardless of subject, so a subject with many
/// assessments pulls the result harder than one with a single grade.
pub fn overall_gpa(all_grades: &[Grade]) -> f64 {
    mean(all_grades.iter().map(|grade| grade.value))
}

/// One chart point per grade in chronological order. `index` is the position
/// in that order, not the date.
pub fn trend_series(grades: &[Grade]) -> Vec<TrendPoint> {
    let mut ordered: Vec<&Grade> = grades.iter().collect();
    ordered.sort_by_key(|grade| grade.date);

    ordered
        .into_iter()
        .enumerate()
        .map(|(index, grade)| TrendPoint {
            index,
            value: grade.value,
        })
        .collect()
}

pub fn subject_summaries(subjects: &[Subject], grades: &[Grade]) -> Vec<SubjectSummary> {
    let mut by_subject: HashMap<Uuid, Vec<Grade>> = HashMap::new();
    for grade in grades {
        by_subject
            .entry(grade.subject_id)
            .or_default()
            .push(grade.clone());
    }

    subjects
        .iter()
        .map(|subject| {
            let mut grades = by_subject.remove(&subject.id).unwrap_or_default();
            grades.sort_by_key(|grade| grade.date);
            let values = grades.iter().map(|grade| grade.value);

            SubjectSummary {
                subject_id: subject.id,
                subject_name: subject.name.clone(),
                term: subject.term.clone(),
                average: average_for_subject(&grades),
                grade_count: grades.len(),
                lowest: values.clone().reduce(f64::min),
                highest: values.reduce(f64::max),
                latest: grades.last().map(|grade| grade.value),
            }
        })
        .collect()
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (total, count) = values.fold((0.0, 0usize), |(total, count), value| {
        (total + value, count + 1)
    });

    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
    }

    fn grade(subject_id: Uuid, value: f64, date: NaiveDate) -> Grade {
        Grade::new(subject_id, "Prelim", value, date)
    }

    #[test]
    fn average_of_nothing_is_zero() {
        assert_eq!(average_for_subject(&[]), 0.0);
        assert_eq!(overall_gpa(&[]), 0.0);
    }

    #[test]
    fn average_is_the_arithmetic_mean() {
        let subject = Uuid::new_v4();
        let grades = vec![
            grade(subject, 80.0, day(1)),
            grade(subject, 90.0, day(2)),
            grade(subject, 100.0, day(3)),
        ];
        assert!((average_for_subject(&grades) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn gpa_ignores_subject_boundaries() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let grades = vec![grade(a, 100.0, day(1)), grade(b, 0.0, day(2))];
        assert!((overall_gpa(&grades) - 50.0).abs() < 1e-9);

        // Three grades in A and one in B: each grade weighs the same.
        let grades = vec![
            grade(a, 90.0, day(1)),
            grade(a, 90.0, day(2)),
            grade(a, 90.0, day(3)),
            grade(b, 50.0, day(4)),
        ];
        assert!((overall_gpa(&grades) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn trend_is_chronological_and_indexed_by_position() {
        let subject = Uuid::new_v4();
        let grades = vec![
            grade(subject, 70.0, day(20)),
            grade(subject, 60.0, day(3)),
            grade(subject, 85.0, day(11)),
        ];

        let trend = trend_series(&grades);
        assert_eq!(
            trend,
            vec![
                TrendPoint { index: 0, value: 60.0 },
                TrendPoint { index: 1, value: 85.0 },
                TrendPoint { index: 2, value: 70.0 },
            ]
        );
    }

    #[test]
    fn trend_keeps_input_order_for_equal_dates() {
        let subject = Uuid::new_v4();
        let grades = vec![grade(subject, 10.0, day(5)), grade(subject, 20.0, day(5))];
        let values: Vec<f64> = trend_series(&grades).iter().map(|p| p.value).collect();
        assert_eq!(values, vec![10.0, 20.0]);
    }

    #[test]
    fn summaries_cover_subjects_without_grades() {
        let algebra = Subject::new("Algebra", "Fall 2024");
        let history = Subject::new("History", "Fall 2024");
        let grades = vec![
            grade(algebra.id, 55.0, day(2)),
            grade(algebra.id, 95.0, day(9)),
        ];

        let summaries = subject_summaries(&[algebra.clone(), history.clone()], &grades);
        assert_eq!(summaries.len(), 2);

        let first = &summaries[0];
        assert_eq!(first.subject_id, algebra.id);
        assert_eq!(first.grade_count, 2);
        assert!((first.average - 75.0).abs() < 1e-9);
        assert_eq!(first.lowest, Some(55.0));
        assert_eq!(first.highest, Some(95.0));
        assert_eq!(first.latest, Some(95.0));

        let second = &summaries[1];
        assert_eq!(second.grade_count, 0);
        assert_eq!(second.average, 0.0);
        assert_eq!(second.latest, None);
    }
}
