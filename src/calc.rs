use crate::model::{Group, Student, Subject, GROUPS, SUBJECTS};
use serde::Serialize;

/// Rounds .5 upward, matching the front end's `Math.round`.
pub fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

/// One-decimal rounding used on report averages: `Int(10*x + 0.5) / 10`.
pub fn round_off_1_decimal(x: f64) -> f64 {
    ((10.0 * x) + 0.5).floor() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAverage {
    pub subject: &'static str,
    pub label: &'static str,
    pub avg: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupProgress {
    pub group: Group,
    pub count: usize,
    pub graded: usize,
    /// `None` for a group with no members.
    pub percent: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_students: usize,
    pub graded_students: usize,
    pub pending_students: usize,
    pub progress_percent: i64,
    pub subject_averages: Vec<SubjectAverage>,
    pub groups: Vec<GroupProgress>,
}

pub fn graded_count(students: &[Student]) -> usize {
    students.iter().filter(|s| s.is_graded()).count()
}

/// Subject totals are summed over every student but divided by the graded
/// count only (at least 1).
pub fn subject_averages(students: &[Student]) -> Vec<SubjectAverage> {
    SUBJECTS
        .iter()
        .map(|subject| SubjectAverage {
            subject: subject.key(),
            label: subject.label(),
            avg: subject_average(students, *subject),
        })
        .collect()
}

pub fn subject_average(students: &[Student], subject: Subject) -> i64 {
    let denom = graded_count(students).max(1) as f64;
    let total: f64 = students.iter().map(|s| s.scores.get(subject)).sum();
    round_half_up(total / denom)
}

pub fn group_progress(students: &[Student]) -> Vec<GroupProgress> {
    GROUPS
        .iter()
        .map(|group| {
            let members = students.iter().filter(|s| s.group == Some(*group));
            let (count, graded) = members.fold((0usize, 0usize), |(c, g), s| {
                (c + 1, g + usize::from(s.is_graded()))
            });
            let percent = if count == 0 {
                None
            } else {
                Some(round_half_up(100.0 * graded as f64 / count as f64))
            };
            GroupProgress {
                group: *group,
                count,
                graded,
                percent,
            }
        })
        .collect()
}

pub fn dashboard_summary(students: &[Student]) -> DashboardSummary {
    let total_students = students.len();
    let graded_students = graded_count(students);
    let progress_percent = if total_students == 0 {
        0
    } else {
        round_half_up(100.0 * graded_students as f64 / total_students as f64)
    };

    DashboardSummary {
        total_students,
        graded_students,
        pending_students: total_students - graded_students,
        progress_percent,
        subject_averages: subject_averages(students),
        groups: group_progress(students),
    }
}
