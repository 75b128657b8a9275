use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use crate::error::GradingError;
use crate::models::{
    AssignmentGroup, AssignmentScore, Course, Gradebook, LearnerResult, SkippedSubmission,
    Submission,
};

struct AssignmentTerms {
    due_at: DateTime<Utc>,
    points_possible: f64,
}

struct LearnerTally {
    id: u64,
    avg: f64,
    scores: Vec<AssignmentScore>,
}

impl LearnerTally {
    fn new(id: u64) -> Self {
        Self {
            id,
            avg: 0.0,
            scores: Vec::new(),
        }
    }

    fn record(&mut self, assignment_id: u64, fraction: f64) {
        match self
            .scores
            .iter_mut()
            .find(|entry| entry.assignment_id == assignment_id)
        {
            Some(entry) => entry.fraction = fraction,
            None => self.scores.push(AssignmentScore {
                assignment_id,
                fraction,
            }),
        }
    }

    fn finish(self) -> LearnerResult {
        LearnerResult {
            id: self.id,
            avg: round_to_hundredths(self.avg),
            scores: self.scores,
        }
    }
}

/// Runs one grading pass and keeps the late submissions it excluded.
///
/// Only submissions with `submitted_at <= due_at` are scored. Each adds
/// `score / points_possible` to its assignment slot and `score * weight / 100`
/// to the learner's average. The average is a weighted sum of raw scores, not
/// of the normalized fractions.
pub fn grade(
    course: &Course,
    group: &AssignmentGroup,
    submissions: &[Submission],
) -> Result<Gradebook, GradingError> {
    if group.course_id != course.id {
        return Err(GradingError::MismatchedCourse {
            course_id: course.id,
            group_course_id: group.course_id,
        });
    }

    let mut terms: HashMap<u64, AssignmentTerms> = HashMap::new();
    for assignment in &group.assignments {
        if assignment.points_possible.is_nan() || assignment.points_possible <= 0.0 {
            return Err(GradingError::InvalidAssignment {
                assignment_id: assignment.id,
                points_possible: assignment.points_possible,
            });
        }
        terms.insert(
            assignment.id,
            AssignmentTerms {
                due_at: assignment.due_at,
                points_possible: assignment.points_possible,
            },
        );
    }

    let weight = group.group_weight / 100.0;
    let mut order: HashMap<u64, usize> = HashMap::new();
    let mut tallies: Vec<LearnerTally> = Vec::new();
    let mut skipped = Vec::new();

    for submission in submissions {
        let assignment =
            terms
                .get(&submission.assignment_id)
                .ok_or(GradingError::UnknownAssignment {
                    assignment_id: submission.assignment_id,
                    learner_id: submission.learner_id,
                })?;
        let detail = &submission.submission;

        if detail.submitted_at > assignment.due_at {
            warn!(
                learner_id = submission.learner_id,
                assignment_id = submission.assignment_id,
                submitted_at = %detail.submitted_at,
                due_at = %assignment.due_at,
                "skipping late submission"
            );
            skipped.push(SkippedSubmission {
                learner_id: submission.learner_id,
                assignment_id: submission.assignment_id,
                submitted_at: detail.submitted_at,
                due_at: assignment.due_at,
            });
            continue;
        }

        let index = *order.entry(submission.learner_id).or_insert_with(|| {
            tallies.push(LearnerTally::new(submission.learner_id));
            tallies.len() - 1
        });
        let tally = &mut tallies[index];
        tally.record(
            submission.assignment_id,
            detail.score / assignment.points_possible,
        );
        tally.avg += detail.score * weight;
    }

    debug!(
        course_id = course.id,
        group_id = group.id,
        learners = tallies.len(),
        skipped = skipped.len(),
        "graded assignment group"
    );

    Ok(Gradebook {
        results: tallies.into_iter().map(LearnerTally::finish).collect(),
        skipped,
    })
}

/// Per-learner results, or the first condition that aborted the pass.
pub fn compute(
    course: &Course,
    group: &AssignmentGroup,
    submissions: &[Submission],
) -> Result<Vec<LearnerResult>, GradingError> {
    grade(course, group, submissions).map(|gradebook| gradebook.results)
}

/// Like [`grade`], but a grading error is logged and yields an empty
/// gradebook.
pub fn grade_or_empty(
    course: &Course,
    group: &AssignmentGroup,
    submissions: &[Submission],
) -> Gradebook {
    grade(course, group, submissions).unwrap_or_else(|err| {
        error!(
            code = err.code(),
            assignment_id = ?err.assignment_id(),
            "grading aborted: {err}"
        );
        Gradebook::default()
    })
}

/// Like [`compute`], but a grading error yields no results, so callers cannot
/// tell it apart from an empty submission list.
pub fn compute_or_empty(
    course: &Course,
    group: &AssignmentGroup,
    submissions: &[Submission],
) -> Vec<LearnerResult> {
    grade_or_empty(course, group, submissions).results
}

pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
