use std::fmt::Write;

use crate::models::{Dataset, Gradebook, LearnerResult};
use crate::timestamp::format_timestamp;

/// Learners ordered by average, highest first, ties by id.
pub fn rank_by_average(results: &[LearnerResult]) -> Vec<&LearnerResult> {
    let mut ranked: Vec<&LearnerResult> = results.iter().collect();
    ranked.sort_by(|a, b| {
        b.avg
            .partial_cmp(&a.avg)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.id.cmp(&b.id))
    });
    ranked
}

pub fn format_learner_line(result: &LearnerResult) -> String {
    let mut line = format!("- learner {} avg {:.2}", result.id, result.avg);
    for entry in &result.scores {
        let _ = write!(
            line,
            " | {}: {:.1}%",
            entry.assignment_id,
            entry.fraction * 100.0
        );
    }
    line
}

pub fn build_report(dataset: &Dataset, gradebook: &Gradebook) -> String {
    let group = &dataset.assignment_group;
    let mut output = String::new();

    let _ = writeln!(output, "# Learner Score Report");
    let _ = writeln!(
        output,
        "Course {} ({}), group {} ({}) weighted {}%",
        dataset.course.name, dataset.course.id, group.name, group.id, group.group_weight
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Assignments");

    if group.assignments.is_empty() {
        let _ = writeln!(output, "No assignments in this group.");
    } else {
        for assignment in &group.assignments {
            let _ = writeln!(
                output,
                "- {} {}: {} points, due {}",
                assignment.id,
                assignment.name,
                assignment.points_possible,
                format_timestamp(&assignment.due_at)
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Learner Averages");

    if gradebook.results.is_empty() {
        let _ = writeln!(output, "No scored submissions.");
    } else {
        for result in rank_by_average(&gradebook.results) {
            let _ = writeln!(output, "{}", format_learner_line(result));
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Skipped Late Submissions");

    if gradebook.skipped.is_empty() {
        let _ = writeln!(output, "No late submissions.");
    } else {
        for skipped in &gradebook.skipped {
            let _ = writeln!(
                output,
                "- learner {} on assignment {}: submitted {}, due {}",
                skipped.learner_id,
                skipped.assignment_id,
                format_timestamp(&skipped.submitted_at),
                format_timestamp(&skipped.due_at)
            );
        }
    }

    output
}
