use std::path::Path;

use anyhow::Context;
use chrono::{TimeZone, Utc};

use crate::models::{
    Assignment, AssignmentGroup, Course, Dataset, Submission, SubmissionDetail,
};
use crate::timestamp::parse_timestamp;

pub fn load_dataset(path: &Path) -> anyhow::Result<Dataset> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    let dataset = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse dataset {}", path.display()))?;
    Ok(dataset)
}

/// Reads `learner_id,assignment_id,submitted_at,score` rows in file order.
pub fn import_submissions_csv(csv_path: &Path) -> anyhow::Result<Vec<Submission>> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        learner_id: u64,
        assignment_id: u64,
        submitted_at: String,
        score: f64,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut submissions = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result
            .with_context(|| format!("bad row {} in {}", index + 1, csv_path.display()))?;
        let submitted_at = parse_timestamp(&row.submitted_at)
            .with_context(|| format!("bad row {} in {}", index + 1, csv_path.display()))?;

        submissions.push(Submission {
            learner_id: row.learner_id,
            assignment_id: row.assignment_id,
            submission: SubmissionDetail {
                submitted_at,
                score: row.score,
            },
        });
    }

    Ok(submissions)
}

/// Loads the dataset and appends any CSV submissions after its own.
pub fn load_inputs(dataset_path: &Path, csv_path: Option<&Path>) -> anyhow::Result<Dataset> {
    let mut dataset = load_dataset(dataset_path)?;

    if let Some(path) = csv_path {
        let imported = import_submissions_csv(path)?;
        tracing::info!(
            count = imported.len(),
            path = %path.display(),
            "imported submissions from csv"
        );
        dataset.submissions.extend(imported);
    }

    Ok(dataset)
}

pub fn sample_dataset() -> anyhow::Result<Dataset> {
    let day = |month: u32, date: u32| {
        Utc.with_ymd_and_hms(2024, month, date, 0, 0, 0)
            .single()
            .context("invalid date")
    };

    let assignments = vec![
        Assignment {
            id: 100,
            name: "Assignment 1".to_string(),
            due_at: day(7, 5)?,
            points_possible: 100.0,
        },
        Assignment {
            id: 101,
            name: "Assignment 2".to_string(),
            due_at: day(7, 10)?,
            points_possible: 200.0,
        },
    ];

    let rows = vec![
        (123, 100, day(7, 4)?, 85.0),
        (123, 101, day(7, 11)?, 150.0),
        (124, 100, day(7, 5)?, 90.0),
        (124, 101, day(7, 9)?, 180.0),
    ];

    let submissions = rows
        .into_iter()
        .map(|(learner_id, assignment_id, submitted_at, score)| Submission {
            learner_id,
            assignment_id,
            submission: SubmissionDetail {
                submitted_at,
                score,
            },
        })
        .collect();

    Ok(Dataset {
        course: Course {
            id: 1,
            name: "JavaScript Basics".to_string(),
        },
        assignment_group: AssignmentGroup {
            id: 10,
            name: "Week 1 Assignments".to_string(),
            course_id: 1,
            group_weight: 30.0,
            assignments,
        },
        submissions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("learner-scores-{nanos}-{name}"));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn sample_round_trips_through_json_file() {
        let sample = sample_dataset().unwrap();
        let path = temp_file("sample.json", &serde_json::to_string_pretty(&sample).unwrap());

        let loaded = load_dataset(&path).unwrap();
        assert_eq!(loaded, sample);
        assert_eq!(loaded.submissions.len(), 4);
    }

    #[test]
    fn csv_rows_append_after_dataset_submissions() {
        let dataset = temp_file(
            "dataset.json",
            &serde_json::to_string(&sample_dataset().unwrap()).unwrap(),
        );
        let csv = temp_file(
            "subs.csv",
            "learner_id,assignment_id,submitted_at,score\n\
             130,100,2024-07-01T12:00:00Z,70\n\
             131,101,2024-07-10,199.5\n",
        );

        let loaded = load_inputs(&dataset, Some(csv.as_path())).unwrap();
        assert_eq!(loaded.submissions.len(), 6);
        assert_eq!(loaded.submissions[4].learner_id, 130);
        assert_eq!(loaded.submissions[5].submission.score, 199.5);
        assert_eq!(
            loaded.submissions[5].submission.submitted_at,
            Utc.with_ymd_and_hms(2024, 7, 10, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn csv_with_bad_timestamp_reports_row() {
        let csv = temp_file(
            "bad.csv",
            "learner_id,assignment_id,submitted_at,score\n130,100,yesterday,70\n",
        );

        let err = import_submissions_csv(&csv).unwrap_err();
        assert!(format!("{err:#}").contains("bad row 1"));
        assert!(format!("{err:#}").contains("yesterday"));
    }

    #[test]
    fn missing_dataset_is_an_error() {
        let path = std::env::temp_dir().join("learner-scores-does-not-exist.json");
        let err = load_dataset(&path).unwrap_err();
        assert!(err.to_string().contains("failed to read dataset"));
    }
}
