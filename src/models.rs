use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: u64,
    pub name: String,
    #[serde(with = "crate::timestamp::iso8601")]
    pub due_at: DateTime<Utc>,
    pub points_possible: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentGroup {
    pub id: u64,
    pub name: String,
    pub course_id: u64,
    /// Percentage of the course grade, 0 to 100.
    pub group_weight: f64,
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionDetail {
    #[serde(with = "crate::timestamp::iso8601")]
    pub submitted_at: DateTime<Utc>,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub learner_id: u64,
    pub assignment_id: u64,
    pub submission: SubmissionDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub course: Course,
    pub assignment_group: AssignmentGroup,
    #[serde(default)]
    pub submissions: Vec<Submission>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignmentScore {
    pub assignment_id: u64,
    /// `score / points_possible`, not clamped.
    pub fraction: f64,
}

/// Serializes flat: `id`, `avg`, then one key per assignment id.
#[derive(Debug, Clone, PartialEq)]
pub struct LearnerResult {
    pub id: u64,
    pub avg: f64,
    pub scores: Vec<AssignmentScore>,
}

impl Serialize for LearnerResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.scores.len() + 2))?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("avg", &self.avg)?;
        for entry in &self.scores {
            map.serialize_entry(&entry.assignment_id.to_string(), &entry.fraction)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSubmission {
    pub learner_id: u64,
    pub assignment_id: u64,
    #[serde(with = "crate::timestamp::iso8601")]
    pub submitted_at: DateTime<Utc>,
    #[serde(with = "crate::timestamp::iso8601")]
    pub due_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gradebook {
    pub results: Vec<LearnerResult>,
    pub skipped: Vec<SkippedSubmission>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn learner_result_serializes_flat_in_slot_order() {
        let result = LearnerResult {
            id: 124,
            avg: 81.0,
            scores: vec![
                AssignmentScore {
                    assignment_id: 101,
                    fraction: 0.9,
                },
                AssignmentScore {
                    assignment_id: 100,
                    fraction: 0.9,
                },
            ],
        };

        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"id":124,"avg":81.0,"101":0.9,"100":0.9}"#);
    }

    #[test]
    fn dataset_defaults_missing_submissions() {
        let raw = r#"{
            "course": {"id": 1, "name": "JavaScript Basics"},
            "assignment_group": {
                "id": 10, "name": "Week 1", "course_id": 1, "group_weight": 30,
                "assignments": [
                    {"id": 100, "name": "A1", "due_at": "2024-07-05T00:00:00Z", "points_possible": 100}
                ]
            }
        }"#;

        let dataset: Dataset = serde_json::from_str(raw).unwrap();
        assert!(dataset.submissions.is_empty());
        assert_eq!(dataset.assignment_group.assignments[0].points_possible, 100.0);
    }

    #[test]
    fn rejects_unparseable_due_dates() {
        let raw = r#"{"id": 100, "name": "A1", "due_at": "soon", "points_possible": 100}"#;
        let err = serde_json::from_str::<Assignment>(raw).unwrap_err();
        assert!(err.to_string().contains("soon"));
    }
}
