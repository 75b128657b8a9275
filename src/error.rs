/// Conditions that abort a grading pass. No partial results are produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GradingError {
    #[error("assignment group belongs to course {group_course_id}, not course {course_id}")]
    MismatchedCourse { course_id: u64, group_course_id: u64 },

    #[error("invalid points_possible {points_possible} for assignment {assignment_id}")]
    InvalidAssignment {
        assignment_id: u64,
        points_possible: f64,
    },

    #[error("learner {learner_id} submitted to unknown assignment {assignment_id}")]
    UnknownAssignment { assignment_id: u64, learner_id: u64 },
}

impl GradingError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MismatchedCourse { .. } => "MISMATCHED_COURSE",
            Self::InvalidAssignment { .. } => "INVALID_ASSIGNMENT",
            Self::UnknownAssignment { .. } => "UNKNOWN_ASSIGNMENT",
        }
    }

    /// The offending assignment id, where there is one.
    pub fn assignment_id(&self) -> Option<u64> {
        match self {
            Self::MismatchedCourse { .. } => None,
            Self::InvalidAssignment { assignment_id, .. }
            | Self::UnknownAssignment { assignment_id, .. } => Some(*assignment_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_ids() {
        let err = GradingError::InvalidAssignment {
            assignment_id: 100,
            points_possible: 0.0,
        };
        assert_eq!(
            err.to_string(),
            "invalid points_possible 0 for assignment 100"
        );
        assert_eq!(err.code(), "INVALID_ASSIGNMENT");
        assert_eq!(err.assignment_id(), Some(100));
    }

    #[test]
    fn course_mismatch_has_no_assignment() {
        let err = GradingError::MismatchedCourse {
            course_id: 2,
            group_course_id: 1,
        };
        assert_eq!(err.code(), "MISMATCHED_COURSE");
        assert_eq!(err.assignment_id(), None);
        assert!(err.to_string().contains("course 2"));
    }
}
