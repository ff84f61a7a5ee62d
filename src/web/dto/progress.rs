use serde::Serialize;
use uuid::Uuid;

use crate::model::entity::{ContentProgress, average_progress, round2};

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EnrollmentProgressView {
    pub enrollment_id: Uuid,
    pub completed_items: usize,
    pub average_progress: f64,
    pub items: Vec<ContentProgress>,
}

impl EnrollmentProgressView {
    pub fn new(enrollment_id: Uuid, items: Vec<ContentProgress>) -> Self {
        Self {
            enrollment_id,
            completed_items: items.iter().filter(|p| p.completed()).count(),
            average_progress: round2(average_progress(&items)),
            items,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CourseProgressSummary {
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub total_items: i64,
    pub completed_items: i64,
    /// Percentage of completed published items, two decimals.
    pub overall_progress: f64,
    pub total_time_spent_seconds: i64,
}

impl CourseProgressSummary {
    /// `completed_items` counts published content only, the same way the enrollment
    /// percentage does.
    pub fn new(
        student_id: Uuid,
        course_id: Uuid,
        total_items: i64,
        completed_items: i64,
        items: &[ContentProgress],
    ) -> Self {
        let completed_items = completed_items.clamp(0, total_items.max(0));
        let overall_progress = if total_items > 0 {
            round2(completed_items as f64 * 100.0 / total_items as f64)
        } else {
            0.0
        };

        Self {
            student_id,
            course_id,
            total_items,
            completed_items,
            overall_progress,
            total_time_spent_seconds: items.iter().map(|p| p.time_spent_seconds()).sum(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_course_has_zero_progress() {
        let summary = CourseProgressSummary::new(Uuid::new_v4(), Uuid::new_v4(), 0, 0, &[]);
        assert_eq!(summary.overall_progress, 0.0);
        assert_eq!(summary.completed_items, 0);
        assert_eq!(summary.total_time_spent_seconds, 0);
    }

    #[test]
    fn completed_never_exceeds_published_total() {
        let summary = CourseProgressSummary::new(Uuid::new_v4(), Uuid::new_v4(), 2, 3, &[]);
        assert_eq!(summary.completed_items, 2);
        assert_eq!(summary.overall_progress, 100.0);

        let summary = CourseProgressSummary::new(Uuid::new_v4(), Uuid::new_v4(), 3, 1, &[]);
        assert_eq!(summary.overall_progress, 33.33);
    }
}
