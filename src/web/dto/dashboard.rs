use serde::Serialize;
use uuid::Uuid;

use crate::{
    model::entity::{CourseStatus, round2},
    web::UserRole,
};

/// Role dashboard envelope: greeting, feature list and role-specific figures.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct Dashboard<T> {
    pub message: String,
    pub role: UserRole,
    pub features: Vec<String>,
    pub data: T,
}

impl<T> Dashboard<T> {
    pub fn new(role: UserRole, features: &[&str], data: T) -> Self {
        let message = match role {
            UserRole::Admin => "Welcome to the admin dashboard",
            UserRole::Instructor => "Welcome to the instructor dashboard",
            UserRole::Student => "Welcome to your learning dashboard",
        };

        Self {
            message: message.to_string(),
            role,
            features: features.iter().map(|f| f.to_string()).collect(),
            data,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AdminStats {
    pub total_users: i64,
    pub total_courses: i64,
    pub total_enrollments: i64,
    pub total_quizzes: i64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RoleCount {
    pub role: UserRole,
    pub count: i64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct StatusCount {
    pub status: CourseStatus,
    pub count: i64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AdminAnalytics {
    pub users_by_role: Vec<RoleCount>,
    pub courses_by_status: Vec<StatusCount>,
    pub total_enrollments: i64,
    pub completed_quiz_attempts: i64,
    pub average_quiz_score: Option<f64>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct StudentStats {
    pub enrolled_courses: i64,
    pub completed_quizzes: i64,
    pub average_quiz_score: Option<f64>,
    pub next_step: String,
}

impl StudentStats {
    pub fn new(enrolled_courses: i64, completed_quizzes: i64, average_quiz_score: Option<f64>) -> Self {
        let next_step = if enrolled_courses == 0 {
            "Browse the catalogue and enroll in your first course."
        } else if completed_quizzes == 0 {
            "Continue your courses and take your first quiz."
        } else {
            "Keep going, review your quiz results and continue learning."
        };

        Self {
            enrolled_courses,
            completed_quizzes,
            average_quiz_score: average_quiz_score.map(round2),
            next_step: next_step.to_string(),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct InstructorStats {
    pub total_courses: i64,
    pub total_students: i64,
    pub total_quizzes: i64,
    pub average_student_score: Option<f64>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CourseAnalytics {
    pub course_id: Uuid,
    pub title: String,
    pub status: CourseStatus,
    pub enrollments: i64,
    pub average_progress: f64,
    pub completed_quiz_attempts: i64,
    pub average_quiz_score: Option<f64>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn student_hint_follows_activity() {
        assert!(StudentStats::new(0, 0, None).next_step.contains("enroll"));
        assert!(StudentStats::new(2, 0, None).next_step.contains("first quiz"));
        assert_eq!(StudentStats::new(2, 3, Some(71.666)).average_quiz_score, Some(71.67));
    }
}
