use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

pub const PAYMENT_COMPLETED: &str = "COMPLETED";
pub const ENROLLMENT_ACTIVE: &str = "ACTIVE";
pub const ENROLLMENT_COMPLETED: &str = "COMPLETED";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Enrollment {
    id: Uuid,
    student_id: Uuid,
    course_id: Uuid,
    payment_amount_cents: i64,
    payment_status: String,
    enrollment_status: String,
    progress_percentage: i32,
    overall_score: Option<i32>,
    enrolled_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    last_accessed_at: Option<DateTime<Utc>>,
}

impl ResourceTyped for Enrollment {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Enrollment
    }
}

impl Enrollment {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn student_id(&self) -> Uuid {
        self.student_id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn progress_percentage(&self) -> i32 {
        self.progress_percentage
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PAYMENT_COMPLETED
    }
}

#[async_trait]
impl HasOwner for Enrollment {
    type OwnerId = uuid::Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.student_id)
    }
}

/// Integer share of completed items, 0 for a course without content.
pub fn progress_percentage(completed: i64, total: i64) -> i32 {
    if total <= 0 {
        return 0;
    }
    let completed = completed.clamp(0, total);
    (completed * 100 / total) as i32
}

impl Enrollment {
    /// Enrolls the actor. Payment is recorded as settled for the given amount.
    pub async fn create(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        course_id: Uuid,
        payment_amount_cents: i64,
    ) -> DatabaseResult<Self> {
        let enrollment = sqlx::query_as(
            r#"
            INSERT INTO enrollments (
                id, student_id, course_id, payment_amount_cents, payment_status, enrollment_status, last_accessed_at
            )
            VALUES ($1,$2,$3,$4,$5,$6, now())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(actor.user_id())
        .bind(course_id)
        .bind(payment_amount_cents)
        .bind(PAYMENT_COMPLETED)
        .bind(ENROLLMENT_ACTIVE)
        .fetch_one(mm.executor())
        .await?;

        Ok(enrollment)
    }

    pub async fn find_by_id(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM enrollments WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn find_by_student_course(
        mm: &ModelManager,
        student_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result =
            sqlx::query_as("SELECT * FROM enrollments WHERE student_id = $1 AND course_id = $2")
                .bind(student_id)
                .bind(course_id)
                .fetch_optional(mm.executor())
                .await?;
        Ok(result)
    }

    /// Whether `student_id` holds a paid enrollment in `course_id`.
    pub async fn has_access(
        mm: &ModelManager,
        student_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<bool> {
        let enrollment = Self::find_by_student_course(mm, student_id, course_id).await?;
        Ok(enrollment.is_some_and(|e| e.is_paid()))
    }

    /// Recomputes the course-level progress from per-content progress rows and marks the
    /// enrollment completed once every published item is done.
    pub async fn refresh_progress(self, mm: &ModelManager) -> DatabaseResult<Self> {
        let total = super::ModuleContent::count_published_in_course(mm, self.course_id).await?;
        let completed = super::ContentProgress::count_completed_published(mm, self.id).await?;

        let percentage = progress_percentage(completed, total);
        let finished = total > 0 && percentage >= 100;

        let enrollment = sqlx::query_as(
            r#"
            UPDATE enrollments
            SET progress_percentage = $1,
                enrollment_status = CASE WHEN $2 THEN $3 ELSE enrollment_status END,
                completed_at = CASE WHEN $2 THEN COALESCE(completed_at, now()) ELSE completed_at END,
                last_accessed_at = now()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(percentage)
        .bind(finished)
        .bind(ENROLLMENT_COMPLETED)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(enrollment)
    }

    pub async fn count_all(mm: &ModelManager) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM enrollments")
            .fetch_one(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn count_by_student(mm: &ModelManager, student_id: Uuid) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE student_id = $1")
            .bind(student_id)
            .fetch_one(mm.executor())
            .await?;
        Ok(result)
    }
}

/// Headcount and mean progress of a course's enrollments.
#[derive(Debug, Clone, Copy, Default, Serialize, FromRow, utoipa::ToSchema)]
pub struct EnrollmentStats {
    pub enrollments: i64,
    pub average_progress: Option<f64>,
}

impl EnrollmentStats {
    pub async fn for_course(mm: &ModelManager, course_id: Uuid) -> DatabaseResult<Self> {
        let stats = sqlx::query_as(
            r#"
            SELECT COUNT(*) AS enrollments, AVG(progress_percentage)::FLOAT8 AS average_progress
            FROM enrollments
            WHERE course_id = $1
            "#,
        )
        .bind(course_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(stats)
    }

    /// Distinct students across every course of the instructor.
    pub async fn students_of_instructor(mm: &ModelManager, instructor_id: Uuid) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT e.student_id)
            FROM enrollments e
            JOIN courses c ON c.id = e.course_id
            WHERE c.instructor_id = $1
            "#,
        )
        .bind(instructor_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }
}

/// Enrollment of the current student joined with course and instructor.
#[derive(Debug, Serialize, FromRow, utoipa::ToSchema)]
pub struct StudentCourseRow {
    pub enrollment_id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub difficulty_level: String,
    pub instructor_name: String,
    pub payment_amount_cents: i64,
    pub payment_status: String,
    pub enrollment_status: String,
    pub progress_percentage: i32,
    pub enrolled_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl StudentCourseRow {
    pub async fn list_for_student(mm: &ModelManager, student_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                e.id AS enrollment_id,
                c.id AS course_id,
                c.title,
                c.description,
                c.thumbnail_url,
                c.difficulty_level,
                TRIM(u.first_name || ' ' || u.last_name) AS instructor_name,
                e.payment_amount_cents,
                e.payment_status,
                e.enrollment_status,
                e.progress_percentage,
                e.enrolled_at,
                e.completed_at
            FROM enrollments e
            JOIN courses c ON c.id = e.course_id
            JOIN users u ON u.id = c.instructor_id
            WHERE e.student_id = $1
            ORDER BY e.enrolled_at DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(rows)
    }
}

/// Student enrolled in a course, as seen by its instructor.
#[derive(Debug, Serialize, FromRow, utoipa::ToSchema)]
pub struct CourseEnrollmentRow {
    pub enrollment_id: Uuid,
    pub student_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub enrollment_status: String,
    pub progress_percentage: i32,
    pub enrolled_at: DateTime<Utc>,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl CourseEnrollmentRow {
    pub async fn list_for_course(mm: &ModelManager, course_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                e.id AS enrollment_id,
                u.id AS student_id,
                u.email,
                u.first_name,
                u.last_name,
                e.enrollment_status,
                e.progress_percentage,
                e.enrolled_at,
                e.last_accessed_at
            FROM enrollments e
            JOIN users u ON u.id = e.student_id
            WHERE e.course_id = $1
            ORDER BY e.enrolled_at
            "#,
        )
        .bind(course_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn progress_is_integer_share_of_completed_items() {
        assert_eq!(progress_percentage(0, 0), 0);
        assert_eq!(progress_percentage(0, 4), 0);
        assert_eq!(progress_percentage(1, 3), 33);
        assert_eq!(progress_percentage(2, 3), 66);
        assert_eq!(progress_percentage(3, 3), 100);
    }

    #[test]
    fn progress_never_exceeds_hundred() {
        assert_eq!(progress_percentage(5, 3), 100);
        assert_eq!(progress_percentage(-1, 3), 0);
    }
}
