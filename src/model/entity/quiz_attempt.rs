use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptStatus {
    InProgress,
    Completed,
    Abandoned,
    TimedOut,
}

impl AttemptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Abandoned => "ABANDONED",
            Self::TimedOut => "TIMED_OUT",
        }
    }
}

impl From<&str> for AttemptStatus {
    fn from(value: &str) -> Self {
        match value {
            "COMPLETED" => Self::Completed,
            "ABANDONED" => Self::Abandoned,
            "TIMED_OUT" => Self::TimedOut,
            _ => Self::InProgress,
        }
    }
}

/// Outcome of grading an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct QuizScore {
    pub earned_points: i32,
    pub total_points: i32,
    /// Percentage, rounded down.
    pub score: i32,
    pub passed: bool,
}

impl QuizScore {
    pub fn compute(earned_points: i64, total_points: i64, passing_score: i32) -> Self {
        let score = if total_points > 0 {
            (earned_points.clamp(0, total_points) * 100 / total_points) as i32
        } else {
            0
        };

        Self {
            earned_points: earned_points as i32,
            total_points: total_points as i32,
            score,
            passed: score >= passing_score,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct QuizAttempt {
    id: Uuid,
    quiz_id: Uuid,
    student_id: Uuid,
    attempt_number: i32,
    status: String,
    score: Option<i32>,
    total_points: Option<i32>,
    earned_points: Option<i32>,
    passed: Option<bool>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    time_spent_minutes: Option<i32>,
}

impl ResourceTyped for QuizAttempt {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::QuizAttempt
    }
}

impl QuizAttempt {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn quiz_id(&self) -> Uuid {
        self.quiz_id
    }

    pub fn student_id(&self) -> Uuid {
        self.student_id
    }

    pub fn attempt_number(&self) -> i32 {
        self.attempt_number
    }

    pub fn status(&self) -> AttemptStatus {
        AttemptStatus::from(self.status.as_str())
    }

    pub fn score(&self) -> Option<i32> {
        self.score
    }

    pub fn is_graded(&self) -> bool {
        self.score.is_some()
    }

    /// True once the time limit has run out, measured from `started_at`.
    pub fn is_expired(&self, time_limit_minutes: Option<i32>, now: DateTime<Utc>) -> bool {
        match time_limit_minutes {
            Some(limit) if limit > 0 => now > self.started_at + Duration::minutes(limit as i64),
            _ => false,
        }
    }

    /// Whole minutes elapsed since the attempt started.
    pub fn minutes_spent(&self, now: DateTime<Utc>) -> i32 {
        (now - self.started_at).num_minutes().max(0) as i32
    }
}

#[async_trait]
impl HasOwner for QuizAttempt {
    type OwnerId = uuid::Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.student_id)
    }
}

impl QuizAttempt {
    pub async fn create(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        quiz_id: Uuid,
        attempt_number: i32,
    ) -> DatabaseResult<Self> {
        let attempt = sqlx::query_as(
            r#"
            INSERT INTO quiz_attempts (id, quiz_id, student_id, attempt_number, status)
            VALUES ($1,$2,$3,$4,$5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(quiz_id)
        .bind(actor.user_id())
        .bind(attempt_number)
        .bind(AttemptStatus::InProgress.as_str())
        .fetch_one(mm.executor())
        .await?;

        Ok(attempt)
    }

    pub async fn find_by_id(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM quiz_attempts WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn find_open(
        mm: &ModelManager,
        quiz_id: Uuid,
        student_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM quiz_attempts WHERE quiz_id = $1 AND student_id = $2 AND status = $3",
        )
        .bind(quiz_id)
        .bind(student_id)
        .bind(AttemptStatus::InProgress.as_str())
        .fetch_optional(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn count_for(mm: &ModelManager, quiz_id: Uuid, student_id: Uuid) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM quiz_attempts WHERE quiz_id = $1 AND student_id = $2",
        )
        .bind(quiz_id)
        .bind(student_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn list_for(mm: &ModelManager, quiz_id: Uuid, student_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            r#"
            SELECT * FROM quiz_attempts
            WHERE quiz_id = $1 AND student_id = $2
            ORDER BY attempt_number DESC
            "#,
        )
        .bind(quiz_id)
        .bind(student_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    /// Closes an open attempt without grading it.
    pub async fn close(self, mm: &ModelManager, status: AttemptStatus) -> DatabaseResult<Self> {
        let now = Utc::now();
        let attempt = sqlx::query_as(
            r#"
            UPDATE quiz_attempts
            SET status = $1, completed_at = $2, time_spent_minutes = $3
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(status.as_str())
        .bind(now)
        .bind(self.minutes_spent(now))
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;
        Ok(attempt)
    }

    /// Writes the score once. `None` when another request graded the attempt first.
    pub async fn grade(
        self,
        mm: &ModelManager,
        status: AttemptStatus,
        score: QuizScore,
    ) -> DatabaseResult<Option<Self>> {
        let now = Utc::now();
        let completed_at = self.completed_at.unwrap_or(now);
        let attempt = sqlx::query_as(
            r#"
            UPDATE quiz_attempts
            SET status = $1,
                score = $2,
                total_points = $3,
                earned_points = $4,
                passed = $5,
                completed_at = $6,
                time_spent_minutes = $7
            WHERE id = $8 AND score IS NULL
            RETURNING *
            "#,
        )
        .bind(status.as_str())
        .bind(score.score)
        .bind(score.total_points)
        .bind(score.earned_points)
        .bind(score.passed)
        .bind(completed_at)
        .bind(self.minutes_spent(completed_at))
        .bind(self.id)
        .fetch_optional(mm.executor())
        .await?;
        Ok(attempt)
    }
}

/// Count and average score over graded attempts.
#[derive(Debug, Clone, Copy, Default, Serialize, FromRow, utoipa::ToSchema)]
pub struct QuizAttemptStats {
    pub completed_attempts: i64,
    pub average_score: Option<f64>,
}

const STATS_SELECT: &str = r#"
    SELECT COUNT(*) AS completed_attempts, AVG(a.score)::FLOAT8 AS average_score
    FROM quiz_attempts a
"#;

impl QuizAttemptStats {
    pub async fn all(mm: &ModelManager) -> DatabaseResult<Self> {
        let sql = format!("{STATS_SELECT} WHERE a.score IS NOT NULL");
        let stats = sqlx::query_as(&sql).fetch_one(mm.executor()).await?;
        Ok(stats)
    }

    pub async fn for_student(mm: &ModelManager, student_id: Uuid) -> DatabaseResult<Self> {
        let sql = format!("{STATS_SELECT} WHERE a.score IS NOT NULL AND a.student_id = $1");
        let stats = sqlx::query_as(&sql)
            .bind(student_id)
            .fetch_one(mm.executor())
            .await?;
        Ok(stats)
    }

    pub async fn for_course(mm: &ModelManager, course_id: Uuid) -> DatabaseResult<Self> {
        let sql = format!(
            r#"{STATS_SELECT}
            JOIN quizzes q ON q.id = a.quiz_id
            JOIN module_contents mc ON mc.id = q.module_content_id
            JOIN course_modules m ON m.id = mc.module_id
            WHERE a.score IS NOT NULL AND m.course_id = $1"#
        );
        let stats = sqlx::query_as(&sql)
            .bind(course_id)
            .fetch_one(mm.executor())
            .await?;
        Ok(stats)
    }

    pub async fn for_instructor(mm: &ModelManager, instructor_id: Uuid) -> DatabaseResult<Self> {
        let sql = format!(
            r#"{STATS_SELECT}
            JOIN quizzes q ON q.id = a.quiz_id
            JOIN module_contents mc ON mc.id = q.module_content_id
            JOIN course_modules m ON m.id = mc.module_id
            JOIN courses c ON c.id = m.course_id
            WHERE a.score IS NOT NULL AND c.instructor_id = $1"#
        );
        let stats = sqlx::query_as(&sql)
            .bind(instructor_id)
            .fetch_one(mm.executor())
            .await?;
        Ok(stats)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn score_is_rounded_down_percentage() {
        let score = QuizScore::compute(2, 3, 70);
        assert_eq!(score.score, 66);
        assert!(!score.passed);

        let score = QuizScore::compute(7, 10, 70);
        assert_eq!(score.score, 70);
        assert!(score.passed);
    }

    #[test]
    fn empty_quiz_scores_zero() {
        let score = QuizScore::compute(0, 0, 70);
        assert_eq!(score.score, 0);
        assert!(!score.passed);

        // nothing to pass when the bar is zero
        assert!(QuizScore::compute(0, 0, 0).passed);
    }

    #[test]
    fn full_marks() {
        let score = QuizScore::compute(5, 5, 100);
        assert_eq!(score.score, 100);
        assert!(score.passed);
        assert_eq!(score.earned_points, 5);
        assert_eq!(score.total_points, 5);
    }

    fn attempt_started(now: DateTime<Utc>, minutes_ago: i64) -> QuizAttempt {
        QuizAttempt {
            id: Uuid::new_v4(),
            quiz_id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            attempt_number: 1,
            status: AttemptStatus::InProgress.as_str().to_string(),
            score: None,
            total_points: None,
            earned_points: None,
            passed: None,
            started_at: now - Duration::minutes(minutes_ago),
            completed_at: None,
            time_spent_minutes: None,
        }
    }

    #[test]
    fn time_limit_expiry() {
        let now = Utc::now();
        let attempt = attempt_started(now, 11);
        assert!(attempt.is_expired(Some(10), now));
        assert!(!attempt.is_expired(Some(15), now));
        assert!(!attempt.is_expired(None, now));
        assert!(!attempt.is_expired(Some(0), now));
        assert_eq!(attempt.minutes_spent(now), 11);
    }

    #[test]
    fn status_parsing() {
        assert_eq!(AttemptStatus::from("TIMED_OUT"), AttemptStatus::TimedOut);
        assert_eq!(AttemptStatus::from("COMPLETED"), AttemptStatus::Completed);
        assert_eq!(AttemptStatus::from("whatever"), AttemptStatus::InProgress);
    }
}
