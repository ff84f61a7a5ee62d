use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct InterviewAttempt {
    id: Uuid,
    interview_id: Uuid,
    student_id: Uuid,
    overall_score: Option<i32>,
    total_questions: i32,
    time_taken_minutes: Option<i32>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl ResourceTyped for InterviewAttempt {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::InterviewAttempt
    }
}

/// Integer mean of the answer scores, `None` without answers.
pub fn overall_score(scores: &[i32]) -> Option<i32> {
    if scores.is_empty() {
        return None;
    }
    let sum: i64 = scores.iter().map(|s| *s as i64).sum();
    Some((sum / scores.len() as i64) as i32)
}

impl InterviewAttempt {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn interview_id(&self) -> Uuid {
        self.interview_id
    }

    pub fn student_id(&self) -> Uuid {
        self.student_id
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub async fn create(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        interview_id: Uuid,
        total_questions: i32,
    ) -> DatabaseResult<Self> {
        let attempt = sqlx::query_as(
            r#"
            INSERT INTO interview_attempts (id, interview_id, student_id, total_questions)
            VALUES ($1,$2,$3,$4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(interview_id)
        .bind(actor.user_id())
        .bind(total_questions)
        .fetch_one(mm.executor())
        .await?;
        Ok(attempt)
    }

    pub async fn find_by_id(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM interview_attempts WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn list_by_student(mm: &ModelManager, student_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM interview_attempts WHERE student_id = $1 ORDER BY started_at DESC",
        )
        .bind(student_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn complete(self, mm: &ModelManager, overall_score: Option<i32>) -> DatabaseResult<Self> {
        let now = Utc::now();
        let minutes = (now - self.started_at).num_minutes().max(0) as i32;
        let attempt = sqlx::query_as(
            r#"
            UPDATE interview_attempts
            SET overall_score = $1, completed_at = $2, time_taken_minutes = $3
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(overall_score)
        .bind(now)
        .bind(minutes)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;
        Ok(attempt)
    }
}

#[async_trait]
impl HasOwner for InterviewAttempt {
    type OwnerId = uuid::Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.student_id)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn overall_score_is_integer_mean() {
        assert_eq!(overall_score(&[]), None);
        assert_eq!(overall_score(&[80]), Some(80));
        assert_eq!(overall_score(&[70, 85, 90]), Some(81));
        assert_eq!(overall_score(&[0, 100]), Some(50));
    }
}
