use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct StudentAnswer {
    id: Uuid,
    attempt_id: Uuid,
    question_id: Uuid,
    selected_option_id: Option<Uuid>,
    is_correct: bool,
    points_earned: i32,
    answered_at: DateTime<Utc>,
}

pub struct StudentAnswerCreate {
    pub attempt_id: Uuid,
    pub question_id: Uuid,
    pub selected_option_id: Uuid,
    pub is_correct: bool,
    pub points_earned: i32,
}

impl ResourceTyped for StudentAnswer {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::StudentAnswer
    }
}

impl StudentAnswer {
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    pub fn points_earned(&self) -> i32 {
        self.points_earned
    }

    /// Records the answer, replacing an earlier answer to the same question.
    pub async fn upsert(mm: &ModelManager, data: StudentAnswerCreate) -> DatabaseResult<Self> {
        let answer = sqlx::query_as(
            r#"
            INSERT INTO student_answers (id, attempt_id, question_id, selected_option_id, is_correct, points_earned)
            VALUES ($1,$2,$3,$4,$5,$6)
            ON CONFLICT (attempt_id, question_id) DO UPDATE
            SET selected_option_id = EXCLUDED.selected_option_id,
                is_correct = EXCLUDED.is_correct,
                points_earned = EXCLUDED.points_earned,
                answered_at = now()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.attempt_id)
        .bind(data.question_id)
        .bind(data.selected_option_id)
        .bind(data.is_correct)
        .bind(data.points_earned)
        .fetch_one(mm.executor())
        .await?;

        Ok(answer)
    }

    pub async fn earned_points(mm: &ModelManager, attempt_id: Uuid) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(points_earned), 0)::BIGINT FROM student_answers WHERE attempt_id = $1",
        )
        .bind(attempt_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn list_by_attempt(mm: &ModelManager, attempt_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM student_answers WHERE attempt_id = $1 ORDER BY answered_at",
        )
        .bind(attempt_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }
}
