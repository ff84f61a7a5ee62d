use crate::ai::Evaluation;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct InterviewAnswer {
    id: Uuid,
    attempt_id: Uuid,
    question_id: Uuid,
    student_answer: String,
    ai_score: i32,
    ai_feedback: String,
    strengths: Vec<String>,
    improvements: Vec<String>,
    answered_at: DateTime<Utc>,
}

impl ResourceTyped for InterviewAnswer {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::InterviewAnswer
    }
}

impl InterviewAnswer {
    pub fn ai_score(&self) -> i32 {
        self.ai_score
    }

    /// Stores the evaluated answer, replacing an earlier answer to the same question.
    pub async fn upsert(
        mm: &ModelManager,
        attempt_id: Uuid,
        question_id: Uuid,
        answer: &str,
        evaluation: &Evaluation,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO interview_answers (
                id, attempt_id, question_id, student_answer, ai_score, ai_feedback, strengths, improvements
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            ON CONFLICT (attempt_id, question_id) DO UPDATE
            SET student_answer = EXCLUDED.student_answer,
                ai_score = EXCLUDED.ai_score,
                ai_feedback = EXCLUDED.ai_feedback,
                strengths = EXCLUDED.strengths,
                improvements = EXCLUDED.improvements,
                answered_at = now()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(attempt_id)
        .bind(question_id)
        .bind(answer)
        .bind(evaluation.score)
        .bind(&evaluation.feedback)
        .bind(&evaluation.strengths)
        .bind(&evaluation.improvements)
        .fetch_one(mm.executor())
        .await?;
        Ok(row)
    }

    pub async fn list_by_attempt(mm: &ModelManager, attempt_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM interview_answers WHERE attempt_id = $1 ORDER BY answered_at",
        )
        .bind(attempt_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }
}
