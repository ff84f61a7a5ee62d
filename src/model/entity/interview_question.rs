use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, prelude::FromRow};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct InterviewQuestion {
    id: Uuid,
    interview_id: Uuid,
    question: String,
    sample_answer: String,
    key_points: Vec<String>,
    difficulty: String,
    order_index: i32,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct InterviewQuestionCreate {
    pub question: String,
    #[serde(default)]
    pub sample_answer: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    pub difficulty: Option<String>,
}

impl ResourceTyped for InterviewQuestion {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::InterviewQuestion
    }
}

impl InterviewQuestion {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn interview_id(&self) -> Uuid {
        self.interview_id
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn sample_answer(&self) -> &str {
        &self.sample_answer
    }

    pub fn key_points(&self) -> &[String] {
        &self.key_points
    }

    /// Hides what would give the answer away.
    pub fn without_answer(mut self) -> Self {
        self.sample_answer = String::new();
        self.key_points = Vec::new();
        self
    }

    /// Stores the questions in the given order, numbered from 1.
    pub(crate) async fn insert_all(
        conn: &mut PgConnection,
        interview_id: Uuid,
        default_difficulty: &str,
        questions: Vec<InterviewQuestionCreate>,
    ) -> DatabaseResult<Vec<Self>> {
        let mut created = Vec::with_capacity(questions.len());

        for (idx, q) in questions.into_iter().enumerate() {
            let difficulty = q.difficulty.unwrap_or_else(|| default_difficulty.to_string());
            let row: Self = sqlx::query_as(
                r#"
                INSERT INTO interview_questions (id, interview_id, question, sample_answer, key_points, difficulty, order_index)
                VALUES ($1,$2,$3,$4,$5,$6,$7)
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(interview_id)
            .bind(&q.question)
            .bind(&q.sample_answer)
            .bind(&q.key_points)
            .bind(&difficulty)
            .bind(idx as i32 + 1)
            .fetch_one(&mut *conn)
            .await?;
            created.push(row);
        }

        Ok(created)
    }

    pub async fn find_by_id(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM interview_questions WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn list_by_interview(mm: &ModelManager, interview_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM interview_questions WHERE interview_id = $1 ORDER BY order_index",
        )
        .bind(interview_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn count_by_interview(mm: &ModelManager, interview_id: Uuid) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM interview_questions WHERE interview_id = $1",
        )
        .bind(interview_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }
}
