use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct QuestionOption {
    id: Uuid,
    question_id: Uuid,
    option_text: String,
    option_order: i32,
    is_correct: bool,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct QuestionOptionCreate {
    pub question_id: Uuid,
    pub option_text: String,
    pub option_order: Option<i32>,
    pub is_correct: bool,
}

impl ResourceTyped for QuestionOption {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::QuestionOption
    }
}

impl QuestionOption {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn question_id(&self) -> Uuid {
        self.question_id
    }

    pub fn option_text(&self) -> &str {
        &self.option_text
    }

    pub fn option_order(&self) -> i32 {
        self.option_order
    }

    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    pub async fn create(mm: &ModelManager, data: QuestionOptionCreate) -> DatabaseResult<Self> {
        let option = sqlx::query_as(
            r#"
            INSERT INTO question_options (id, question_id, option_text, option_order, is_correct)
            VALUES (
                $1, $2, $3,
                COALESCE($4, (SELECT COALESCE(MAX(option_order), 0) + 1 FROM question_options WHERE question_id = $2)),
                $5
            )
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.question_id)
        .bind(&data.option_text)
        .bind(data.option_order)
        .bind(data.is_correct)
        .fetch_one(mm.executor())
        .await?;

        Ok(option)
    }

    pub async fn find_by_id(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM question_options WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    /// Options of every question in the quiz, ordered within each question.
    pub async fn list_by_quiz(mm: &ModelManager, quiz_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            r#"
            SELECT o.*
            FROM question_options o
            JOIN quiz_questions q ON q.id = o.question_id
            WHERE q.quiz_id = $1
            ORDER BY q.question_order, o.option_order
            "#,
        )
        .bind(quiz_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }
}
