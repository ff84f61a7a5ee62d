use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    SingleChoice,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MultipleChoice => "MULTIPLE_CHOICE",
            Self::TrueFalse => "TRUE_FALSE",
            Self::SingleChoice => "SINGLE_CHOICE",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct QuizQuestion {
    id: Uuid,
    quiz_id: Uuid,
    question_text: String,
    question_type: String,
    question_order: i32,
    points: i32,
    explanation: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct QuizQuestionCreate {
    pub quiz_id: Uuid,
    pub question_text: String,
    pub question_type: QuestionType,
    pub question_order: Option<i32>,
    pub points: i32,
    pub explanation: Option<String>,
}

impl ResourceTyped for QuizQuestion {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::QuizQuestion
    }
}

impl QuizQuestion {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn quiz_id(&self) -> Uuid {
        self.quiz_id
    }

    pub fn question_text(&self) -> &str {
        &self.question_text
    }

    pub fn question_type(&self) -> &str {
        &self.question_type
    }

    pub fn question_order(&self) -> i32 {
        self.question_order
    }

    pub fn points(&self) -> i32 {
        self.points
    }

    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    pub async fn create(mm: &ModelManager, data: QuizQuestionCreate) -> DatabaseResult<Self> {
        let question = sqlx::query_as(
            r#"
            INSERT INTO quiz_questions (id, quiz_id, question_text, question_type, question_order, points, explanation)
            VALUES (
                $1, $2, $3, $4,
                COALESCE($5, (SELECT COALESCE(MAX(question_order), 0) + 1 FROM quiz_questions WHERE quiz_id = $2)),
                $6, $7
            )
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.quiz_id)
        .bind(&data.question_text)
        .bind(data.question_type.as_str())
        .bind(data.question_order)
        .bind(data.points)
        .bind(&data.explanation)
        .fetch_one(mm.executor())
        .await?;

        Ok(question)
    }

    pub async fn find_by_id(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM quiz_questions WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn list_by_quiz(mm: &ModelManager, quiz_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM quiz_questions WHERE quiz_id = $1 ORDER BY question_order, created_at",
        )
        .bind(quiz_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn total_points(mm: &ModelManager, quiz_id: Uuid) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(points), 0)::BIGINT FROM quiz_questions WHERE quiz_id = $1",
        )
        .bind(quiz_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }
}

#[async_trait]
impl HasOwner for QuizQuestion {
    type OwnerId = uuid::Uuid;

    async fn get_owner_id(
        &self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        let owner = sqlx::query_scalar(
            r#"
            SELECT c.instructor_id
            FROM quizzes q
            JOIN module_contents mc ON mc.id = q.module_content_id
            JOIN course_modules m ON m.id = mc.module_id
            JOIN courses c ON c.id = m.course_id
            WHERE q.id = $1
            "#,
        )
        .bind(self.quiz_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(owner)
    }
}
