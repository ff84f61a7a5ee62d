use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

pub const DEFAULT_PASSING_SCORE: i32 = 70;
pub const DEFAULT_MAX_ATTEMPTS: i32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Quiz {
    id: Uuid,
    module_content_id: Uuid,
    title: String,
    description: String,
    passing_score: i32,
    time_limit_minutes: Option<i32>,
    max_attempts: i32,
    is_published: bool,
    show_results_immediately: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct QuizCreateUpdate {
    pub module_content_id: Uuid,
    pub title: String,
    pub description: String,
    pub passing_score: i32,
    pub time_limit_minutes: Option<i32>,
    pub max_attempts: i32,
    pub show_results_immediately: bool,
}

impl ResourceTyped for Quiz {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Quiz
    }
}

impl Quiz {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn module_content_id(&self) -> Uuid {
        self.module_content_id
    }

    pub fn passing_score(&self) -> i32 {
        self.passing_score
    }

    pub fn time_limit_minutes(&self) -> Option<i32> {
        self.time_limit_minutes
    }

    pub fn max_attempts(&self) -> i32 {
        self.max_attempts
    }

    pub fn is_published(&self) -> bool {
        self.is_published
    }

    pub fn show_results_immediately(&self) -> bool {
        self.show_results_immediately
    }
}

#[async_trait]
impl CrudRepository<Quiz, QuizCreateUpdate, uuid::Uuid> for Quiz {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuizCreateUpdate,
    ) -> DatabaseResult<Self> {
        let quiz = sqlx::query_as(
            r#"
            INSERT INTO quizzes (
                id, module_content_id, title, description, passing_score, time_limit_minutes,
                max_attempts, show_results_immediately
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.module_content_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.passing_score)
        .bind(data.time_limit_minutes)
        .bind(data.max_attempts)
        .bind(data.show_results_immediately)
        .fetch_one(mm.executor())
        .await?;

        Ok(quiz)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuizCreateUpdate,
    ) -> DatabaseResult<Self> {
        let quiz = sqlx::query_as(
            r#"
            UPDATE quizzes
            SET title = $1,
                description = $2,
                passing_score = $3,
                time_limit_minutes = $4,
                max_attempts = $5,
                show_results_immediately = $6,
                updated_at = now()
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.passing_score)
        .bind(data.time_limit_minutes)
        .bind(data.max_attempts)
        .bind(data.show_results_immediately)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(quiz)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM quizzes WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: uuid::Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM quizzes WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    async fn list(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM quizzes ORDER BY created_at LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quizzes")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

#[async_trait]
impl HasOwner for Quiz {
    type OwnerId = uuid::Uuid;

    async fn get_owner_id(
        &self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        let owner = sqlx::query_scalar(
            r#"
            SELECT c.instructor_id
            FROM module_contents mc
            JOIN course_modules m ON m.id = mc.module_id
            JOIN courses c ON c.id = m.course_id
            WHERE mc.id = $1
            "#,
        )
        .bind(self.module_content_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(owner)
    }
}

impl Quiz {
    pub async fn find_by_content(
        mm: &ModelManager,
        module_content_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM quizzes WHERE module_content_id = $1")
            .bind(module_content_id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn course_id(&self, mm: &ModelManager) -> DatabaseResult<Uuid> {
        let course_id = sqlx::query_scalar(
            r#"
            SELECT m.course_id
            FROM module_contents mc
            JOIN course_modules m ON m.id = mc.module_id
            WHERE mc.id = $1
            "#,
        )
        .bind(self.module_content_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(course_id)
    }

    pub async fn set_published(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        published: bool,
    ) -> DatabaseResult<Self> {
        sqlx::query("UPDATE quizzes SET is_published = $1, updated_at = now() WHERE id = $2")
            .bind(published)
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        self.is_published = published;
        Ok(self)
    }

    pub async fn count_all(mm: &ModelManager) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quizzes")
            .fetch_one(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn count_by_instructor(mm: &ModelManager, instructor_id: Uuid) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM quizzes q
            JOIN module_contents mc ON mc.id = q.module_content_id
            JOIN course_modules m ON m.id = mc.module_id
            JOIN courses c ON c.id = m.course_id
            WHERE c.instructor_id = $1
            "#,
        )
        .bind(instructor_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }
}
