use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, prelude::FromRow};
use uuid::Uuid;

use super::{InterviewQuestion, InterviewQuestionCreate};

pub const DEFAULT_TIME_LIMIT_MINUTES: i32 = 60;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Interview {
    id: Uuid,
    course_id: Uuid,
    title: String,
    description: String,
    job_role: String,
    difficulty: String,
    time_limit_minutes: i32,
    is_published: bool,
    ai_generated: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct InterviewCreateUpdate {
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub job_role: String,
    pub difficulty: String,
    pub time_limit_minutes: i32,
    pub ai_generated: bool,
}

impl ResourceTyped for Interview {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Interview
    }
}

impl Interview {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn job_role(&self) -> &str {
        &self.job_role
    }

    pub fn is_published(&self) -> bool {
        self.is_published
    }
}

impl Interview {
    async fn insert<'e>(executor: impl PgExecutor<'e>, data: &InterviewCreateUpdate) -> DatabaseResult<Self> {
        let interview = sqlx::query_as(
            r#"
            INSERT INTO interviews (
                id, course_id, title, description, job_role, difficulty, time_limit_minutes, ai_generated
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.course_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.job_role)
        .bind(&data.difficulty)
        .bind(data.time_limit_minutes)
        .bind(data.ai_generated)
        .fetch_one(executor)
        .await?;

        Ok(interview)
    }

    /// Inserts the interview and its questions in one transaction. Questions without
    /// a difficulty take the interview's.
    pub async fn create_with_questions(
        mm: &ModelManager,
        data: InterviewCreateUpdate,
        questions: Vec<InterviewQuestionCreate>,
    ) -> DatabaseResult<(Self, Vec<InterviewQuestion>)> {
        let mut tx = mm.executor().begin().await?;
        let interview = Self::insert(&mut *tx, &data).await?;
        let questions = InterviewQuestion::insert_all(&mut tx, interview.id, &data.difficulty, questions).await?;
        tx.commit().await?;
        Ok((interview, questions))
    }
}

#[async_trait]
impl CrudRepository<Interview, InterviewCreateUpdate, uuid::Uuid> for Interview {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: InterviewCreateUpdate,
    ) -> DatabaseResult<Self> {
        Self::insert(mm.executor(), &data).await
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: InterviewCreateUpdate,
    ) -> DatabaseResult<Self> {
        let interview = sqlx::query_as(
            r#"
            UPDATE interviews
            SET title = $1,
                description = $2,
                job_role = $3,
                difficulty = $4,
                time_limit_minutes = $5,
                updated_at = now()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.job_role)
        .bind(&data.difficulty)
        .bind(data.time_limit_minutes)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(interview)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM interviews WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM interviews WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM interviews ORDER BY created_at LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM interviews")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

#[async_trait]
impl HasOwner for Interview {
    type OwnerId = uuid::Uuid;

    async fn get_owner_id(
        &self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        let owner = sqlx::query_scalar("SELECT instructor_id FROM courses WHERE id = $1")
            .bind(self.course_id)
            .fetch_one(mm.executor())
            .await?;
        Ok(owner)
    }
}

impl Interview {
    pub async fn list_by_course(
        mm: &ModelManager,
        course_id: Uuid,
        only_published: bool,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            r#"
            SELECT * FROM interviews
            WHERE course_id = $1 AND (is_published OR NOT $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(course_id)
        .bind(only_published)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn set_published(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        published: bool,
    ) -> DatabaseResult<Self> {
        sqlx::query("UPDATE interviews SET is_published = $1, updated_at = now() WHERE id = $2")
            .bind(published)
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        self.is_published = published;
        Ok(self)
    }
}
