use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct CourseModule {
    id: Uuid,
    course_id: Uuid,
    title: String,
    description: String,
    module_order: i32,
    is_published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CourseModuleCreateUpdate {
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    /// Appended after the last module when absent.
    pub module_order: Option<i32>,
    pub is_published: Option<bool>,
}

impl ResourceTyped for CourseModule {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::CourseModule
    }
}

impl CourseModule {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn module_order(&self) -> i32 {
        self.module_order
    }

    pub fn is_published(&self) -> bool {
        self.is_published
    }
}

#[async_trait]
impl CrudRepository<CourseModule, CourseModuleCreateUpdate, uuid::Uuid> for CourseModule {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CourseModuleCreateUpdate,
    ) -> DatabaseResult<Self> {
        let module = sqlx::query_as(
            r#"
            INSERT INTO course_modules (id, course_id, title, description, module_order, is_published)
            VALUES (
                $1, $2, $3, $4,
                COALESCE($5, (SELECT COALESCE(MAX(module_order), 0) + 1 FROM course_modules WHERE course_id = $2)),
                $6
            )
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.course_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.module_order)
        .bind(data.is_published.unwrap_or(false))
        .fetch_one(mm.executor())
        .await?;

        Ok(module)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CourseModuleCreateUpdate,
    ) -> DatabaseResult<Self> {
        let module = sqlx::query_as(
            r#"
            UPDATE course_modules
            SET title = $1,
                description = $2,
                module_order = COALESCE($3, module_order),
                is_published = COALESCE($4, is_published),
                updated_at = now()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.module_order)
        .bind(data.is_published)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(module)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM course_modules WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM course_modules WHERE id = $1")
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
        let result = sqlx::query_as(
            "SELECT * FROM course_modules ORDER BY course_id, module_order LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM course_modules")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

#[async_trait]
impl HasOwner for CourseModule {
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

impl CourseModule {
    pub async fn list_by_course(
        mm: &ModelManager,
        course_id: Uuid,
        only_published: bool,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            r#"
            SELECT * FROM course_modules
            WHERE course_id = $1 AND (is_published OR NOT $2)
            ORDER BY module_order, created_at
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
        sqlx::query("UPDATE course_modules SET is_published = $1, updated_at = now() WHERE id = $2")
            .bind(published)
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        self.is_published = published;
        Ok(self)
    }
}
