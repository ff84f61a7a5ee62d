use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentType {
    Video,
    PdfNotes,
    PdfQuestions,
    Quiz,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "VIDEO",
            Self::PdfNotes => "PDF_NOTES",
            Self::PdfQuestions => "PDF_QUESTIONS",
            Self::Quiz => "QUIZ",
        }
    }

    pub fn is_pdf(&self) -> bool {
        matches!(self, Self::PdfNotes | Self::PdfQuestions)
    }
}

impl From<&str> for ContentType {
    fn from(value: &str) -> Self {
        match value {
            "VIDEO" => Self::Video,
            "PDF_QUESTIONS" => Self::PdfQuestions,
            "QUIZ" => Self::Quiz,
            _ => Self::PdfNotes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct ModuleContent {
    id: Uuid,
    module_id: Uuid,
    title: String,
    description: String,
    content_type: String,
    content_order: i32,
    content_url: Option<String>,
    video_url: Option<String>,
    pdf_url: Option<String>,
    thumbnail_url: Option<String>,
    duration_seconds: Option<i32>,
    file_size: Option<i64>,
    is_published: bool,
    is_free: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Editable content fields. `None` keeps the stored value on update.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ModuleContentCreateUpdate {
    pub module_id: Uuid,
    pub title: String,
    pub description: String,
    pub content_type: Option<ContentType>,
    pub content_order: Option<i32>,
    pub content_url: Option<String>,
    pub video_url: Option<String>,
    pub pdf_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<i32>,
    pub file_size: Option<i64>,
    pub is_published: Option<bool>,
    pub is_free: Option<bool>,
}

impl ResourceTyped for ModuleContent {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::ModuleContent
    }
}

impl ModuleContent {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn module_id(&self) -> Uuid {
        self.module_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content_type(&self) -> ContentType {
        ContentType::from(self.content_type.as_str())
    }

    pub fn is_published(&self) -> bool {
        self.is_published
    }

    pub fn is_free(&self) -> bool {
        self.is_free
    }

    /// Drops every link to the underlying material, leaving the outline.
    pub fn without_urls(mut self) -> Self {
        self.content_url = None;
        self.video_url = None;
        self.pdf_url = None;
        self
    }
}

#[async_trait]
impl CrudRepository<ModuleContent, ModuleContentCreateUpdate, uuid::Uuid> for ModuleContent {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: ModuleContentCreateUpdate,
    ) -> DatabaseResult<Self> {
        let content_type = data.content_type.unwrap_or(ContentType::PdfNotes);
        let content = sqlx::query_as(
            r#"
            INSERT INTO module_contents (
                id, module_id, title, description, content_type, content_order, content_url,
                video_url, pdf_url, thumbnail_url, duration_seconds, file_size, is_published, is_free
            )
            VALUES (
                $1, $2, $3, $4, $5,
                COALESCE($6, (SELECT COALESCE(MAX(content_order), 0) + 1 FROM module_contents WHERE module_id = $2)),
                $7, $8, $9, $10, $11, $12, $13, $14
            )
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.module_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(content_type.as_str())
        .bind(data.content_order)
        .bind(&data.content_url)
        .bind(&data.video_url)
        .bind(&data.pdf_url)
        .bind(&data.thumbnail_url)
        .bind(data.duration_seconds)
        .bind(data.file_size)
        .bind(data.is_published.unwrap_or(false))
        .bind(data.is_free.unwrap_or(false))
        .fetch_one(mm.executor())
        .await?;

        Ok(content)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: ModuleContentCreateUpdate,
    ) -> DatabaseResult<Self> {
        let content = sqlx::query_as(
            r#"
            UPDATE module_contents
            SET title = $1,
                description = $2,
                content_order = COALESCE($3, content_order),
                content_url = COALESCE($4, content_url),
                video_url = COALESCE($5, video_url),
                pdf_url = COALESCE($6, pdf_url),
                thumbnail_url = COALESCE($7, thumbnail_url),
                duration_seconds = COALESCE($8, duration_seconds),
                file_size = COALESCE($9, file_size),
                is_published = COALESCE($10, is_published),
                is_free = COALESCE($11, is_free),
                updated_at = now()
            WHERE id = $12
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.content_order)
        .bind(&data.content_url)
        .bind(&data.video_url)
        .bind(&data.pdf_url)
        .bind(&data.thumbnail_url)
        .bind(data.duration_seconds)
        .bind(data.file_size)
        .bind(data.is_published)
        .bind(data.is_free)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(content)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM module_contents WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM module_contents WHERE id = $1")
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
            "SELECT * FROM module_contents ORDER BY module_id, content_order LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM module_contents")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

#[async_trait]
impl HasOwner for ModuleContent {
    type OwnerId = uuid::Uuid;

    async fn get_owner_id(
        &self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        let owner = sqlx::query_scalar(
            r#"
            SELECT c.instructor_id
            FROM course_modules m
            JOIN courses c ON c.id = m.course_id
            WHERE m.id = $1
            "#,
        )
        .bind(self.module_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(owner)
    }
}

impl ModuleContent {
    pub async fn list_by_module(
        mm: &ModelManager,
        module_id: Uuid,
        only_published: bool,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            r#"
            SELECT * FROM module_contents
            WHERE module_id = $1 AND (is_published OR NOT $2)
            ORDER BY content_order, created_at
            "#,
        )
        .bind(module_id)
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
        sqlx::query("UPDATE module_contents SET is_published = $1, updated_at = now() WHERE id = $2")
            .bind(published)
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        self.is_published = published;
        Ok(self)
    }

    /// Course the content belongs to, through its module.
    pub async fn course_id(&self, mm: &ModelManager) -> DatabaseResult<Uuid> {
        let course_id = sqlx::query_scalar("SELECT course_id FROM course_modules WHERE id = $1")
            .bind(self.module_id)
            .fetch_one(mm.executor())
            .await?;
        Ok(course_id)
    }

    pub async fn count_published_in_course(
        mm: &ModelManager,
        course_id: Uuid,
    ) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM module_contents mc
            JOIN course_modules m ON m.id = mc.module_id
            WHERE m.course_id = $1 AND mc.is_published
            "#,
        )
        .bind(course_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }
}
