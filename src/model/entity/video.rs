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
pub enum VideoStatus {
    Processing,
    Ready,
    Failed,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "PROCESSING",
            Self::Ready => "READY",
            Self::Failed => "FAILED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VideoType {
    Lesson,
    Preview,
    Trailer,
}

impl VideoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lesson => "LESSON",
            Self::Preview => "PREVIEW",
            Self::Trailer => "TRAILER",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Video {
    id: Uuid,
    course_id: Uuid,
    title: String,
    description: String,
    video_url: String,
    thumbnail_url: Option<String>,
    duration_seconds: Option<i32>,
    file_size: Option<i64>,
    video_quality: Option<String>,
    video_type: String,
    status: String,
    order_index: i32,
    is_preview: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct VideoCreateUpdate {
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<i32>,
    pub file_size: Option<i64>,
    pub video_quality: Option<String>,
    pub video_type: VideoType,
    pub status: VideoStatus,
    pub is_preview: bool,
}

impl ResourceTyped for Video {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Video
    }
}

impl Video {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn video_url(&self) -> &str {
        &self.video_url
    }

    pub fn is_preview(&self) -> bool {
        self.is_preview
    }
}

#[async_trait]
impl CrudRepository<Video, VideoCreateUpdate, uuid::Uuid> for Video {
    /// Appends the video after the existing ones of the course.
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: VideoCreateUpdate,
    ) -> DatabaseResult<Self> {
        let video = sqlx::query_as(
            r#"
            INSERT INTO videos (
                id, course_id, title, description, video_url, thumbnail_url, duration_seconds,
                file_size, video_quality, video_type, status, order_index, is_preview
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                (SELECT COUNT(*)::INTEGER FROM videos WHERE course_id = $2),
                $12
            )
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.course_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.video_url)
        .bind(&data.thumbnail_url)
        .bind(data.duration_seconds)
        .bind(data.file_size)
        .bind(&data.video_quality)
        .bind(data.video_type.as_str())
        .bind(data.status.as_str())
        .bind(data.is_preview)
        .fetch_one(mm.executor())
        .await?;

        Ok(video)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: VideoCreateUpdate,
    ) -> DatabaseResult<Self> {
        let video = sqlx::query_as(
            r#"
            UPDATE videos
            SET title = $1,
                description = $2,
                video_url = $3,
                thumbnail_url = $4,
                duration_seconds = $5,
                file_size = $6,
                video_quality = $7,
                video_type = $8,
                status = $9,
                is_preview = $10,
                updated_at = now()
            WHERE id = $11
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.video_url)
        .bind(&data.thumbnail_url)
        .bind(data.duration_seconds)
        .bind(data.file_size)
        .bind(&data.video_quality)
        .bind(data.video_type.as_str())
        .bind(data.status.as_str())
        .bind(data.is_preview)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(video)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM videos WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM videos WHERE id = $1")
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
            "SELECT * FROM videos ORDER BY course_id, order_index LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM videos")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

#[async_trait]
impl HasOwner for Video {
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

impl Video {
    pub async fn list_by_course(
        mm: &ModelManager,
        course_id: Uuid,
        only_preview: bool,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            r#"
            SELECT * FROM videos
            WHERE course_id = $1 AND (is_preview OR NOT $2)
            ORDER BY order_index, created_at
            "#,
        )
        .bind(course_id)
        .bind(only_preview)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn set_preview(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        is_preview: bool,
    ) -> DatabaseResult<Self> {
        sqlx::query("UPDATE videos SET is_preview = $1, updated_at = now() WHERE id = $2")
            .bind(is_preview)
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        self.is_preview = is_preview;
        Ok(self)
    }
}
