use crate::impl_paginatable_for;
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
pub enum CourseStatus {
    Draft,
    Published,
    Archived,
}

impl CourseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Published => "PUBLISHED",
            Self::Archived => "ARCHIVED",
        }
    }

    pub const ALL: [CourseStatus; 3] = [Self::Draft, Self::Published, Self::Archived];
}

impl From<&str> for CourseStatus {
    fn from(value: &str) -> Self {
        match value {
            "PUBLISHED" => Self::Published,
            "ARCHIVED" => Self::Archived,
            _ => Self::Draft,
        }
    }
}

impl std::fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "BEGINNER",
            Self::Intermediate => "INTERMEDIATE",
            Self::Advanced => "ADVANCED",
        }
    }
}

impl From<&str> for DifficultyLevel {
    fn from(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "INTERMEDIATE" => Self::Intermediate,
            "ADVANCED" => Self::Advanced,
            _ => Self::Beginner,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Course {
    id: Uuid,
    instructor_id: Uuid,
    title: String,
    description: String,
    price_cents: i64,
    thumbnail_url: Option<String>,
    status: String,
    difficulty_level: String,
    learning_objectives: Vec<String>,
    prerequisites: Vec<String>,
    estimated_duration_hours: Option<i32>,
    is_featured: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Full set of editable course fields. The owner is always the creating actor.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CourseCreateUpdate {
    pub title: String,
    pub description: String,
    pub price_cents: i64,
    pub thumbnail_url: Option<String>,
    pub status: CourseStatus,
    pub difficulty_level: DifficultyLevel,
    pub learning_objectives: Vec<String>,
    pub prerequisites: Vec<String>,
    pub estimated_duration_hours: Option<i32>,
    pub is_featured: bool,
}

impl ResourceTyped for Course {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Course
    }
}

impl Course {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn instructor_id(&self) -> Uuid {
        self.instructor_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn price_cents(&self) -> i64 {
        self.price_cents
    }

    pub fn status(&self) -> CourseStatus {
        CourseStatus::from(self.status.as_str())
    }

    pub fn is_published(&self) -> bool {
        self.status() == CourseStatus::Published
    }

    /// Current values as an update payload, to be patched by partial updates.
    pub fn to_create_update(&self) -> CourseCreateUpdate {
        CourseCreateUpdate {
            title: self.title.clone(),
            description: self.description.clone(),
            price_cents: self.price_cents,
            thumbnail_url: self.thumbnail_url.clone(),
            status: self.status(),
            difficulty_level: DifficultyLevel::from(self.difficulty_level.as_str()),
            learning_objectives: self.learning_objectives.clone(),
            prerequisites: self.prerequisites.clone(),
            estimated_duration_hours: self.estimated_duration_hours,
            is_featured: self.is_featured,
        }
    }
}

#[async_trait]
impl CrudRepository<Course, CourseCreateUpdate, uuid::Uuid> for Course {
    async fn create(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        data: CourseCreateUpdate,
    ) -> DatabaseResult<Self> {
        let course = sqlx::query_as(
            r#"
            INSERT INTO courses (
                id, instructor_id, title, description, price_cents, thumbnail_url, status,
                difficulty_level, learning_objectives, prerequisites, estimated_duration_hours,
                is_featured
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(actor.user_id())
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.price_cents)
        .bind(&data.thumbnail_url)
        .bind(data.status.as_str())
        .bind(data.difficulty_level.as_str())
        .bind(&data.learning_objectives)
        .bind(&data.prerequisites)
        .bind(data.estimated_duration_hours)
        .bind(data.is_featured)
        .fetch_one(mm.executor())
        .await?;

        Ok(course)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CourseCreateUpdate,
    ) -> DatabaseResult<Self> {
        let course = sqlx::query_as(
            r#"
            UPDATE courses
            SET title = $1,
                description = $2,
                price_cents = $3,
                thumbnail_url = $4,
                status = $5,
                difficulty_level = $6,
                learning_objectives = $7,
                prerequisites = $8,
                estimated_duration_hours = $9,
                is_featured = $10,
                updated_at = now()
            WHERE id = $11
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.price_cents)
        .bind(&data.thumbnail_url)
        .bind(data.status.as_str())
        .bind(data.difficulty_level.as_str())
        .bind(&data.learning_objectives)
        .bind(&data.prerequisites)
        .bind(data.estimated_duration_hours)
        .bind(data.is_featured)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(course)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM courses WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM courses WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM courses ORDER BY created_at DESC LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl_paginatable_for!(Course, CourseCreateUpdate, Uuid);

#[async_trait]
impl HasOwner for Course {
    type OwnerId = uuid::Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.instructor_id)
    }
}

impl Course {
    pub async fn list_by_instructor(
        mm: &ModelManager,
        instructor_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM courses WHERE instructor_id = $1 ORDER BY created_at DESC",
        )
        .bind(instructor_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn set_status(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        status: CourseStatus,
    ) -> DatabaseResult<Self> {
        sqlx::query("UPDATE courses SET status = $1, updated_at = now() WHERE id = $2")
            .bind(status.as_str())
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        self.status = status.to_string();
        Ok(self)
    }

    pub async fn count_by_status(mm: &ModelManager, status: CourseStatus) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(mm.executor())
            .await?;
        Ok(result)
    }
}

/// Published course joined with its instructor, as shown in the public catalogue.
#[derive(Debug, Serialize, FromRow, utoipa::ToSchema)]
pub struct CourseCatalogRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price_cents: i64,
    pub thumbnail_url: Option<String>,
    pub status: String,
    pub difficulty_level: String,
    pub learning_objectives: Vec<String>,
    pub prerequisites: Vec<String>,
    pub estimated_duration_hours: Option<i32>,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub instructor_id: Uuid,
    pub instructor_first_name: String,
    pub instructor_last_name: String,
    pub instructor_email: String,
    pub module_count: i64,
}

const CATALOG_SELECT: &str = r#"
    SELECT
        c.id,
        c.title,
        c.description,
        c.price_cents,
        c.thumbnail_url,
        c.status,
        c.difficulty_level,
        c.learning_objectives,
        c.prerequisites,
        c.estimated_duration_hours,
        c.is_featured,
        c.created_at,
        u.id AS instructor_id,
        u.first_name AS instructor_first_name,
        u.last_name AS instructor_last_name,
        u.email AS instructor_email,
        (SELECT COUNT(*) FROM course_modules m WHERE m.course_id = c.id AND m.is_published) AS module_count
    FROM courses c
    JOIN users u ON u.id = c.instructor_id
    WHERE c.status = 'PUBLISHED'
"#;

impl CourseCatalogRow {
    pub async fn list_published(mm: &ModelManager) -> DatabaseResult<Vec<Self>> {
        let sql = format!("{CATALOG_SELECT} ORDER BY c.is_featured DESC, c.created_at DESC");
        let rows = sqlx::query_as(&sql).fetch_all(mm.executor()).await?;
        Ok(rows)
    }

    pub async fn list_published_by_instructor(
        mm: &ModelManager,
        instructor_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let sql = format!("{CATALOG_SELECT} AND c.instructor_id = $1 ORDER BY c.created_at DESC");
        let rows = sqlx::query_as(&sql)
            .bind(instructor_id)
            .fetch_all(mm.executor())
            .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_round_trips_through_storage_format() {
        for status in CourseStatus::ALL {
            assert_eq!(CourseStatus::from(status.as_str()), status);
        }
        assert_eq!(CourseStatus::from("garbage"), CourseStatus::Draft);
    }

    #[test]
    fn difficulty_defaults_to_beginner() {
        assert_eq!(DifficultyLevel::from("advanced"), DifficultyLevel::Advanced);
        assert_eq!(DifficultyLevel::from(""), DifficultyLevel::Beginner);
    }
}
