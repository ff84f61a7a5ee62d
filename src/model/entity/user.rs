use crate::impl_paginatable_for;
use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::web::AuthenticatedUser;
use crate::web::UserRole;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct UserEntity {
    id: uuid::Uuid,
    email: String,
    #[serde(skip)]
    password_hash: String,
    first_name: String,
    last_name: String,
    role: String,
    is_enabled: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UserEntityCreateUpdate {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
}

impl ResourceTyped for UserEntity {
    fn get_resource_type() -> crate::model::repo::ResourceType {
        crate::model::repo::ResourceType::User
    }
}

impl UserEntity {
    pub fn id(&self) -> uuid::Uuid {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn hash(&self) -> &str {
        &self.password_hash
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    pub fn role(&self) -> UserRole {
        UserRole::from(self.role.as_str())
    }

    pub fn is_enabled(&self) -> bool {
        self.is_enabled
    }
}

#[async_trait::async_trait]
impl CrudRepository<UserEntity, UserEntityCreateUpdate, uuid::Uuid> for UserEntity {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: UserEntityCreateUpdate,
    ) -> DatabaseResult<Self> {
        let user = sqlx::query_as(
            r#"
            INSERT INTO users (id, email, password_hash, first_name, last_name, role)
            VALUES ($1,$2,$3,$4,$5,$6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.role.as_str())
        .fetch_one(mm.executor())
        .await?;

        Ok(user)
    }

    /// Updates profile fields. An empty `password_hash` keeps the current password.
    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: UserEntityCreateUpdate,
    ) -> DatabaseResult<Self> {
        let user = sqlx::query_as(
            r#"
            UPDATE users
            SET email = $1,
                first_name = $2,
                last_name = $3,
                role = $4,
                password_hash = CASE WHEN $5 = '' THEN password_hash ELSE $5 END,
                updated_at = now()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&data.email)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.role.as_str())
        .bind(&data.password_hash)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(user)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM users WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM users ORDER BY created_at, email LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl_paginatable_for!(UserEntity, UserEntityCreateUpdate, Uuid);

#[async_trait]
impl HasOwner for UserEntity {
    type OwnerId = uuid::Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.id) // owners of users are themselves
    }
}

impl UserEntity {
    pub async fn find_by_email(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        email: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn set_enabled(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        enabled: bool,
    ) -> DatabaseResult<Self> {
        sqlx::query("UPDATE users SET is_enabled = $1, updated_at = now() WHERE id = $2")
            .bind(enabled)
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        self.is_enabled = enabled;
        Ok(self)
    }

    pub async fn count_by_role(mm: &ModelManager, role: UserRole) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role.as_str())
            .fetch_one(mm.executor())
            .await?;
        Ok(result)
    }
}

/// Public instructor profile together with the number of courses anyone can see.
#[derive(Debug, Serialize, FromRow, utoipa::ToSchema)]
pub struct InstructorProfileRow {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub published_courses: i64,
    pub created_at: DateTime<Utc>,
}

const INSTRUCTOR_PROFILE_SELECT: &str = r#"
    SELECT
        u.id,
        u.email,
        u.first_name,
        u.last_name,
        u.created_at,
        COUNT(c.id) FILTER (WHERE c.status = 'PUBLISHED') AS published_courses
    FROM users u
    LEFT JOIN courses c ON c.instructor_id = u.id
    WHERE u.role = 'INSTRUCTOR' AND u.is_enabled
"#;

impl InstructorProfileRow {
    pub async fn list(mm: &ModelManager) -> DatabaseResult<Vec<Self>> {
        let sql = format!("{INSTRUCTOR_PROFILE_SELECT} GROUP BY u.id ORDER BY u.last_name, u.first_name");
        let rows = sqlx::query_as(&sql).fetch_all(mm.executor()).await?;
        Ok(rows)
    }

    pub async fn find(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        let sql = format!("{INSTRUCTOR_PROFILE_SELECT} AND u.id = $1 GROUP BY u.id");
        let row = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(row)
    }
}
