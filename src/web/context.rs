//! Who is calling: the resolved account (if any) and the role gates handlers use.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};

use crate::web::{WebResult, error::WebError};

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    user_id: uuid::Uuid,
    user_role: UserRole,
}

impl AuthenticatedUser {
    pub fn new(user_id: uuid::Uuid, user_role: UserRole) -> Self {
        Self { user_id, user_role }
    }

    /// Internal actor for startup tasks and tooling.
    pub fn admin() -> Self {
        Self {
            user_role: UserRole::Admin,
            user_id: uuid::Uuid::max(), // admin ID
        }
    }

    pub fn user_id(&self) -> uuid::Uuid {
        self.user_id
    }

    pub fn user_role(&self) -> UserRole {
        self.user_role
    }

    pub fn is_admin(&self) -> bool {
        self.user_role == UserRole::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Student,
    Instructor,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "STUDENT",
            Self::Instructor => "INSTRUCTOR",
            Self::Admin => "ADMIN",
        }
    }

    pub const ALL: [UserRole; 3] = [Self::Student, Self::Instructor, Self::Admin];
}

impl From<&str> for UserRole {
    fn from(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "ADMIN" => Self::Admin,
            "INSTRUCTOR" => Self::Instructor,
            _ => Self::Student,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    maybe_user: Option<AuthenticatedUser>,
}

impl RequestContext {
    pub fn new(maybe_user: Option<AuthenticatedUser>) -> Self {
        Self { maybe_user }
    }

    pub fn maybe_user(&self) -> Option<&AuthenticatedUser> {
        self.maybe_user.as_ref()
    }

    pub fn user(&self) -> WebResult<&AuthenticatedUser> {
        self.maybe_user.as_ref().ok_or_else(WebError::auth_required)
    }

    /// Authenticated user holding exactly `role`. Admins pass only where `role` is `Admin`.
    pub fn user_with_role(&self, role: UserRole) -> WebResult<&AuthenticatedUser> {
        let user = self.user()?;
        if user.user_role() == role {
            Ok(user)
        } else {
            Err(WebError::role_required(role))
        }
    }

    /// Authenticated instructor or admin, i.e. someone allowed to author course material.
    pub fn author(&self) -> WebResult<&AuthenticatedUser> {
        let user = self.user()?;
        match user.user_role() {
            UserRole::Instructor | UserRole::Admin => Ok(user),
            UserRole::Student => Err(WebError::role_required(UserRole::Instructor)),
        }
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = WebError;

    /// Routers without the context middleware see every caller as anonymous.
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or(RequestContext::new(None)))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn role_parsing_is_case_insensitive_and_defaults_to_student() {
        assert_eq!(UserRole::from("ADMIN"), UserRole::Admin);
        assert_eq!(UserRole::from("instructor"), UserRole::Instructor);
        assert_eq!(UserRole::from("STUDENT"), UserRole::Student);
        assert_eq!(UserRole::from("unknown"), UserRole::Student);
    }

    #[test]
    fn role_display_matches_storage_format() {
        for role in UserRole::ALL {
            assert_eq!(UserRole::from(role.to_string().as_str()), role);
        }
        assert_eq!(serde_json::to_string(&UserRole::Instructor).unwrap(), "\"INSTRUCTOR\"");
    }

    #[test]
    fn role_gates() {
        let student = RequestContext::new(Some(AuthenticatedUser::new(uuid::Uuid::new_v4(), UserRole::Student)));
        let admin = RequestContext::new(Some(AuthenticatedUser::admin()));
        let anonymous = RequestContext::new(None);

        assert!(student.user_with_role(UserRole::Student).is_ok());
        assert!(student.author().is_err());
        assert!(admin.author().is_ok());
        assert!(admin.user_with_role(UserRole::Student).is_err());
        assert!(anonymous.user().is_err());
    }
}
