use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::{
    ai::AiError,
    auth::CryptError,
    error::log_error,
    model::{DatabaseError, ResourceType},
    web::UserRole,
};

pub type WebResult<T> = std::result::Result<T, WebError>;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("RegistrationUserConflict")]
    RegistrationUserConflict,

    #[error("RegistrationInvalid: {details}")]
    RegistrationInvalid { details: String },
}

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("AuthenticationTokenInvalid. Error: {error}")]
    AuthenticationTokenInvalid { error: String },

    #[error("AuthenticationRequired")]
    AuthenticationRequired,

    #[error("AuthenticationInvalidCredentials")]
    AuthenticationInvalidCredentials,

    #[error("AuthenticationAccountDisabled")]
    AuthenticationAccountDisabled,

    #[error("AuthenticationRoleRequired: {role}")]
    AuthenticationRoleRequired { role: UserRole },
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("ResourceNotFound: {resource_type:?}")]
    ResourceNotFound { resource_type: ResourceType },

    #[error("ResourceForbidden: {resource_type:?}")]
    ResourceForbidden { resource_type: ResourceType },

    #[error("ResourcePaymentRequired: {resource_type:?}")]
    ResourcePaymentRequired { resource_type: ResourceType },

    #[error("ResourceFetchError: {resource_type:?}. Error: {error}")]
    ResourceFetchError {
        resource_type: ResourceType,
        error: DatabaseError,
    },

    #[error("ResourceBadRequest: {resource_type:?}. {details}")]
    ResourceBadRequest {
        resource_type: ResourceType,
        details: String,
    },

    #[error("ResourceConflict: {resource_type:?}")]
    ResourceConflict { resource_type: ResourceType },
}

#[derive(Debug, Error)]
pub enum UserError {
    #[error("UserSelfModification")]
    UserSelfModification,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("ServerCryptError: {0}")]
    ServerCryptError(#[from] CryptError),

    #[error("ServerAiNotConfigured")]
    ServerAiNotConfigured,

    #[error("ServerAiUpstream: {0}")]
    ServerAiUpstream(AiError),
}

/// Status and message a failure shows to HTTP clients.
pub trait ClientFacing {
    fn status_code(&self) -> StatusCode;
    fn client_display(&self) -> String;
}

impl ClientFacing for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ServerCryptError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServerAiNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            Self::ServerAiUpstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn client_display(&self) -> String {
        let message = match self {
            Self::ServerCryptError(_) => "Internal server error.",
            Self::ServerAiNotConfigured => "AI service is not configured on this server.",
            Self::ServerAiUpstream(_) => "AI service failed to produce a usable response.",
        };
        message.to_string()
    }
}

impl ClientFacing for RegistrationError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::RegistrationUserConflict => StatusCode::CONFLICT,
            Self::RegistrationInvalid { .. } => StatusCode::BAD_REQUEST,
        }
    }

    fn client_display(&self) -> String {
        match self {
            Self::RegistrationUserConflict => "Registration error, user already exists.".to_string(),
            Self::RegistrationInvalid { details } => format!("Registration error, {details}"),
        }
    }
}

impl ClientFacing for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthenticationRequired
            | Self::AuthenticationTokenInvalid { .. }
            | Self::AuthenticationInvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::AuthenticationAccountDisabled | Self::AuthenticationRoleRequired { .. } => {
                StatusCode::FORBIDDEN
            }
        }
    }

    fn client_display(&self) -> String {
        match self {
            Self::AuthenticationTokenInvalid { .. } => {
                "Authentication error, token invalid or expired.".to_string()
            }
            Self::AuthenticationRequired => "Authentication required.".to_string(),
            Self::AuthenticationInvalidCredentials => {
                "Authentication error, user not found or password is invalid.".to_string()
            }
            Self::AuthenticationAccountDisabled => "Authentication error, account is disabled.".to_string(),
            Self::AuthenticationRoleRequired { role } => format!("Access denied, {role} role required."),
        }
    }
}

impl ClientFacing for ResourceError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            Self::ResourceForbidden { .. } | Self::ResourcePaymentRequired { .. } => StatusCode::FORBIDDEN,
            Self::ResourceFetchError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ResourceBadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::ResourceConflict { .. } => StatusCode::CONFLICT,
        }
    }

    fn client_display(&self) -> String {
        match self {
            Self::ResourceNotFound { resource_type } => format!("{resource_type:?} not found."),
            Self::ResourceForbidden { resource_type } => {
                format!("Access to this {resource_type:?} is forbidden.")
            }
            Self::ResourcePaymentRequired { .. } => {
                "Payment required, enroll in the course to access this resource.".to_string()
            }
            Self::ResourceFetchError { .. } => "Unable to load the requested data.".to_string(),
            Self::ResourceBadRequest { details, .. } => format!("Bad request: {details}"),
            Self::ResourceConflict { resource_type } => format!("{resource_type:?} already exists."),
        }
    }
}

impl ClientFacing for UserError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn client_display(&self) -> String {
        match self {
            Self::UserSelfModification => {
                "Administrators cannot disable or delete their own account.".to_string()
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("ResourceError - {0}")]
    ResourceError(#[from] ResourceError),
    #[error("AuthenticationError - {0}")]
    AuthenticationError(#[from] AuthenticationError),
    #[error("RegistrationError - {0}")]
    RegistrationError(#[from] RegistrationError),
    #[error("UserError - {0}")]
    UserError(#[from] UserError),
    #[error("ServerError - {0}")]
    ServerError(#[from] ServerError),
}

impl WebError {
    pub fn resource_not_found(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceNotFound {
            resource_type: r#type,
        })
    }

    pub fn resource_forbidden(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceForbidden {
            resource_type: r#type,
        })
    }

    pub fn resource_payment_required(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourcePaymentRequired {
            resource_type: r#type,
        })
    }

    pub fn resource_fetch_error(r#type: ResourceType, error: DatabaseError) -> Self {
        Self::ResourceError(ResourceError::ResourceFetchError {
            resource_type: r#type,
            error,
        })
    }

    pub fn resource_bad_request<S: Into<String>>(r#type: ResourceType, details: S) -> Self {
        Self::ResourceError(ResourceError::ResourceBadRequest {
            resource_type: r#type,
            details: details.into(),
        })
    }

    pub fn resource_conflict(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceConflict {
            resource_type: r#type,
        })
    }

    /// Maps a repository failure: ownership denial is 403, a unique violation 409,
    /// anything else 500.
    pub fn database(r#type: ResourceType, error: DatabaseError) -> Self {
        match error {
            DatabaseError::Forbidden => Self::resource_forbidden(r#type),
            e if e.is_unique_violation() => Self::resource_conflict(r#type),
            e => Self::resource_fetch_error(r#type, e),
        }
    }

    pub fn auth_token_invalid<S: Into<String>>(error: S) -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationTokenInvalid {
            error: error.into(),
        })
    }

    pub fn auth_required() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationRequired)
    }

    pub fn auth_invalid_credentials() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationInvalidCredentials)
    }

    pub fn auth_account_disabled() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationAccountDisabled)
    }

    pub fn role_required(role: UserRole) -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationRoleRequired { role })
    }

    pub fn registration_conflict() -> Self {
        Self::RegistrationError(RegistrationError::RegistrationUserConflict)
    }

    pub fn registration_invalid<S: Into<String>>(details: S) -> Self {
        Self::RegistrationError(RegistrationError::RegistrationInvalid {
            details: details.into(),
        })
    }

    pub fn user_self_modification() -> Self {
        Self::UserError(UserError::UserSelfModification)
    }

    pub fn server_crypt_error(e: CryptError) -> Self {
        Self::ServerError(ServerError::ServerCryptError(e))
    }

    pub fn from_ai(e: AiError) -> Self {
        match e {
            AiError::NotConfigured => Self::ServerError(ServerError::ServerAiNotConfigured),
            e => Self::ServerError(ServerError::ServerAiUpstream(e)),
        }
    }

    fn family(&self) -> &dyn ClientFacing {
        match self {
            Self::ResourceError(e) => e,
            Self::RegistrationError(e) => e,
            Self::AuthenticationError(e) => e,
            Self::UserError(e) => e,
            Self::ServerError(e) => e,
        }
    }
}

impl ClientFacing for WebError {
    fn status_code(&self) -> StatusCode {
        self.family().status_code()
    }

    fn client_display(&self) -> String {
        self.family().client_display()
    }
}

/// JSON body of every error response.
#[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub message: String,
    /// e.g. "404"
    pub status_code: String,
    /// Internal error chain, debug builds only
    pub details: Option<String>,
}

impl IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            log_error(&self);
        } else {
            tracing::debug!("{self}");
        }

        let body = ErrorResponse {
            message: self.client_display(),
            status_code: status_code.as_str().to_string(),
            details: cfg!(debug_assertions).then(|| self.to_string()),
        };

        (status_code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_mapping() {
        let course = ResourceType::Course;
        assert_eq!(WebError::resource_not_found(course).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(WebError::resource_conflict(course).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            WebError::resource_payment_required(ResourceType::Video).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(WebError::auth_required().status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(WebError::auth_account_disabled().status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            WebError::role_required(UserRole::Admin).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            WebError::registration_invalid("bad email").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebError::from_ai(AiError::NotConfigured).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            WebError::from_ai(AiError::EmptyResponse).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn forbidden_database_error_maps_to_403() {
        let e = WebError::database(ResourceType::Course, DatabaseError::Forbidden);
        assert_eq!(e.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn bad_request_carries_details_to_client() {
        let e = WebError::resource_bad_request(ResourceType::ModuleContent, "video_url is required");
        assert!(e.client_display().contains("video_url is required"));
    }
}
