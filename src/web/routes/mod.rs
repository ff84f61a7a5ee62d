use crate::{
    model::{HasOwner, ResourceTyped, check_access, is_owner_or_admin},
    web::{AppState, AuthenticatedUser, WebError, WebResult, doc::ApiDoc},
};
use axum::Router;
use tower_cookies::CookieManagerLayer;
use tower_http::{
    LatencyUnit,
    cors::CorsLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod admin;
pub mod auth;
pub mod content;
pub mod courses;
pub mod instructor;
pub mod instructors;
pub mod interviews;
pub mod modules;
pub mod progress;
pub mod quizzes;
pub mod student;
pub mod videos;

/// Turns a missing row into 404.
pub(crate) fn found<T: ResourceTyped>(value: Option<T>) -> WebResult<T> {
    value.ok_or_else(|| WebError::resource_not_found(T::get_resource_type()))
}

/// Requires `user` to own `resource` (admins always pass), 403 otherwise.
pub(crate) async fn ensure_owner<T>(
    state: &AppState,
    user: &AuthenticatedUser,
    resource: &T,
) -> WebResult<()>
where
    T: HasOwner<OwnerId = uuid::Uuid> + ResourceTyped + Sync,
{
    check_access(state.pool(), user, resource, user.user_id())
        .await
        .map_err(|e| WebError::database(T::get_resource_type(), e))
}

pub(crate) async fn owns<T>(
    state: &AppState,
    user: Option<&AuthenticatedUser>,
    resource: &T,
) -> WebResult<bool>
where
    T: HasOwner<OwnerId = uuid::Uuid> + ResourceTyped + Sync,
{
    is_owner_or_admin(state.pool(), user, resource)
        .await
        .map_err(|e| WebError::database(T::get_resource_type(), e))
}

pub fn build_app(state: AppState) -> Router {
    let mut router = Router::new()
        .nest("/api/auth", auth::routes(state.clone()))
        .nest("/api/admin", admin::routes(state.clone()))
        .nest("/api/courses", courses::routes(state.clone()))
        .nest("/api/courses/{course_id}/modules", modules::routes(state.clone()))
        .nest("/api/modules/{module_id}/content", content::routes(state.clone()))
        .nest("/api/quizzes", quizzes::routes(state.clone()))
        .nest("/api/videos", videos::routes(state.clone()))
        .nest("/api/interviews", interviews::routes(state.clone()))
        .nest("/api/progress", progress::routes(state.clone()))
        .nest("/api/student", student::routes(state.clone()))
        .nest("/api/instructor", instructor::routes(state.clone()))
        .nest("/api/instructors", instructors::routes(state.clone()));

    if state.config().app().docs() {
        router = router.merge(SwaggerUi::new("/api/docs").url("/api-doc/openapi.json", ApiDoc::openapi()));
    }

    router
        .layer(CookieManagerLayer::default())
        .layer(CorsLayer::very_permissive())
        .layer(
            TraceLayer::new_for_http().on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
        )
        .with_state(state)
}
