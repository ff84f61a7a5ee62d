use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    model::{
        ResourceTyped,
        entity::{Course, CourseCatalogRow, InstructorProfileRow, UserEntity},
    },
    web::{
        AppState, WebError, WebResult, dto::courses::InstructorProfileView, error::ErrorResponse,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/public", get(public_list_handler))
        .route("/public/{instructor_id}", get(public_profile_handler))
        .with_state(state)
}

fn profile_error(e: crate::model::DatabaseError) -> WebError {
    WebError::resource_fetch_error(UserEntity::get_resource_type(), e)
}

#[utoipa::path(
    get,
    path = "/api/instructors/public",
    description = "Active instructors with their number of published courses",
    responses(
        (status = 200, description = "Instructors", body = Vec<InstructorProfileRow>),
    ),
    tag = "instructors"
)]
async fn public_list_handler(State(state): State<AppState>) -> WebResult<impl IntoResponse> {
    let rows = InstructorProfileRow::list(state.pool())
        .await
        .map_err(profile_error)?;
    Ok((StatusCode::OK, Json(rows)))
}

#[utoipa::path(
    get,
    path = "/api/instructors/public/{instructor_id}",
    description = "Instructor profile with published courses",
    params(("instructor_id" = Uuid, Path, description = "Instructor id")),
    responses(
        (status = 200, description = "Profile", body = InstructorProfileView),
        (status = 404, description = "No such active instructor", body = ErrorResponse),
    ),
    tag = "instructors"
)]
async fn public_profile_handler(
    State(state): State<AppState>,
    Path(instructor_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let profile = InstructorProfileRow::find(state.pool(), instructor_id)
        .await
        .map_err(profile_error)?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    let courses = CourseCatalogRow::list_published_by_instructor(state.pool(), profile.id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(InstructorProfileView { profile, courses })))
}
