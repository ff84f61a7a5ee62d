use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, put},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, Page, PageRequest, PaginatableRepository, ResourceTyped,
        entity::{Course, CourseStatus, Enrollment, Quiz, QuizAttemptStats, UserEntity},
    },
    web::{
        AppState, RequestContext, UserRole, WebError, WebResult,
        dto::dashboard::{AdminAnalytics, AdminStats, Dashboard, RoleCount, StatusCount},
        error::ErrorResponse,
        middlewares,
        routes::found,
    },
};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct EnabledQuery {
    pub enabled: bool,
}

const ADMIN_FEATURES: [&str; 4] = [
    "Manage users",
    "Enable or disable accounts",
    "Review platform analytics",
    "Moderate courses",
];

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/dashboard", get(dashboard_handler))
        .route("/users", get(users_page_handler))
        .route("/users/{user_id}/enabled", put(user_enabled_handler))
        .route("/users/{user_id}", delete(user_delete_handler))
        .route("/courses", get(courses_page_handler))
        .route("/analytics", get(analytics_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

fn stat_error(e: crate::model::DatabaseError) -> WebError {
    WebError::resource_fetch_error(UserEntity::get_resource_type(), e)
}

#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    description = "Platform totals for administrators",
    responses(
        (status = 200, description = "Dashboard", body = Dashboard<AdminStats>),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Administrators only", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []), ("cookie" = []))
)]
async fn dashboard_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let admin = ctx.user_with_role(UserRole::Admin)?;
    let mm = state.pool();

    let stats = AdminStats {
        total_users: UserEntity::count(mm, admin).await.map_err(stat_error)?,
        total_courses: Course::count(mm, admin).await.map_err(stat_error)?,
        total_enrollments: Enrollment::count_all(mm).await.map_err(stat_error)?,
        total_quizzes: Quiz::count_all(mm).await.map_err(stat_error)?,
    };

    Ok((
        StatusCode::OK,
        Json(Dashboard::new(UserRole::Admin, &ADMIN_FEATURES, stats)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    description = "Paginated list of every account",
    params(PageRequest),
    responses(
        (status = 200, description = "Users page", body = Page<UserEntity>),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Administrators only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []), ("cookie" = []))
)]
async fn users_page_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> WebResult<impl IntoResponse> {
    let admin = ctx.user_with_role(UserRole::Admin)?;

    let users = UserEntity::page(state.pool(), admin, page)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(users)))
}

#[utoipa::path(
    get,
    path = "/api/admin/courses",
    description = "Every course regardless of status, newest first, for moderation",
    params(PageRequest),
    responses(
        (status = 200, description = "Courses page", body = Page<Course>),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Administrators only", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []), ("cookie" = []))
)]
async fn courses_page_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> WebResult<impl IntoResponse> {
    let admin = ctx.user_with_role(UserRole::Admin)?;

    let courses = Course::page(state.pool(), admin, page)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{user_id}/enabled",
    description = "Enables or disables an account. Administrators cannot disable themselves",
    params(("user_id" = Uuid, Path, description = "User id"), EnabledQuery),
    responses(
        (status = 200, description = "Updated user", body = UserEntity),
        (status = 400, description = "Attempt to disable own account", body = ErrorResponse),
        (status = 403, description = "Administrators only", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []), ("cookie" = []))
)]
#[tracing::instrument(skip(ctx, state))]
async fn user_enabled_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<EnabledQuery>,
) -> WebResult<impl IntoResponse> {
    let admin = ctx.user_with_role(UserRole::Admin)?;
    if user_id == admin.user_id() && !query.enabled {
        return Err(WebError::user_self_modification());
    }

    let user = UserEntity::find_by_id(state.pool(), admin, user_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    let updated = found(user)?
        .set_enabled(state.pool(), admin, query.enabled)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    tracing::info!("account {} enabled={}", updated.email(), updated.is_enabled());
    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{user_id}",
    description = "Deletes an account together with everything it owns",
    params(("user_id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 400, description = "Attempt to delete own account", body = ErrorResponse),
        (status = 403, description = "Administrators only", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []), ("cookie" = []))
)]
#[tracing::instrument(skip(ctx, state))]
async fn user_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let admin = ctx.user_with_role(UserRole::Admin)?;
    if user_id == admin.user_id() {
        return Err(WebError::user_self_modification());
    }

    let user = UserEntity::find_by_id(state.pool(), admin, user_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    found(user)?
        .delete(state.pool(), admin)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/api/admin/analytics",
    description = "Users per role, courses per status and quiz activity",
    responses(
        (status = 200, description = "Analytics", body = AdminAnalytics),
        (status = 403, description = "Administrators only", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []), ("cookie" = []))
)]
async fn analytics_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    ctx.user_with_role(UserRole::Admin)?;
    let mm = state.pool();

    let mut users_by_role = Vec::with_capacity(UserRole::ALL.len());
    for role in UserRole::ALL {
        let count = UserEntity::count_by_role(mm, role).await.map_err(stat_error)?;
        users_by_role.push(RoleCount { role, count });
    }

    let mut courses_by_status = Vec::with_capacity(CourseStatus::ALL.len());
    for status in CourseStatus::ALL {
        let count = Course::count_by_status(mm, status).await.map_err(stat_error)?;
        courses_by_status.push(StatusCount { status, count });
    }

    let quiz_stats = QuizAttemptStats::all(mm).await.map_err(stat_error)?;

    Ok((
        StatusCode::OK,
        Json(AdminAnalytics {
            users_by_role,
            courses_by_status,
            total_enrollments: Enrollment::count_all(mm).await.map_err(stat_error)?,
            completed_quiz_attempts: quiz_stats.completed_attempts,
            average_quiz_score: quiz_stats.average_score,
        }),
    ))
}
