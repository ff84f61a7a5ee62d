use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, ResourceTyped,
        entity::{Course, CourseModule},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::courses::{ModuleBody, PublishedQuery},
        error::ErrorResponse,
        middlewares,
        routes::{courses::load_course, ensure_owner, found},
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(modules_list_handler).post(module_create_handler))
        .route("/manage", get(modules_manage_handler))
        .route(
            "/{module_id}",
            put(module_update_handler).delete(module_delete_handler),
        )
        .route("/{module_id}/publish", put(module_publish_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

fn module_error(e: crate::model::DatabaseError) -> WebError {
    WebError::database(CourseModule::get_resource_type(), e)
}

/// Module addressed under its course; a module of another course is reported as missing.
async fn load_module(state: &AppState, course_id: Uuid, module_id: Uuid) -> WebResult<CourseModule> {
    let module = CourseModule::find_by_id(state.pool(), &AuthenticatedUser::admin(), module_id)
        .await
        .map_err(module_error)?
        .filter(|m| m.course_id() == course_id);
    found(module)
}

#[utoipa::path(
    get,
    path = "/api/courses/{course_id}/modules",
    description = "Published modules of a published course in order",
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Modules", body = Vec<CourseModule>),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "modules"
)]
async fn modules_list_handler(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let course = load_course(&state, course_id).await?;
    if !course.is_published() {
        return Err(WebError::resource_not_found(Course::get_resource_type()));
    }

    let modules = CourseModule::list_by_course(state.pool(), course.id(), true)
        .await
        .map_err(module_error)?;
    Ok((StatusCode::OK, Json(modules)))
}

#[utoipa::path(
    get,
    path = "/api/courses/{course_id}/modules/manage",
    description = "Every module of the course including unpublished ones",
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Modules", body = Vec<CourseModule>),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "modules",
    security(("bearer" = []), ("cookie" = []))
)]
async fn modules_manage_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let course = load_course(&state, course_id).await?;
    ensure_owner(&state, user, &course).await?;

    let modules = CourseModule::list_by_course(state.pool(), course.id(), false)
        .await
        .map_err(module_error)?;
    Ok((StatusCode::OK, Json(modules)))
}

#[utoipa::path(
    post,
    path = "/api/courses/{course_id}/modules",
    request_body = ModuleBody,
    description = "Adds a module; without an order it goes last",
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 201, description = "Module created", body = CourseModule),
        (status = 400, description = "Missing title", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "modules",
    security(("bearer" = []), ("cookie" = []))
)]
async fn module_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<ModuleBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let course = load_course(&state, course_id).await?;
    ensure_owner(&state, user, &course).await?;

    let data = payload
        .into_create_update(course.id())
        .map_err(|e| WebError::resource_bad_request(CourseModule::get_resource_type(), e))?;
    let module = CourseModule::create(state.pool(), user, data)
        .await
        .map_err(module_error)?;
    Ok((StatusCode::CREATED, Json(module)))
}

#[utoipa::path(
    put,
    path = "/api/courses/{course_id}/modules/{module_id}",
    request_body = ModuleBody,
    description = "Replaces title, description and optionally order or visibility",
    params(
        ("course_id" = Uuid, Path, description = "Course id"),
        ("module_id" = Uuid, Path, description = "Module id"),
    ),
    responses(
        (status = 200, description = "Module updated", body = CourseModule),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Module not found in course", body = ErrorResponse),
    ),
    tag = "modules",
    security(("bearer" = []), ("cookie" = []))
)]
async fn module_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((course_id, module_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ModuleBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let module = load_module(&state, course_id, module_id).await?;
    ensure_owner(&state, user, &module).await?;

    let data = payload
        .into_create_update(course_id)
        .map_err(|e| WebError::resource_bad_request(CourseModule::get_resource_type(), e))?;
    let updated = module
        .update(state.pool(), user, data)
        .await
        .map_err(module_error)?;
    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/courses/{course_id}/modules/{module_id}",
    description = "Deletes a module and its content",
    params(
        ("course_id" = Uuid, Path, description = "Course id"),
        ("module_id" = Uuid, Path, description = "Module id"),
    ),
    responses(
        (status = 200, description = "Module deleted"),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Module not found in course", body = ErrorResponse),
    ),
    tag = "modules",
    security(("bearer" = []), ("cookie" = []))
)]
async fn module_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((course_id, module_id)): Path<(Uuid, Uuid)>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let module = load_module(&state, course_id, module_id).await?;
    ensure_owner(&state, user, &module).await?;

    module.delete(state.pool(), user).await.map_err(module_error)?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    put,
    path = "/api/courses/{course_id}/modules/{module_id}/publish",
    description = "Shows or hides a module",
    params(
        ("course_id" = Uuid, Path, description = "Course id"),
        ("module_id" = Uuid, Path, description = "Module id"),
        PublishedQuery,
    ),
    responses(
        (status = 200, description = "Module updated", body = CourseModule),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Module not found in course", body = ErrorResponse),
    ),
    tag = "modules",
    security(("bearer" = []), ("cookie" = []))
)]
async fn module_publish_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((course_id, module_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<PublishedQuery>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let module = load_module(&state, course_id, module_id).await?;
    ensure_owner(&state, user, &module).await?;

    let updated = module
        .set_published(state.pool(), user, query.published)
        .await
        .map_err(module_error)?;
    Ok((StatusCode::OK, Json(updated)))
}
