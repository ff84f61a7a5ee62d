use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch, put},
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, ResourceTyped,
        entity::{CourseModule, Enrollment, ModuleContent},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, UserRole, WebError, WebResult,
        dto::{
            content::{ContentCreateBody, ContentUpdateBody, ContentView},
            courses::PublishedQuery,
        },
        error::ErrorResponse,
        middlewares,
        routes::{courses::load_course, ensure_owner, found, owns},
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(content_list_handler).post(content_create_handler))
        .route("/manage", get(content_manage_handler))
        .route(
            "/{content_id}",
            put(content_update_handler).delete(content_delete_handler),
        )
        .route("/{content_id}/publish", patch(content_publish_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

fn content_error(e: crate::model::DatabaseError) -> WebError {
    WebError::database(ModuleContent::get_resource_type(), e)
}

async fn load_module(state: &AppState, module_id: Uuid) -> WebResult<CourseModule> {
    let module = CourseModule::find_by_id(state.pool(), &AuthenticatedUser::admin(), module_id)
        .await
        .map_err(|e| WebError::database(CourseModule::get_resource_type(), e))?;
    found(module)
}

async fn load_content(state: &AppState, module_id: Uuid, content_id: Uuid) -> WebResult<ModuleContent> {
    let content = ModuleContent::find_by_id(state.pool(), &AuthenticatedUser::admin(), content_id)
        .await
        .map_err(content_error)?
        .filter(|c| c.module_id() == module_id);
    found(content)
}

/// Whether a non-owner may open paid items of the module's course.
async fn enrolled(state: &AppState, user: Option<&AuthenticatedUser>, module: &CourseModule) -> WebResult<bool> {
    match user {
        Some(user) if user.user_role() == UserRole::Student => {
            Enrollment::has_access(state.pool(), user.user_id(), module.course_id())
                .await
                .map_err(|e| WebError::database(Enrollment::get_resource_type(), e))
        }
        _ => Ok(false),
    }
}

#[utoipa::path(
    get,
    path = "/api/modules/{module_id}/content",
    description = "Published content of a published module in a published course. Paid items are locked and stripped of URLs unless the caller is enrolled or owns the course",
    params(("module_id" = Uuid, Path, description = "Module id")),
    responses(
        (status = 200, description = "Content items", body = Vec<ContentView>),
        (status = 404, description = "Module not found or not published", body = ErrorResponse),
    ),
    tag = "content"
)]
async fn content_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(module_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let module = load_module(&state, module_id).await?;

    let open = if owns(&state, ctx.maybe_user(), &module).await? {
        true
    } else {
        let course = load_course(&state, module.course_id()).await?;
        if !course.is_published() || !module.is_published() {
            return Err(WebError::resource_not_found(CourseModule::get_resource_type()));
        }
        enrolled(&state, ctx.maybe_user(), &module).await?
    };

    let items = ModuleContent::list_by_module(state.pool(), module.id(), true)
        .await
        .map_err(content_error)?
        .into_iter()
        .map(|c| ContentView::new(c, open))
        .collect::<Vec<_>>();
    Ok((StatusCode::OK, Json(items)))
}

#[utoipa::path(
    get,
    path = "/api/modules/{module_id}/content/manage",
    description = "Every content item of the module with URLs",
    params(("module_id" = Uuid, Path, description = "Module id")),
    responses(
        (status = 200, description = "Content items", body = Vec<ModuleContent>),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse),
    ),
    tag = "content",
    security(("bearer" = []), ("cookie" = []))
)]
async fn content_manage_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(module_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let module = load_module(&state, module_id).await?;
    ensure_owner(&state, user, &module).await?;

    let items = ModuleContent::list_by_module(state.pool(), module.id(), false)
        .await
        .map_err(content_error)?;
    Ok((StatusCode::OK, Json(items)))
}

#[utoipa::path(
    post,
    path = "/api/modules/{module_id}/content",
    request_body = ContentCreateBody,
    description = "Adds an unpublished content item at the end of the module",
    params(("module_id" = Uuid, Path, description = "Module id")),
    responses(
        (status = 201, description = "Content created", body = ModuleContent),
        (status = 400, description = "Missing title or URL for the content type", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse),
    ),
    tag = "content",
    security(("bearer" = []), ("cookie" = []))
)]
async fn content_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(module_id): Path<Uuid>,
    Json(payload): Json<ContentCreateBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let module = load_module(&state, module_id).await?;
    ensure_owner(&state, user, &module).await?;

    let data = payload
        .into_create(module.id())
        .map_err(|e| WebError::resource_bad_request(ModuleContent::get_resource_type(), e))?;
    let content = ModuleContent::create(state.pool(), user, data)
        .await
        .map_err(content_error)?;
    Ok((StatusCode::CREATED, Json(content)))
}

#[utoipa::path(
    put,
    path = "/api/modules/{module_id}/content/{content_id}",
    request_body = ContentUpdateBody,
    description = "Updates a content item; omitted optional fields keep their value",
    params(
        ("module_id" = Uuid, Path, description = "Module id"),
        ("content_id" = Uuid, Path, description = "Content id"),
    ),
    responses(
        (status = 200, description = "Content updated", body = ModuleContent),
        (status = 400, description = "Missing title", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Content not found in module", body = ErrorResponse),
    ),
    tag = "content",
    security(("bearer" = []), ("cookie" = []))
)]
async fn content_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((module_id, content_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ContentUpdateBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let content = load_content(&state, module_id, content_id).await?;
    ensure_owner(&state, user, &content).await?;

    let data = payload
        .into_update(module_id)
        .map_err(|e| WebError::resource_bad_request(ModuleContent::get_resource_type(), e))?;
    let updated = content
        .update(state.pool(), user, data)
        .await
        .map_err(content_error)?;
    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/modules/{module_id}/content/{content_id}",
    description = "Deletes a content item and its quiz",
    params(
        ("module_id" = Uuid, Path, description = "Module id"),
        ("content_id" = Uuid, Path, description = "Content id"),
    ),
    responses(
        (status = 200, description = "Content deleted"),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Content not found in module", body = ErrorResponse),
    ),
    tag = "content",
    security(("bearer" = []), ("cookie" = []))
)]
async fn content_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((module_id, content_id)): Path<(Uuid, Uuid)>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let content = load_content(&state, module_id, content_id).await?;
    ensure_owner(&state, user, &content).await?;

    content.delete(state.pool(), user).await.map_err(content_error)?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    patch,
    path = "/api/modules/{module_id}/content/{content_id}/publish",
    description = "Shows or hides a content item",
    params(
        ("module_id" = Uuid, Path, description = "Module id"),
        ("content_id" = Uuid, Path, description = "Content id"),
        PublishedQuery,
    ),
    responses(
        (status = 200, description = "Content updated", body = ModuleContent),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Content not found in module", body = ErrorResponse),
    ),
    tag = "content",
    security(("bearer" = []), ("cookie" = []))
)]
async fn content_publish_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((module_id, content_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<PublishedQuery>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let content = load_content(&state, module_id, content_id).await?;
    ensure_owner(&state, user, &content).await?;

    let updated = content
        .set_published(state.pool(), user, query.published)
        .await
        .map_err(content_error)?;
    Ok((StatusCode::OK, Json(updated)))
}
