use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, ResourceTyped,
        entity::{Enrollment, Video},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, UserRole, WebError, WebResult,
        dto::videos::{PreviewQuery, VideoBody, VideoUrlResponse},
        error::ErrorResponse,
        middlewares,
        routes::{courses::load_course, ensure_owner, found, owns},
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", post(video_create_handler))
        .route("/course/{course_id}", get(course_videos_handler))
        .route(
            "/{video_id}",
            get(video_get_handler)
                .put(video_update_handler)
                .delete(video_delete_handler),
        )
        .route("/{video_id}/url", get(video_url_handler))
        .route("/{video_id}/preview", put(video_preview_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

fn video_error(e: crate::model::DatabaseError) -> WebError {
    WebError::database(Video::get_resource_type(), e)
}

async fn load_video(state: &AppState, video_id: Uuid) -> WebResult<Video> {
    let video = Video::find_by_id(state.pool(), &AuthenticatedUser::admin(), video_id)
        .await
        .map_err(video_error)?;
    found(video)
}

/// Owner, admin, or a student with a paid enrollment in the course.
async fn sees_full_course(state: &AppState, user: &AuthenticatedUser, course_id: Uuid) -> WebResult<bool> {
    let course = load_course(state, course_id).await?;
    if owns(state, Some(user), &course).await? {
        return Ok(true);
    }
    if user.user_role() != UserRole::Student {
        return Ok(false);
    }
    Enrollment::has_access(state.pool(), user.user_id(), course_id)
        .await
        .map_err(|e| WebError::database(Enrollment::get_resource_type(), e))
}

#[utoipa::path(
    post,
    path = "/api/videos",
    request_body = VideoBody,
    description = "Registers a video by URL. YouTube links are stored in embed form",
    responses(
        (status = 201, description = "Video created", body = Video),
        (status = 400, description = "Missing title or URL", body = ErrorResponse),
        (status = 403, description = "Not the course owner", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "videos",
    security(("bearer" = []), ("cookie" = []))
)]
async fn video_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<VideoBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let course = load_course(&state, payload.course_id).await?;
    ensure_owner(&state, user, &course).await?;

    let data = payload
        .into_create_update()
        .map_err(|e| WebError::resource_bad_request(Video::get_resource_type(), e))?;
    let video = Video::create(state.pool(), user, data)
        .await
        .map_err(video_error)?;
    Ok((StatusCode::CREATED, Json(video)))
}

#[utoipa::path(
    get,
    path = "/api/videos/course/{course_id}",
    description = "Videos of a course. Callers without access only see previews",
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Videos", body = Vec<Video>),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "videos",
    security(("bearer" = []), ("cookie" = []))
)]
async fn course_videos_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let full = sees_full_course(&state, user, course_id).await?;

    let videos = Video::list_by_course(state.pool(), course_id, !full)
        .await
        .map_err(video_error)?;
    Ok((StatusCode::OK, Json(videos)))
}

#[utoipa::path(
    get,
    path = "/api/videos/{video_id}",
    description = "Full video record",
    params(("video_id" = Uuid, Path, description = "Video id")),
    responses(
        (status = 200, description = "Video", body = Video),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
    ),
    tag = "videos",
    security(("bearer" = []), ("cookie" = []))
)]
async fn video_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(video_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let video = load_video(&state, video_id).await?;
    ensure_owner(&state, user, &video).await?;
    Ok((StatusCode::OK, Json(video)))
}

#[utoipa::path(
    put,
    path = "/api/videos/{video_id}",
    request_body = VideoBody,
    description = "Replaces a video. It cannot be moved to another course",
    params(("video_id" = Uuid, Path, description = "Video id")),
    responses(
        (status = 200, description = "Video updated", body = Video),
        (status = 400, description = "Invalid body or different course", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
    ),
    tag = "videos",
    security(("bearer" = []), ("cookie" = []))
)]
async fn video_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(video_id): Path<Uuid>,
    Json(payload): Json<VideoBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let video = load_video(&state, video_id).await?;
    ensure_owner(&state, user, &video).await?;

    if payload.course_id != video.course_id() {
        return Err(WebError::resource_bad_request(
            Video::get_resource_type(),
            "course_id cannot change",
        ));
    }
    let data = payload
        .into_create_update()
        .map_err(|e| WebError::resource_bad_request(Video::get_resource_type(), e))?;
    let updated = video
        .update(state.pool(), user, data)
        .await
        .map_err(video_error)?;
    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    get,
    path = "/api/videos/{video_id}/url",
    description = "Playable URL of a preview, or of any video for enrolled students and the owner",
    params(("video_id" = Uuid, Path, description = "Video id")),
    responses(
        (status = 200, description = "Video URL", body = VideoUrlResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Payment required", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
    ),
    tag = "videos",
    security(("bearer" = []), ("cookie" = []))
)]
async fn video_url_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(video_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let video = load_video(&state, video_id).await?;

    if !video.is_preview() && !sees_full_course(&state, user, video.course_id()).await? {
        return Err(WebError::resource_payment_required(Video::get_resource_type()));
    }

    Ok((
        StatusCode::OK,
        Json(VideoUrlResponse {
            video_id: video.id(),
            video_url: video.video_url().to_string(),
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/api/videos/{video_id}/preview",
    description = "Marks a video as free preview or paid",
    params(("video_id" = Uuid, Path, description = "Video id"), PreviewQuery),
    responses(
        (status = 200, description = "Video updated", body = Video),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
    ),
    tag = "videos",
    security(("bearer" = []), ("cookie" = []))
)]
async fn video_preview_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(video_id): Path<Uuid>,
    Query(query): Query<PreviewQuery>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let video = load_video(&state, video_id).await?;
    ensure_owner(&state, user, &video).await?;

    let updated = video
        .set_preview(state.pool(), user, query.is_preview)
        .await
        .map_err(video_error)?;
    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/videos/{video_id}",
    description = "Deletes a video",
    params(("video_id" = Uuid, Path, description = "Video id")),
    responses(
        (status = 200, description = "Video deleted"),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
    ),
    tag = "videos",
    security(("bearer" = []), ("cookie" = []))
)]
async fn video_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(video_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let video = load_video(&state, video_id).await?;
    ensure_owner(&state, user, &video).await?;

    video.delete(state.pool(), user).await.map_err(video_error)?;
    Ok(StatusCode::OK)
}
