use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, ResourceTyped,
        entity::{ContentProgress, CourseModule, Enrollment, ModuleContent, ProgressUpdate},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::progress::{CourseProgressSummary, EnrollmentProgressView},
        error::ErrorResponse,
        middlewares,
        routes::{courses::load_course, ensure_owner, found, owns},
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route(
            "/enrollment/{enrollment_id}/content/{content_id}/start",
            post(progress_start_handler),
        )
        .route(
            "/enrollment/{enrollment_id}/content/{content_id}",
            put(progress_update_handler),
        )
        .route("/enrollment/{enrollment_id}", get(enrollment_progress_handler))
        .route(
            "/student/{student_id}/course/{course_id}",
            get(course_summary_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

fn db_error<T: ResourceTyped>(e: crate::model::DatabaseError) -> WebError {
    WebError::database(T::get_resource_type(), e)
}

async fn load_enrollment(state: &AppState, enrollment_id: Uuid) -> WebResult<Enrollment> {
    let enrollment = Enrollment::find_by_id(state.pool(), enrollment_id)
        .await
        .map_err(db_error::<Enrollment>)?;
    found(enrollment)
}

/// Enrollment of the caller together with a content item of the enrolled course.
/// Unpublished content, modules or courses are hidden unless the caller owns the course.
async fn load_own_item(
    state: &AppState,
    user: &AuthenticatedUser,
    enrollment_id: Uuid,
    content_id: Uuid,
) -> WebResult<(Enrollment, ModuleContent)> {
    let enrollment = load_enrollment(state, enrollment_id).await?;
    if enrollment.student_id() != user.user_id() {
        return Err(WebError::resource_forbidden(Enrollment::get_resource_type()));
    }

    let content = ModuleContent::find_by_id(state.pool(), user, content_id)
        .await
        .map_err(db_error::<ModuleContent>)?;
    let content = found(content)?;
    let course_id = content
        .course_id(state.pool())
        .await
        .map_err(db_error::<ModuleContent>)?;
    if course_id != enrollment.course_id() {
        return Err(WebError::resource_not_found(ModuleContent::get_resource_type()));
    }

    let course = load_course(state, course_id).await?;
    if !owns(state, Some(user), &course).await? {
        let module = CourseModule::find_by_id(state.pool(), user, content.module_id())
            .await
            .map_err(db_error::<CourseModule>)?;
        let module = found(module)?;
        if !course.is_published() || !module.is_published() || !content.is_published() {
            return Err(WebError::resource_not_found(ModuleContent::get_resource_type()));
        }
    }

    Ok((enrollment, content))
}

/// Enrollment owner, course owner or admin.
async fn ensure_can_view(state: &AppState, user: &AuthenticatedUser, enrollment: &Enrollment) -> WebResult<()> {
    if enrollment.student_id() == user.user_id() {
        return Ok(());
    }
    let course = load_course(state, enrollment.course_id()).await?;
    ensure_owner(state, user, &course).await
}

#[utoipa::path(
    post,
    path = "/api/progress/enrollment/{enrollment_id}/content/{content_id}/start",
    description = "Opens progress tracking for a content item. Repeated calls return the same row",
    params(
        ("enrollment_id" = Uuid, Path, description = "Enrollment id"),
        ("content_id" = Uuid, Path, description = "Content id"),
    ),
    responses(
        (status = 200, description = "Progress row", body = ContentProgress),
        (status = 403, description = "Not your enrollment", body = ErrorResponse),
        (status = 404, description = "Enrollment or content not found in the course", body = ErrorResponse),
    ),
    tag = "progress",
    security(("bearer" = []), ("cookie" = []))
)]
async fn progress_start_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((enrollment_id, content_id)): Path<(Uuid, Uuid)>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let (enrollment, content) = load_own_item(&state, user, enrollment_id, content_id).await?;

    let progress = ContentProgress::start(state.pool(), enrollment.id(), content.id())
        .await
        .map_err(db_error::<ContentProgress>)?;
    Ok((StatusCode::OK, Json(progress)))
}

#[utoipa::path(
    put,
    path = "/api/progress/enrollment/{enrollment_id}/content/{content_id}",
    request_body = ProgressUpdate,
    description = "Reports progress on a content item and recomputes the course progress",
    params(
        ("enrollment_id" = Uuid, Path, description = "Enrollment id"),
        ("content_id" = Uuid, Path, description = "Content id"),
    ),
    responses(
        (status = 200, description = "Updated progress row", body = ContentProgress),
        (status = 403, description = "Not your enrollment", body = ErrorResponse),
        (status = 404, description = "Enrollment or content not found in the course", body = ErrorResponse),
    ),
    tag = "progress",
    security(("bearer" = []), ("cookie" = []))
)]
#[tracing::instrument(skip(ctx, state))]
async fn progress_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((enrollment_id, content_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ProgressUpdate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let (enrollment, content) = load_own_item(&state, user, enrollment_id, content_id).await?;
    let mm = state.pool();

    let progress = ContentProgress::start(mm, enrollment.id(), content.id())
        .await
        .map_err(db_error::<ContentProgress>)?;
    let next = payload.apply(progress.state());
    let progress = progress
        .save(mm, next)
        .await
        .map_err(db_error::<ContentProgress>)?;

    let enrollment = enrollment
        .refresh_progress(mm)
        .await
        .map_err(db_error::<Enrollment>)?;
    tracing::debug!(
        "enrollment {} at {}%",
        enrollment.id(),
        enrollment.progress_percentage()
    );

    Ok((StatusCode::OK, Json(progress)))
}

#[utoipa::path(
    get,
    path = "/api/progress/enrollment/{enrollment_id}",
    description = "Every progress row of an enrollment with totals",
    params(("enrollment_id" = Uuid, Path, description = "Enrollment id")),
    responses(
        (status = 200, description = "Enrollment progress", body = EnrollmentProgressView),
        (status = 403, description = "No access", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse),
    ),
    tag = "progress",
    security(("bearer" = []), ("cookie" = []))
)]
async fn enrollment_progress_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(enrollment_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let enrollment = load_enrollment(&state, enrollment_id).await?;
    ensure_can_view(&state, user, &enrollment).await?;

    let items = ContentProgress::list_by_enrollment(state.pool(), enrollment.id())
        .await
        .map_err(db_error::<ContentProgress>)?;
    Ok((
        StatusCode::OK,
        Json(EnrollmentProgressView::new(enrollment.id(), items)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/progress/student/{student_id}/course/{course_id}",
    description = "Completion summary of one student in one course",
    params(
        ("student_id" = Uuid, Path, description = "Student id"),
        ("course_id" = Uuid, Path, description = "Course id"),
    ),
    responses(
        (status = 200, description = "Course progress", body = CourseProgressSummary),
        (status = 403, description = "No access", body = ErrorResponse),
        (status = 404, description = "Student is not enrolled in the course", body = ErrorResponse),
    ),
    tag = "progress",
    security(("bearer" = []), ("cookie" = []))
)]
async fn course_summary_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((student_id, course_id)): Path<(Uuid, Uuid)>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let mm = state.pool();

    let enrollment = Enrollment::find_by_student_course(mm, student_id, course_id)
        .await
        .map_err(db_error::<Enrollment>)?;
    let enrollment = found(enrollment)?;
    ensure_can_view(&state, user, &enrollment).await?;

    let total = ModuleContent::count_published_in_course(mm, course_id)
        .await
        .map_err(db_error::<ModuleContent>)?;
    let completed = ContentProgress::count_completed_published(mm, enrollment.id())
        .await
        .map_err(db_error::<ContentProgress>)?;
    let items = ContentProgress::list_by_enrollment(mm, enrollment.id())
        .await
        .map_err(db_error::<ContentProgress>)?;

    Ok((
        StatusCode::OK,
        Json(CourseProgressSummary::new(student_id, course_id, total, completed, &items)),
    ))
}
