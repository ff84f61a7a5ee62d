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
        entity::{Course, CourseCatalogRow, CourseEnrollmentRow, CourseStatus, Enrollment},
    },
    web::{
        AppState, RequestContext, UserRole, WebError, WebResult,
        dto::courses::{CourseCreateBody, CourseUpdateBody, PublishQuery},
        error::ErrorResponse,
        middlewares,
        routes::{ensure_owner, found, owns},
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", post(course_create_handler))
        .route("/public", get(public_list_handler))
        .route("/public/instructor/{instructor_id}", get(public_by_instructor_handler))
        .route("/instructor", get(my_courses_handler))
        .route(
            "/{course_id}",
            get(course_get_handler)
                .put(course_update_handler)
                .delete(course_delete_handler),
        )
        .route("/{course_id}/publish", put(course_publish_handler))
        .route("/{course_id}/enroll", post(course_enroll_handler))
        .route("/{course_id}/enrollments", get(course_enrollments_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

fn course_error(e: crate::model::DatabaseError) -> WebError {
    WebError::database(Course::get_resource_type(), e)
}

pub(crate) async fn load_course(state: &AppState, course_id: Uuid) -> WebResult<Course> {
    let course = Course::find_by_id(state.pool(), &crate::web::AuthenticatedUser::admin(), course_id)
        .await
        .map_err(course_error)?;
    found(course)
}

#[utoipa::path(
    get,
    path = "/api/courses/public",
    description = "Published courses with instructor summary, newest first",
    responses(
        (status = 200, description = "Catalogue", body = Vec<CourseCatalogRow>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses"
)]
async fn public_list_handler(State(state): State<AppState>) -> WebResult<impl IntoResponse> {
    let courses = CourseCatalogRow::list_published(state.pool())
        .await
        .map_err(course_error)?;
    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    get,
    path = "/api/courses/public/instructor/{instructor_id}",
    description = "Published courses of one instructor",
    params(("instructor_id" = Uuid, Path, description = "Instructor id")),
    responses(
        (status = 200, description = "Courses", body = Vec<CourseCatalogRow>),
    ),
    tag = "courses"
)]
async fn public_by_instructor_handler(
    State(state): State<AppState>,
    Path(instructor_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let courses = CourseCatalogRow::list_published_by_instructor(state.pool(), instructor_id)
        .await
        .map_err(course_error)?;
    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    get,
    path = "/api/courses/instructor",
    description = "Every course of the signed in instructor, any status",
    responses(
        (status = 200, description = "Courses", body = Vec<Course>),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Instructors only", body = ErrorResponse),
    ),
    tag = "courses",
    security(("bearer" = []), ("cookie" = []))
)]
async fn my_courses_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let instructor = ctx.user_with_role(UserRole::Instructor)?;
    let courses = Course::list_by_instructor(state.pool(), instructor.user_id())
        .await
        .map_err(course_error)?;
    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    get,
    path = "/api/courses/{course_id}",
    description = "A published course, or any course of the caller. Drafts of others are reported as missing",
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course", body = Course),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "courses"
)]
async fn course_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let course = load_course(&state, course_id).await?;

    if !course.is_published() && !owns(&state, ctx.maybe_user(), &course).await? {
        return Err(WebError::resource_not_found(Course::get_resource_type()));
    }

    Ok((StatusCode::OK, Json(course)))
}

#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CourseCreateBody,
    description = "Creates a draft course owned by the caller",
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Missing title or negative price", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Instructors only", body = ErrorResponse),
    ),
    tag = "courses",
    security(("bearer" = []), ("cookie" = []))
)]
#[tracing::instrument(skip_all)]
async fn course_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<CourseCreateBody>,
) -> WebResult<impl IntoResponse> {
    let instructor = ctx.user_with_role(UserRole::Instructor)?;
    let data = payload
        .into_create()
        .map_err(|e| WebError::resource_bad_request(Course::get_resource_type(), e))?;

    let course = Course::create(state.pool(), instructor, data)
        .await
        .map_err(course_error)?;

    tracing::info!("course {} created by {}", course.id(), instructor.user_id());
    Ok((StatusCode::CREATED, Json(course)))
}

#[utoipa::path(
    put,
    path = "/api/courses/{course_id}",
    request_body = CourseUpdateBody,
    description = "Partial update of a course",
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "courses",
    security(("bearer" = []), ("cookie" = []))
)]
async fn course_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<CourseUpdateBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let course = load_course(&state, course_id).await?;
    ensure_owner(&state, user, &course).await?;

    let data = payload
        .apply(course.to_create_update())
        .map_err(|e| WebError::resource_bad_request(Course::get_resource_type(), e))?;

    let updated = course
        .update(state.pool(), user, data)
        .await
        .map_err(course_error)?;
    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/courses/{course_id}",
    description = "Deletes a course with its modules, content, videos, interviews and enrollments",
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course deleted"),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "courses",
    security(("bearer" = []), ("cookie" = []))
)]
#[tracing::instrument(skip(ctx, state))]
async fn course_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let course = load_course(&state, course_id).await?;
    ensure_owner(&state, user, &course).await?;

    course.delete(state.pool(), user).await.map_err(course_error)?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    put,
    path = "/api/courses/{course_id}/publish",
    description = "Publishes a course or returns it to draft",
    params(("course_id" = Uuid, Path, description = "Course id"), PublishQuery),
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "courses",
    security(("bearer" = []), ("cookie" = []))
)]
async fn course_publish_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Query(query): Query<PublishQuery>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let course = load_course(&state, course_id).await?;
    ensure_owner(&state, user, &course).await?;

    let status = if query.publish {
        CourseStatus::Published
    } else {
        CourseStatus::Draft
    };
    let updated = course
        .set_status(state.pool(), user, status)
        .await
        .map_err(course_error)?;
    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    post,
    path = "/api/courses/{course_id}/enroll",
    description = "Enrolls the signed in student, recording payment of the course price",
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 201, description = "Enrolled", body = Enrollment),
        (status = 403, description = "Students only", body = ErrorResponse),
        (status = 404, description = "Course not found or not published", body = ErrorResponse),
        (status = 409, description = "Already enrolled", body = ErrorResponse),
    ),
    tag = "courses",
    security(("bearer" = []), ("cookie" = []))
)]
#[tracing::instrument(skip(ctx, state))]
async fn course_enroll_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let student = ctx.user_with_role(UserRole::Student)?;
    let course = load_course(&state, course_id).await?;
    if !course.is_published() {
        return Err(WebError::resource_not_found(Course::get_resource_type()));
    }

    let enrollment = Enrollment::create(state.pool(), student, course.id(), course.price_cents())
        .await
        .map_err(|e| WebError::database(Enrollment::get_resource_type(), e))?;

    tracing::info!("student {} enrolled in {}", student.user_id(), course.id());
    Ok((StatusCode::CREATED, Json(enrollment)))
}

#[utoipa::path(
    get,
    path = "/api/courses/{course_id}/enrollments",
    description = "Students enrolled in the course with their progress",
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Enrollments", body = Vec<CourseEnrollmentRow>),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "courses",
    security(("bearer" = []), ("cookie" = []))
)]
async fn course_enrollments_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let course = load_course(&state, course_id).await?;
    ensure_owner(&state, user, &course).await?;

    let rows = CourseEnrollmentRow::list_for_course(state.pool(), course.id())
        .await
        .map_err(|e| WebError::database(Enrollment::get_resource_type(), e))?;
    Ok((StatusCode::OK, Json(rows)))
}
