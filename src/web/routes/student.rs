use axum::{Json, Router, extract::State, http::StatusCode, middleware, response::IntoResponse, routing::get};

use crate::{
    model::{
        ResourceTyped,
        entity::{Enrollment, QuizAttemptStats, StudentCourseRow},
    },
    web::{
        AppState, RequestContext, UserRole, WebError, WebResult,
        dto::dashboard::{Dashboard, StudentStats},
        error::ErrorResponse,
        middlewares,
    },
};

const STUDENT_FEATURES: [&str; 4] = [
    "Browse and enroll in courses",
    "Track your progress",
    "Take quizzes",
    "Practice interviews",
];

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/dashboard", get(dashboard_handler))
        .route("/courses", get(courses_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

fn enrollment_error(e: crate::model::DatabaseError) -> WebError {
    WebError::resource_fetch_error(Enrollment::get_resource_type(), e)
}

#[utoipa::path(
    get,
    path = "/api/student/dashboard",
    description = "Enrollment and quiz figures of the signed in student",
    responses(
        (status = 200, description = "Dashboard", body = Dashboard<StudentStats>),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Students only", body = ErrorResponse),
    ),
    tag = "student",
    security(("bearer" = []), ("cookie" = []))
)]
async fn dashboard_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let student = ctx.user_with_role(UserRole::Student)?;
    let mm = state.pool();

    let enrolled = Enrollment::count_by_student(mm, student.user_id())
        .await
        .map_err(enrollment_error)?;
    let quizzes = QuizAttemptStats::for_student(mm, student.user_id())
        .await
        .map_err(enrollment_error)?;

    let stats = StudentStats::new(enrolled, quizzes.completed_attempts, quizzes.average_score);
    Ok((
        StatusCode::OK,
        Json(Dashboard::new(UserRole::Student, &STUDENT_FEATURES, stats)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/student/courses",
    description = "Courses the student is enrolled in with payment and progress",
    responses(
        (status = 200, description = "Enrolled courses", body = Vec<StudentCourseRow>),
        (status = 403, description = "Students only", body = ErrorResponse),
    ),
    tag = "student",
    security(("bearer" = []), ("cookie" = []))
)]
async fn courses_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let student = ctx.user_with_role(UserRole::Student)?;
    let rows = StudentCourseRow::list_for_student(state.pool(), student.user_id())
        .await
        .map_err(enrollment_error)?;
    Ok((StatusCode::OK, Json(rows)))
}
