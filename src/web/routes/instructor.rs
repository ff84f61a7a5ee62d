use axum::{Json, Router, extract::State, http::StatusCode, middleware, response::IntoResponse, routing::get};

use crate::{
    model::{
        ResourceTyped,
        entity::{Course, EnrollmentStats, Quiz, QuizAttemptStats, round2},
    },
    web::{
        AppState, RequestContext, UserRole, WebError, WebResult,
        dto::dashboard::{CourseAnalytics, Dashboard, InstructorStats},
        error::ErrorResponse,
        middlewares,
    },
};

const INSTRUCTOR_FEATURES: [&str; 4] = [
    "Create and publish courses",
    "Build quizzes",
    "Generate interview practice",
    "Follow student progress",
];

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/dashboard", get(dashboard_handler))
        .route("/analytics", get(analytics_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

fn stat_error(e: crate::model::DatabaseError) -> WebError {
    WebError::resource_fetch_error(Course::get_resource_type(), e)
}

#[utoipa::path(
    get,
    path = "/api/instructor/dashboard",
    description = "Course, student and quiz figures of the signed in instructor",
    responses(
        (status = 200, description = "Dashboard", body = Dashboard<InstructorStats>),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Instructors only", body = ErrorResponse),
    ),
    tag = "instructor",
    security(("bearer" = []), ("cookie" = []))
)]
async fn dashboard_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let instructor = ctx.user_with_role(UserRole::Instructor)?;
    let mm = state.pool();
    let id = instructor.user_id();

    let courses = Course::list_by_instructor(mm, id).await.map_err(stat_error)?;
    let scores = QuizAttemptStats::for_instructor(mm, id)
        .await
        .map_err(stat_error)?;

    let stats = InstructorStats {
        total_courses: courses.len() as i64,
        total_students: EnrollmentStats::students_of_instructor(mm, id)
            .await
            .map_err(stat_error)?,
        total_quizzes: Quiz::count_by_instructor(mm, id).await.map_err(stat_error)?,
        average_student_score: scores.average_score.map(round2),
    };

    Ok((
        StatusCode::OK,
        Json(Dashboard::new(UserRole::Instructor, &INSTRUCTOR_FEATURES, stats)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/instructor/analytics",
    description = "Enrollment and quiz figures per course",
    responses(
        (status = 200, description = "Per course analytics", body = Vec<CourseAnalytics>),
        (status = 403, description = "Instructors only", body = ErrorResponse),
    ),
    tag = "instructor",
    security(("bearer" = []), ("cookie" = []))
)]
async fn analytics_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let instructor = ctx.user_with_role(UserRole::Instructor)?;
    let mm = state.pool();

    let courses = Course::list_by_instructor(mm, instructor.user_id())
        .await
        .map_err(stat_error)?;

    let mut analytics = Vec::with_capacity(courses.len());
    for course in courses {
        let enrollments = EnrollmentStats::for_course(mm, course.id())
            .await
            .map_err(stat_error)?;
        let quizzes = QuizAttemptStats::for_course(mm, course.id())
            .await
            .map_err(stat_error)?;

        analytics.push(CourseAnalytics {
            course_id: course.id(),
            title: course.title().to_string(),
            status: course.status(),
            enrollments: enrollments.enrollments,
            average_progress: round2(enrollments.average_progress.unwrap_or(0.0)),
            completed_quiz_attempts: quizzes.completed_attempts,
            average_quiz_score: quizzes.average_score.map(round2),
        });
    }

    Ok((StatusCode::OK, Json(analytics)))
}
