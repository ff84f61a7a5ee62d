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
    ai::{EvaluationRequest, QuestionRequest},
    model::{
        CrudRepository, ResourceTyped,
        entity::{
            Interview, InterviewAnswer, InterviewAttempt, InterviewQuestion,
            InterviewQuestionCreate, overall_score,
        },
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, UserRole, WebError, WebResult,
        dto::{
            courses::PublishedQuery,
            interviews::{
                GenerateInterviewBody, InterviewAnswerBody, InterviewAttemptView, InterviewBody,
                InterviewView, StartedInterviewView,
            },
        },
        error::ErrorResponse,
        middlewares,
        routes::{courses::load_course, ensure_owner, found, owns},
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", post(interview_create_handler))
        .route("/generate", post(interview_generate_handler))
        .route("/course/{course_id}", get(course_interviews_handler))
        .route("/my-attempts", get(my_attempts_handler))
        .route(
            "/{interview_id}",
            get(interview_get_handler)
                .put(interview_update_handler)
                .delete(interview_delete_handler),
        )
        .route("/{interview_id}/publish", put(interview_publish_handler))
        .route("/{interview_id}/start", post(interview_start_handler))
        .route("/attempts/{attempt_id}", get(attempt_detail_handler))
        .route("/attempts/{attempt_id}/answer", post(attempt_answer_handler))
        .route("/attempts/{attempt_id}/complete", post(attempt_complete_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

fn db_error<T: ResourceTyped>(e: crate::model::DatabaseError) -> WebError {
    WebError::database(T::get_resource_type(), e)
}

async fn load_interview(state: &AppState, interview_id: Uuid) -> WebResult<Interview> {
    let interview = Interview::find_by_id(state.pool(), &AuthenticatedUser::admin(), interview_id)
        .await
        .map_err(db_error::<Interview>)?;
    found(interview)
}

async fn load_attempt(state: &AppState, attempt_id: Uuid) -> WebResult<InterviewAttempt> {
    let attempt = InterviewAttempt::find_by_id(state.pool(), attempt_id)
        .await
        .map_err(db_error::<InterviewAttempt>)?;
    found(attempt)
}

/// Open attempt of the caller.
async fn load_open_attempt(
    state: &AppState,
    user: &AuthenticatedUser,
    attempt_id: Uuid,
) -> WebResult<InterviewAttempt> {
    let attempt = load_attempt(state, attempt_id).await?;
    if attempt.student_id() != user.user_id() {
        return Err(WebError::resource_forbidden(InterviewAttempt::get_resource_type()));
    }
    if attempt.is_completed() {
        return Err(WebError::resource_bad_request(
            InterviewAttempt::get_resource_type(),
            "attempt is already completed",
        ));
    }
    Ok(attempt)
}

async fn create_with_questions(
    state: &AppState,
    data: crate::model::entity::InterviewCreateUpdate,
    questions: Vec<InterviewQuestionCreate>,
) -> WebResult<InterviewView> {
    let (interview, questions) = Interview::create_with_questions(state.pool(), data, questions)
        .await
        .map_err(db_error::<Interview>)?;
    Ok(InterviewView { interview, questions })
}

#[utoipa::path(
    post,
    path = "/api/interviews/generate",
    request_body = GenerateInterviewBody,
    description = "Generates an unpublished interview with AI written questions",
    responses(
        (status = 201, description = "Interview generated", body = InterviewView),
        (status = 400, description = "Invalid role or question count", body = ErrorResponse),
        (status = 403, description = "Not the course owner", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 502, description = "AI provider failed or returned unusable output", body = ErrorResponse),
        (status = 503, description = "AI is not configured", body = ErrorResponse),
    ),
    tag = "interviews",
    security(("bearer" = []), ("cookie" = []))
)]
#[tracing::instrument(skip_all)]
async fn interview_generate_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<GenerateInterviewBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    payload
        .validate()
        .map_err(|e| WebError::resource_bad_request(Interview::get_resource_type(), e))?;
    let course = load_course(&state, payload.course_id).await?;
    ensure_owner(&state, user, &course).await?;

    let data = payload.to_create();
    let generated = state
        .ai()
        .generate_questions(QuestionRequest {
            job_role: &data.job_role,
            difficulty: &data.difficulty,
            count: payload.number_of_questions,
            course_title: course.title(),
        })
        .await
        .map_err(WebError::from_ai)?;

    let questions = generated.into_iter().map(InterviewQuestionCreate::from).collect();
    let view = create_with_questions(&state, data, questions).await?;

    tracing::info!(
        "generated {} questions for interview {}",
        view.questions.len(),
        view.interview.id()
    );
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    post,
    path = "/api/interviews",
    request_body = InterviewBody,
    description = "Creates an unpublished interview with hand written questions",
    responses(
        (status = 201, description = "Interview created", body = InterviewView),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 403, description = "Not the course owner", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "interviews",
    security(("bearer" = []), ("cookie" = []))
)]
async fn interview_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<InterviewBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let course = load_course(&state, payload.course_id).await?;
    ensure_owner(&state, user, &course).await?;

    let (data, questions) = payload
        .into_parts()
        .map_err(|e| WebError::resource_bad_request(Interview::get_resource_type(), e))?;
    let view = create_with_questions(&state, data, questions).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    get,
    path = "/api/interviews/course/{course_id}",
    description = "Interviews of a course. Only the owner sees unpublished ones",
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Interviews", body = Vec<Interview>),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "interviews"
)]
async fn course_interviews_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let course = load_course(&state, course_id).await?;
    let all = owns(&state, ctx.maybe_user(), &course).await?;

    let interviews = Interview::list_by_course(state.pool(), course.id(), !all)
        .await
        .map_err(db_error::<Interview>)?;
    Ok((StatusCode::OK, Json(interviews)))
}

#[utoipa::path(
    get,
    path = "/api/interviews/{interview_id}",
    description = "Interview with its questions. Sample answers and key points are only shown to the owner",
    params(("interview_id" = Uuid, Path, description = "Interview id")),
    responses(
        (status = 200, description = "Interview", body = InterviewView),
        (status = 404, description = "Interview not found or not published", body = ErrorResponse),
    ),
    tag = "interviews"
)]
async fn interview_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let interview = load_interview(&state, interview_id).await?;
    let owner = owns(&state, ctx.maybe_user(), &interview).await?;
    if !interview.is_published() && !owner {
        return Err(WebError::resource_not_found(Interview::get_resource_type()));
    }

    let mut questions = InterviewQuestion::list_by_interview(state.pool(), interview.id())
        .await
        .map_err(db_error::<InterviewQuestion>)?;
    if !owner {
        questions = questions.into_iter().map(InterviewQuestion::without_answer).collect();
    }

    Ok((StatusCode::OK, Json(InterviewView { interview, questions })))
}

#[utoipa::path(
    put,
    path = "/api/interviews/{interview_id}",
    request_body = InterviewBody,
    description = "Updates interview settings. Questions in the body are ignored",
    params(("interview_id" = Uuid, Path, description = "Interview id")),
    responses(
        (status = 200, description = "Interview updated", body = Interview),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Interview not found", body = ErrorResponse),
    ),
    tag = "interviews",
    security(("bearer" = []), ("cookie" = []))
)]
async fn interview_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
    Json(payload): Json<InterviewBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let interview = load_interview(&state, interview_id).await?;
    ensure_owner(&state, user, &interview).await?;

    let (data, _) = payload
        .into_parts()
        .map_err(|e| WebError::resource_bad_request(Interview::get_resource_type(), e))?;
    let updated = interview
        .update(state.pool(), user, data)
        .await
        .map_err(db_error::<Interview>)?;
    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    put,
    path = "/api/interviews/{interview_id}/publish",
    description = "Opens or closes an interview for students",
    params(("interview_id" = Uuid, Path, description = "Interview id"), PublishedQuery),
    responses(
        (status = 200, description = "Interview updated", body = Interview),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Interview not found", body = ErrorResponse),
    ),
    tag = "interviews",
    security(("bearer" = []), ("cookie" = []))
)]
async fn interview_publish_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
    Query(query): Query<PublishedQuery>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let interview = load_interview(&state, interview_id).await?;
    ensure_owner(&state, user, &interview).await?;

    let updated = interview
        .set_published(state.pool(), user, query.published)
        .await
        .map_err(db_error::<Interview>)?;
    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/interviews/{interview_id}",
    description = "Deletes an interview with its questions and attempts",
    params(("interview_id" = Uuid, Path, description = "Interview id")),
    responses(
        (status = 200, description = "Interview deleted"),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Interview not found", body = ErrorResponse),
    ),
    tag = "interviews",
    security(("bearer" = []), ("cookie" = []))
)]
async fn interview_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let interview = load_interview(&state, interview_id).await?;
    ensure_owner(&state, user, &interview).await?;

    interview
        .delete(state.pool(), user)
        .await
        .map_err(db_error::<Interview>)?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/api/interviews/{interview_id}/start",
    description = "Starts a practice attempt. Questions come without sample answers",
    params(("interview_id" = Uuid, Path, description = "Interview id")),
    responses(
        (status = 201, description = "Attempt started", body = StartedInterviewView),
        (status = 403, description = "Students only", body = ErrorResponse),
        (status = 404, description = "Interview not found or not published", body = ErrorResponse),
    ),
    tag = "interviews",
    security(("bearer" = []), ("cookie" = []))
)]
async fn interview_start_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let student = ctx.user_with_role(UserRole::Student)?;
    let interview = load_interview(&state, interview_id).await?;
    if !interview.is_published() {
        return Err(WebError::resource_not_found(Interview::get_resource_type()));
    }

    let questions = InterviewQuestion::list_by_interview(state.pool(), interview.id())
        .await
        .map_err(db_error::<InterviewQuestion>)?;
    let attempt = InterviewAttempt::create(state.pool(), student, interview.id(), questions.len() as i32)
        .await
        .map_err(db_error::<InterviewAttempt>)?;

    let questions = questions.into_iter().map(InterviewQuestion::without_answer).collect();
    Ok((StatusCode::CREATED, Json(StartedInterviewView { attempt, questions })))
}

#[utoipa::path(
    post,
    path = "/api/interviews/attempts/{attempt_id}/answer",
    request_body = InterviewAnswerBody,
    description = "Evaluates and stores an answer, replacing an earlier answer to the same question",
    params(("attempt_id" = Uuid, Path, description = "Attempt id")),
    responses(
        (status = 200, description = "Evaluated answer", body = InterviewAnswer),
        (status = 400, description = "Attempt completed or question of another interview", body = ErrorResponse),
        (status = 403, description = "Not your attempt", body = ErrorResponse),
        (status = 404, description = "Attempt not found", body = ErrorResponse),
    ),
    tag = "interviews",
    security(("bearer" = []), ("cookie" = []))
)]
async fn attempt_answer_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
    Json(payload): Json<InterviewAnswerBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let attempt = load_open_attempt(&state, user, attempt_id).await?;

    let question = InterviewQuestion::find_by_id(state.pool(), payload.question_id)
        .await
        .map_err(db_error::<InterviewQuestion>)?
        .filter(|q| q.interview_id() == attempt.interview_id())
        .ok_or_else(|| {
            WebError::resource_bad_request(
                InterviewAnswer::get_resource_type(),
                "question does not belong to this interview",
            )
        })?;

    let evaluation = state
        .ai()
        .evaluate_answer(EvaluationRequest {
            question: question.question(),
            sample_answer: question.sample_answer(),
            key_points: question.key_points(),
            answer: &payload.answer,
        })
        .await;

    let answer = InterviewAnswer::upsert(
        state.pool(),
        attempt.id(),
        question.id(),
        &payload.answer,
        &evaluation,
    )
    .await
    .map_err(db_error::<InterviewAnswer>)?;
    Ok((StatusCode::OK, Json(answer)))
}

#[utoipa::path(
    post,
    path = "/api/interviews/attempts/{attempt_id}/complete",
    description = "Closes the attempt with the mean score of its answers",
    params(("attempt_id" = Uuid, Path, description = "Attempt id")),
    responses(
        (status = 200, description = "Completed attempt", body = InterviewAttemptView),
        (status = 400, description = "Attempt already completed", body = ErrorResponse),
        (status = 403, description = "Not your attempt", body = ErrorResponse),
        (status = 404, description = "Attempt not found", body = ErrorResponse),
    ),
    tag = "interviews",
    security(("bearer" = []), ("cookie" = []))
)]
async fn attempt_complete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let attempt = load_open_attempt(&state, user, attempt_id).await?;

    let answers = InterviewAnswer::list_by_attempt(state.pool(), attempt.id())
        .await
        .map_err(db_error::<InterviewAnswer>)?;
    let scores: Vec<i32> = answers.iter().map(InterviewAnswer::ai_score).collect();

    let attempt = attempt
        .complete(state.pool(), overall_score(&scores))
        .await
        .map_err(db_error::<InterviewAttempt>)?;
    Ok((StatusCode::OK, Json(InterviewAttemptView { attempt, answers })))
}

#[utoipa::path(
    get,
    path = "/api/interviews/my-attempts",
    description = "Interview attempts of the caller, latest first",
    responses(
        (status = 200, description = "Attempts", body = Vec<InterviewAttempt>),
        (status = 403, description = "Students only", body = ErrorResponse),
    ),
    tag = "interviews",
    security(("bearer" = []), ("cookie" = []))
)]
async fn my_attempts_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let student = ctx.user_with_role(UserRole::Student)?;
    let attempts = InterviewAttempt::list_by_student(state.pool(), student.user_id())
        .await
        .map_err(db_error::<InterviewAttempt>)?;
    Ok((StatusCode::OK, Json(attempts)))
}

#[utoipa::path(
    get,
    path = "/api/interviews/attempts/{attempt_id}",
    description = "Attempt with evaluated answers, for the student, the course owner and admins",
    params(("attempt_id" = Uuid, Path, description = "Attempt id")),
    responses(
        (status = 200, description = "Attempt", body = InterviewAttemptView),
        (status = 403, description = "No access", body = ErrorResponse),
        (status = 404, description = "Attempt not found", body = ErrorResponse),
    ),
    tag = "interviews",
    security(("bearer" = []), ("cookie" = []))
)]
async fn attempt_detail_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let attempt = load_attempt(&state, attempt_id).await?;

    if attempt.student_id() != user.user_id() {
        let interview = load_interview(&state, attempt.interview_id()).await?;
        ensure_owner(&state, user, &interview).await?;
    }

    let answers = InterviewAnswer::list_by_attempt(state.pool(), attempt.id())
        .await
        .map_err(db_error::<InterviewAnswer>)?;
    Ok((StatusCode::OK, Json(InterviewAttemptView { attempt, answers })))
}
