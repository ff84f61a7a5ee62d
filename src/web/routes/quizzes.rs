use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch, post, put},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, ResourceTyped,
        entity::{
            AttemptStatus, ContentType, Enrollment, ModuleContent, QuestionOption, Quiz,
            QuizAttempt, QuizQuestion, QuizScore, StudentAnswer, StudentAnswerCreate,
        },
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, UserRole, WebError, WebResult,
        dto::{
            courses::PublishedQuery,
            quizzes::{AnswerBody, AttemptResultView, OptionBody, QuestionBody, QuizBody, QuizView},
        },
        error::ErrorResponse,
        middlewares,
        routes::{ensure_owner, found, owns},
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route(
            "/content/{content_id}",
            get(quiz_get_handler).post(quiz_create_handler),
        )
        .route("/{quiz_id}", put(quiz_update_handler))
        .route("/{quiz_id}/publish", patch(quiz_publish_handler))
        .route("/{quiz_id}/questions", post(question_create_handler))
        .route("/questions/{question_id}/options", post(option_create_handler))
        .route("/{quiz_id}/attempts", post(attempt_start_handler))
        .route("/{quiz_id}/attempts/my", get(my_attempts_handler))
        .route("/attempts/{attempt_id}/answers", post(attempt_answer_handler))
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

async fn load_quiz(state: &AppState, quiz_id: Uuid) -> WebResult<Quiz> {
    let quiz = Quiz::find_by_id(state.pool(), &AuthenticatedUser::admin(), quiz_id)
        .await
        .map_err(db_error::<Quiz>)?;
    found(quiz)
}

/// Attempt of the caller; attempts of other students are forbidden.
async fn load_own_attempt(
    state: &AppState,
    user: &AuthenticatedUser,
    attempt_id: Uuid,
) -> WebResult<QuizAttempt> {
    let attempt = QuizAttempt::find_by_id(state.pool(), attempt_id)
        .await
        .map_err(db_error::<QuizAttempt>)?;
    let attempt = found(attempt)?;
    if attempt.student_id() != user.user_id() {
        return Err(WebError::resource_forbidden(QuizAttempt::get_resource_type()));
    }
    Ok(attempt)
}

#[utoipa::path(
    post,
    path = "/api/quizzes/content/{content_id}",
    request_body = QuizBody,
    description = "Attaches a quiz to QUIZ content. Each content item holds at most one quiz",
    params(("content_id" = Uuid, Path, description = "Content id")),
    responses(
        (status = 201, description = "Quiz created", body = Quiz),
        (status = 400, description = "Content is not of type QUIZ or settings are invalid", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Content not found", body = ErrorResponse),
        (status = 409, description = "Content already has a quiz", body = ErrorResponse),
    ),
    tag = "quizzes",
    security(("bearer" = []), ("cookie" = []))
)]
async fn quiz_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(content_id): Path<Uuid>,
    Json(payload): Json<QuizBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let content = ModuleContent::find_by_id(state.pool(), user, content_id)
        .await
        .map_err(db_error::<ModuleContent>)?;
    let content = found(content)?;
    ensure_owner(&state, user, &content).await?;

    if content.content_type() != ContentType::Quiz {
        return Err(WebError::resource_bad_request(
            Quiz::get_resource_type(),
            "content is not of type QUIZ",
        ));
    }

    let data = payload
        .into_create_update(content.id())
        .map_err(|e| WebError::resource_bad_request(Quiz::get_resource_type(), e))?;
    let quiz = Quiz::create(state.pool(), user, data)
        .await
        .map_err(db_error::<Quiz>)?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

#[utoipa::path(
    get,
    path = "/api/quizzes/content/{content_id}",
    description = "Quiz of a content item with ordered questions and options. Correct answers and explanations are only shown to the owner",
    params(("content_id" = Uuid, Path, description = "Content id")),
    responses(
        (status = 200, description = "Quiz", body = QuizView),
        (status = 404, description = "No quiz for this content", body = ErrorResponse),
    ),
    tag = "quizzes"
)]
async fn quiz_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(content_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let quiz = Quiz::find_by_content(state.pool(), content_id)
        .await
        .map_err(db_error::<Quiz>)?;
    let quiz = found(quiz)?;

    let reveal = owns(&state, ctx.maybe_user(), &quiz).await?;
    if !quiz.is_published() && !reveal {
        return Err(WebError::resource_not_found(Quiz::get_resource_type()));
    }

    let questions = QuizQuestion::list_by_quiz(state.pool(), quiz.id())
        .await
        .map_err(db_error::<QuizQuestion>)?;
    let options = QuestionOption::list_by_quiz(state.pool(), quiz.id())
        .await
        .map_err(db_error::<QuestionOption>)?;

    Ok((
        StatusCode::OK,
        Json(QuizView::assemble(quiz, questions, options, reveal)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/quizzes/{quiz_id}",
    request_body = QuizBody,
    description = "Replaces quiz settings",
    params(("quiz_id" = Uuid, Path, description = "Quiz id")),
    responses(
        (status = 200, description = "Quiz updated", body = Quiz),
        (status = 400, description = "Invalid settings", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
    ),
    tag = "quizzes",
    security(("bearer" = []), ("cookie" = []))
)]
async fn quiz_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
    Json(payload): Json<QuizBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let quiz = load_quiz(&state, quiz_id).await?;
    ensure_owner(&state, user, &quiz).await?;

    let data = payload
        .into_create_update(quiz.module_content_id())
        .map_err(|e| WebError::resource_bad_request(Quiz::get_resource_type(), e))?;
    let updated = quiz
        .update(state.pool(), user, data)
        .await
        .map_err(db_error::<Quiz>)?;
    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    patch,
    path = "/api/quizzes/{quiz_id}/publish",
    description = "Opens or closes a quiz for students",
    params(("quiz_id" = Uuid, Path, description = "Quiz id"), PublishedQuery),
    responses(
        (status = 200, description = "Quiz updated", body = Quiz),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
    ),
    tag = "quizzes",
    security(("bearer" = []), ("cookie" = []))
)]
async fn quiz_publish_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
    Query(query): Query<PublishedQuery>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let quiz = load_quiz(&state, quiz_id).await?;
    ensure_owner(&state, user, &quiz).await?;

    let updated = quiz
        .set_published(state.pool(), user, query.published)
        .await
        .map_err(db_error::<Quiz>)?;
    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    post,
    path = "/api/quizzes/{quiz_id}/questions",
    request_body = QuestionBody,
    description = "Adds a question at the end of the quiz",
    params(("quiz_id" = Uuid, Path, description = "Quiz id")),
    responses(
        (status = 201, description = "Question created", body = QuizQuestion),
        (status = 400, description = "Missing text or points below 1", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
    ),
    tag = "quizzes",
    security(("bearer" = []), ("cookie" = []))
)]
async fn question_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
    Json(payload): Json<QuestionBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let quiz = load_quiz(&state, quiz_id).await?;
    ensure_owner(&state, user, &quiz).await?;

    let data = payload
        .into_create(quiz.id())
        .map_err(|e| WebError::resource_bad_request(QuizQuestion::get_resource_type(), e))?;
    let question = QuizQuestion::create(state.pool(), data)
        .await
        .map_err(db_error::<QuizQuestion>)?;
    Ok((StatusCode::CREATED, Json(question)))
}

#[utoipa::path(
    post,
    path = "/api/quizzes/questions/{question_id}/options",
    request_body = OptionBody,
    description = "Adds an answer option to a question",
    params(("question_id" = Uuid, Path, description = "Question id")),
    responses(
        (status = 201, description = "Option created", body = QuestionOption),
        (status = 400, description = "Missing text", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Question not found", body = ErrorResponse),
    ),
    tag = "quizzes",
    security(("bearer" = []), ("cookie" = []))
)]
async fn option_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
    Json(payload): Json<OptionBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.author()?;
    let question = QuizQuestion::find_by_id(state.pool(), question_id)
        .await
        .map_err(db_error::<QuizQuestion>)?;
    let question = found(question)?;
    ensure_owner(&state, user, &question).await?;

    let data = payload
        .into_create(question.id())
        .map_err(|e| WebError::resource_bad_request(QuestionOption::get_resource_type(), e))?;
    let option = QuestionOption::create(state.pool(), data)
        .await
        .map_err(db_error::<QuestionOption>)?;
    Ok((StatusCode::CREATED, Json(option)))
}

#[utoipa::path(
    post,
    path = "/api/quizzes/{quiz_id}/attempts",
    description = "Starts an attempt or resumes the one in progress",
    params(("quiz_id" = Uuid, Path, description = "Quiz id")),
    responses(
        (status = 200, description = "Attempt in progress", body = QuizAttempt),
        (status = 400, description = "No attempts left", body = ErrorResponse),
        (status = 403, description = "Not enrolled in the course", body = ErrorResponse),
        (status = 404, description = "Quiz not found or not published", body = ErrorResponse),
    ),
    tag = "quizzes",
    security(("bearer" = []), ("cookie" = []))
)]
#[tracing::instrument(skip(ctx, state))]
async fn attempt_start_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let student = ctx.user_with_role(UserRole::Student)?;
    let quiz = load_quiz(&state, quiz_id).await?;
    if !quiz.is_published() {
        return Err(WebError::resource_not_found(Quiz::get_resource_type()));
    }

    let mm = state.pool();
    let course_id = quiz.course_id(mm).await.map_err(db_error::<Quiz>)?;
    let enrolled = Enrollment::has_access(mm, student.user_id(), course_id)
        .await
        .map_err(db_error::<Enrollment>)?;
    if !enrolled {
        return Err(WebError::resource_payment_required(Quiz::get_resource_type()));
    }

    if let Some(open) = QuizAttempt::find_open(mm, quiz.id(), student.user_id())
        .await
        .map_err(db_error::<QuizAttempt>)?
    {
        return Ok((StatusCode::OK, Json(open)));
    }

    let used = QuizAttempt::count_for(mm, quiz.id(), student.user_id())
        .await
        .map_err(db_error::<QuizAttempt>)?;
    if used >= quiz.max_attempts() as i64 {
        return Err(WebError::resource_bad_request(
            QuizAttempt::get_resource_type(),
            format!("maximum of {} attempts reached", quiz.max_attempts()),
        ));
    }

    let attempt = match QuizAttempt::create(mm, student, quiz.id(), used as i32 + 1).await {
        Ok(attempt) => attempt,
        // a concurrent start won the race for the single open attempt
        Err(e) if e.is_unique_violation() => {
            let open = QuizAttempt::find_open(mm, quiz.id(), student.user_id())
                .await
                .map_err(db_error::<QuizAttempt>)?;
            found(open)?
        }
        Err(e) => return Err(db_error::<QuizAttempt>(e)),
    };

    tracing::info!("attempt {} started", attempt.attempt_number());
    Ok((StatusCode::OK, Json(attempt)))
}

#[utoipa::path(
    get,
    path = "/api/quizzes/{quiz_id}/attempts/my",
    description = "Attempts of the caller on this quiz, latest first",
    params(("quiz_id" = Uuid, Path, description = "Quiz id")),
    responses(
        (status = 200, description = "Attempts", body = Vec<QuizAttempt>),
        (status = 403, description = "Students only", body = ErrorResponse),
    ),
    tag = "quizzes",
    security(("bearer" = []), ("cookie" = []))
)]
async fn my_attempts_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let student = ctx.user_with_role(UserRole::Student)?;
    let attempts = QuizAttempt::list_for(state.pool(), quiz_id, student.user_id())
        .await
        .map_err(db_error::<QuizAttempt>)?;
    Ok((StatusCode::OK, Json(attempts)))
}

#[utoipa::path(
    post,
    path = "/api/quizzes/attempts/{attempt_id}/answers",
    request_body = AnswerBody,
    description = "Records or replaces the answer to one question",
    params(("attempt_id" = Uuid, Path, description = "Attempt id")),
    responses(
        (status = 200, description = "Answer stored", body = StudentAnswer),
        (status = 400, description = "Attempt closed, time is up, or question/option mismatch", body = ErrorResponse),
        (status = 403, description = "Not your attempt", body = ErrorResponse),
        (status = 404, description = "Attempt not found", body = ErrorResponse),
    ),
    tag = "quizzes",
    security(("bearer" = []), ("cookie" = []))
)]
async fn attempt_answer_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
    Json(payload): Json<AnswerBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let attempt = load_own_attempt(&state, user, attempt_id).await?;
    let bad_request = |details: &str| {
        WebError::resource_bad_request(StudentAnswer::get_resource_type(), details.to_string())
    };

    if attempt.status() != AttemptStatus::InProgress {
        return Err(bad_request("attempt is not in progress"));
    }

    let mm = state.pool();
    let quiz = load_quiz(&state, attempt.quiz_id()).await?;
    if attempt.is_expired(quiz.time_limit_minutes(), Utc::now()) {
        attempt
            .close(mm, AttemptStatus::TimedOut)
            .await
            .map_err(db_error::<QuizAttempt>)?;
        return Err(bad_request("time limit exceeded"));
    }

    let question = QuizQuestion::find_by_id(mm, payload.question_id)
        .await
        .map_err(db_error::<QuizQuestion>)?
        .filter(|q| q.quiz_id() == attempt.quiz_id())
        .ok_or_else(|| bad_request("question does not belong to this quiz"))?;

    let option = QuestionOption::find_by_id(mm, payload.selected_option_id)
        .await
        .map_err(db_error::<QuestionOption>)?
        .filter(|o| o.question_id() == question.id())
        .ok_or_else(|| bad_request("option does not belong to this question"))?;

    let answer = StudentAnswer::upsert(
        mm,
        StudentAnswerCreate {
            attempt_id: attempt.id(),
            question_id: question.id(),
            selected_option_id: option.id(),
            is_correct: option.is_correct(),
            points_earned: if option.is_correct() { question.points() } else { 0 },
        },
    )
    .await
    .map_err(db_error::<StudentAnswer>)?;

    Ok((StatusCode::OK, Json(answer)))
}

fn already_completed() -> WebError {
    WebError::resource_bad_request(QuizAttempt::get_resource_type(), "attempt is already completed")
}

#[utoipa::path(
    post,
    path = "/api/quizzes/attempts/{attempt_id}/complete",
    description = "Grades the attempt. Attempts past the time limit are graded as TIMED_OUT",
    params(("attempt_id" = Uuid, Path, description = "Attempt id")),
    responses(
        (status = 200, description = "Graded attempt", body = AttemptResultView),
        (status = 400, description = "Attempt already graded", body = ErrorResponse),
        (status = 403, description = "Not your attempt", body = ErrorResponse),
        (status = 404, description = "Attempt not found", body = ErrorResponse),
    ),
    tag = "quizzes",
    security(("bearer" = []), ("cookie" = []))
)]
#[tracing::instrument(skip(ctx, state))]
async fn attempt_complete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let attempt = load_own_attempt(&state, user, attempt_id).await?;

    let status = attempt.status();
    if attempt.is_graded() || !matches!(status, AttemptStatus::InProgress | AttemptStatus::TimedOut) {
        return Err(already_completed());
    }

    let mm = state.pool();
    let quiz = load_quiz(&state, attempt.quiz_id()).await?;
    let final_status = if status == AttemptStatus::TimedOut
        || attempt.is_expired(quiz.time_limit_minutes(), Utc::now())
    {
        AttemptStatus::TimedOut
    } else {
        AttemptStatus::Completed
    };

    let earned = StudentAnswer::earned_points(mm, attempt.id())
        .await
        .map_err(db_error::<StudentAnswer>)?;
    let total = QuizQuestion::total_points(mm, quiz.id())
        .await
        .map_err(db_error::<QuizQuestion>)?;
    let score = QuizScore::compute(earned, total, quiz.passing_score());

    // a concurrent completion may have graded it since the check above
    let graded = attempt
        .grade(mm, final_status, score)
        .await
        .map_err(db_error::<QuizAttempt>)?
        .ok_or_else(already_completed)?;
    tracing::info!("attempt graded {} ({})", score.score, final_status.as_str());

    let answers = if quiz.show_results_immediately() {
        Some(
            StudentAnswer::list_by_attempt(mm, graded.id())
                .await
                .map_err(db_error::<StudentAnswer>)?,
        )
    } else {
        None
    };

    Ok((StatusCode::OK, Json(AttemptResultView { attempt: graded, answers })))
}

