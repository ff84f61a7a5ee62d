use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use tower_cookies::{Cookie, Cookies, cookie::SameSite};

use crate::{
    auth::{self, UserClaims, hash_password, verify_password},
    model::{
        CrudRepository, ResourceTyped,
        entity::{UserEntity, UserEntityCreateUpdate},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::auth::{AuthResponse, LoginBody, RegisterBody, normalize_email},
        error::ErrorResponse,
        middlewares::{self, AUTH_TOKEN},
        routes::found,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    let protected = Router::new()
        .route("/me", get(me_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ));

    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .merge(protected)
        .with_state(state)
}

/// Signs a token for `user` and mirrors it into the `SID` cookie.
fn issue_token(state: &AppState, cookies: &Cookies, user: &UserEntity) -> WebResult<String> {
    let app = state.config().app();
    let claims = UserClaims::new(user.id(), user.role(), user.email(), app.token_ttl());
    let token = auth::generate_token(claims, app.jwt())
        .map_err(|e| WebError::server_crypt_error(e.into()))?;

    let mut cookie = Cookie::new(AUTH_TOKEN, token.clone());
    cookie.set_same_site(SameSite::Lax);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookies.add(cookie);

    Ok(token)
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterBody,
    description = "Creates a student or instructor account and signs it in",
    responses(
        (status = 200, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid email, short password or admin role requested", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[tracing::instrument(skip_all)]
async fn register_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<RegisterBody>,
) -> WebResult<impl IntoResponse> {
    let role = payload.validate().map_err(WebError::registration_invalid)?;
    let email = normalize_email(&payload.email);

    let admin = AuthenticatedUser::admin();
    let existing = UserEntity::find_by_email(state.pool(), &admin, &email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    if existing.is_some() {
        return Err(WebError::registration_conflict());
    }

    let hash = hash_password(&payload.password).map_err(WebError::server_crypt_error)?;
    let data = UserEntityCreateUpdate {
        email,
        password_hash: hash,
        first_name: payload.first_name.trim().to_string(),
        last_name: payload.last_name.trim().to_string(),
        role,
    };

    let created = UserEntity::create(state.pool(), &admin, data)
        .await
        .map_err(|e| match e {
            e if e.is_unique_violation() => WebError::registration_conflict(),
            e => WebError::resource_fetch_error(UserEntity::get_resource_type(), e),
        })?;

    tracing::info!("registered {} {}", created.role(), created.email());
    let token = issue_token(&state, &cookies, &created)?;

    Ok((StatusCode::OK, Json(AuthResponse { token, user: created })))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginBody,
    description = "Exchanges credentials for a token",
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Unknown email or wrong password", body = ErrorResponse),
        (status = 403, description = "Account is disabled", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[tracing::instrument(skip_all)]
async fn login_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<LoginBody>,
) -> WebResult<impl IntoResponse> {
    let admin = AuthenticatedUser::admin();
    let user = UserEntity::find_by_email(state.pool(), &admin, &normalize_email(&payload.email))
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(WebError::auth_invalid_credentials)?;

    let is_verified =
        verify_password(user.hash(), &payload.password).map_err(WebError::server_crypt_error)?;

    if !is_verified {
        return Err(WebError::auth_invalid_credentials());
    }

    if !user.is_enabled() {
        return Err(WebError::auth_account_disabled());
    }

    let token = issue_token(&state, &cookies, &user)?;
    Ok((StatusCode::OK, Json(AuthResponse { token, user })))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    description = "Returns the signed in user",
    responses(
        (status = 200, description = "Current user", body = UserEntity),
        (status = 401, description = "Not signed in", body = ErrorResponse),
    ),
    tag = "auth",
    security(("bearer" = []), ("cookie" = []))
)]
async fn me_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let me = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(found(me)?)))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    description = "Clears the session cookie",
    responses(
        (status = 200, description = "Signed out"),
    ),
    tag = "auth"
)]
async fn logout_handler(cookies: Cookies) -> impl IntoResponse {
    let mut cookie = Cookie::from(AUTH_TOKEN);
    cookie.set_path("/");
    cookies.remove(cookie);
    StatusCode::OK
}
