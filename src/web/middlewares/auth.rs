use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{
    auth,
    model::{CrudRepository, ResourceTyped, entity::UserEntity},
    web::{AppState, RequestContext, context::AuthenticatedUser, error::WebError},
};

pub static AUTH_TOKEN: &str = "SID";

fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Resolves the caller from `Authorization: Bearer`, falling back to the `SID` cookie.
///
/// No token means an anonymous context. A token that fails validation is rejected with 401,
/// a token of a deleted user is treated as anonymous and a disabled user gets 403.
pub async fn extract_context_fn(
    State(state): State<AppState>,
    cookies: Cookies,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let token = bearer_token(&req).or_else(|| cookies.get(AUTH_TOKEN).map(|c| c.value().to_string()));

    let Some(token) = token else {
        req.extensions_mut().insert(RequestContext::new(None));
        return Ok(next.run(req).await);
    };

    let claims = auth::process_token(&token, state.config().app().jwt())
        .map_err(|e| WebError::auth_token_invalid(e.to_string()))?
        .claims;

    let id = claims
        .user_id()
        .ok_or_else(|| WebError::auth_token_invalid("subject is not a user id"))?;

    let user = UserEntity::find_by_id(state.pool(), &AuthenticatedUser::admin(), id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    let ctx = match user {
        Some(user) if !user.is_enabled() => return Err(WebError::auth_account_disabled()),
        Some(user) => RequestContext::new(Some(AuthenticatedUser::new(id, user.role()))),
        None => RequestContext::new(None),
    };

    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}
