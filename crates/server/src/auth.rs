//! Bearer-token authentication middleware.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use db::models::user::User;
use tracing::warn;

use crate::AppState;

/// Context for authenticated requests, inserted into request extensions.
#[derive(Clone)]
pub struct RequestContext {
    pub user: User,
}

/// Validate the bearer token, load the user row and inject
/// [`RequestContext`]. Missing/invalid tokens are 401; a valid token for a
/// deactivated user is 403.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let bearer = match req.headers().typed_get::<Authorization<Bearer>>() {
        Some(Authorization(token)) => token.token().to_owned(),
        None => return StatusCode::UNAUTHORIZED.into_response(),
    };

    let user_id = match state.jwt().verify_access_token(&bearer) {
        Ok(user_id) => user_id,
        Err(error) => {
            warn!(?error, "failed to verify access token");
            return StatusCode::UNAUTHORIZED.into_response();
        }
    };

    let user = match User::find_by_id(state.pool(), user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!("user `{}` missing", user_id);
            return StatusCode::UNAUTHORIZED.into_response();
        }
        Err(error) => {
            warn!(?error, "failed to load user");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if !user.is_active {
        return StatusCode::FORBIDDEN.into_response();
    }

    req.extensions_mut().insert(RequestContext { user });
    next.run(req).await
}
