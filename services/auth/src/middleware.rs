//! Middleware for cookie-based session authentication

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::{error::AuthError, state::AppState};

/// Resolve and renew the caller's session.
///
/// On success the [`Session`](crate::models::Session) is placed in the
/// request extensions and the cookie is re-issued so its max-age rolls
/// with the session.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = state
        .session_cookie
        .token(&jar)
        .ok_or(AuthError::AuthenticationRequired)?;

    let session = state
        .accounts
        .sessions()
        .touch(&token)
        .await?
        .ok_or_else(|| {
            debug!("Rejected request with unknown or expired session");
            AuthError::AuthenticationRequired
        })?;

    let cookie = state.session_cookie.issue(&session.token);
    req.extensions_mut().insert(session);

    let response = next.run(req).await;
    Ok((jar.add(cookie), response).into_response())
}
