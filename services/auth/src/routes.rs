//! Authentication service routes

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::AuthError,
    middleware::require_session,
    models::{Account, AccountProfile, Session},
    state::AppState,
};

/// Request for account registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Account as returned after registration
#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for RegisteredUser {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            created_at: account.created_at,
        }
    }
}

/// Account as returned after login
#[derive(Debug, Serialize)]
pub struct LoggedInUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(rename = "lastLogin")]
    pub last_login: Option<DateTime<Utc>>,
}

impl From<&Account> for LoggedInUser {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            last_login: account.last_login,
        }
    }
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/profile", get(profile))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let timestamp = Utc::now().to_rfc3339();

    if state.accounts.store().health_check().await {
        (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected",
                "timestamp": timestamp,
            })),
        )
    } else {
        warn!("Health check failed: database unreachable");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "database": "disconnected",
                "timestamp": timestamp,
            })),
        )
    }
}

/// Account registration endpoint
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let registered = state
        .accounts
        .register(&payload.username, &payload.email, &payload.password)
        .await?;

    let jar = jar.add(state.session_cookie.issue(&registered.session.token));

    Ok((
        StatusCode::CREATED,
        jar,
        Json(json!({
            "message": "User registered successfully",
            "user": RegisteredUser::from(&registered.account),
        })),
    ))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let authenticated = state
        .accounts
        .authenticate(&payload.username, &payload.password)
        .await?;

    let jar = jar.add(state.session_cookie.issue(&authenticated.session.token));

    Ok((
        StatusCode::OK,
        jar,
        Json(json!({
            "message": "Login successful",
            "user": LoggedInUser::from(&authenticated.account),
        })),
    ))
}

/// Logout endpoint
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthError> {
    if let Some(token) = state.session_cookie.token(&jar) {
        state.accounts.sessions().destroy(&token).await?;
        info!("User logged out");
    }

    Ok((
        StatusCode::OK,
        state.session_cookie.clear(jar),
        Json(json!({ "message": "Logout successful" })),
    ))
}

/// Profile of the signed-in account
pub async fn profile(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, AuthError> {
    let profile = state.accounts.get_profile(session.account_id).await?;

    Ok(Json(json!({
        "user": AccountProfile::from(&profile.account),
        "stats": { "total_users": profile.total_accounts },
    })))
}
