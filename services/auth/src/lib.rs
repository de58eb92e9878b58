//! Username/password authentication service
//!
//! Accounts live in a credential store with case-insensitive unique
//! usernames and emails; successful registration or login opens a
//! cookie-carried session with a rolling expiry.

use std::sync::Arc;

use chrono::Duration;

pub mod config;
pub mod cookies;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repositories;
pub mod routes;
pub mod service;
pub mod session;
pub mod state;
pub mod validation;

use crate::{
    config::Settings,
    cookies::SessionCookie,
    error::AuthResult,
    password::PasswordHasher,
    repositories::CredentialStore,
    service::AccountService,
    session::{SessionManager, SessionStore},
};

pub use routes::create_router;
pub use state::AppState;

/// Wire the service components over the given stores
pub fn build_state(
    settings: &Settings,
    credential_store: Arc<dyn CredentialStore>,
    session_store: Arc<dyn SessionStore>,
) -> AuthResult<AppState> {
    let ttl = Duration::seconds(settings.session.ttl_seconds);

    let hasher = PasswordHasher::new(&settings.password)?;
    let sessions = SessionManager::new(session_store, ttl);
    let accounts = AccountService::new(credential_store, hasher, sessions);
    let session_cookie = SessionCookie::new(
        settings.session.cookie_name.clone(),
        settings.is_production(),
        ttl,
    );

    Ok(AppState {
        accounts,
        session_cookie,
    })
}
