//! Application state shared across handlers

use crate::{cookies::SessionCookie, service::AccountService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub session_cookie: SessionCookie,
}
