//! Authentication service models

pub mod account;
pub mod session;

pub use account::{Account, AccountProfile, NewAccount};
pub use session::Session;
