//! Session extraction for Axum handlers.
//!
//! - [`session::AuthSession`] -- Resolves the caller's session from a Bearer
//!   token or the session cookie, rejecting with 401 when there is none.

pub mod session;
