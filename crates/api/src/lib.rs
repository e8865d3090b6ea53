//! Portfolio server library.
//!
//! Exposes the building blocks (config, state, error handling, the dashboard
//! form and list view, routes) so integration tests and the binary entrypoint
//! can both access them.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod views;
