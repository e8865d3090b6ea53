//! Domain types for the portfolio service.
//!
//! - [`project`] -- the project record, its wire DTOs and the form validation schema.
//! - [`showcase`] -- technology filtering for the public page.

pub mod error;
pub mod project;
pub mod showcase;
pub mod types;
