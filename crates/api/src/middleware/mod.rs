//! Request middleware and extractors.

pub mod auth;
pub mod visitor;

pub use auth::{CurrentUser, RequireAdmin};
