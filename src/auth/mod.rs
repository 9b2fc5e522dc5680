//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Email/password registration and login
//! - JWT access/refresh token issuance and validation
//! - Google/GitHub OAuth login and account linking
//! - AuthedUser extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod oauth;
pub mod password;
pub mod routes;
pub mod store;
pub mod token;
pub mod validators;

#[cfg(test)]
mod tests;

pub use extractors::{AuthedUser, MaybeAuthedUser};
pub use models::User;
pub use routes::auth_routes;
