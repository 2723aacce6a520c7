//! Middleware for request processing.

pub mod auth;

pub use auth::AuthOwner;
