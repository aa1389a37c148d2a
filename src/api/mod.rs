//! REST API client module for the Recetario backend.
//!
//! This module provides the `ApiClient` used by every UI surface: it
//! decorates outbound requests with the session's bearer token and turns
//! 401 responses into `SessionInvalidated` signals for the root listener.
//!
//! The API uses JWT bearer token authentication obtained through the
//! login endpoint.

pub mod client;
pub mod error;

pub use client::{ApiClient, LoginOutcome, RecipeSearch};
pub use error::ApiError;
