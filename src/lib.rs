//! Recetario core - client-side session and API layer for the Recetario
//! recipe-sharing application.
//!
//! This crate owns the authentication session lifecycle (token acquisition,
//! persistence, attachment, expiry-driven teardown) and the authenticated
//! request pipeline every page dispatches through. Rendering, routing and
//! the backend's own business logic live elsewhere; they talk to this crate
//! through `SessionManager`, `ApiClient` and the session snapshot stream.
//!
//! Wiring at application start:
//!
//! ```no_run
//! use recetario_core::{invalidation_channel, ApiClient, Config, SessionManager};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let session = SessionManager::new(Config::storage_dir()?);
//!
//! let (invalidated_tx, invalidated_rx) = invalidation_channel();
//! let api = ApiClient::new(&config, session.clone(), invalidated_tx)?;
//!
//! // The one root listener that turns 401s into logout()
//! let _listener = session.listen_for_invalidation(invalidated_rx);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, LoginOutcome, RecipeSearch};
pub use auth::{
    invalidation_channel, SessionInvalidated, SessionManager, SessionSnapshot, UserIdentity,
};
pub use config::Config;
pub use models::{Category, Difficulty, NewRecipe, Recipe, RecipePage};
