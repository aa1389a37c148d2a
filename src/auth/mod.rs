//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `SessionManager`: shared, subscribable session state with login/logout
//! - `TokenStore`: durable persistence for the bearer token
//! - the `sessionInvalidated` channel linking the request pipeline to the
//!   root logout listener
//!
//! Only the token survives restarts; the identity record is re-derived from
//! the login response.

pub mod session;
pub mod store;

pub use session::{
    invalidation_channel, InvalidationReceiver, InvalidationSender, SessionInvalidated,
    SessionManager, SessionSnapshot, UserIdentity,
};
pub use store::TokenStore;
