//! Session state management.
//!
//! `SessionManager` is the single source of truth for who is logged in.
//! It owns the bearer token and the identity record from the login
//! response, persists the token across restarts, and broadcasts every
//! state transition to subscribers through a watch channel.
//!
//! The token is treated as an opaque credential. It is never decoded or
//! validated client-side; the identity comes from the login payload.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use super::TokenStore;

/// Identity of the logged-in user, as returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Point-in-time view of the session, delivered to subscribers.
///
/// A session restored from a previous run carries a token but no identity:
/// the login response is the only source of `user`, and nothing re-fetches
/// it on startup. Callers that need the identity after a restart must fetch
/// the profile themselves.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSnapshot {
    pub token: Option<String>,
    pub user: Option<UserIdentity>,
}

impl SessionSnapshot {
    /// A session is authenticated exactly when it holds a token.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Signal published by the request pipeline when the server rejects the
/// session credential with a 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionInvalidated;

pub type InvalidationSender = mpsc::UnboundedSender<SessionInvalidated>;
pub type InvalidationReceiver = mpsc::UnboundedReceiver<SessionInvalidated>;

/// Create the channel the request pipeline publishes expiry signals on.
///
/// The sender half is handed to `ApiClient` at construction. The receiver
/// half must reach exactly one [`SessionManager::listen_for_invalidation`]
/// call owned by the application root; the single-consumer channel makes a
/// second listener impossible rather than merely discouraged.
pub fn invalidation_channel() -> (InvalidationSender, InvalidationReceiver) {
    mpsc::unbounded_channel()
}

/// Shared handle to the session. Clone is cheap; all clones observe the
/// same state.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    store: TokenStore,
    // The watch channel doubles as the state cell: send_replace commits the
    // new snapshot before returning, so a read immediately after login or
    // logout always observes the transition.
    changes: watch::Sender<SessionSnapshot>,
}

impl SessionManager {
    /// Create a session manager, hydrating from a token saved by a prior run.
    ///
    /// Storage problems are not fatal: the session starts unauthenticated
    /// and simply will not survive restarts.
    pub fn new(storage_dir: PathBuf) -> Self {
        let store = TokenStore::new(storage_dir);
        let token = match store.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Could not read persisted token, starting unauthenticated");
                None
            }
        };
        let state = SessionSnapshot { token, user: None };
        let (changes, _) = watch::channel(state);
        Self {
            inner: Arc::new(SessionInner { store, changes }),
        }
    }

    /// Establish a session from a `(user, token)` pair already obtained from
    /// the login endpoint.
    ///
    /// Persists the token, then commits the in-memory state. The pair is
    /// trusted as-is; overlapping logins resolve last-write-wins.
    pub fn login(&self, user: UserIdentity, token: String) {
        if let Err(e) = self.inner.store.save(&token) {
            warn!(error = %e, "Could not persist token, session will not survive restart");
        }
        info!(username = %user.username, "Session established");
        self.inner.changes.send_replace(SessionSnapshot {
            token: Some(token),
            user: Some(user),
        });
    }

    /// Tear down the session: remove the persisted token and clear the
    /// in-memory state. Idempotent.
    pub fn logout(&self) {
        if let Err(e) = self.inner.store.clear() {
            warn!(error = %e, "Could not remove persisted token");
        }
        info!("Session cleared");
        self.inner.changes.send_replace(SessionSnapshot::default());
    }

    /// Current session state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.changes.borrow().clone()
    }

    /// The bearer token, if a session is established.
    pub fn token(&self) -> Option<String> {
        self.inner.changes.borrow().token.clone()
    }

    /// The logged-in identity. Absent after restart hydration even when a
    /// token is present.
    pub fn user(&self) -> Option<UserIdentity> {
        self.inner.changes.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.changes.borrow().token.is_some()
    }

    /// Subscribe to session transitions. Every login and logout produces a
    /// new snapshot on the returned receiver.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.changes.subscribe()
    }

    /// Spawn the root listener that turns each invalidation signal into a
    /// `logout()` call.
    ///
    /// The receiver is consumed, so only one listener can exist per channel.
    /// The task ends when every sender has been dropped.
    pub fn listen_for_invalidation(
        &self,
        mut rx: InvalidationReceiver,
    ) -> tokio::task::JoinHandle<()> {
        let session = self.clone();
        tokio::spawn(async move {
            while rx.recv().await.is_some() {
                warn!("Server invalidated the session, logging out");
                session.logout();
            }
        })
    }
}
