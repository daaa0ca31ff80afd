use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::clock::Clock;
use super::credentials::{CredentialStore, TOKEN_KEY};
use super::token::decode_claims;

/// Role assigned to regular (non-admin) accounts.
pub const USER_ROLE: &str = "USER";

/// Authentication status as seen by screens and route guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    /// Cold start, before the stored credential has been checked.
    Unknown,
    Authenticated,
    Unauthenticated,
}

/// Profile summary of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub status: AuthStatus,
    pub user: Option<UserSummary>,
    pub is_loading: bool,
}

impl SessionState {
    fn initial() -> Self {
        Self {
            status: AuthStatus::Unknown,
            user: None,
            is_loading: false,
        }
    }

    /// `None` while the status is still unknown.
    pub fn is_authenticated(&self) -> Option<bool> {
        match self.status {
            AuthStatus::Unknown => None,
            AuthStatus::Authenticated => Some(true),
            AuthStatus::Unauthenticated => Some(false),
        }
    }
}

/// Where a route guard should send the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Status not settled yet; show a loading state and do not redirect.
    Loading,
    Home,
    Login,
}

/// Decide the route for a session state. Never redirects while unknown.
pub fn route_for(state: &SessionState) -> RouteDecision {
    match state.status {
        AuthStatus::Unknown => RouteDecision::Loading,
        AuthStatus::Authenticated => match state.user {
            Some(ref user) if user.role == USER_ROLE => RouteDecision::Home,
            _ => RouteDecision::Login,
        },
        AuthStatus::Unauthenticated => RouteDecision::Login,
    }
}

/// Process-wide authentication state.
///
/// Clones share the same state. Every mutation goes through the single
/// watch sender, so writes are serialized and each subscriber sees the
/// latest value. The status moves `Unknown -> Authenticated | Unauthenticated`
/// and between the two settled states, but never back to `Unknown`.
#[derive(Debug, Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<SessionState>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::initial());
        Self { tx: Arc::new(tx) }
    }

    /// Current state.
    pub fn snapshot(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    pub fn status(&self) -> AuthStatus {
        self.tx.borrow().status
    }

    pub fn current_user(&self) -> Option<UserSummary> {
        self.tx.borrow().user.clone()
    }

    /// Receive every subsequent state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Mark the session authenticated for `user`.
    pub fn set_authenticated(&self, user: UserSummary) {
        info!(user_id = %user.id, role = %user.role, "Session authenticated");
        self.tx.send_modify(|state| {
            state.status = AuthStatus::Authenticated;
            state.user = Some(user);
            state.is_loading = false;
        });
    }

    pub fn set_loading(&self, is_loading: bool) {
        self.tx.send_if_modified(|state| {
            if state.is_loading == is_loading {
                return false;
            }
            state.is_loading = is_loading;
            true
        });
    }

    /// Clear the session. Safe to call repeatedly; subscribers are only
    /// notified when something actually changed.
    pub fn logout(&self) {
        let changed = self.tx.send_if_modified(|state| {
            if state.status == AuthStatus::Unauthenticated
                && state.user.is_none()
                && !state.is_loading
            {
                return false;
            }
            state.status = AuthStatus::Unauthenticated;
            state.user = None;
            state.is_loading = false;
            true
        });
        if changed {
            info!("Session cleared");
        } else {
            debug!("Session already cleared");
        }
    }
}

/// Resume a session from the stored credential at cold start.
///
/// Settles the status out of `Unknown`: a stored, unexpired token resumes
/// the session with the user from its claims; an expired or unreadable
/// token is deleted; a missing token or unavailable storage leaves the
/// session unauthenticated.
pub async fn restore_session(
    credentials: &dyn CredentialStore,
    session: &SessionStore,
    clock: &dyn Clock,
) -> AuthStatus {
    let token = match credentials.get(TOKEN_KEY).await {
        Ok(token) => token,
        Err(e) => {
            warn!(error = %e, "Failed to read stored token");
            None
        }
    };

    let Some(token) = token else {
        session.logout();
        return session.status();
    };

    match decode_claims(&token) {
        Ok(claims) if !claims.is_expired_at(clock.now()) => {
            session.set_authenticated(claims.user_summary());
        }
        _ => {
            warn!("Stored token is expired or unreadable, discarding");
            if let Err(e) = credentials.delete(TOKEN_KEY).await {
                warn!(error = %e, "Failed to delete stored token");
            }
            session.logout();
        }
    }

    session.status()
}
