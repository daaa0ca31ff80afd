//! Authentication module for managing the bearer token and session state.
//!
//! This module provides:
//! - `CredentialStore`: durable storage for the bearer token (OS keychain or memory)
//! - `token`: offline decoding of the token's claims and the expiry check
//! - `SessionStore`: process-wide, observable authentication state
//! - `Clock`: injectable wall-clock used by the expiry check
//!
//! Tokens are issued by the backend on login and stored under [`TOKEN_KEY`].
//! Expiry is checked lazily before every outgoing request; there is no
//! background timer, so an idle session only ends on the next request.

pub mod clock;
pub mod credentials;
pub mod session;
pub mod token;

pub use clock::{Clock, SystemClock};
pub use credentials::{
    CredentialError, CredentialStore, KeyringCredentialStore, MemoryCredentialStore, TOKEN_KEY,
};
pub use session::{restore_session, route_for, AuthStatus, RouteDecision, SessionState, SessionStore, UserSummary};
pub use token::{decode_claims, is_expired, TokenClaims, TokenError};
