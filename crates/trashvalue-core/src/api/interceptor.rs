//! Session policy applied around every request.
//!
//! Before a request goes out, `enforce_session_validity` decides whether the
//! stored token may be attached and clears an expired one. After it returns,
//! `handle_response` clears the session on a 401 and normalizes error bodies.
//! Both may clear the credential store and the session concurrently from
//! several in-flight requests; every step is idempotent, so the end state
//! (no token, unauthenticated) is the same under any interleaving.

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::StatusCode;
use tracing::{debug, warn};

use super::transport::HttpResponse;
use super::{ApiError, ApiResult};
use crate::auth::{is_expired, Clock, CredentialStore, SessionStore, TOKEN_KEY};

/// Delete the stored token and clear the session.
///
/// A failed delete is logged but not raised; the session is cleared either way.
pub async fn invalidate_session(credentials: &dyn CredentialStore, session: &SessionStore) {
    if let Err(e) = credentials.delete(TOKEN_KEY).await {
        warn!(error = %e, "Failed to delete stored token");
    }
    session.logout();
}

/// Prepare the authorization headers for an outgoing request.
///
/// Returns an empty header set when there is no usable token. An expired
/// token is deleted and the session cleared before returning; the request
/// then goes out unauthenticated. Never fails: unreadable storage is
/// treated as "no token".
pub async fn enforce_session_validity(
    session: &SessionStore,
    credentials: &dyn CredentialStore,
    clock: &dyn Clock,
) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let token = match credentials.get(TOKEN_KEY).await {
        Ok(token) => token,
        Err(e) => {
            warn!(error = %e, "Credential storage unavailable, sending request without token");
            None
        }
    };

    let Some(token) = token else {
        return headers;
    };

    if is_expired(&token, clock.now()) {
        warn!("Stored token expired, clearing session");
        invalidate_session(credentials, session).await;
        return headers;
    }

    match HeaderValue::from_str(&format!("Bearer {}", token)) {
        Ok(mut value) => {
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }
        Err(e) => {
            // Only possible for a token with characters that are not legal in a header
            warn!(error = %e, "Stored token is not a valid header value, clearing session");
            invalidate_session(credentials, session).await;
        }
    }

    headers
}

/// Apply the response policy to a completed exchange.
///
/// Success passes through unchanged. A 401 clears the stored token and the
/// session before the failure is returned to the caller. Every failure body
/// carrying a `message` is surfaced as that message. Transport errors are
/// propagated as-is.
pub async fn handle_response(
    outcome: ApiResult<HttpResponse>,
    session: &SessionStore,
    credentials: &dyn CredentialStore,
) -> ApiResult<HttpResponse> {
    let response = outcome?;

    if response.status.is_success() {
        return Ok(response);
    }

    if response.status == StatusCode::UNAUTHORIZED {
        warn!("Request rejected as unauthorized, clearing session");
        invalidate_session(credentials, session).await;
    } else {
        debug!(status = %response.status, "Request failed");
    }

    Err(ApiError::from_status(response.status, &response.body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthStatus, MemoryCredentialStore, UserSummary};
    use crate::test_support::{make_token, FailingCredentialStore, FixedClock};

    fn signed_in(session: &SessionStore) {
        session.set_authenticated(UserSummary {
            id: "user-1".to_string(),
            name: "Siti Rahma".to_string(),
            email: "siti@example.com".to_string(),
            role: "USER".to_string(),
        });
    }

    #[tokio::test]
    async fn test_expired_token_is_cleared_and_not_attached() {
        let clock = FixedClock::default();
        let credentials = MemoryCredentialStore::with_token(make_token(clock.timestamp() - 1));
        let session = SessionStore::new();
        signed_in(&session);

        let headers = enforce_session_validity(&session, &credentials, &clock).await;

        assert!(headers.get(header::AUTHORIZATION).is_none());
        assert_eq!(credentials.get(TOKEN_KEY).await.unwrap(), None);
        assert_eq!(session.status(), AuthStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn test_valid_token_is_attached_and_session_untouched() {
        let clock = FixedClock::default();
        let token = make_token(clock.timestamp() + 3600);
        let credentials = MemoryCredentialStore::with_token(token.clone());
        let session = SessionStore::new();
        signed_in(&session);
        let before = session.snapshot();

        let headers = enforce_session_validity(&session, &credentials, &clock).await;

        assert_eq!(
            headers.get(header::AUTHORIZATION).unwrap().to_str().unwrap(),
            format!("Bearer {}", token)
        );
        assert_eq!(session.snapshot(), before);
        assert_eq!(credentials.get(TOKEN_KEY).await.unwrap(), Some(token));
    }

    #[tokio::test]
    async fn test_no_token_sends_anonymous_request() {
        let clock = FixedClock::default();
        let session = SessionStore::new();

        let headers = enforce_session_validity(&session, &MemoryCredentialStore::new(), &clock).await;

        assert!(headers.is_empty());
        // Anonymous requests do not settle the cold-start state
        assert_eq!(session.status(), AuthStatus::Unknown);
    }

    #[tokio::test]
    async fn test_storage_failure_sends_anonymous_request() {
        let clock = FixedClock::default();
        let session = SessionStore::new();

        let headers = enforce_session_validity(&session, &FailingCredentialStore, &clock).await;
        assert!(headers.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_expiry_check_is_idempotent() {
        let clock = FixedClock::default();
        let credentials = MemoryCredentialStore::with_token("garbage");
        let session = SessionStore::new();
        signed_in(&session);
        let mut rx = session.subscribe();

        let first = enforce_session_validity(&session, &credentials, &clock).await;
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        let second = enforce_session_validity(&session, &credentials, &clock).await;
        assert!(first.is_empty() && second.is_empty());
        assert!(!rx.has_changed().unwrap());
        assert_eq!(credentials.get(TOKEN_KEY).await.unwrap(), None);
        assert_eq!(session.status(), AuthStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let credentials = MemoryCredentialStore::with_token("token");
        let session = SessionStore::new();
        signed_in(&session);

        let response = HttpResponse::new(StatusCode::OK, r#"{"status":"success"}"#);
        let result = handle_response(Ok(response), &session, &credentials).await.unwrap();

        assert_eq!(result.text(), r#"{"status":"success"}"#);
        assert_eq!(session.status(), AuthStatus::Authenticated);
        assert!(credentials.get(TOKEN_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unauthorized_clears_session_and_fails() {
        let credentials = MemoryCredentialStore::with_token("token");
        let session = SessionStore::new();
        signed_in(&session);

        let response = HttpResponse::new(StatusCode::UNAUTHORIZED, "");
        let result = handle_response(Ok(response), &session, &credentials).await;

        assert!(matches!(result, Err(ApiError::Unauthorized)));
        assert_eq!(credentials.get(TOKEN_KEY).await.unwrap(), None);
        assert_eq!(session.snapshot().is_authenticated(), Some(false));
    }

    #[tokio::test]
    async fn test_unauthorized_with_failing_storage_still_clears_session() {
        let session = SessionStore::new();
        signed_in(&session);

        let response = HttpResponse::new(StatusCode::UNAUTHORIZED, r#"{"message":"Invalid token"}"#);
        let err = handle_response(Ok(response), &session, &FailingCredentialStore)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Invalid token");
        assert_eq!(session.status(), AuthStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn test_error_message_is_normalized() {
        let credentials = MemoryCredentialStore::with_token("token");
        let session = SessionStore::new();
        signed_in(&session);

        let response = HttpResponse::new(StatusCode::INTERNAL_SERVER_ERROR, r#"{"message":"Server error"}"#);
        let err = handle_response(Ok(response), &session, &credentials)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Server error");
        // Only a 401 ends the session
        assert_eq!(session.status(), AuthStatus::Authenticated);
    }

    #[tokio::test]
    async fn test_transport_error_propagates_unchanged() {
        let credentials = MemoryCredentialStore::with_token("token");
        let session = SessionStore::new();
        signed_in(&session);

        let outcome = Err(ApiError::InvalidResponse("connection reset".to_string()));
        let err = handle_response(outcome, &session, &credentials).await.unwrap_err();

        assert_eq!(err.to_string(), "Invalid response: connection reset");
        assert_eq!(session.status(), AuthStatus::Authenticated);
    }
}
