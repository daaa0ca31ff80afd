//! API client for the TrashValue REST API.
//!
//! `ApiClient` owns the request pipeline and the account operations that
//! change the session (login, registration, logout). Resource endpoints
//! live in `services`.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::interceptor::{enforce_session_validity, handle_response, invalidate_session};
use super::transport::{HttpRequest, HttpResponse, MultipartForm, ReqwestTransport, Transport};
use super::{ApiError, ApiResult};
use crate::auth::{
    decode_claims, Clock, CredentialStore, SessionStore, SystemClock, UserSummary, TOKEN_KEY,
};
use crate::config::Config;
use crate::models::{LoginCredentials, LoginResponse, RegisterRequest, RegisterResponse};

/// API client for TrashValue.
/// Clone is cheap - all collaborators are shared.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialStore>,
    session: SessionStore,
    clock: Arc<dyn Clock>,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
        session: SessionStore,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            transport,
            credentials,
            session,
            clock,
        }
    }

    /// Create a client that talks to the configured API over HTTP.
    pub fn from_config(
        config: &Config,
        credentials: Arc<dyn CredentialStore>,
        session: SessionStore,
    ) -> anyhow::Result<Self> {
        let base_url = config.api_url()?;
        let timeout = config.request_timeout_secs.map(Duration::from_secs);
        let transport = ReqwestTransport::new(base_url, timeout)?;

        Ok(Self::new(
            Arc::new(transport),
            credentials,
            session,
            Arc::new(SystemClock),
        ))
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    // ===== Request pipeline =====

    /// Send a request through the session policy and the transport.
    pub async fn execute(&self, mut request: HttpRequest) -> ApiResult<HttpResponse> {
        let auth_headers =
            enforce_session_validity(&self.session, self.credentials.as_ref(), self.clock.as_ref())
                .await;
        request.headers.extend(auth_headers);

        let method = request.method.clone();
        let path = request.path.clone();
        let outcome = self.transport.send(request).await;

        let result = handle_response(outcome, &self.session, self.credentials.as_ref()).await;
        if let Err(ref e) = result {
            debug!(method = %method, path = %path, error = %e, "Request failed");
        }
        result
    }

    /// Execute and parse the JSON response body.
    pub(crate) async fn fetch<T: DeserializeOwned>(&self, request: HttpRequest) -> ApiResult<T> {
        let path = request.path.clone();
        let response = self.execute(request).await?;
        response.json().map_err(|e| {
            warn!(path = %path, error = %e, "Unexpected response shape");
            e
        })
    }

    // ===== Account =====

    /// Sign in and start a session.
    ///
    /// On success the token is stored and the session becomes authenticated
    /// with the returned user. On failure the session settles as
    /// unauthenticated and the error carries the server's message, or
    /// "Login failed" when there was none.
    pub async fn login(&self, credentials: &LoginCredentials) -> ApiResult<UserSummary> {
        self.session.set_loading(true);

        match self.try_login(credentials).await {
            Ok(user) => {
                info!(user_id = %user.id, "Login successful");
                self.session.set_authenticated(user.clone());
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.session.set_loading(false);
                if self.session.snapshot().is_authenticated() != Some(true) {
                    self.session.logout();
                }
                match e {
                    ApiError::Server { .. } | ApiError::NetworkError(_) => Err(e),
                    other => Err(ApiError::LoginFailed(Box::new(other))),
                }
            }
        }
    }

    async fn try_login(&self, credentials: &LoginCredentials) -> ApiResult<UserSummary> {
        let request = HttpRequest::post("/users/login").json(credentials)?;
        let response: LoginResponse = self.fetch(request).await?;

        let token = response
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::InvalidResponse("Login response did not include a token".to_string()))?;

        self.credentials.set(TOKEN_KEY, &token).await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to store token: {}", e))
        })?;

        Ok(response.data.to_summary())
    }

    /// Create a new account. Does not sign in.
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<RegisterResponse> {
        let mut form = MultipartForm::new()
            .text("name", &request.name)
            .text("phone", &request.phone)
            .text("email", &request.email)
            .text("password", &request.password)
            .text("address", &request.address);

        if let Some(ref image) = request.profile_image {
            form = form.file("profileImage", image.clone());
        }
        if let Some(ref photo) = request.background_photo {
            form = form.file("backgroundPhoto", photo.clone());
        }

        self.fetch(HttpRequest::post("/users/register").multipart(form))
            .await
    }

    /// User-initiated sign out.
    pub async fn logout(&self) {
        info!("Signing out");
        invalidate_session(self.credentials.as_ref(), &self.session).await;
    }

    /// Id of the signed-in user, read from the stored token's claims.
    pub async fn current_user_id(&self) -> ApiResult<String> {
        let token = self
            .credentials
            .get(TOKEN_KEY)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to read stored token");
                ApiError::Unauthorized
            })?
            .ok_or(ApiError::Unauthorized)?;

        match decode_claims(&token) {
            Ok(claims) if !claims.id.is_empty() => Ok(claims.id),
            _ => Err(ApiError::Unauthorized),
        }
    }
}
