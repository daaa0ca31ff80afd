//! REST API client module for the TrashValue backend.
//!
//! Every call runs through the authenticated request pipeline:
//!
//! 1. `interceptor::enforce_session_validity` reads the stored token and
//!    attaches it, or clears the session if it has expired
//! 2. the `Transport` sends the request
//! 3. `interceptor::handle_response` clears the session on a 401 and turns
//!    server error bodies into readable `ApiError`s
//!
//! The API uses JWT bearer tokens obtained from `/users/login`.

pub mod client;
pub mod error;
pub mod interceptor;
pub mod services;
pub mod transport;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
pub use interceptor::{enforce_session_validity, handle_response, invalidate_session};
pub use transport::{FormPart, HttpRequest, HttpResponse, MultipartForm, ReqwestTransport, RequestBody, Transport};
