//! Core library for the TrashValue client.
//!
//! This crate contains everything the front ends share:
//!
//! - `auth`: credential storage, token inspection, and the observable session state
//! - `api`: the authenticated request pipeline and the typed API client
//! - `models`: request/response types for the TrashValue backend
//! - `cache`: local JSON cache for catalog data
//! - `config`: application configuration
//! - `utils`: display formatting helpers

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod models;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{ApiClient, ApiError, ApiResult};
pub use auth::{AuthStatus, SessionState, SessionStore, UserSummary};
pub use config::Config;
