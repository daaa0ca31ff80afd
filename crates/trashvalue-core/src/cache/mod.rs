//! Local caching module for catalog data.
//!
//! This module provides the `CacheManager` for storing waste type and waste
//! bank listings locally so repeated lookups do not hit the API. Data is
//! cached in JSON format, one file per page, and considered stale after
//! 5 minutes.

pub mod manager;

pub use manager::{CacheManager, CachedData};
