//! Local caching module for offline-tolerant screens.
//!
//! This module provides the `CacheManager` for storing and retrieving
//! marketplace data locally. Data is cached in JSON format and considered
//! stale after 60 minutes.
//!
//! Cached data types include:
//! - The product catalog
//! - The user's farmer or buyer profile

pub mod manager;

pub use manager::{CacheManager, CachedData};
