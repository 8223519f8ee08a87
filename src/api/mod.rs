//! REST API module for the KukuConnect marketplace.
//!
//! This module provides:
//! - `AuthGateway`: the authorization layer that attaches bearer
//!   credentials and recovers once from an expired access token
//! - `MarketClient`: typed account, product, and profile endpoints
//! - `ApiError`: the error taxonomy surfaced to callers
//!
//! The API uses JWT bearer token authentication; tokens are obtained
//! through the login endpoint and silently refreshed on expiry.

pub mod client;
pub mod error;
pub mod gateway;

pub use client::{FarmerDashboard, MarketClient};
pub use error::ApiError;
pub use gateway::{Attempt, AuthGateway};
