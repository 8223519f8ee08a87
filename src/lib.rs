//! Client library for the KukuConnect agricultural marketplace API.
//!
//! The centerpiece is the session/token lifecycle: [`AuthGateway`] owns the
//! access/refresh credential pair, attaches the bearer token to every
//! outgoing call, and transparently recovers from an expired access token
//! by refreshing once and reissuing the failed request once. A rejected
//! refresh destroys the session and broadcasts the transition so the UI
//! can return to the login screen.
//!
//! Around the gateway sit the typed endpoints ([`MarketClient`]), the
//! role-gated navigation rules ([`routes`]), a client-side cart for
//! checkout ([`cart`]), and a local JSON cache for offline-tolerant
//! screens ([`cache`]).
//!
//! ```no_run
//! use kukuconnect_client::{Config, MarketClient, Role};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let client = MarketClient::new(&config)?;
//!
//! let session = client.login("alice", "secret1234567").await?;
//! let products = client.list_products().await?;
//!
//! if session.role == Role::Farmer {
//!     // Profiles are addressed by their own id, not the user id
//!     let dashboard = client.farmer_dashboard(3).await?;
//!     println!("{} listings", dashboard.products.len());
//! }
//! # let _ = products;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod cache;
pub mod cart;
pub mod config;
pub mod models;
pub mod routes;
pub mod utils;

pub use api::{ApiError, AuthGateway, FarmerDashboard, MarketClient};
pub use auth::{CredentialStore, Role, SessionData, SessionState, SessionStore};
pub use cache::{CacheManager, CachedData};
pub use cart::{Cart, CartItem, OrderSummary};
pub use config::Config;
pub use models::{
    BuyerProfile, FarmerProfile, NewBuyerProfile, NewFarmerProfile, NewProduct, NewUser, Product,
    SaleUnit, UserInfo,
};
pub use routes::{Navigation, Route};
