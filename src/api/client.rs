//! Typed client for the KukuConnect marketplace REST API.
//!
//! This module provides the `MarketClient` struct wrapping the
//! authorization gateway with the account, product, and profile endpoints.
//! All authenticated calls inherit the gateway's single-retry token
//! refresh behavior.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::auth::{claims, Role, SessionData, SessionStore};
use crate::config::Config;
use crate::models::{
    BuyerProfile, FarmerProfile, NewBuyerProfile, NewFarmerProfile, NewProduct, NewUser, Product,
    UserInfo,
};

use super::AuthGateway;

// ============================================================================
// Endpoint paths
// ============================================================================

const LOGIN_PATH: &str = "/api/users/login/";
const REGISTER_PATH: &str = "/api/users/register/";
const LOGOUT_PATH: &str = "/api/users/logout/";
const ME_PATH: &str = "/api/users/me/";
const PRODUCTS_PATH: &str = "/api/products/";
const PRODUCT_CREATE_PATH: &str = "/api/products/new/";
const MY_PRODUCTS_PATH: &str = "/api/products/my-products/";
const FARMER_PROFILES_PATH: &str = "/api/profiles/farmers/";
const BUYER_PROFILES_PATH: &str = "/api/profiles/buyers/";
const CHATBOT_PATH: &str = "/api/chatbot/";

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access: String,
    refresh: String,
    #[serde(default)]
    user: Option<LoginUser>,
    #[serde(default)]
    user_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginUser {
    #[serde(default)]
    user_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    response: String,
}

impl LoginResponse {
    /// Role precedence: `user.user_type` in the body, then a top-level
    /// `user_type`, then the access token's own claims, then buyer.
    fn resolve_role(&self) -> Role {
        self.user
            .as_ref()
            .and_then(|u| u.user_type.as_deref())
            .or(self.user_type.as_deref())
            .map(Role::parse)
            .unwrap_or_else(|| claims::role_from_token(&self.access))
    }
}

/// Everything the farmer dashboard screen renders in one fetch.
#[derive(Debug, Clone)]
pub struct FarmerDashboard {
    pub user: UserInfo,
    pub profile: FarmerProfile,
    pub products: Vec<Product>,
}

/// Marketplace API client.
/// Clone is cheap - the gateway (and its reqwest pool) is shared via Arc.
#[derive(Clone)]
pub struct MarketClient {
    gateway: Arc<AuthGateway>,
}

impl MarketClient {
    /// Create a client from configuration, restoring any persisted session.
    pub fn new(config: &Config) -> Result<Self> {
        let store = SessionStore::new(config.cache_dir()?);
        let gateway = AuthGateway::new(config.base_url(), store)
            .context("Failed to construct authorization gateway")?;
        Ok(Self {
            gateway: Arc::new(gateway),
        })
    }

    pub fn with_gateway(gateway: AuthGateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }

    /// The underlying gateway, for session state and lifecycle
    /// subscriptions.
    pub fn gateway(&self) -> &AuthGateway {
        &self.gateway
    }

    // ===== Account =====

    /// Authenticate and install the resulting session.
    ///
    /// Sent without credentials attached: a login must never ride on a
    /// stale bearer token.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionData> {
        let body = serde_json::json!({ "username": username, "password": password });
        let response: LoginResponse = self
            .gateway
            .post_public(LOGIN_PATH, &body)
            .await
            .context("Login request failed")?;

        let role = response.resolve_role();
        debug!(username, role = role.as_str(), "Login succeeded");

        let data = SessionData::new(response.access, response.refresh, role, username.to_string());
        self.gateway
            .install_session(data.clone())
            .await
            .context("Failed to persist session")?;
        Ok(data)
    }

    /// Register a new account. Does not log in.
    pub async fn register(&self, new_user: &NewUser) -> Result<UserInfo> {
        let user = self.gateway.post_public(REGISTER_PATH, new_user).await?;
        Ok(user)
    }

    /// End the session: best-effort server-side invalidation of the
    /// refresh token, then an unconditional local clear. The local clear
    /// happens regardless of the server call's outcome.
    pub async fn logout(&self) -> Result<()> {
        if let Some(session) = self.gateway.session().await {
            let body = serde_json::json!({ "refresh_token": session.refresh_token });
            if let Err(e) = self.gateway.post_no_content(LOGOUT_PATH, &body).await {
                warn!(error = %e, "Server-side logout failed, clearing local session anyway");
            }
        }
        self.gateway.clear_session().await;
        Ok(())
    }

    /// Fetch the authenticated user's account details.
    pub async fn me(&self) -> Result<UserInfo> {
        let user = self.gateway.get(ME_PATH).await?;
        Ok(user)
    }

    // ===== Products =====

    /// Fetch the marketplace product catalog.
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        let products = self.gateway.get(PRODUCTS_PATH).await?;
        Ok(products)
    }

    pub async fn product(&self, id: i64) -> Result<Product> {
        let product = self
            .gateway
            .get(&format!("{}{}/", PRODUCTS_PATH, id))
            .await?;
        Ok(product)
    }

    /// Create a listing. The server attributes it to the session's farmer.
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product> {
        let created = self.gateway.post(PRODUCT_CREATE_PATH, product).await?;
        Ok(created)
    }

    pub async fn update_product(&self, id: i64, product: &NewProduct) -> Result<Product> {
        let updated = self
            .gateway
            .put(&format!("{}{}/", PRODUCTS_PATH, id), product)
            .await?;
        Ok(updated)
    }

    pub async fn delete_product(&self, id: i64) -> Result<()> {
        self.gateway
            .delete(&format!("{}{}/", PRODUCTS_PATH, id))
            .await?;
        Ok(())
    }

    /// Fetch the authenticated farmer's own listings.
    pub async fn my_products(&self) -> Result<Vec<Product>> {
        let products = self.gateway.get(MY_PRODUCTS_PATH).await?;
        Ok(products)
    }

    // ===== Profiles =====

    pub async fn create_farmer_profile(&self, profile: &NewFarmerProfile) -> Result<FarmerProfile> {
        let created = self.gateway.post(FARMER_PROFILES_PATH, profile).await?;
        Ok(created)
    }

    /// Fetch a farmer profile by its own id (the `id` field of
    /// `FarmerProfile`), not the owning user's id. The two sequences are
    /// independent server-side.
    pub async fn farmer_profile(&self, id: i64) -> Result<FarmerProfile> {
        let profile = self
            .gateway
            .get(&format!("{}{}/", FARMER_PROFILES_PATH, id))
            .await?;
        Ok(profile)
    }

    pub async fn update_farmer_profile(
        &self,
        id: i64,
        profile: &NewFarmerProfile,
    ) -> Result<FarmerProfile> {
        let updated = self
            .gateway
            .put(&format!("{}{}/", FARMER_PROFILES_PATH, id), profile)
            .await?;
        Ok(updated)
    }

    pub async fn create_buyer_profile(&self, profile: &NewBuyerProfile) -> Result<BuyerProfile> {
        let created = self.gateway.post(BUYER_PROFILES_PATH, profile).await?;
        Ok(created)
    }

    /// Fetch a buyer profile by its own id, not the owning user's id.
    pub async fn buyer_profile(&self, id: i64) -> Result<BuyerProfile> {
        let profile = self
            .gateway
            .get(&format!("{}{}/", BUYER_PROFILES_PATH, id))
            .await?;
        Ok(profile)
    }

    pub async fn update_buyer_profile(
        &self,
        id: i64,
        profile: &NewBuyerProfile,
    ) -> Result<BuyerProfile> {
        let updated = self
            .gateway
            .put(&format!("{}{}/", BUYER_PROFILES_PATH, id), profile)
            .await?;
        Ok(updated)
    }

    // ===== Assistant =====

    /// Ask the farming assistant a question and get its reply.
    /// The server rate-limits this endpoint; a 429 surfaces as an error.
    pub async fn chat(&self, user_input: &str) -> Result<String> {
        let body = serde_json::json!({ "user_input": user_input });
        let reply: ChatResponse = self.gateway.post(CHATBOT_PATH, &body).await?;
        Ok(reply.response)
    }

    // ===== Dashboard =====

    /// Fetch everything the farmer dashboard shows. The listing and
    /// profile fetches run concurrently.
    ///
    /// `profile_id` is the farmer profile's own id (remembered from
    /// `create_farmer_profile` or a cached profile); user ids live in a
    /// different sequence and do not address profiles.
    pub async fn farmer_dashboard(&self, profile_id: i64) -> Result<FarmerDashboard> {
        let user = self.me().await?;
        let (products, profile) = futures::future::try_join(
            self.my_products(),
            self.farmer_profile(profile_id),
        )
        .await?;
        Ok(FarmerDashboard {
            user,
            profile,
            products,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_prefers_nested_user_type() {
        let json = r#"{"access":"A1","refresh":"R1","user":{"user_type":"farmer"}}"#;
        let response: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.resolve_role(), Role::Farmer);
    }

    #[test]
    fn role_falls_back_to_top_level_field() {
        let json = r#"{"access":"A1","refresh":"R1","user_type":"farmer"}"#;
        let response: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.resolve_role(), Role::Farmer);
    }

    #[test]
    fn role_falls_back_to_token_claims() {
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;
        use base64::Engine;

        let payload = URL_SAFE_NO_PAD.encode(br#"{"user_type":"farmer"}"#);
        let access = format!("h.{}.s", payload);
        let json = format!(r#"{{"access":"{}","refresh":"R1"}}"#, access);
        let response: LoginResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(response.resolve_role(), Role::Farmer);
    }

    #[test]
    fn role_defaults_to_buyer() {
        let json = r#"{"access":"A1","refresh":"R1"}"#;
        let response: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.resolve_role(), Role::Buyer);
    }

    #[test]
    fn parses_assistant_reply() {
        let json = r#"{"response":"Vaccinate chicks against Newcastle at day 3."}"#;
        let reply: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            reply.response,
            "Vaccinate chicks against Newcastle at day 3."
        );
    }
}
