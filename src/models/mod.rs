//! Data models for KukuConnect marketplace entities.
//!
//! This module contains the wire types exchanged with the API:
//!
//! - `Product`, `NewProduct`: marketplace listings
//! - `FarmerProfile`, `BuyerProfile` and their creation payloads
//! - `UserInfo`, `NewUser`: account types
//!
//! The backend serializes decimal fields (prices, farm sizes) as JSON
//! strings; the deserializers here accept either strings or numbers.

pub mod product;
pub mod profile;
pub mod user;

pub use product::{NewProduct, Product, SaleUnit};
pub use profile::{BuyerProfile, FarmerProfile, NewBuyerProfile, NewFarmerProfile};
pub use user::{NewUser, UserInfo};

pub(crate) mod decimal {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    /// Accept a decimal encoded as either a JSON number or a string.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => Ok(n),
            Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
        }
    }

    /// Optional variant of [`deserialize`], treating `null` as `None`.
    pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Num(n)) => Ok(Some(n)),
            Some(Raw::Text(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}
