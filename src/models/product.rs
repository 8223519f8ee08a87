use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::decimal;

/// How a listing is sold: by weight (kg) or by head count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleUnit {
    Weight,
    Number,
}

impl SaleUnit {
    pub fn display_name(&self) -> &'static str {
        match self {
            SaleUnit::Weight => "By Weight",
            SaleUnit::Number => "By Number",
        }
    }
}

/// A marketplace listing as returned by the products endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: SaleUnit,
    #[serde(deserialize_with = "decimal::deserialize")]
    pub price: f64,
    /// Weight in kg or number of birds, depending on `category`
    pub stock: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub farmer_name: String,
}

/// Payload for creating or updating a listing. The farmer is taken from
/// the authenticated session server-side.
#[derive(Debug, Clone, Serialize)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub category: SaleUnit,
    pub price: f64,
    pub stock: u32,
}
