use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::decimal;

/// Farmer-side profile attached to a user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmerProfile {
    pub id: i64,
    pub user: i64,
    pub farm_name: String,
    pub location: String,
    pub phone_number: String,
    /// Farm size in acres, when provided
    #[serde(default, deserialize_with = "decimal::deserialize_opt")]
    pub farm_size: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewFarmerProfile {
    pub farm_name: String,
    pub location: String,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub farm_size: Option<f64>,
}

/// Buyer-side profile attached to a user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyerProfile {
    pub id: i64,
    pub user: i64,
    pub business_name: Option<String>,
    pub phone_number: String,
    /// Free-text list of preferred products
    pub preferred_products: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewBuyerProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_products: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_farmer_profile_with_string_farm_size() {
        let json = r#"{
            "id": 9,
            "user": 4,
            "farm_name": "Green Acres Poultry",
            "location": "Nakuru",
            "phone_number": "+254700111222",
            "farm_size": "2.50",
            "created_at": "2024-10-01T09:00:00Z",
            "updated_at": "2024-10-20T09:00:00Z"
        }"#;

        let profile: FarmerProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.farm_name, "Green Acres Poultry");
        assert_eq!(profile.farm_size, Some(2.5));
    }

    #[test]
    fn parses_buyer_profile_with_nulls() {
        let json = r#"{
            "id": 2,
            "user": 7,
            "business_name": null,
            "phone_number": "+254711000999",
            "preferred_products": null,
            "created_at": "2024-10-01T09:00:00Z",
            "updated_at": "2024-10-01T09:00:00Z"
        }"#;

        let profile: BuyerProfile = serde_json::from_str(json).unwrap();
        assert!(profile.business_name.is_none());
        assert!(profile.preferred_products.is_none());
    }

    #[test]
    fn new_profile_omits_absent_optionals() {
        let payload = NewBuyerProfile {
            business_name: None,
            phone_number: "+254711000999".to_string(),
            preferred_products: None,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("business_name").is_none());
        assert_eq!(value["phone_number"], "+254711000999");
    }
}
