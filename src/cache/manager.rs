use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::models::{BuyerProfile, FarmerProfile, Product};

/// Consider cache stale after 1 hour.
/// Balances freshness with reducing unnecessary API calls for slowly-changing data.
const CACHE_STALE_MINUTES: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > CACHE_STALE_MINUTES
    }
}

/// JSON file cache for marketplace data, so screens can render the last
/// known catalog and profile while a refresh is in flight.
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<CachedData<T>>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", name))?;
        let cached: CachedData<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", name))?;
        Ok(Some(cached))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let cached = CachedData::new(data);
        let path = self.cache_path(name);
        let contents = serde_json::to_string_pretty(&cached)?;
        std::fs::write(&path, contents)?;
        Ok(())
    }

    // ===== Catalog =====

    pub fn load_products(&self) -> Result<Option<CachedData<Vec<Product>>>> {
        self.load("products")
    }

    pub fn save_products(&self, products: &[Product]) -> Result<()> {
        self.save("products", &products)
    }

    // ===== Profiles =====

    pub fn load_farmer_profile(&self) -> Result<Option<CachedData<FarmerProfile>>> {
        self.load("farmer_profile")
    }

    pub fn save_farmer_profile(&self, profile: &FarmerProfile) -> Result<()> {
        self.save("farmer_profile", profile)
    }

    pub fn load_buyer_profile(&self) -> Result<Option<CachedData<BuyerProfile>>> {
        self.load("buyer_profile")
    }

    pub fn save_buyer_profile(&self, profile: &BuyerProfile) -> Result<()> {
        self.save("buyer_profile", profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SaleUnit;
    use chrono::Duration;

    #[test]
    fn staleness_follows_the_window() {
        let fresh = CachedData::new(vec![1, 2, 3]);
        assert!(!fresh.is_stale());

        let old = CachedData {
            data: vec![1],
            cached_at: Utc::now() - Duration::minutes(CACHE_STALE_MINUTES + 5),
        };
        assert!(old.is_stale());
    }

    #[test]
    fn missing_cache_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();
        assert!(cache.load_products().unwrap().is_none());
    }

    #[test]
    fn saved_catalog_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();

        let products = vec![Product {
            id: 1,
            title: "Eggs".to_string(),
            description: "Tray of 30".to_string(),
            category: SaleUnit::Number,
            price: 420.0,
            stock: 25,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            farmer_name: "wanjiku".to_string(),
        }];
        cache.save_products(&products).unwrap();

        let loaded = cache.load_products().unwrap().unwrap();
        assert_eq!(loaded.data.len(), 1);
        assert_eq!(loaded.data[0].title, "Eggs");
        assert!(!loaded.is_stale());
    }
}
