//! Client-side shopping cart.
//!
//! The cart never talks to the server; it accumulates listings and
//! quantities locally and produces the order summary the checkout screen
//! renders. Payment execution is out of scope for this crate.

use serde::{Deserialize, Serialize};

use crate::models::Product;
use crate::utils::format_price;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: i64,
    pub title: String,
    pub unit_price: f64,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

/// Snapshot handed to the checkout screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub lines: Vec<CartItem>,
    pub total: f64,
}

impl OrderSummary {
    pub fn display_total(&self) -> String {
        format_price(self.total)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listing to the cart; quantities merge for repeat adds.
    pub fn add(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            item.quantity += quantity;
        } else {
            self.items.push(CartItem {
                product_id: product.id,
                title: product.title.clone(),
                unit_price: product.price,
                quantity,
            });
        }
    }

    /// Set an item's quantity; zero removes it.
    pub fn set_quantity(&mut self, product_id: i64, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
        } else if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity = quantity;
        }
    }

    pub fn remove(&mut self, product_id: i64) {
        self.items.retain(|i| i.product_id != product_id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn summary(&self) -> OrderSummary {
        OrderSummary {
            lines: self.items.clone(),
            total: self.total(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SaleUnit;
    use chrono::Utc;

    fn listing(id: i64, title: &str, price: f64) -> Product {
        Product {
            id,
            title: title.to_string(),
            description: String::new(),
            category: SaleUnit::Number,
            price,
            stock: 100,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            farmer_name: "wanjiku".to_string(),
        }
    }

    #[test]
    fn repeat_adds_merge_quantities() {
        let mut cart = Cart::new();
        let eggs = listing(1, "Eggs", 420.0);
        cart.add(&eggs, 2);
        cart.add(&eggs, 3);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
        assert_eq!(cart.total(), 2100.0);
    }

    #[test]
    fn zero_quantity_removes_the_line() {
        let mut cart = Cart::new();
        cart.add(&listing(1, "Eggs", 420.0), 2);
        cart.add(&listing(2, "Broiler", 750.0), 1);

        cart.set_quantity(1, 0);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].product_id, 2);
    }

    #[test]
    fn adding_zero_is_a_no_op() {
        let mut cart = Cart::new();
        cart.add(&listing(1, "Eggs", 420.0), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn summary_totals_match_lines() {
        let mut cart = Cart::new();
        cart.add(&listing(1, "Eggs", 420.0), 2);
        cart.add(&listing(2, "Broiler", 750.5), 3);

        let summary = cart.summary();
        assert_eq!(summary.lines.len(), 2);
        assert_eq!(summary.total, 420.0 * 2.0 + 750.5 * 3.0);
        assert_eq!(summary.display_total(), "KSh 3,091.50");
    }
}
