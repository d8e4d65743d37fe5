// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper.

use once_cell::sync::Lazy;
use primebasket::models::NewProduct;
use primebasket::{MemoryStore, Shop, ShopConfig, Stores, TokenConfig};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::Level;

pub const TEST_SECRET: &str = "integration-test-secret-with-32-plus-chars";

pub fn new_product(
  name: &str,
  category: &str,
  brand: &str,
  sale_cents: i64,
  rating: Option<f64>,
  discount: Option<f64>,
) -> NewProduct {
  NewProduct {
    product: name.to_string(),
    category: category.to_string(),
    sub_category: None,
    brand: brand.to_string(),
    kind: None,
    description: Some(format!("{} by {}", name, brand)),
    market_price: Decimal::new(sale_cents + 500, 2),
    sale_price: Decimal::new(sale_cents, 2),
    rating,
    discount,
  }
}

/// Ten products; ids are assigned 1..=10 in this order.
pub fn sample_products() -> Vec<NewProduct> {
  vec![
    new_product("Basmati Rice", "Foodgrains", "Daawat", 45000, Some(4.5), Some(10.0)),
    new_product("Brown Rice", "Foodgrains", "Daawat", 30000, Some(4.1), None),
    new_product("Tomato Ketchup", "Sauces", "Kissan", 12000, Some(4.0), Some(20.0)),
    new_product("Potato Chips", "Snacks", "Lays", 2000, None, Some(5.0)),
    new_product("Masala Potato Chips", "Snacks", "Lays", 2000, Some(3.9), Some(16.0)),
    new_product("Sona Masoori Rice", "Foodgrains", "India Gate", 52000, Some(f64::NAN), Some(25.0)),
    new_product("Green Tea", "Beverages", "Tetley", 25000, Some(4.3), Some(0.0)),
    new_product("Tomato Soup", "Sauces", "Knorr", 9000, Some(3.5), None),
    new_product("Salted Peanuts", "Snacks", "Haldiram", 6000, Some(4.4), Some(15.0)),
    new_product("Black Tea", "Beverages", "Tetley", 18000, None, Some(12.0)),
  ]
}

pub fn memory_store() -> Arc<MemoryStore> {
  Arc::new(MemoryStore::with_products(sample_products()))
}

pub fn shop_over(store: Arc<MemoryStore>) -> Shop {
  Shop::new(Stores::memory(store), ShopConfig::new(TokenConfig::new(TEST_SECRET)))
    .expect("shop builds with a valid secret")
}

pub fn test_shop() -> (Shop, Arc<MemoryStore>) {
  let store = memory_store();
  (shop_over(store.clone()), store)
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
