// core/src/store/mod.rs

//! Persistence seams. Services only see these traits; `PgStore` backs them
//! with PostgreSQL and `MemoryStore` keeps everything in process.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CartItem, CartLine, NewUser, Product, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Ordering for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
  /// Ascending id, i.e. the order products were loaded in.
  #[default]
  Insertion,
  PriceAsc,
  PriceDesc,
  /// Highest rating first, unrated products last.
  RatingDesc,
  /// Highest discount first, products without a discount last.
  DiscountDesc,
}

impl ProductSort {
  /// Unknown values fall back to insertion order.
  pub fn parse(raw: &str) -> Self {
    match raw.trim() {
      "price_asc" => ProductSort::PriceAsc,
      "price_desc" => ProductSort::PriceDesc,
      "rating" | "rating_desc" => ProductSort::RatingDesc,
      "discount" => ProductSort::DiscountDesc,
      _ => ProductSort::Insertion,
    }
  }
}

/// Listing filter. `category` and `brand` match case-insensitively and exactly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
  pub category: Option<String>,
  pub brand: Option<String>,
  pub sort: ProductSort,
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
  async fn count_products(&self, filter: &ProductFilter) -> Result<i64>;

  async fn list_products(&self, filter: &ProductFilter, offset: i64, limit: i64) -> Result<Vec<Product>>;

  async fn get_product(&self, id: i32) -> Result<Option<Product>>;

  /// Products with the given ids, in ascending id order. Unknown ids are skipped.
  async fn products_by_ids(&self, ids: &[i32]) -> Result<Vec<Product>>;

  async fn products_in_category(&self, category: &str, exclude_id: i32) -> Result<Vec<Product>>;

  /// Products of `brand`, or with a discount of at least `min_discount`.
  async fn recommendation_candidates(&self, brand: &str, min_discount: f64, exclude_id: i32) -> Result<Vec<Product>>;

  /// Case-insensitive substring match on name, category, description and
  /// brand, ascending id, at most `limit` rows.
  async fn search_substring(&self, needle: &str, limit: i64) -> Result<Vec<Product>>;

  /// `(id, name)` for every product; the candidate set for fuzzy matching.
  async fn product_names(&self) -> Result<Vec<(i32, String)>>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
  /// Rows of one session joined with their products, oldest first.
  async fn cart_lines(&self, session_key: &str) -> Result<Vec<CartLine>>;

  /// Inserts the row, or on conflict adds `quantity` to the existing row,
  /// capping the total at `cap`. Must be a single atomic operation.
  async fn upsert_add(&self, session_key: &str, product_id: i32, quantity: i32, cap: i32) -> Result<CartItem>;

  /// Sets the quantity of an existing row. `None` if there is no such row.
  async fn set_quantity(&self, session_key: &str, product_id: i32, quantity: i32) -> Result<Option<CartItem>>;

  /// Deletes the row if present. Returns whether a row was deleted.
  async fn remove_item(&self, session_key: &str, product_id: i32) -> Result<bool>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
  /// Fails with a validation error when the username is taken.
  async fn create_user(&self, new_user: NewUser) -> Result<User>;

  async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

  async fn find_by_id(&self, id: i64) -> Result<Option<User>>;

  async fn update_password(&self, id: i64, password_hash: &str) -> Result<()>;
}

pub(crate) const USERNAME_TAKEN: &str = "A user with that username already exists.";

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_known_sorts() {
    assert_eq!(ProductSort::parse("price_asc"), ProductSort::PriceAsc);
    assert_eq!(ProductSort::parse("price_desc"), ProductSort::PriceDesc);
    assert_eq!(ProductSort::parse("rating"), ProductSort::RatingDesc);
    assert_eq!(ProductSort::parse("rating_desc"), ProductSort::RatingDesc);
    assert_eq!(ProductSort::parse("discount"), ProductSort::DiscountDesc);
  }

  #[test]
  fn unknown_sort_keeps_insertion_order() {
    assert_eq!(ProductSort::parse(""), ProductSort::Insertion);
    assert_eq!(ProductSort::parse("newest"), ProductSort::Insertion);
  }
}
