// core/src/models/product.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::sanitize::{finite_round2, price_round2};

/// A catalog row as stored.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Product {
  pub id: i32,
  pub product: String,
  pub category: String,
  pub sub_category: Option<String>,
  pub brand: String,
  #[sqlx(rename = "type")]
  pub kind: Option<String>,
  pub description: Option<String>,
  pub market_price: Decimal,
  pub sale_price: Decimal,
  pub rating: Option<f64>,
  pub discount: Option<f64>,
}

/// Fields for a product that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewProduct {
  pub product: String,
  pub category: String,
  pub sub_category: Option<String>,
  pub brand: String,
  #[serde(rename = "type")]
  pub kind: Option<String>,
  pub description: Option<String>,
  pub market_price: Decimal,
  pub sale_price: Decimal,
  pub rating: Option<f64>,
  pub discount: Option<f64>,
}

impl NewProduct {
  pub fn into_product(self, id: i32) -> Product {
    Product {
      id,
      product: self.product,
      category: self.category,
      sub_category: self.sub_category,
      brand: self.brand,
      kind: self.kind,
      description: self.description,
      market_price: self.market_price,
      sale_price: self.sale_price,
      rating: self.rating,
      discount: self.discount,
    }
  }
}

/// Wire representation of a product. Every float is finite and rounded to two
/// places, or null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductView {
  pub id: i32,
  pub product: String,
  pub category: String,
  pub sub_category: Option<String>,
  pub brand: String,
  #[serde(rename = "type")]
  pub kind: Option<String>,
  pub description: Option<String>,
  #[serde(with = "rust_decimal::serde::float")]
  pub market_price: Decimal,
  #[serde(with = "rust_decimal::serde::float")]
  pub sale_price: Decimal,
  pub rating: Option<f64>,
  pub discount: Option<f64>,
}

impl From<&Product> for ProductView {
  fn from(p: &Product) -> Self {
    Self {
      id: p.id,
      product: p.product.clone(),
      category: p.category.clone(),
      sub_category: p.sub_category.clone(),
      brand: p.brand.clone(),
      kind: p.kind.clone(),
      description: p.description.clone(),
      market_price: price_round2(p.market_price),
      sale_price: price_round2(p.sale_price),
      rating: finite_round2(p.rating),
      discount: finite_round2(p.discount),
    }
  }
}
