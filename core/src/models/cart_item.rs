// core/src/models/cart_item.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use super::product::{Product, ProductView};
use crate::sanitize::price_round2;

pub const MIN_QUANTITY: i32 = 1;
pub const MAX_QUANTITY: i32 = 10;

/// One row of a session cart. `(session_key, product_id)` is unique.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CartItem {
  pub id: i64,
  pub session_key: String,
  pub product_id: i32,
  pub quantity: i32,
  pub created_at: DateTime<Utc>,
}

/// A cart row joined with its product.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
  pub item: CartItem,
  pub product: Product,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLineView {
  pub id: i64,
  pub product: ProductView,
  pub quantity: i32,
  #[serde(with = "rust_decimal::serde::float")]
  pub line_total: Decimal,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartView {
  pub items: Vec<CartLineView>,
  pub total_quantity: i32,
  #[serde(with = "rust_decimal::serde::float")]
  pub subtotal: Decimal,
}

impl CartView {
  pub fn from_lines(lines: &[CartLine]) -> Self {
    let items: Vec<CartLineView> = lines
      .iter()
      .map(|line| CartLineView {
        id: line.item.id,
        product: ProductView::from(&line.product),
        quantity: line.item.quantity,
        line_total: price_round2(line.product.sale_price * Decimal::from(line.item.quantity)),
        created_at: line.item.created_at,
      })
      .collect();

    let total_quantity = items.iter().map(|i| i.quantity).sum();
    let subtotal = price_round2(items.iter().map(|i| i.line_total).sum());

    Self {
      items,
      total_quantity,
      subtotal,
    }
  }

  pub fn quantity_of(&self, product_id: i32) -> Option<i32> {
    self
      .items
      .iter()
      .find(|line| line.product.id == product_id)
      .map(|line| line.quantity)
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }
}
