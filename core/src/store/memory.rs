// core/src/store/memory.rs

//! In-process store with the same observable semantics as `PgStore`.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::{CartStore, CatalogStore, ProductFilter, ProductSort, UserStore, USERNAME_TAKEN};
use crate::error::{Result, ShopError};
use crate::models::{CartItem, CartLine, NewProduct, NewUser, Product, User};

#[derive(Default)]
struct Tables {
  products: BTreeMap<i32, Product>,
  next_product_id: i32,
  cart_items: Vec<CartItem>,
  next_cart_item_id: i64,
  users: Vec<User>,
  next_user_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
  tables: RwLock<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_products(products: impl IntoIterator<Item = NewProduct>) -> Self {
    let store = Self::new();
    for p in products {
      store.insert_product(p);
    }
    store
  }

  pub fn insert_product(&self, new_product: NewProduct) -> Product {
    let mut tables = self.tables.write();
    tables.next_product_id += 1;
    let product = new_product.into_product(tables.next_product_id);
    tables.products.insert(product.id, product.clone());
    product
  }

  /// Deletes a product and, like the foreign key in PostgreSQL, every cart
  /// row pointing at it.
  pub fn remove_product(&self, id: i32) -> bool {
    let mut tables = self.tables.write();
    let removed = tables.products.remove(&id).is_some();
    tables.cart_items.retain(|item| item.product_id != id);
    removed
  }

  pub fn cart_item_count(&self) -> usize {
    self.tables.read().cart_items.len()
  }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
  a.to_lowercase() == b.to_lowercase()
}

fn matches_filter(p: &Product, filter: &ProductFilter) -> bool {
  let category_ok = filter.category.as_deref().map_or(true, |c| eq_ignore_case(&p.category, c));
  let brand_ok = filter.brand.as_deref().map_or(true, |b| eq_ignore_case(&p.brand, b));
  category_ok && brand_ok
}

/// Descending with missing values last, matching `DESC NULLS LAST`.
fn desc_nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
  match (a, b) {
    (Some(x), Some(y)) => y.total_cmp(&x),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  }
}

fn compare(sort: ProductSort, a: &Product, b: &Product) -> Ordering {
  let primary = match sort {
    ProductSort::Insertion => Ordering::Equal,
    ProductSort::PriceAsc => a.sale_price.cmp(&b.sale_price),
    ProductSort::PriceDesc => b.sale_price.cmp(&a.sale_price),
    ProductSort::RatingDesc => desc_nulls_last(a.rating, b.rating),
    ProductSort::DiscountDesc => desc_nulls_last(a.discount, b.discount),
  };
  primary.then(a.id.cmp(&b.id))
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
  haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

#[async_trait]
impl CatalogStore for MemoryStore {
  async fn count_products(&self, filter: &ProductFilter) -> Result<i64> {
    let tables = self.tables.read();
    Ok(tables.products.values().filter(|p| matches_filter(p, filter)).count() as i64)
  }

  async fn list_products(&self, filter: &ProductFilter, offset: i64, limit: i64) -> Result<Vec<Product>> {
    let tables = self.tables.read();
    let mut rows: Vec<Product> = tables
      .products
      .values()
      .filter(|p| matches_filter(p, filter))
      .cloned()
      .collect();
    rows.sort_by(|a, b| compare(filter.sort, a, b));
    Ok(
      rows
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect(),
    )
  }

  async fn get_product(&self, id: i32) -> Result<Option<Product>> {
    Ok(self.tables.read().products.get(&id).cloned())
  }

  async fn products_by_ids(&self, ids: &[i32]) -> Result<Vec<Product>> {
    let tables = self.tables.read();
    Ok(
      tables
        .products
        .values()
        .filter(|p| ids.contains(&p.id))
        .cloned()
        .collect(),
    )
  }

  async fn products_in_category(&self, category: &str, exclude_id: i32) -> Result<Vec<Product>> {
    let tables = self.tables.read();
    Ok(
      tables
        .products
        .values()
        .filter(|p| p.id != exclude_id && p.category == category)
        .cloned()
        .collect(),
    )
  }

  async fn recommendation_candidates(&self, brand: &str, min_discount: f64, exclude_id: i32) -> Result<Vec<Product>> {
    let tables = self.tables.read();
    Ok(
      tables
        .products
        .values()
        .filter(|p| p.id != exclude_id)
        .filter(|p| p.brand == brand || p.discount.is_some_and(|d| !d.is_nan() && d >= min_discount))
        .cloned()
        .collect(),
    )
  }

  async fn search_substring(&self, needle: &str, limit: i64) -> Result<Vec<Product>> {
    let needle = needle.to_lowercase();
    let tables = self.tables.read();
    Ok(
      tables
        .products
        .values()
        .filter(|p| {
          contains_ignore_case(Some(p.product.as_str()), &needle)
            || contains_ignore_case(Some(p.category.as_str()), &needle)
            || contains_ignore_case(p.description.as_deref(), &needle)
            || contains_ignore_case(Some(p.brand.as_str()), &needle)
        })
        .take(limit.max(0) as usize)
        .cloned()
        .collect(),
    )
  }

  async fn product_names(&self) -> Result<Vec<(i32, String)>> {
    let tables = self.tables.read();
    Ok(tables.products.values().map(|p| (p.id, p.product.clone())).collect())
  }
}

#[async_trait]
impl CartStore for MemoryStore {
  async fn cart_lines(&self, session_key: &str) -> Result<Vec<CartLine>> {
    let tables = self.tables.read();
    let mut items: Vec<&CartItem> = tables
      .cart_items
      .iter()
      .filter(|item| item.session_key == session_key)
      .collect();
    items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    Ok(
      items
        .into_iter()
        .filter_map(|item| {
          tables.products.get(&item.product_id).map(|product| CartLine {
            item: item.clone(),
            product: product.clone(),
          })
        })
        .collect(),
    )
  }

  async fn upsert_add(&self, session_key: &str, product_id: i32, quantity: i32, cap: i32) -> Result<CartItem> {
    let mut tables = self.tables.write();
    if !tables.products.contains_key(&product_id) {
      return Err(ShopError::Internal(format!(
        "cart item references missing product {}",
        product_id
      )));
    }

    if let Some(existing) = tables
      .cart_items
      .iter_mut()
      .find(|item| item.session_key == session_key && item.product_id == product_id)
    {
      existing.quantity = existing.quantity.saturating_add(quantity).min(cap);
      return Ok(existing.clone());
    }

    tables.next_cart_item_id += 1;
    let item = CartItem {
      id: tables.next_cart_item_id,
      session_key: session_key.to_string(),
      product_id,
      quantity,
      created_at: Utc::now(),
    };
    tables.cart_items.push(item.clone());
    Ok(item)
  }

  async fn set_quantity(&self, session_key: &str, product_id: i32, quantity: i32) -> Result<Option<CartItem>> {
    let mut tables = self.tables.write();
    Ok(
      tables
        .cart_items
        .iter_mut()
        .find(|item| item.session_key == session_key && item.product_id == product_id)
        .map(|item| {
          item.quantity = quantity;
          item.clone()
        }),
    )
  }

  async fn remove_item(&self, session_key: &str, product_id: i32) -> Result<bool> {
    let mut tables = self.tables.write();
    let before = tables.cart_items.len();
    tables
      .cart_items
      .retain(|item| !(item.session_key == session_key && item.product_id == product_id));
    Ok(tables.cart_items.len() != before)
  }
}

#[async_trait]
impl UserStore for MemoryStore {
  async fn create_user(&self, new_user: NewUser) -> Result<User> {
    let mut tables = self.tables.write();
    if tables.users.iter().any(|u| u.username == new_user.username) {
      return Err(ShopError::validation(USERNAME_TAKEN));
    }
    tables.next_user_id += 1;
    let user = User {
      id: tables.next_user_id,
      username: new_user.username,
      email: new_user.email,
      first_name: new_user.first_name,
      last_name: new_user.last_name,
      password_hash: new_user.password_hash,
      date_joined: Utc::now(),
    };
    tables.users.push(user.clone());
    Ok(user)
  }

  async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
    Ok(self.tables.read().users.iter().find(|u| u.username == username).cloned())
  }

  async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
    Ok(self.tables.read().users.iter().find(|u| u.id == id).cloned())
  }

  async fn update_password(&self, id: i64, password_hash: &str) -> Result<()> {
    let mut tables = self.tables.write();
    match tables.users.iter_mut().find(|u| u.id == id) {
      Some(user) => {
        user.password_hash = password_hash.to_string();
        Ok(())
      }
      None => Err(ShopError::not_found("User not found")),
    }
  }
}
