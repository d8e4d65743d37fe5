// core/src/store/postgres.rs

//! PostgreSQL-backed store using runtime `sqlx` queries.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::{error, instrument};

use super::{CartStore, CatalogStore, ProductFilter, ProductSort, UserStore, USERNAME_TAKEN};
use crate::error::{Result, ShopError};
use crate::models::{CartItem, CartLine, NewUser, Product, User};

const PRODUCT_COLUMNS: &str = r#"id, product, category, sub_category, brand, "type", description,
  market_price, sale_price, rating, discount"#;

const CART_ITEM_COLUMNS: &str = "id, session_key, product_id, quantity, created_at";

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, password_hash, date_joined";

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }
}

fn order_clause(sort: ProductSort) -> &'static str {
  match sort {
    ProductSort::Insertion => "ORDER BY id ASC",
    ProductSort::PriceAsc => "ORDER BY sale_price ASC, id ASC",
    ProductSort::PriceDesc => "ORDER BY sale_price DESC, id ASC",
    ProductSort::RatingDesc => "ORDER BY rating DESC NULLS LAST, id ASC",
    ProductSort::DiscountDesc => "ORDER BY discount DESC NULLS LAST, id ASC",
  }
}

const FILTER_CLAUSE: &str = "WHERE ($1::text IS NULL OR LOWER(category) = LOWER($1))
  AND ($2::text IS NULL OR LOWER(brand) = LOWER($2))";

/// PostgreSQL orders NaN above every number; a NaN discount never qualifies.
const DISCOUNT_AT_LEAST: &str = "(discount >= $2 AND discount <> 'NaN')";

/// `%needle%` with LIKE metacharacters escaped.
fn like_pattern(needle: &str) -> String {
  let mut escaped = String::with_capacity(needle.len() + 2);
  escaped.push('%');
  for c in needle.chars() {
    if matches!(c, '%' | '_' | '\\') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped.push('%');
  escaped
}

#[derive(FromRow)]
struct CartLineRow {
  item_id: i64,
  session_key: String,
  quantity: i32,
  created_at: chrono::DateTime<chrono::Utc>,
  #[sqlx(flatten)]
  product: Product,
}

impl From<CartLineRow> for CartLine {
  fn from(row: CartLineRow) -> Self {
    CartLine {
      item: CartItem {
        id: row.item_id,
        session_key: row.session_key,
        product_id: row.product.id,
        quantity: row.quantity,
        created_at: row.created_at,
      },
      product: row.product,
    }
  }
}

#[async_trait]
impl CatalogStore for PgStore {
  async fn count_products(&self, filter: &ProductFilter) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM products {}", FILTER_CLAUSE);
    let count: i64 = sqlx::query_scalar(&sql)
      .bind(filter.category.as_deref())
      .bind(filter.brand.as_deref())
      .fetch_one(&self.pool)
      .await?;
    Ok(count)
  }

  #[instrument(name = "PgStore::list_products", skip(self), err(Display))]
  async fn list_products(&self, filter: &ProductFilter, offset: i64, limit: i64) -> Result<Vec<Product>> {
    let sql = format!(
      "SELECT {} FROM products {} {} OFFSET $3 LIMIT $4",
      PRODUCT_COLUMNS,
      FILTER_CLAUSE,
      order_clause(filter.sort)
    );
    let rows = sqlx::query_as::<_, Product>(&sql)
      .bind(filter.category.as_deref())
      .bind(filter.brand.as_deref())
      .bind(offset)
      .bind(limit)
      .fetch_all(&self.pool)
      .await?;
    Ok(rows)
  }

  async fn get_product(&self, id: i32) -> Result<Option<Product>> {
    let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
    let row = sqlx::query_as::<_, Product>(&sql)
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row)
  }

  async fn products_by_ids(&self, ids: &[i32]) -> Result<Vec<Product>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let sql = format!("SELECT {} FROM products WHERE id = ANY($1) ORDER BY id", PRODUCT_COLUMNS);
    let rows = sqlx::query_as::<_, Product>(&sql)
      .bind(ids)
      .fetch_all(&self.pool)
      .await?;
    Ok(rows)
  }

  async fn products_in_category(&self, category: &str, exclude_id: i32) -> Result<Vec<Product>> {
    let sql = format!(
      "SELECT {} FROM products WHERE category = $1 AND id <> $2 ORDER BY id",
      PRODUCT_COLUMNS
    );
    let rows = sqlx::query_as::<_, Product>(&sql)
      .bind(category)
      .bind(exclude_id)
      .fetch_all(&self.pool)
      .await?;
    Ok(rows)
  }

  async fn recommendation_candidates(&self, brand: &str, min_discount: f64, exclude_id: i32) -> Result<Vec<Product>> {
    let sql = format!(
      "SELECT {} FROM products WHERE (brand = $1 OR {}) AND id <> $3 ORDER BY id",
      PRODUCT_COLUMNS, DISCOUNT_AT_LEAST
    );
    let rows = sqlx::query_as::<_, Product>(&sql)
      .bind(brand)
      .bind(min_discount)
      .bind(exclude_id)
      .fetch_all(&self.pool)
      .await?;
    Ok(rows)
  }

  #[instrument(name = "PgStore::search_substring", skip(self), err(Display))]
  async fn search_substring(&self, needle: &str, limit: i64) -> Result<Vec<Product>> {
    let sql = format!(
      "SELECT {} FROM products
       WHERE product ILIKE $1 OR category ILIKE $1 OR description ILIKE $1 OR brand ILIKE $1
       ORDER BY id LIMIT $2",
      PRODUCT_COLUMNS
    );
    let rows = sqlx::query_as::<_, Product>(&sql)
      .bind(like_pattern(needle))
      .bind(limit)
      .fetch_all(&self.pool)
      .await?;
    Ok(rows)
  }

  async fn product_names(&self) -> Result<Vec<(i32, String)>> {
    let rows: Vec<(i32, String)> = sqlx::query_as("SELECT id, product FROM products ORDER BY id")
      .fetch_all(&self.pool)
      .await?;
    Ok(rows)
  }
}

#[async_trait]
impl CartStore for PgStore {
  async fn cart_lines(&self, session_key: &str) -> Result<Vec<CartLine>> {
    let rows = sqlx::query_as::<_, CartLineRow>(
      r#"SELECT ci.id AS item_id, ci.session_key, ci.quantity, ci.created_at,
                p.id, p.product, p.category, p.sub_category, p.brand, p."type", p.description,
                p.market_price, p.sale_price, p.rating, p.discount
         FROM cart_items ci
         JOIN products p ON p.id = ci.product_id
         WHERE ci.session_key = $1
         ORDER BY ci.created_at, ci.id"#,
    )
    .bind(session_key)
    .fetch_all(&self.pool)
    .await?;
    Ok(rows.into_iter().map(CartLine::from).collect())
  }

  #[instrument(name = "PgStore::upsert_add", skip(self), err(Display))]
  async fn upsert_add(&self, session_key: &str, product_id: i32, quantity: i32, cap: i32) -> Result<CartItem> {
    // Relies on UNIQUE (session_key, product_id); concurrent adds serialize on the row.
    let sql = format!(
      "INSERT INTO cart_items (session_key, product_id, quantity, created_at)
       VALUES ($1, $2, $3, NOW())
       ON CONFLICT (session_key, product_id)
       DO UPDATE SET quantity = LEAST(cart_items.quantity + EXCLUDED.quantity, $4)
       RETURNING {}",
      CART_ITEM_COLUMNS
    );
    let item = sqlx::query_as::<_, CartItem>(&sql)
      .bind(session_key)
      .bind(product_id)
      .bind(quantity)
      .bind(cap)
      .fetch_one(&self.pool)
      .await?;
    Ok(item)
  }

  async fn set_quantity(&self, session_key: &str, product_id: i32, quantity: i32) -> Result<Option<CartItem>> {
    let sql = format!(
      "UPDATE cart_items SET quantity = $3 WHERE session_key = $1 AND product_id = $2 RETURNING {}",
      CART_ITEM_COLUMNS
    );
    let row = sqlx::query_as::<_, CartItem>(&sql)
      .bind(session_key)
      .bind(product_id)
      .bind(quantity)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row)
  }

  async fn remove_item(&self, session_key: &str, product_id: i32) -> Result<bool> {
    let result = sqlx::query("DELETE FROM cart_items WHERE session_key = $1 AND product_id = $2")
      .bind(session_key)
      .bind(product_id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }
}

#[async_trait]
impl UserStore for PgStore {
  async fn create_user(&self, new_user: NewUser) -> Result<User> {
    let sql = format!(
      "INSERT INTO users (username, email, first_name, last_name, password_hash, date_joined)
       VALUES ($1, $2, $3, $4, $5, NOW())
       RETURNING {}",
      USER_COLUMNS
    );
    sqlx::query_as::<_, User>(&sql)
      .bind(&new_user.username)
      .bind(&new_user.email)
      .bind(&new_user.first_name)
      .bind(&new_user.last_name)
      .bind(&new_user.password_hash)
      .fetch_one(&self.pool)
      .await
      .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => ShopError::validation(USERNAME_TAKEN),
        other => {
          error!(error = %other, "Failed to insert user.");
          ShopError::Database(other)
        }
      })
  }

  async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
    let row = sqlx::query_as::<_, User>(&sql)
      .bind(username)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row)
  }

  async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
    let row = sqlx::query_as::<_, User>(&sql)
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row)
  }

  async fn update_password(&self, id: i64, password_hash: &str) -> Result<()> {
    let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
      .bind(id)
      .bind(password_hash)
      .execute(&self.pool)
      .await?;
    if result.rows_affected() == 0 {
      return Err(ShopError::not_found("User not found"));
    }
    Ok(())
  }
}
