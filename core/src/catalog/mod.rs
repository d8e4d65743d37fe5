// core/src/catalog/mod.rs

//! Product listing, single-product lookup and search.

pub mod ranking;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{event, instrument, Level};

use crate::cache::TtlCache;
use crate::error::{Result, ShopError};
use crate::models::{Product, ProductView};
use crate::similarity::TextSimilarity;
use crate::store::{CatalogStore, ProductFilter, ProductSort};

pub const DEFAULT_PAGE_SIZE: i64 = 24;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const RELATED_LIMIT: usize = 5;
pub const SEARCH_LIMIT: usize = 50;
pub const FUZZY_THRESHOLD: f64 = 0.2;
pub const RECOMMEND_MIN_DISCOUNT: f64 = 15.0;

const ALL_CATEGORIES: &str = "all categories";
const ALL_BRANDS: &str = "all brands";

/// Query string of the listing endpoint. Numbers are kept as text so a
/// malformed value is handled here rather than rejected by the parser.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
  pub category: Option<String>,
  pub brand: Option<String>,
  pub sort: Option<String>,
  pub page: Option<String>,
  pub page_size: Option<String>,
}

/// Empty values and the "all ..." sentinel mean no filter.
fn filter_value(raw: Option<&str>, sentinel: &str) -> Option<String> {
  let value = raw?.trim();
  if value.is_empty() || value.eq_ignore_ascii_case(sentinel) {
    None
  } else {
    Some(value.to_string())
  }
}

impl ListQuery {
  pub fn filter(&self) -> ProductFilter {
    ProductFilter {
      category: filter_value(self.category.as_deref(), ALL_CATEGORIES),
      brand: filter_value(self.brand.as_deref(), ALL_BRANDS),
      sort: self.sort.as_deref().map(ProductSort::parse).unwrap_or_default(),
    }
  }

  /// Values above the maximum are clamped; missing, malformed or
  /// non-positive values use the default.
  pub fn page_size(&self) -> i64 {
    match self.page_size.as_deref().map(str::trim).map(str::parse::<i64>) {
      Some(Ok(n)) if n >= 1 => n.min(MAX_PAGE_SIZE),
      _ => DEFAULT_PAGE_SIZE,
    }
  }

  /// The requested 1-based page. `last` resolves to `num_pages`.
  fn page_number(&self, num_pages: i64) -> Result<i64> {
    let invalid = || ShopError::not_found("Invalid page.");
    let page = match self.page.as_deref().map(str::trim) {
      None | Some("") => 1,
      Some("last") => num_pages,
      Some(raw) => raw.parse::<i64>().map_err(|_| invalid())?,
    };
    if page < 1 || page > num_pages {
      return Err(invalid());
    }
    Ok(page)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPage {
  pub count: i64,
  pub page: i64,
  pub page_size: i64,
  pub num_pages: i64,
  pub results: Vec<ProductView>,
}

impl ProductPage {
  pub fn has_next(&self) -> bool {
    self.page < self.num_pages
  }

  pub fn has_previous(&self) -> bool {
    self.page > 1
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDetail {
  pub product: ProductView,
  pub similar_products: Vec<ProductView>,
  pub recommended_products: Vec<ProductView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
  pub count: usize,
  pub results: Vec<ProductView>,
}

fn views(products: &[Product]) -> Vec<ProductView> {
  products.iter().map(ProductView::from).collect()
}

pub fn normalize_search_query(raw: &str) -> String {
  raw.trim().to_lowercase()
}

pub struct CatalogService {
  store: Arc<dyn CatalogStore>,
  similarity: Arc<dyn TextSimilarity>,
  pages: TtlCache<ProductPage>,
  details: TtlCache<ProductDetail>,
  searches: TtlCache<SearchResults>,
}

impl CatalogService {
  pub fn new(store: Arc<dyn CatalogStore>, similarity: Arc<dyn TextSimilarity>, ttl: std::time::Duration) -> Self {
    Self {
      store,
      similarity,
      pages: TtlCache::new(ttl),
      details: TtlCache::new(ttl),
      searches: TtlCache::new(ttl),
    }
  }

  /// One page of the filtered, sorted catalog. `raw_query` is the request's
  /// query string verbatim and keys the cache entry.
  #[instrument(name = "CatalogService::list_products", skip(self, query))]
  pub async fn list_products(&self, raw_query: &str, query: &ListQuery) -> Result<ProductPage> {
    let key = format!("products:{}", raw_query);
    self
      .pages
      .get_or_try_insert_with(&key, || self.load_page(query))
      .await
  }

  async fn load_page(&self, query: &ListQuery) -> Result<ProductPage> {
    let filter = query.filter();
    let page_size = query.page_size();
    let count = self.store.count_products(&filter).await?;
    // An empty catalog still has one (empty) page.
    let num_pages = ((count + page_size - 1) / page_size).max(1);
    let page = query.page_number(num_pages)?;

    let rows = self
      .store
      .list_products(&filter, (page - 1) * page_size, page_size)
      .await?;
    event!(Level::DEBUG, count, page, page_size, rows = rows.len(), "Loaded product page.");

    Ok(ProductPage {
      count,
      page,
      page_size,
      num_pages,
      results: views(&rows),
    })
  }

  #[instrument(name = "CatalogService::get_product", skip(self))]
  pub async fn get_product(&self, id: i32) -> Result<ProductDetail> {
    let key = format!("product:{}", id);
    self.details.get_or_try_insert_with(&key, || self.load_detail(id)).await
  }

  async fn load_detail(&self, id: i32) -> Result<ProductDetail> {
    let product = self
      .store
      .get_product(id)
      .await?
      .ok_or_else(|| ShopError::not_found("Product not found"))?;

    let same_category = self.store.products_in_category(&product.category, product.id).await?;
    let similar = ranking::rank_similar(&product, same_category, self.similarity.as_ref(), RELATED_LIMIT);

    let candidates = self
      .store
      .recommendation_candidates(&product.brand, RECOMMEND_MIN_DISCOUNT, product.id)
      .await?;
    let recommended = ranking::rank_recommended(&product, candidates, RELATED_LIMIT);

    Ok(ProductDetail {
      product: ProductView::from(&product),
      similar_products: views(&similar),
      recommended_products: views(&recommended),
    })
  }

  #[instrument(name = "CatalogService::search", skip(self))]
  pub async fn search(&self, raw_query: &str) -> Result<SearchResults> {
    let query = normalize_search_query(raw_query);
    if query.is_empty() {
      return Err(ShopError::validation("Search query is required"));
    }
    let key = format!("search:{}", query);
    self.searches.get_or_try_insert_with(&key, || self.load_search(&query)).await
  }

  async fn load_search(&self, query: &str) -> Result<SearchResults> {
    let fuzzy: Vec<(f64, i32)> = self
      .store
      .product_names()
      .await?
      .into_iter()
      .map(|(id, name)| (self.similarity.score(query, &name), id))
      .filter(|(score, _)| *score > FUZZY_THRESHOLD)
      .collect();

    // Fetch enough substring rows that the merge can still fill the limit
    // after dropping the ones already matched fuzzily.
    let substring_limit = (SEARCH_LIMIT + fuzzy.len()) as i64;
    let substring: Vec<i32> = self
      .store
      .search_substring(query, substring_limit)
      .await?
      .into_iter()
      .map(|p| p.id)
      .collect();

    let ids = ranking::merge_search_hits(fuzzy, substring, SEARCH_LIMIT);
    let mut found = self.store.products_by_ids(&ids).await?;
    found.sort_by_key(|p| ids.iter().position(|id| *id == p.id));

    event!(Level::DEBUG, %query, hits = found.len(), "Search finished.");
    Ok(SearchResults {
      count: found.len(),
      results: views(&found),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn query(page: Option<&str>, page_size: Option<&str>) -> ListQuery {
    ListQuery {
      page: page.map(String::from),
      page_size: page_size.map(String::from),
      ..ListQuery::default()
    }
  }

  #[test]
  fn page_size_defaults_and_clamps() {
    assert_eq!(query(None, None).page_size(), 24);
    assert_eq!(query(None, Some("10")).page_size(), 10);
    assert_eq!(query(None, Some("500")).page_size(), 100);
    assert_eq!(query(None, Some("0")).page_size(), 24);
    assert_eq!(query(None, Some("abc")).page_size(), 24);
  }

  #[test]
  fn page_number_bounds() {
    assert_eq!(query(None, None).page_number(3).unwrap(), 1);
    assert_eq!(query(Some("3"), None).page_number(3).unwrap(), 3);
    assert_eq!(query(Some("last"), None).page_number(3).unwrap(), 3);
    assert!(matches!(query(Some("4"), None).page_number(3), Err(ShopError::NotFound(_))));
    assert!(matches!(query(Some("0"), None).page_number(3), Err(ShopError::NotFound(_))));
    assert!(matches!(query(Some("two"), None).page_number(3), Err(ShopError::NotFound(_))));
  }

  #[test]
  fn sentinels_mean_no_filter() {
    let q = ListQuery {
      category: Some("All Categories".to_string()),
      brand: Some("  ".to_string()),
      sort: Some("rating_desc".to_string()),
      ..ListQuery::default()
    };
    let filter = q.filter();
    assert_eq!(filter.category, None);
    assert_eq!(filter.brand, None);
    assert_eq!(filter.sort, ProductSort::RatingDesc);
  }

  #[test]
  fn search_query_is_trimmed_and_folded() {
    assert_eq!(normalize_search_query("  Basmati RICE "), "basmati rice");
  }
}
