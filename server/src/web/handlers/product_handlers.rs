// server/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpRequest, HttpResponse};
use primebasket::catalog::{ListQuery, ProductPage};
use primebasket::models::ProductView;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PageResponse {
  pub count: i64,
  pub next: Option<String>,
  pub previous: Option<String>,
  pub results: Vec<ProductView>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  #[serde(default)]
  pub q: String,
}

/// Absolute URL of the current request.
fn request_url(req: &HttpRequest) -> Option<Url> {
  let conn = req.connection_info();
  Url::parse(&format!("{}://{}{}", conn.scheme(), conn.host(), req.uri())).ok()
}

/// `url` with its `page` parameter replaced. Page 1 drops the parameter.
pub fn page_link(url: &Url, page: i64) -> String {
  let kept: Vec<(String, String)> = url
    .query_pairs()
    .filter(|(k, _)| k != "page")
    .map(|(k, v)| (k.into_owned(), v.into_owned()))
    .collect();

  let mut link = url.clone();
  link.set_query(None);
  {
    let mut pairs = link.query_pairs_mut();
    for (k, v) in &kept {
      pairs.append_pair(k, v);
    }
    if page > 1 {
      pairs.append_pair("page", &page.to_string());
    }
  }
  if link.query() == Some("") {
    link.set_query(None);
  }
  link.to_string()
}

fn page_response(req: &HttpRequest, page: ProductPage) -> PageResponse {
  let url = request_url(req);
  let link = |target: i64| url.as_ref().map(|u| page_link(u, target));
  PageResponse {
    count: page.count,
    next: if page.has_next() { link(page.page + 1) } else { None },
    previous: if page.has_previous() { link(page.page - 1) } else { None },
    results: page.results,
  }
}

#[instrument(name = "handler::list_products", skip(app_state, req, query), fields(query = %req.query_string()))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
  let page = app_state.shop.catalog.list_products(req.query_string(), &query).await?;
  debug!(count = page.count, page = page.page, "Listing products.");
  Ok(HttpResponse::Ok().json(page_response(&req, page)))
}

#[instrument(name = "handler::get_product", skip(app_state))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  product_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
  let detail = app_state.shop.catalog.get_product(product_id.into_inner()).await?;
  Ok(HttpResponse::Ok().json(detail))
}

#[instrument(name = "handler::search", skip(app_state, params), fields(q = %params.q))]
pub async fn search_handler(
  app_state: web::Data<AppState>,
  params: web::Query<SearchParams>,
) -> Result<HttpResponse, AppError> {
  let results = app_state.shop.catalog.search(&params.q).await?;
  Ok(HttpResponse::Ok().json(results))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn page_link_replaces_page_and_keeps_other_params() {
    let url = Url::parse("http://localhost:8080/api/shop/products/?brand=lays&page=2&page_size=3").unwrap();
    assert_eq!(
      page_link(&url, 3),
      "http://localhost:8080/api/shop/products/?brand=lays&page_size=3&page=3"
    );
    assert_eq!(
      page_link(&url, 1),
      "http://localhost:8080/api/shop/products/?brand=lays&page_size=3"
    );
  }

  #[test]
  fn first_page_without_other_params_has_no_query() {
    let url = Url::parse("http://localhost/api/shop/products/?page=2").unwrap();
    assert_eq!(page_link(&url, 1), "http://localhost/api/shop/products/");
  }
}
