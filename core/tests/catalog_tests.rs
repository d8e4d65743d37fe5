// tests/catalog_tests.rs
mod common;

use common::{new_product, setup_tracing, shop_over, test_shop};
use primebasket::catalog::ListQuery;
use primebasket::{MemoryStore, ShopError};
use std::sync::Arc;

fn list_query(pairs: &[(&str, &str)]) -> ListQuery {
  let mut q = ListQuery::default();
  for (k, v) in pairs {
    let v = Some(v.to_string());
    match *k {
      "category" => q.category = v,
      "brand" => q.brand = v,
      "sort" => q.sort = v,
      "page" => q.page = v,
      "page_size" => q.page_size = v,
      other => panic!("unknown key {}", other),
    }
  }
  q
}

fn raw(pairs: &[(&str, &str)]) -> String {
  pairs
    .iter()
    .map(|(k, v)| format!("{}={}", k, v))
    .collect::<Vec<_>>()
    .join("&")
}

async fn listed_ids(shop: &primebasket::Shop, pairs: &[(&str, &str)]) -> Vec<i32> {
  let page = shop
    .catalog
    .list_products(&raw(pairs), &list_query(pairs))
    .await
    .unwrap();
  page.results.iter().map(|p| p.id).collect()
}

#[tokio::test]
async fn default_listing_is_insertion_order() {
  setup_tracing();
  let (shop, _store) = test_shop();
  let page = shop.catalog.list_products("", &ListQuery::default()).await.unwrap();

  assert_eq!(page.count, 10);
  assert_eq!(page.page, 1);
  assert_eq!(page.page_size, 24);
  assert_eq!(page.num_pages, 1);
  assert!(!page.has_next());
  assert!(!page.has_previous());
  let ids: Vec<i32> = page.results.iter().map(|p| p.id).collect();
  assert_eq!(ids, (1..=10).collect::<Vec<_>>());
}

#[tokio::test]
async fn filters_are_case_insensitive_and_sentinels_are_ignored() {
  setup_tracing();
  let (shop, _store) = test_shop();

  assert_eq!(listed_ids(&shop, &[("category", "foodGRAINS")]).await, vec![1, 2, 6]);
  assert_eq!(listed_ids(&shop, &[("brand", "TETLEY")]).await, vec![7, 10]);
  assert_eq!(
    listed_ids(&shop, &[("category", "Snacks"), ("brand", "lays")]).await,
    vec![4, 5]
  );
  assert_eq!(listed_ids(&shop, &[("category", "all categories")]).await.len(), 10);
  assert_eq!(listed_ids(&shop, &[("brand", "All Brands")]).await.len(), 10);
}

#[tokio::test]
async fn sorts_order_results_with_id_tie_break() {
  setup_tracing();
  let (shop, _store) = test_shop();

  assert_eq!(
    listed_ids(&shop, &[("sort", "price_asc")]).await,
    vec![4, 5, 9, 8, 3, 10, 7, 2, 1, 6]
  );
  assert_eq!(
    listed_ids(&shop, &[("sort", "price_desc")]).await,
    vec![6, 1, 2, 7, 10, 3, 8, 9, 4, 5]
  );
  assert_eq!(
    listed_ids(&shop, &[("sort", "discount")]).await,
    vec![6, 3, 5, 9, 10, 1, 4, 7, 2, 8]
  );
  assert_eq!(
    listed_ids(&shop, &[("category", "snacks"), ("sort", "rating")]).await,
    vec![9, 5, 4]
  );
  assert_eq!(
    listed_ids(&shop, &[("category", "snacks"), ("sort", "rating_desc")]).await,
    vec![9, 5, 4]
  );
  assert_eq!(
    listed_ids(&shop, &[("sort", "newest")]).await,
    (1..=10).collect::<Vec<_>>()
  );
}

#[tokio::test]
async fn pagination_bounds() {
  setup_tracing();
  let (shop, _store) = test_shop();

  let pairs = [("page_size", "3"), ("page", "4")];
  let page = shop.catalog.list_products(&raw(&pairs), &list_query(&pairs)).await.unwrap();
  assert_eq!(page.count, 10);
  assert_eq!(page.num_pages, 4);
  assert!(page.has_previous());
  assert!(!page.has_next());
  assert_eq!(page.results.iter().map(|p| p.id).collect::<Vec<_>>(), vec![10]);

  let pairs = [("page_size", "3"), ("page", "5")];
  match shop.catalog.list_products(&raw(&pairs), &list_query(&pairs)).await {
    Err(ShopError::NotFound(m)) => assert_eq!(m, "Invalid page."),
    other => panic!("unexpected: {:?}", other),
  }

  let pairs = [("page_size", "500")];
  let page = shop.catalog.list_products(&raw(&pairs), &list_query(&pairs)).await.unwrap();
  assert_eq!(page.page_size, 100);
}

#[tokio::test]
async fn empty_result_has_a_first_page() {
  setup_tracing();
  let (shop, _store) = test_shop();

  let pairs = [("category", "Dairy")];
  let page = shop.catalog.list_products(&raw(&pairs), &list_query(&pairs)).await.unwrap();
  assert_eq!(page.count, 0);
  assert_eq!(page.num_pages, 1);
  assert!(page.results.is_empty());

  let pairs = [("category", "Dairy"), ("page", "2")];
  assert!(matches!(
    shop.catalog.list_products(&raw(&pairs), &list_query(&pairs)).await,
    Err(ShopError::NotFound(_))
  ));
}

#[tokio::test]
async fn identical_query_strings_hit_the_cache() {
  setup_tracing();
  let (shop, store) = test_shop();

  assert_eq!(listed_ids(&shop, &[("brand", "lays")]).await, vec![4, 5]);
  store.insert_product(new_product("Cream Onion Chips", "Snacks", "Lays", 2000, None, None));

  // Same query string: served from cache.
  assert_eq!(listed_ids(&shop, &[("brand", "lays")]).await, vec![4, 5]);
  // A different query string is a different key.
  assert_eq!(listed_ids(&shop, &[("brand", "Lays")]).await, vec![4, 5, 11]);
}

#[tokio::test]
async fn product_detail_ranks_related_lists() {
  setup_tracing();
  let (shop, _store) = test_shop();
  let detail = shop.catalog.get_product(1).await.unwrap();

  assert_eq!(detail.product.product, "Basmati Rice");
  let similar: Vec<i32> = detail.similar_products.iter().map(|p| p.id).collect();
  assert_eq!(similar, vec![2, 6]);

  // 3: 4.0*2+20, 6: NaN rating counts as 0 so 25, 5 and 9: 23.8, 2: same brand 8.2.
  let recommended: Vec<i32> = detail.recommended_products.iter().map(|p| p.id).collect();
  assert_eq!(recommended.len(), 5);
  assert_eq!(&recommended[..2], &[3, 6]);
  assert!(recommended[2..4].contains(&5) && recommended[2..4].contains(&9));
  assert_eq!(recommended[4], 2);
}

#[tokio::test]
async fn related_lists_exclude_self_and_cap_at_five() {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  for i in 0..12 {
    store.insert_product(new_product(&format!("Mango Juice {}", i), "Beverages", "Frooti", 5000, Some(4.0), Some(30.0)));
  }
  let shop = shop_over(store);

  for id in 1..=12 {
    let detail = shop.catalog.get_product(id).await.unwrap();
    assert_eq!(detail.similar_products.len(), 5);
    assert_eq!(detail.recommended_products.len(), 5);
    assert!(detail.similar_products.iter().all(|p| p.id != id));
    assert!(detail.recommended_products.iter().all(|p| p.id != id));
  }
}

#[tokio::test]
async fn unknown_product_is_not_found() {
  setup_tracing();
  let (shop, _store) = test_shop();
  match shop.catalog.get_product(404).await {
    Err(ShopError::NotFound(m)) => assert_eq!(m, "Product not found"),
    other => panic!("unexpected: {:?}", other),
  }
}

#[tokio::test]
async fn non_finite_values_serialize_as_null() {
  setup_tracing();
  let (shop, _store) = test_shop();
  let detail = shop.catalog.get_product(6).await.unwrap();
  assert_eq!(detail.product.rating, None);

  let json = serde_json::to_value(&detail).unwrap();
  assert!(json["product"]["rating"].is_null());
  assert_eq!(json["product"]["discount"], serde_json::json!(25.0));
  assert_eq!(json["product"]["sale_price"], serde_json::json!(520.0));
}

#[tokio::test]
async fn empty_search_is_rejected() {
  setup_tracing();
  let (shop, _store) = test_shop();
  assert!(matches!(shop.catalog.search("   ").await, Err(ShopError::Validation(_))));
}

#[tokio::test]
async fn search_without_hits_is_empty() {
  setup_tracing();
  let (shop, _store) = test_shop();
  let found = shop.catalog.search("zzzz").await.unwrap();
  assert_eq!(found.count, 0);
  assert!(found.results.is_empty());
}

#[tokio::test]
async fn fuzzy_hits_rank_before_substring_hits() {
  setup_tracing();
  let (shop, _store) = test_shop();

  // Brown Rice scores highest, then Basmati Rice, then Sona Masoori Rice.
  let ids: Vec<i32> = shop.catalog.search(" RICE ").await.unwrap().results.iter().map(|p| p.id).collect();
  assert_eq!(ids, vec![2, 1, 6]);

  // Masala Potato Chips only matches as a substring.
  let ids: Vec<i32> = shop.catalog.search("chip").await.unwrap().results.iter().map(|p| p.id).collect();
  assert_eq!(ids, vec![4, 5]);

  // A typo only matches fuzzily.
  let ids: Vec<i32> = shop.catalog.search("ketchp").await.unwrap().results.iter().map(|p| p.id).collect();
  assert_eq!(ids, vec![3]);
}

#[tokio::test]
async fn search_is_capped_and_cached() {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  for i in 0..60 {
    store.insert_product(new_product(&format!("Rice Pack {}", i), "Foodgrains", "Generic", 1000, None, None));
  }
  let shop = shop_over(store.clone());

  let first = shop.catalog.search("rice").await.unwrap();
  assert_eq!(first.count, 50);

  store.remove_product(first.results[0].id);
  let again = shop.catalog.search("  Rice").await.unwrap();
  assert_eq!(again, first);
}
