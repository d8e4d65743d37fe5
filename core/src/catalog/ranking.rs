// core/src/catalog/ranking.rs

//! Ordering rules for derived product lists.

use std::cmp::Ordering;

use crate::models::Product;
use crate::sanitize::finite_or_zero;
use crate::similarity::TextSimilarity;

/// Orders `(score, id)` pairs by descending score, then ascending id.
fn by_score_then_id(a: &(f64, i32), b: &(f64, i32)) -> Ordering {
  b.0.total_cmp(&a.0).then(a.1.cmp(&b.1))
}

fn top_by_score(mut scored: Vec<(f64, Product)>, limit: usize) -> Vec<Product> {
  scored.sort_by(|a, b| by_score_then_id(&(a.0, a.1.id), &(b.0, b.1.id)));
  scored.into_iter().take(limit).map(|(_, p)| p).collect()
}

/// Candidates ranked by name similarity to `anchor`.
pub fn rank_similar(
  anchor: &Product,
  candidates: Vec<Product>,
  similarity: &dyn TextSimilarity,
  limit: usize,
) -> Vec<Product> {
  let scored = candidates
    .into_iter()
    .filter(|c| c.id != anchor.id)
    .map(|c| (similarity.score(&anchor.product, &c.product), c))
    .collect();
  top_by_score(scored, limit)
}

/// `rating * 2 + discount`, missing or non-finite parts counting as zero.
pub fn recommendation_score(product: &Product) -> f64 {
  finite_or_zero(product.rating) * 2.0 + finite_or_zero(product.discount)
}

pub fn rank_recommended(anchor: &Product, candidates: Vec<Product>, limit: usize) -> Vec<Product> {
  let scored = candidates
    .into_iter()
    .filter(|c| c.id != anchor.id)
    .map(|c| (recommendation_score(&c), c))
    .collect();
  top_by_score(scored, limit)
}

/// Merges fuzzy hits and substring hits.
///
/// Fuzzy hits come first, highest score first. Substring hits that were not
/// already matched follow in ascending id. The result holds at most `limit`
/// ids.
pub fn merge_search_hits(mut fuzzy: Vec<(f64, i32)>, mut substring: Vec<i32>, limit: usize) -> Vec<i32> {
  fuzzy.sort_by(by_score_then_id);
  substring.sort_unstable();

  let mut ids: Vec<i32> = Vec::with_capacity(limit);
  for id in fuzzy.into_iter().map(|(_, id)| id).chain(substring) {
    if ids.len() == limit {
      break;
    }
    if !ids.contains(&id) {
      ids.push(id);
    }
  }
  ids
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::similarity::Trigram;
  use rust_decimal::Decimal;

  fn product(id: i32, name: &str, rating: Option<f64>, discount: Option<f64>) -> Product {
    Product {
      id,
      product: name.to_string(),
      category: "Snacks".to_string(),
      sub_category: None,
      brand: "Acme".to_string(),
      kind: None,
      description: None,
      market_price: Decimal::new(1000, 2),
      sale_price: Decimal::new(900, 2),
      rating,
      discount,
    }
  }

  #[test]
  fn recommendation_score_ignores_non_finite() {
    assert_eq!(recommendation_score(&product(1, "a", Some(4.0), Some(10.0))), 18.0);
    assert_eq!(recommendation_score(&product(1, "a", Some(f64::NAN), None)), 0.0);
    assert_eq!(recommendation_score(&product(1, "a", None, Some(f64::INFINITY))), 0.0);
  }

  #[test]
  fn recommended_ties_break_by_id() {
    let anchor = product(1, "anchor", None, None);
    let ranked = rank_recommended(
      &anchor,
      vec![
        product(9, "x", Some(4.0), Some(2.0)),
        product(3, "y", Some(4.0), Some(2.0)),
        product(5, "z", Some(5.0), Some(0.0)),
      ],
      5,
    );
    let ids: Vec<i32> = ranked.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![3, 9, 5]);
  }

  #[test]
  fn similar_excludes_anchor_and_caps() {
    let anchor = product(1, "Potato Chips", None, None);
    let mut candidates = vec![product(1, "Potato Chips", None, None)];
    for id in 2..10 {
      candidates.push(product(id, "Potato Chips Salted", None, None));
    }
    let ranked = rank_similar(&anchor, candidates, &Trigram, 5);
    assert_eq!(ranked.len(), 5);
    assert!(ranked.iter().all(|p| p.id != 1));
    let ids: Vec<i32> = ranked.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![2, 3, 4, 5, 6]);
  }

  #[test]
  fn merge_puts_fuzzy_first_and_dedups() {
    let ids = merge_search_hits(vec![(0.3, 8), (0.9, 4)], vec![8, 2, 6], 50);
    assert_eq!(ids, vec![4, 8, 2, 6]);
  }

  #[test]
  fn merge_respects_limit() {
    let ids = merge_search_hits(vec![(0.5, 1), (0.5, 2)], vec![3, 4], 3);
    assert_eq!(ids, vec![1, 2, 3]);
  }
}
