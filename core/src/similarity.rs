// core/src/similarity.rs

//! Text similarity used to rank "similar products" and fuzzy search hits.

use std::collections::HashSet;

/// Scores how alike two strings are, from 0.0 (nothing shared) to 1.0.
pub trait TextSimilarity: Send + Sync {
  fn score(&self, a: &str, b: &str) -> f64;
}

/// Trigram similarity with the same word padding rules as PostgreSQL's
/// `pg_trgm`: lowercase, split on non-alphanumerics, pad every word with two
/// leading blanks and one trailing blank, then compare trigram sets.
#[derive(Debug, Default, Clone, Copy)]
pub struct Trigram;

impl TextSimilarity for Trigram {
  fn score(&self, a: &str, b: &str) -> f64 {
    let left = trigrams(a);
    let right = trigrams(b);
    if left.is_empty() || right.is_empty() {
      return 0.0;
    }
    let shared = left.intersection(&right).count();
    let union = left.len() + right.len() - shared;
    shared as f64 / union as f64
  }
}

fn trigrams(text: &str) -> HashSet<[char; 3]> {
  let mut out = HashSet::new();
  let lowered = text.to_lowercase();
  for word in lowered.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
    let padded: Vec<char> = "  ".chars().chain(word.chars()).chain(" ".chars()).collect();
    for window in padded.windows(3) {
      out.insert([window[0], window[1], window[2]]);
    }
  }
  out
}
