// core/src/sanitize.rs

//! Normalization applied to every number before it leaves the crate.
//!
//! Rating and discount columns are nullable floats and can hold NaN; anything
//! that is not a finite number is emitted as null.

use rust_decimal::Decimal;

/// Rounds to two decimal places; `None` for missing or non-finite input.
pub fn finite_round2(value: Option<f64>) -> Option<f64> {
  let v = value.filter(|v| v.is_finite())?;
  let rounded = (v * 100.0).round() / 100.0;
  rounded.is_finite().then_some(rounded)
}

/// Treats a missing or non-finite value as zero. Used by scoring, never for
/// output.
pub fn finite_or_zero(value: Option<f64>) -> f64 {
  value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

pub fn price_round2(value: Decimal) -> Decimal {
  value.round_dp(2)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::str::FromStr;

  #[test]
  fn rounds_to_two_places() {
    assert_eq!(finite_round2(Some(4.256)), Some(4.26));
    assert_eq!(finite_round2(Some(3.0)), Some(3.0));
    assert_eq!(finite_round2(Some(-1.234)), Some(-1.23));
  }

  #[test]
  fn non_finite_becomes_none() {
    assert_eq!(finite_round2(Some(f64::NAN)), None);
    assert_eq!(finite_round2(Some(f64::INFINITY)), None);
    assert_eq!(finite_round2(Some(f64::NEG_INFINITY)), None);
    assert_eq!(finite_round2(None), None);
  }

  #[test]
  fn overflow_while_rounding_becomes_none() {
    assert_eq!(finite_round2(Some(f64::MAX)), None);
  }

  #[test]
  fn scoring_treats_nan_as_zero() {
    assert_eq!(finite_or_zero(Some(f64::NAN)), 0.0);
    assert_eq!(finite_or_zero(None), 0.0);
    assert_eq!(finite_or_zero(Some(4.5)), 4.5);
  }

  #[test]
  fn prices_keep_two_places() {
    let price = Decimal::from_str("199.999").unwrap();
    assert_eq!(price_round2(price), Decimal::from_str("200.00").unwrap());
  }
}
