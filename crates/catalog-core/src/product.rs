//! Products and their denormalised rating.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, lifecycle::Lifecycle};

/// Maximum number of fractional digits accepted for a price.
pub const PRICE_SCALE: u32 = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
  pub product_id:  Uuid,
  pub name:        String,
  pub description: Option<String>,
  pub price:       Decimal,
  pub image_url:   Option<String>,
  pub stock:       u32,
  pub category_id: Uuid,
  pub lifecycle:   Lifecycle,
  /// Mean grade of the product's active reviews. Written only by the rating
  /// aggregator; see [`crate::rating`].
  pub rating:      f64,
}

/// Input to product create and update. There is no rating field: the rating
/// is derived, never supplied.
#[derive(Debug, Clone)]
pub struct NewProduct {
  pub name:        String,
  pub description: Option<String>,
  pub price:       Decimal,
  pub image_url:   Option<String>,
  pub stock:       u32,
  pub category_id: Uuid,
}

impl NewProduct {
  pub fn validate(&self) -> Result<()> { check_price(self.price) }
}

/// A price must be strictly positive with at most [`PRICE_SCALE`] decimal
/// places. Trailing zeros are ignored (`9.990` is accepted).
pub fn check_price(price: Decimal) -> Result<()> {
  if price <= Decimal::ZERO {
    return Err(Error::Validation(format!("price must be positive, got {price}")));
  }
  if price.normalize().scale() > PRICE_SCALE {
    return Err(Error::Validation(format!(
      "price must have at most {PRICE_SCALE} decimal places, got {price}"
    )));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  fn dec(s: &str) -> Decimal { Decimal::from_str(s).unwrap() }

  #[test]
  fn accepts_two_decimal_places() {
    assert!(check_price(dec("19.99")).is_ok());
    assert!(check_price(dec("5")).is_ok());
    assert!(check_price(dec("9.990")).is_ok());
  }

  #[test]
  fn rejects_non_positive() {
    assert!(matches!(check_price(dec("0")), Err(Error::Validation(_))));
    assert!(matches!(check_price(dec("-1.00")), Err(Error::Validation(_))));
  }

  #[test]
  fn rejects_sub_cent_precision() {
    assert!(matches!(check_price(dec("1.005")), Err(Error::Validation(_))));
  }
}
