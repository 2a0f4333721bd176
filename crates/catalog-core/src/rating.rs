//! Rating arithmetic.
//!
//! A product's rating is the arithmetic mean of the grades of its active
//! reviews. Storage backends select the grades and persist the result inside
//! the same transaction as the review write that changed them.

use crate::{Error, Result};

pub const MIN_GRADE: u8 = 1;
pub const MAX_GRADE: u8 = 5;

/// Rating of a product with no active reviews.
pub const EMPTY_RATING: f64 = 0.0;

/// Mean of `grades`, or [`EMPTY_RATING`] for an empty slice.
pub fn average(grades: &[u8]) -> f64 {
  if grades.is_empty() {
    return EMPTY_RATING;
  }
  let sum: u64 = grades.iter().map(|&g| u64::from(g)).sum();
  sum as f64 / grades.len() as f64
}

pub fn check_grade(grade: u8) -> Result<()> {
  if (MIN_GRADE..=MAX_GRADE).contains(&grade) {
    Ok(())
  } else {
    Err(Error::Validation(format!(
      "grade must be between {MIN_GRADE} and {MAX_GRADE}, got {grade}"
    )))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_set_is_sentinel() {
    assert_eq!(average(&[]), EMPTY_RATING);
  }

  #[test]
  fn mean_of_grades() {
    assert_eq!(average(&[5]), 5.0);
    assert_eq!(average(&[5, 3]), 4.0);
    assert_eq!(average(&[4, 2]), 3.0);
    assert!((average(&[5, 4, 4]) - 13.0 / 3.0).abs() < f64::EPSILON);
  }

  #[test]
  fn grade_bounds() {
    assert!(check_grade(1).is_ok());
    assert!(check_grade(5).is_ok());
    assert!(matches!(check_grade(0), Err(Error::Validation(_))));
    assert!(matches!(check_grade(6), Err(Error::Validation(_))));
  }
}
