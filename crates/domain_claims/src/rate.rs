//! Rate validation
//!
//! The lecturer's authorized rate is the source of truth: a submitted rate
//! either matches it exactly or the claim is corrected to it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ClaimError;

/// Outcome of comparing a submitted rate to the authorized rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateCheck {
    /// The rate the lecturer submitted
    pub submitted_rate: Decimal,
    /// Whether the submitted rate equals the authorized rate
    pub matched: bool,
    /// The rate to store on the claim
    pub corrected_rate: Decimal,
}

/// Compares `submitted` against `authorized`
///
/// Comparison is exact decimal equality, so `500` and `500.00` match while
/// `500.01` does not. The corrected rate is always `authorized`.
///
/// # Errors
///
/// Returns `ClaimError::InvalidInput` if either rate is negative.
pub fn validate(submitted: Decimal, authorized: Decimal) -> Result<RateCheck, ClaimError> {
    if submitted < Decimal::ZERO {
        return Err(ClaimError::invalid_input(format!(
            "submitted hourly rate {} is negative",
            submitted
        )));
    }
    if authorized < Decimal::ZERO {
        return Err(ClaimError::invalid_input(format!(
            "authorized hourly rate {} is negative",
            authorized
        )));
    }

    Ok(RateCheck {
        submitted_rate: submitted,
        matched: submitted == authorized,
        corrected_rate: authorized,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_matching_rate() {
        let check = validate(dec!(500), dec!(500)).unwrap();
        assert!(check.matched);
        assert_eq!(check.corrected_rate, dec!(500));
    }

    #[test]
    fn test_scale_does_not_matter() {
        assert!(validate(dec!(500.00), dec!(500)).unwrap().matched);
    }

    #[test]
    fn test_no_tolerance() {
        let check = validate(dec!(500.01), dec!(500)).unwrap();
        assert!(!check.matched);
        assert_eq!(check.corrected_rate, dec!(500));
        assert_eq!(check.submitted_rate, dec!(500.01));
    }

    #[test]
    fn test_negative_rates_are_invalid() {
        assert!(matches!(validate(dec!(-1), dec!(500)), Err(ClaimError::InvalidInput(_))));
        assert!(matches!(validate(dec!(500), dec!(-0.5)), Err(ClaimError::InvalidInput(_))));
    }

    #[test]
    fn test_zero_is_valid() {
        assert!(validate(dec!(0), dec!(0)).unwrap().matched);
    }

    proptest! {
        #[test]
        fn prop_corrected_rate_is_always_authorized(
            submitted in 0i64..10_000_000,
            authorized in 0i64..10_000_000,
            scale in 0u32..4,
        ) {
            let submitted = Decimal::new(submitted, scale);
            let authorized = Decimal::new(authorized, 2);
            let check = validate(submitted, authorized).unwrap();
            prop_assert_eq!(check.corrected_rate, authorized);
            prop_assert_eq!(check.matched, submitted == authorized);
        }
    }
}
