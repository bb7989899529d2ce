//! Fractional W' depletion pacing
//!
//! Computes the constant power that spends a given fraction of W' over a
//! given duration, from (P − CP) × duration = fraction × W'. The model
//! deliberately ignores W' reconstitution during the effort.

use crate::error::{CpFitError, Result};

/// Constant power (W) required to expend `fraction` of W' over `duration_s`
///
/// `fraction` must be non-negative; values above 1 are allowed so callers can
/// probe hypothetical over-depletion. No plausibility bound is placed on
/// `cp_w` or `wprime_j`; the solver trusts the caller's fitted parameters.
pub fn power_for_fraction(
    cp_w: f64,
    wprime_j: f64,
    fraction: f64,
    duration_s: f64,
) -> Result<f64> {
    if duration_s <= 0.0 {
        return Err(CpFitError::InvalidInput(
            "duration_s must be > 0".to_string(),
        ));
    }
    if fraction < 0.0 {
        return Err(CpFitError::InvalidInput(
            "fraction must be >= 0".to_string(),
        ));
    }

    Ok(cp_w + (fraction * wprime_j) / duration_s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CpFitError;

    #[test]
    fn test_reference_depletion_target() {
        // 70% of a 20 kJ reservoir over 3 minutes
        let power = power_for_fraction(250.0, 20000.0, 0.70, 180.0).unwrap();
        assert!((power - 327.7778).abs() < 1e-3);
    }

    #[test]
    fn test_zero_fraction_yields_cp() {
        let power = power_for_fraction(231.5, 18000.0, 0.0, 600.0).unwrap();
        assert_eq!(power, 231.5);
    }

    #[test]
    fn test_linear_in_fraction() {
        let cp = 250.0;
        let once = power_for_fraction(cp, 20000.0, 0.35, 180.0).unwrap();
        let twice = power_for_fraction(cp, 20000.0, 0.70, 180.0).unwrap();
        assert!(((twice - cp) - 2.0 * (once - cp)).abs() < 1e-9);
    }

    #[test]
    fn test_over_depletion_is_allowed() {
        // fraction > 1 is a legitimate sensitivity query
        let power = power_for_fraction(250.0, 20000.0, 1.5, 180.0).unwrap();
        assert!((power - (250.0 + 1.5 * 20000.0 / 180.0)).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_arguments_rejected() {
        let err = power_for_fraction(250.0, 20000.0, 0.70, 0.0).unwrap_err();
        assert!(matches!(err, CpFitError::InvalidInput(_)));

        let err = power_for_fraction(250.0, 20000.0, 0.70, -10.0).unwrap_err();
        assert!(matches!(err, CpFitError::InvalidInput(_)));

        let err = power_for_fraction(250.0, 20000.0, -0.1, 180.0).unwrap_err();
        assert!(matches!(err, CpFitError::InvalidInput(_)));
    }

    // Property-based tests using proptest
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_depletion_properties(
            cp in 100.0f64..400.0,
            wprime in 5000.0f64..40000.0,
            fraction in 0.0f64..1.5,
            duration in 30.0f64..3600.0,
        ) {
            let power = power_for_fraction(cp, wprime, fraction, duration);
            prop_assert!(power.is_ok());
            let power = power.unwrap();

            // never below CP, and doubling the fraction doubles the margin
            prop_assert!(power >= cp);
            let doubled = power_for_fraction(cp, wprime, 2.0 * fraction, duration).unwrap();
            prop_assert!(((doubled - cp) - 2.0 * (power - cp)).abs() < 1e-6);
        }
    }
}
