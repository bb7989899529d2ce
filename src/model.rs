//! Inverse-time Critical Power model fitting
//!
//! Fits the two-parameter model P = W'/t + CP to mean power outputs of timed
//! efforts. Substituting x = 1/t makes the model linear (y = W'·x + CP), so
//! the fit is an ordinary least-squares regression solved via the closed-form
//! normal equations. With exactly two samples this reduces to the exact
//! two-point solution; with three or more it is a genuine least-squares fit
//! tolerant of measurement noise.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CpFitError, Result};

/// Result of one inverse-time model fit
///
/// A pure computed snapshot with no shared state. `residuals_w`,
/// `durations_s`, and `powers_w` are aligned to the input sample order, an
/// invariant the residual table rendering relies on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Critical Power in watts (fitted intercept)
    pub cp_w: f64,
    /// W' in joules (fitted slope in the 1/t transform)
    pub wprime_j: f64,
    /// Coefficient of determination; `None` when all observed powers are
    /// identical (zero total variance makes r² undefined)
    pub r2: Option<f64>,
    /// Per-sample residuals, actual minus predicted power, input order
    pub residuals_w: Vec<f64>,
    /// Echoed input durations, input order
    pub durations_s: Vec<f64>,
    /// Echoed input powers, input order
    pub powers_w: Vec<f64>,
}

impl FitResult {
    /// W' expressed in kilojoules
    pub fn wprime_kj(&self) -> f64 {
        self.wprime_j / 1000.0
    }

    /// Model-predicted power for a duration, P = W'/t + CP
    pub fn predicted_power(&self, duration_s: f64) -> f64 {
        self.wprime_j / duration_s + self.cp_w
    }
}

/// Inverse-time model fitter
pub struct CpModel;

impl CpModel {
    /// Fit CP and W' via least squares to P = W'/t + CP
    ///
    /// `powers` in watts and `durations` in seconds must have equal length of
    /// at least 2, contain only finite values, and every duration must be
    /// strictly positive. All checks run before any computation; a violation
    /// fails with `InvalidInput` naming the condition. Identical durations
    /// across all samples make the design matrix singular and fail with
    /// `DegenerateInput`.
    pub fn fit(powers: &[f64], durations: &[f64]) -> Result<FitResult> {
        if powers.len() != durations.len() || powers.len() < 2 {
            return Err(CpFitError::InvalidInput(
                "length mismatch or fewer than 2 samples".to_string(),
            ));
        }

        if powers.iter().chain(durations.iter()).any(|v| !v.is_finite()) {
            return Err(CpFitError::InvalidInput(
                "all powers and durations must be finite numbers".to_string(),
            ));
        }

        if durations.iter().any(|&t| t <= 0.0) {
            return Err(CpFitError::InvalidInput(
                "all durations must be > 0 seconds".to_string(),
            ));
        }

        // Linear regression of P against 1/t: y = a·x + b with a = W', b = CP
        let n = powers.len() as f64;
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        let mut sum_xx = 0.0;
        let mut sum_xy = 0.0;

        for (&p, &t) in powers.iter().zip(durations.iter()) {
            let x = 1.0 / t;
            sum_x += x;
            sum_y += p;
            sum_xx += x * x;
            sum_xy += x * p;
        }

        // Scale-relative singularity check: the denominator vanishes exactly
        // when all durations coincide, regardless of their magnitude.
        let denominator = n * sum_xx - sum_x * sum_x;
        if denominator.abs() <= n * sum_xx * 1e-12 {
            return Err(CpFitError::DegenerateInput(
                "durations do not vary; cannot fit the inverse-time model".to_string(),
            ));
        }

        let wprime_j = (n * sum_xy - sum_x * sum_y) / denominator;
        let cp_w = (sum_y - wprime_j * sum_x) / n;

        // Diagnostics: residuals in input order, r² from ss_res / ss_tot
        let mean_y = sum_y / n;
        let mut residuals_w = Vec::with_capacity(powers.len());
        let mut ss_res = 0.0;
        let mut ss_tot = 0.0;

        for (&p, &t) in powers.iter().zip(durations.iter()) {
            let predicted = wprime_j / t + cp_w;
            let residual = p - predicted;
            residuals_w.push(residual);
            ss_res += residual * residual;
            ss_tot += (p - mean_y) * (p - mean_y);
        }

        let r2 = if ss_tot > 0.0 {
            Some(1.0 - ss_res / ss_tot)
        } else {
            None
        };

        debug!(cp_w, wprime_j, ?r2, samples = powers.len(), "fitted inverse-time model");

        Ok(FitResult {
            cp_w,
            wprime_j,
            r2,
            residuals_w,
            durations_s: durations.to_vec(),
            powers_w: powers.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn test_two_point_fit_is_exact() {
        // Two samples with distinct durations are reproduced exactly
        let result = CpModel::fit(&[350.0, 280.0], &[180.0, 720.0]).unwrap();

        assert!(result.residuals_w.iter().all(|r| r.abs() < 1e-6));
        assert!((result.r2.unwrap() - 1.0).abs() < 1e-6);
        assert!((result.predicted_power(180.0) - 350.0).abs() < 1e-6);
        assert!((result.predicted_power(720.0) - 280.0).abs() < 1e-6);
    }

    #[test]
    fn test_three_point_regression_baseline() {
        // Realistic 3/5/12-minute protocol; exact least-squares solution is
        // cp = 116295/507 W and W' = 2826000/169 J
        let result = CpModel::fit(&[320.0, 290.0, 250.0], &[180.0, 300.0, 720.0]).unwrap();

        assert!((result.cp_w - 116295.0 / 507.0).abs() < 1e-6);
        assert!((result.wprime_j - 2826000.0 / 169.0).abs() < 1e-6);
        assert!(result.r2.unwrap() > 0.95);
        assert!((result.r2.unwrap() - 0.985487).abs() < 1e-4);
    }

    #[test]
    fn test_residuals_match_model_prediction() {
        let powers = [331.0, 288.0, 255.0, 244.0];
        let durations = [120.0, 300.0, 600.0, 1200.0];
        let result = CpModel::fit(&powers, &durations).unwrap();

        for i in 0..powers.len() {
            let expected = powers[i] - (result.wprime_j / durations[i] + result.cp_w);
            assert!((result.residuals_w[i] - expected).abs() < TOL);
        }
        assert_eq!(result.durations_s, durations.to_vec());
        assert_eq!(result.powers_w, powers.to_vec());
    }

    #[test]
    fn test_r2_bounded_above_by_one() {
        let result = CpModel::fit(&[400.0, 260.0, 285.0], &[60.0, 600.0, 300.0]).unwrap();
        assert!(result.r2.unwrap() <= 1.0);
    }

    #[test]
    fn test_r2_undefined_for_constant_powers() {
        // All powers identical: zero total variance, r² is not applicable
        let result = CpModel::fit(&[250.0, 250.0, 250.0], &[180.0, 300.0, 720.0]).unwrap();
        assert_eq!(result.r2, None);
        // The flat line is still a valid fit
        assert!(result.residuals_w.iter().all(|r| r.abs() < 1e-6));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = CpModel::fit(&[320.0, 290.0], &[180.0, 300.0, 720.0]).unwrap_err();
        assert!(matches!(err, CpFitError::InvalidInput(_)));
        assert!(err.to_string().contains("length mismatch"));
    }

    #[test]
    fn test_too_few_samples_rejected() {
        let err = CpModel::fit(&[320.0], &[180.0]).unwrap_err();
        assert!(matches!(err, CpFitError::InvalidInput(_)));

        let err = CpModel::fit(&[], &[]).unwrap_err();
        assert!(matches!(err, CpFitError::InvalidInput(_)));
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let err = CpModel::fit(&[320.0, f64::NAN], &[180.0, 300.0]).unwrap_err();
        assert!(matches!(err, CpFitError::InvalidInput(_)));

        let err = CpModel::fit(&[320.0, 290.0], &[f64::INFINITY, 300.0]).unwrap_err();
        assert!(matches!(err, CpFitError::InvalidInput(_)));
    }

    #[test]
    fn test_non_positive_duration_rejected() {
        let err = CpModel::fit(&[320.0, 290.0], &[0.0, 300.0]).unwrap_err();
        assert!(matches!(err, CpFitError::InvalidInput(_)));

        let err = CpModel::fit(&[320.0, 290.0], &[-180.0, 300.0]).unwrap_err();
        assert!(matches!(err, CpFitError::InvalidInput(_)));
    }

    #[test]
    fn test_identical_durations_are_degenerate() {
        // Same duration twice leaves the design matrix singular
        let err = CpModel::fit(&[320.0, 290.0], &[300.0, 300.0]).unwrap_err();
        assert!(matches!(err, CpFitError::DegenerateInput(_)));

        let err = CpModel::fit(&[320.0, 290.0, 250.0], &[300.0, 300.0, 300.0]).unwrap_err();
        assert!(matches!(err, CpFitError::DegenerateInput(_)));
    }

    #[test]
    fn test_result_serializes() {
        let result = CpModel::fit(&[250.0, 250.0], &[180.0, 720.0]).unwrap();
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"r2\":null"));

        let back: FitResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }

    // Property-based tests using proptest
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_fit_properties(
            p1 in 150.0f64..500.0,
            p2 in 150.0f64..500.0,
            p3 in 150.0f64..500.0,
            // distinct duration ranges keep the design matrix well-conditioned
            t1 in 60.0f64..240.0,
            t2 in 250.0f64..500.0,
            t3 in 550.0f64..1800.0,
        ) {
            let powers = [p1, p2, p3];
            let durations = [t1, t2, t3];
            let result = CpModel::fit(&powers, &durations);

            prop_assert!(result.is_ok());
            let fit = result.unwrap();

            // residual identity holds elementwise
            for i in 0..3 {
                let expected = powers[i] - (fit.wprime_j / durations[i] + fit.cp_w);
                prop_assert!((fit.residuals_w[i] - expected).abs() < 1e-6);
            }

            // r² never exceeds 1 when defined
            if let Some(r2) = fit.r2 {
                prop_assert!(r2 <= 1.0 + 1e-12);
            }

            prop_assert_eq!(fit.durations_s, durations.to_vec());
            prop_assert_eq!(fit.powers_w, powers.to_vec());
        }
    }
}
