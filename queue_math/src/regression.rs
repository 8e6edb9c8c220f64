//! Weighted least-squares regression
//!
//! Closed-form weighted normal equations for a straight-line fit, plus the
//! leverage-aware standard error needed for prediction intervals. Weights
//! are arbitrary non-negative values; points with zero weight contribute
//! nothing to the fit but stay in the caller's bookkeeping.

use crate::{MathError, Result};

/// A fitted weighted straight line together with the dispersion statistics
/// required to build prediction intervals around it.
#[derive(Debug, Clone)]
pub struct WeightedLinearFit {
    /// Slope of the fitted line
    pub slope: f64,
    /// Intercept of the fitted line
    pub intercept: f64,
    /// Weighted mean of the x axis
    pub weighted_mean_x: f64,
    /// Weighted sum of squared x deviations (not normalized)
    pub weighted_var_x: f64,
    /// Weighted residual mean square
    pub residual_mean_square: f64,
    /// Sum of all weights
    pub sum_weights: f64,
    /// Degrees of freedom: sum of weights minus 2
    pub degrees_of_freedom: f64,
}

impl WeightedLinearFit {
    /// Fit y = slope * x + intercept by weighted least squares.
    ///
    /// Fails on mismatched input lengths, a degenerate design (zero weighted
    /// variance of x) or non-positive degrees of freedom.
    pub fn fit(x: &[f64], y: &[f64], weights: &[f64]) -> Result<Self> {
        if x.len() != y.len() || x.len() != weights.len() {
            return Err(MathError::InvalidInput(format!(
                "Mismatched input lengths: x={}, y={}, weights={}",
                x.len(),
                y.len(),
                weights.len()
            )));
        }
        if x.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot fit a line through zero points".to_string(),
            ));
        }

        let mut sum_w = 0.0;
        let mut sum_wx = 0.0;
        let mut sum_wy = 0.0;
        let mut sum_wxx = 0.0;
        let mut sum_wxy = 0.0;
        for i in 0..x.len() {
            let w = weights[i];
            sum_w += w;
            sum_wx += w * x[i];
            sum_wy += w * y[i];
            sum_wxx += w * x[i] * x[i];
            sum_wxy += w * x[i] * y[i];
        }

        let denom = sum_w * sum_wxx - sum_wx * sum_wx;
        if denom == 0.0 || !denom.is_finite() {
            return Err(MathError::CalculationError(
                "Degenerate design: weighted variance of x is zero".to_string(),
            ));
        }

        let slope = (sum_w * sum_wxy - sum_wx * sum_wy) / denom;
        let intercept = (sum_wy - slope * sum_wx) / sum_w;

        let weighted_mean_x = sum_wx / sum_w;
        let mut weighted_var_x = 0.0;
        let mut weighted_res_sq = 0.0;
        for i in 0..x.len() {
            let w = weights[i];
            let dx = x[i] - weighted_mean_x;
            weighted_var_x += w * dx * dx;
            let residual = y[i] - (slope * x[i] + intercept);
            weighted_res_sq += w * residual * residual;
        }

        let degrees_of_freedom = sum_w - 2.0;
        if degrees_of_freedom <= 0.0 {
            return Err(MathError::InsufficientData(format!(
                "Non-positive degrees of freedom: {degrees_of_freedom:.3}"
            )));
        }

        Ok(Self {
            slope,
            intercept,
            weighted_mean_x,
            weighted_var_x,
            residual_mean_square: weighted_res_sq / degrees_of_freedom,
            sum_weights: sum_w,
            degrees_of_freedom,
        })
    }

    /// Predicted y value at `x`.
    pub fn predict_at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Standard error of a new observation at `x`, including the leverage
    /// term `(x - mean)^2 / var`.
    pub fn standard_error_at(&self, x: f64) -> f64 {
        let dx = x - self.weighted_mean_x;
        let leverage = dx * dx / self.weighted_var_x;
        (self.residual_mean_square * (1.0 + 1.0 / self.sum_weights + leverage)).sqrt()
    }
}
