//! Core type definitions

use serde::{Deserialize, Serialize};

/// Class label type. Digit datasets use 0-9, but any integer is accepted.
pub type Label = i64;

/// Result of solving one binary SVM dual problem
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Lagrange multipliers (alpha values), one per training sample
    pub alpha: Vec<f64>,
    /// Bias term (b) of the decision function `sum(alpha_i * y_i * K(x_i, x)) + b`
    pub b: f64,
    /// Indices of support vectors (where alpha > 0)
    pub support_vectors: Vec<usize>,
    /// Number of iterations performed
    pub iterations: usize,
    /// Final dual objective value
    pub objective_value: f64,
}

/// Configuration for the SMO solver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Regularization parameter (upper bound for alpha)
    pub c: f64,
    /// Stopping tolerance on the maximal KKT violation
    pub epsilon: f64,
    /// Maximum number of iterations per binary problem
    pub max_iterations: usize,
    /// Kernel cache size in bytes
    pub cache_size: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            epsilon: 0.001,
            max_iterations: 100_000,
            cache_size: 100_000_000, // 100MB
        }
    }
}

impl OptimizerConfig {
    /// Check that parameters describe a solvable problem
    pub fn validate(&self) -> crate::core::Result<()> {
        if !(self.c > 0.0 && self.c.is_finite()) {
            return Err(crate::core::SVMError::InvalidParameter(format!(
                "C must be positive and finite, got: {}",
                self.c
            )));
        }
        if !(self.epsilon > 0.0 && self.epsilon.is_finite()) {
            return Err(crate::core::SVMError::InvalidParameter(format!(
                "epsilon must be positive and finite, got: {}",
                self.epsilon
            )));
        }
        if self.max_iterations == 0 {
            return Err(crate::core::SVMError::InvalidParameter(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
