//! Sequential Minimal Optimization (SMO) solver implementation
//!
//! Solves the binary C-SVM dual
//!
//! ```text
//! min  1/2 a^T Q a - e^T a    subject to  0 <= a_i <= C,  y^T a = 0
//! ```
//!
//! with `Q_ij = y_i y_j K(x_i, x_j)`, two variables at a time. The working pair
//! is the maximal violating pair with second-order selection of the partner
//! (Fan, Chen and Lin, 2005), and the gradient is kept up to date from cached
//! kernel columns.

use crate::cache::KernelCache;
use crate::core::{OptimizationResult, OptimizerConfig, Result, SVMError};
use crate::kernel::Kernel;
use log::{debug, warn};
use ndarray::ArrayView2;
use std::sync::Arc;

/// Replacement for non-positive curvature along the working pair direction
const TAU: f64 = 1e-12;

/// SMO solver for binary SVM optimization
pub struct SMOSolver<K: Kernel> {
    kernel: Arc<K>,
    config: OptimizerConfig,
}

/// Mutable state of one solve
struct SolverState {
    alpha: Vec<f64>,
    gradient: Vec<f64>,
    diagonal: Vec<f64>,
}

impl<K: Kernel> SMOSolver<K> {
    /// Create a new SMO solver with the given kernel and configuration
    pub fn new(kernel: Arc<K>, config: OptimizerConfig) -> Self {
        Self { kernel, config }
    }

    /// Solve the SVM optimization problem
    ///
    /// `x` holds one sample per row and `y` the matching labels, each +1 or -1.
    /// Both classes must be present.
    pub fn solve(&self, x: ArrayView2<f64>, y: &[f64]) -> Result<OptimizationResult> {
        let mut cache = KernelCache::with_memory_limit(self.config.cache_size, x.nrows());
        self.solve_with_cache(x, y, &mut cache)
    }

    /// Solve the SVM optimization problem with a caller-provided kernel cache
    ///
    /// The cache must belong to this exact `x`; column indices are row indices.
    pub fn solve_with_cache(
        &self,
        x: ArrayView2<f64>,
        y: &[f64],
        cache: &mut KernelCache,
    ) -> Result<OptimizationResult> {
        let n = x.nrows();
        if n == 0 {
            return Err(SVMError::EmptyDataset);
        }
        if y.len() != n {
            return Err(SVMError::SampleCountMismatch {
                features: n,
                labels: y.len(),
            });
        }
        if let Some(&bad) = y.iter().find(|&&label| label != 1.0 && label != -1.0) {
            return Err(SVMError::InvalidParameter(format!(
                "binary labels must be -1 or +1, got {bad}"
            )));
        }
        if !y.iter().any(|&label| label > 0.0) || !y.iter().any(|&label| label < 0.0) {
            return Err(SVMError::InvalidDataset(
                "binary problem needs samples of both classes".to_string(),
            ));
        }

        let c = self.config.c;
        let mut state = SolverState {
            alpha: vec![0.0; n],
            // Gradient of the dual objective at alpha = 0 is -e
            gradient: vec![-1.0; n],
            diagonal: x
                .rows()
                .into_iter()
                .map(|row| self.kernel.compute(row, row))
                .collect(),
        };

        let mut iterations = 0;
        while iterations < self.config.max_iterations {
            let Some((i, j)) = self.select_working_set(x, y, &state, cache) else {
                break;
            };

            let col_i = cache.column(self.kernel.as_ref(), x, i);
            let col_j = cache.column(self.kernel.as_ref(), x, j);

            // Move along d (d_i = y_i, d_j = -y_j), which keeps y^T a constant
            let mut eta = state.diagonal[i] + state.diagonal[j] - 2.0 * col_i[j];
            if eta <= 0.0 {
                eta = TAU;
            }
            let unclipped = (-y[i] * state.gradient[i] + y[j] * state.gradient[j]) / eta;

            let room_i = if y[i] > 0.0 { c - state.alpha[i] } else { state.alpha[i] };
            let room_j = if y[j] > 0.0 { state.alpha[j] } else { c - state.alpha[j] };
            let step = unclipped.min(room_i).min(room_j);

            // Snap to the bound exactly so box membership tests stay exact
            state.alpha[i] = if step == room_i {
                if y[i] > 0.0 { c } else { 0.0 }
            } else {
                state.alpha[i] + y[i] * step
            };
            state.alpha[j] = if step == room_j {
                if y[j] > 0.0 { 0.0 } else { c }
            } else {
                state.alpha[j] - y[j] * step
            };

            for (k, g) in state.gradient.iter_mut().enumerate() {
                *g += y[k] * step * (col_i[k] - col_j[k]);
            }

            iterations += 1;
        }

        if iterations >= self.config.max_iterations {
            warn!(
                "SMO reached the iteration limit ({}) before converging",
                self.config.max_iterations
            );
        }

        let b = -self.calculate_rho(y, &state);
        let support_vectors: Vec<usize> = state
            .alpha
            .iter()
            .enumerate()
            .filter_map(|(i, &a)| if a > 0.0 { Some(i) } else { None })
            .collect();
        let objective_value = self.calculate_objective(&state);

        debug!(
            "SMO finished: n={n}, iterations={iterations}, support vectors={}, cache hit rate={:.3}",
            support_vectors.len(),
            cache.hit_rate()
        );

        Ok(OptimizationResult {
            alpha: state.alpha,
            b,
            support_vectors,
            iterations,
            objective_value,
        })
    }

    /// Pick the maximal violating pair, or `None` once the KKT gap is below epsilon
    fn select_working_set(
        &self,
        x: ArrayView2<f64>,
        y: &[f64],
        state: &SolverState,
        cache: &mut KernelCache,
    ) -> Option<(usize, usize)> {
        let c = self.config.c;
        let alpha = &state.alpha;
        let gradient = &state.gradient;

        let mut g_max = f64::NEG_INFINITY;
        let mut best_i = None;
        for t in 0..y.len() {
            let in_up = (y[t] > 0.0 && alpha[t] < c) || (y[t] < 0.0 && alpha[t] > 0.0);
            if in_up && -y[t] * gradient[t] >= g_max {
                g_max = -y[t] * gradient[t];
                best_i = Some(t);
            }
        }
        let i = best_i?;
        let col_i = cache.column(self.kernel.as_ref(), x, i);

        let mut g_max2 = f64::NEG_INFINITY;
        let mut obj_min = f64::INFINITY;
        let mut best_j = None;
        for t in 0..y.len() {
            let in_low = (y[t] > 0.0 && alpha[t] > 0.0) || (y[t] < 0.0 && alpha[t] < c);
            if !in_low {
                continue;
            }
            let violation = y[t] * gradient[t];
            g_max2 = g_max2.max(violation);

            let b = g_max + violation;
            if b > 0.0 {
                let mut a = state.diagonal[i] + state.diagonal[t] - 2.0 * col_i[t];
                if a <= 0.0 {
                    a = TAU;
                }
                let obj = -(b * b) / a;
                if obj <= obj_min {
                    obj_min = obj;
                    best_j = Some(t);
                }
            }
        }

        if g_max + g_max2 < self.config.epsilon {
            return None;
        }
        best_j.map(|j| (i, j))
    }

    /// Offset rho of the decision function `sum(alpha_i y_i K(x_i, x)) - rho`
    fn calculate_rho(&self, y: &[f64], state: &SolverState) -> f64 {
        let c = self.config.c;
        let mut upper = f64::INFINITY;
        let mut lower = f64::NEG_INFINITY;
        let mut free_sum = 0.0;
        let mut free_count = 0usize;

        for (t, (&a, &g)) in state.alpha.iter().zip(&state.gradient).enumerate() {
            let yg = y[t] * g;
            if a >= c {
                if y[t] < 0.0 {
                    upper = upper.min(yg);
                } else {
                    lower = lower.max(yg);
                }
            } else if a <= 0.0 {
                if y[t] > 0.0 {
                    upper = upper.min(yg);
                } else {
                    lower = lower.max(yg);
                }
            } else {
                free_sum += yg;
                free_count += 1;
            }
        }

        if free_count > 0 {
            free_sum / free_count as f64
        } else {
            (upper + lower) / 2.0
        }
    }

    /// Dual objective in maximization form: sum(a) - 1/2 a^T Q a
    fn calculate_objective(&self, state: &SolverState) -> f64 {
        // (Q a)_i = G_i + 1, so sum(a) - 1/2 a^T Q a = 1/2 sum(a_i (1 - G_i))
        0.5 * state
            .alpha
            .iter()
            .zip(&state.gradient)
            .map(|(&a, &g)| a * (1.0 - g))
            .sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::LinearKernel;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    fn solver(config: OptimizerConfig) -> SMOSolver<LinearKernel> {
        SMOSolver::new(Arc::new(LinearKernel::new()), config)
    }

    fn decision(x: &Array2<f64>, y: &[f64], result: &OptimizationResult, point: &[f64]) -> f64 {
        x.rows()
            .into_iter()
            .zip(y)
            .zip(&result.alpha)
            .map(|((row, &label), &a)| {
                a * label * row.iter().zip(point).map(|(u, v)| u * v).sum::<f64>()
            })
            .sum::<f64>()
            + result.b
    }

    #[test]
    fn test_smo_solver_empty_dataset() {
        let x = Array2::<f64>::zeros((0, 2));
        let result = solver(OptimizerConfig::default()).solve(x.view(), &[]);
        assert!(matches!(result, Err(SVMError::EmptyDataset)));
    }

    #[test]
    fn test_smo_solver_invalid_labels() {
        let x = array![[1.0], [2.0]];
        let result = solver(OptimizerConfig::default()).solve(x.view(), &[1.0, 0.5]);
        assert!(matches!(result, Err(SVMError::InvalidParameter(_))));
    }

    #[test]
    fn test_smo_solver_single_class() {
        let x = array![[1.0], [2.0]];
        let result = solver(OptimizerConfig::default()).solve(x.view(), &[1.0, 1.0]);
        assert!(matches!(result, Err(SVMError::InvalidDataset(_))));
    }

    #[test]
    fn test_smo_solver_separable_1d() {
        let x = array![[2.0], [-2.0], [1.5], [-1.5]];
        let y = [1.0, -1.0, 1.0, -1.0];

        let result = solver(OptimizerConfig::default())
            .solve(x.view(), &y)
            .expect("Should solve successfully");

        // Margin is set by the two inner points: w = 1 / 1.5, b = 0
        assert_eq!(result.support_vectors, vec![2, 3]);
        assert_abs_diff_eq!(result.alpha[2], 2.0 / 9.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.alpha[3], 2.0 / 9.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.b, 0.0, epsilon = 1e-9);
        assert!(result.iterations > 0);

        for (row, &label) in x.rows().into_iter().zip(&y) {
            let value = decision(&x, &y, &result, row.as_slice().unwrap());
            assert_eq!(value.signum(), label);
        }
    }

    #[test]
    fn test_smo_solver_equality_constraint_holds() {
        let x = array![
            [1.0, 1.0],
            [1.2, 0.8],
            [-1.0, -1.0],
            [-0.9, -1.3],
            [0.2, 0.1],
            [-0.1, -0.3]
        ];
        let y = [1.0, 1.0, -1.0, -1.0, 1.0, -1.0];
        let config = OptimizerConfig {
            c: 0.5,
            ..OptimizerConfig::default()
        };

        let result = solver(config).solve(x.view(), &y).expect("Should solve");

        let balance: f64 = result.alpha.iter().zip(&y).map(|(a, l)| a * l).sum();
        assert_abs_diff_eq!(balance, 0.0, epsilon = 1e-9);
        assert!(result.alpha.iter().all(|&a| (0.0..=0.5).contains(&a)));
        assert!(result.objective_value > 0.0);
    }

    #[test]
    fn test_smo_solver_max_iterations() {
        let x = array![[1.0, 1.0], [-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0]];
        let y = [1.0, -1.0, -1.0, 1.0];
        let config = OptimizerConfig {
            max_iterations: 1,
            epsilon: 1e-6,
            ..OptimizerConfig::default()
        };

        let result = solver(config).solve(x.view(), &y).expect("Should solve");
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn test_smo_solver_overlapping_classes_hit_upper_bound() {
        // The same point carries both labels, so its multipliers are pushed to C
        let x = array![[1.0], [1.0], [3.0], [-3.0]];
        let y = [1.0, -1.0, 1.0, -1.0];
        let config = OptimizerConfig {
            c: 0.1,
            ..OptimizerConfig::default()
        };

        let result = solver(config).solve(x.view(), &y).expect("Should solve");
        assert!(result.alpha.iter().any(|&a| a == 0.1));
    }
}
