//! Multi-class Support Vector Classifier
//!
//! Multi-class problems are decomposed one-vs-one: with `k` classes sorted
//! ascending, one binary SVM is trained for every pair `(a, b)` with `a < b`,
//! in the order `(0, 1), (0, 2), ..., (0, k-1), (1, 2), ...`. Class `a` is the
//! positive side of its pair. At prediction time every pair casts one vote and
//! the class with the most votes wins; ties go to the smaller class.
//!
//! For `k = 10` digits this yields 45 binary problems, so a linear model's
//! coefficient matrix has 45 rows.

use crate::core::{Classifier, Label, OptimizerConfig, Result, SVMError};
use crate::kernel::{Kernel, LinearKernel};
use crate::solver::SMOSolver;
use crate::utils::stats::sorted_unique_labels;
use log::{debug, info};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use std::sync::Arc;

/// Support Vector Classifier with a one-vs-one multi-class scheme
pub struct SVC<K: Kernel = LinearKernel> {
    kernel: Arc<K>,
    config: OptimizerConfig,
    state: Option<FittedState>,
}

/// Everything learned by `fit`
struct FittedState {
    classes: Vec<Label>,
    n_features: usize,
    support_vectors: Array2<f64>,
    support_indices: Vec<usize>,
    n_support: Vec<usize>,
    pairs: Vec<PairModel>,
}

/// One binary decision function `sum(dual_coef * K(sv, x)) + intercept`
struct PairModel {
    positive: usize,
    negative: usize,
    /// Rows of `FittedState::support_vectors` used by this pair
    support: Vec<usize>,
    /// alpha_i * y_i for each entry of `support`
    dual_coef: Vec<f64>,
    intercept: f64,
    iterations: usize,
}

impl SVC<LinearKernel> {
    /// Create a classifier with a linear kernel and default parameters
    pub fn new() -> Self {
        Self::with_kernel(LinearKernel::new())
    }
}

impl Default for SVC<LinearKernel> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Kernel> SVC<K> {
    /// Create a classifier with a custom kernel
    pub fn with_kernel(kernel: K) -> Self {
        Self {
            kernel: Arc::new(kernel),
            config: OptimizerConfig::default(),
            state: None,
        }
    }

    /// Replace all solver parameters
    pub fn with_config(mut self, config: OptimizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set regularization parameter C
    pub fn with_c(mut self, c: f64) -> Self {
        self.config.c = c;
        self
    }

    /// Set convergence tolerance
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.config.epsilon = epsilon;
        self
    }

    /// Set maximum number of iterations per binary problem
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set kernel cache size in bytes
    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.config.cache_size = cache_size;
        self
    }

    /// Solver parameters
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Train one binary SVM per class pair
    pub fn fit(&mut self, x: ArrayView2<f64>, y: &[Label]) -> Result<()> {
        if self.state.is_some() {
            return Err(SVMError::AlreadyFitted);
        }
        self.config.validate()?;

        if x.nrows() != y.len() {
            return Err(SVMError::SampleCountMismatch {
                features: x.nrows(),
                labels: y.len(),
            });
        }
        if x.nrows() == 0 {
            return Err(SVMError::EmptyDataset);
        }
        if x.ncols() == 0 {
            return Err(SVMError::InvalidDataset(
                "feature matrix has no columns".to_string(),
            ));
        }
        if let Some(((row, column), &value)) = x.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(SVMError::NonFiniteValue { row, column, value });
        }

        let classes = sorted_unique_labels(y);
        if classes.len() < 2 {
            return Err(SVMError::TooFewClasses(classes.len()));
        }

        // Training rows of each class, ascending
        let mut class_rows: Vec<Vec<usize>> = vec![Vec::new(); classes.len()];
        for (row, label) in y.iter().enumerate() {
            if let Ok(class) = classes.binary_search(label) {
                class_rows[class].push(row);
            }
        }

        info!(
            "Fitting {} kernel SVC on {} samples x {} features, {} classes ({} pairs)",
            self.kernel.name(),
            x.nrows(),
            x.ncols(),
            classes.len(),
            classes.len() * (classes.len() - 1) / 2
        );

        let solver = SMOSolver::new(Arc::clone(&self.kernel), self.config.clone());

        // Pair support is recorded as training rows first, remapped below
        let mut pairs: Vec<PairModel> = Vec::new();
        let mut is_support = vec![false; x.nrows()];

        for positive in 0..classes.len() {
            for negative in positive + 1..classes.len() {
                let rows: Vec<usize> = class_rows[positive]
                    .iter()
                    .chain(&class_rows[negative])
                    .copied()
                    .collect();
                let signs: Vec<f64> = rows
                    .iter()
                    .map(|&row| if y[row] == classes[positive] { 1.0 } else { -1.0 })
                    .collect();

                let subset = x.select(Axis(0), &rows);
                let result = solver.solve(subset.view(), &signs)?;
                debug!(
                    "Pair ({}, {}): {} samples, {} support vectors, {} iterations",
                    classes[positive],
                    classes[negative],
                    rows.len(),
                    result.support_vectors.len(),
                    result.iterations
                );

                for &k in &result.support_vectors {
                    is_support[rows[k]] = true;
                }
                pairs.push(PairModel {
                    positive,
                    negative,
                    support: result.support_vectors.iter().map(|&k| rows[k]).collect(),
                    dual_coef: result
                        .support_vectors
                        .iter()
                        .map(|&k| result.alpha[k] * signs[k])
                        .collect(),
                    intercept: result.b,
                    iterations: result.iterations,
                });
            }
        }

        // Support vectors grouped by class, ascending row order within a class
        let mut support_indices = Vec::new();
        let mut n_support = Vec::with_capacity(classes.len());
        for rows in &class_rows {
            let before = support_indices.len();
            support_indices.extend(rows.iter().copied().filter(|&row| is_support[row]));
            n_support.push(support_indices.len() - before);
        }

        let mut position = vec![usize::MAX; x.nrows()];
        for (slot, &row) in support_indices.iter().enumerate() {
            position[row] = slot;
        }
        for pair in &mut pairs {
            for s in &mut pair.support {
                *s = position[*s];
            }
        }

        info!("Fitted SVC with {} support vectors", support_indices.len());

        self.state = Some(FittedState {
            classes,
            n_features: x.ncols(),
            support_vectors: x.select(Axis(0), &support_indices),
            support_indices,
            n_support,
            pairs,
        });
        Ok(())
    }

    /// Pairwise decision values, shape `[rows, pairs]`.
    ///
    /// A positive value favors the first class of the pair.
    pub fn decision_function(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        let state = self.fitted()?;
        if x.ncols() != state.n_features {
            return Err(SVMError::DimensionMismatch {
                expected: state.n_features,
                actual: x.ncols(),
            });
        }

        let mut decisions = Array2::zeros((x.nrows(), state.pairs.len()));
        let mut kernel_values = Array1::zeros(state.support_vectors.nrows());

        for (sample, mut out) in x.rows().into_iter().zip(decisions.rows_mut()) {
            for (value, sv) in kernel_values
                .iter_mut()
                .zip(state.support_vectors.rows())
            {
                *value = self.kernel.compute(sv, sample);
            }
            for (slot, pair) in out.iter_mut().zip(&state.pairs) {
                *slot = pair
                    .support
                    .iter()
                    .zip(&pair.dual_coef)
                    .map(|(&s, &coef)| coef * kernel_values[s])
                    .sum::<f64>()
                    + pair.intercept;
            }
        }

        Ok(decisions)
    }

    /// Predict one label per row by one-vs-one voting
    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Vec<Label>> {
        let state = self.fitted()?;
        let decisions = self.decision_function(x)?;

        let mut votes = vec![0usize; state.classes.len()];
        let predictions = decisions
            .rows()
            .into_iter()
            .map(|row| {
                votes.iter_mut().for_each(|v| *v = 0);
                for (&value, pair) in row.iter().zip(&state.pairs) {
                    if value > 0.0 {
                        votes[pair.positive] += 1;
                    } else {
                        votes[pair.negative] += 1;
                    }
                }

                let mut best = 0;
                for (class, &count) in votes.iter().enumerate() {
                    if count > votes[best] {
                        best = class;
                    }
                }
                state.classes[best]
            })
            .collect();

        Ok(predictions)
    }

    /// Whether `fit` has completed
    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    /// Drop the trained state so the classifier can be fitted again
    pub fn reset(&mut self) {
        self.state = None;
    }

    /// Classes seen during fit, ascending
    pub fn classes(&self) -> Result<&[Label]> {
        Ok(&self.fitted()?.classes)
    }

    /// Class pairs in decision-function order
    pub fn pairs(&self) -> Result<Vec<(Label, Label)>> {
        let state = self.fitted()?;
        Ok(state
            .pairs
            .iter()
            .map(|p| (state.classes[p.positive], state.classes[p.negative]))
            .collect())
    }

    /// Number of features seen during fit
    pub fn n_features(&self) -> Result<usize> {
        Ok(self.fitted()?.n_features)
    }

    /// Support vectors, one per row, grouped by class
    pub fn support_vectors(&self) -> Result<&Array2<f64>> {
        Ok(&self.fitted()?.support_vectors)
    }

    /// Training-row index of each support vector
    pub fn support_indices(&self) -> Result<&[usize]> {
        Ok(&self.fitted()?.support_indices)
    }

    /// Number of support vectors of each class
    pub fn n_support(&self) -> Result<&[usize]> {
        Ok(&self.fitted()?.n_support)
    }

    /// Dual coefficients (alpha * y) of each pair, aligned with `pair_support`
    pub fn dual_coef(&self) -> Result<Vec<&[f64]>> {
        Ok(self
            .fitted()?
            .pairs
            .iter()
            .map(|p| p.dual_coef.as_slice())
            .collect())
    }

    /// Rows of `support_vectors()` used by each pair
    pub fn pair_support(&self) -> Result<Vec<&[usize]>> {
        Ok(self
            .fitted()?
            .pairs
            .iter()
            .map(|p| p.support.as_slice())
            .collect())
    }

    /// Intercept of each pairwise decision function
    pub fn intercepts(&self) -> Result<Array1<f64>> {
        Ok(self.fitted()?.pairs.iter().map(|p| p.intercept).collect())
    }

    /// SMO iterations spent on each pair
    pub fn iterations(&self) -> Result<Vec<usize>> {
        Ok(self.fitted()?.pairs.iter().map(|p| p.iterations).collect())
    }

    fn fitted(&self) -> Result<&FittedState> {
        self.state.as_ref().ok_or(SVMError::ModelNotTrained)
    }
}

impl SVC<LinearKernel> {
    /// Primal weight matrix, shape `[pairs, features]`
    ///
    /// Row `p` is `sum(dual_coef * support_vector)` over the support vectors of pair `p`.
    pub fn coef(&self) -> Result<Array2<f64>> {
        let state = self.fitted()?;
        let mut coef = Array2::zeros((state.pairs.len(), state.n_features));
        for (mut weights, pair) in coef.rows_mut().into_iter().zip(&state.pairs) {
            for (&s, &dual) in pair.support.iter().zip(&pair.dual_coef) {
                weights.scaled_add(dual, &state.support_vectors.row(s));
            }
        }
        Ok(coef)
    }
}

impl<K: Kernel> Classifier for SVC<K> {
    fn fit(&mut self, x: ArrayView2<f64>, y: &[Label]) -> Result<()> {
        SVC::fit(self, x, y)
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Vec<Label>> {
        SVC::predict(self, x)
    }

    fn is_fitted(&self) -> bool {
        SVC::is_fitted(self)
    }

    fn reset(&mut self) {
        SVC::reset(self)
    }
}
