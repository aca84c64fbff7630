//! Core traits

use crate::core::{Label, Result};
use ndarray::ArrayView2;

/// A multi-class classifier with an explicit UNFIT -> FIT lifecycle
pub trait Classifier {
    /// Learn from a feature matrix and its parallel label vector.
    ///
    /// Fails if the classifier is already fitted.
    fn fit(&mut self, x: ArrayView2<f64>, y: &[Label]) -> Result<()>;

    /// Predict one label per row of `x`
    fn predict(&self, x: ArrayView2<f64>) -> Result<Vec<Label>>;

    /// Whether `fit` has completed successfully
    fn is_fitted(&self) -> bool;

    /// Discard trained state, returning to the unfitted state
    fn reset(&mut self);
}
