//! Kernel trait definition

use ndarray::ArrayView1;

/// Kernel function trait
///
/// A kernel function K(x, y) must satisfy Mercer's condition to be valid for SVM.
pub trait Kernel: Send + Sync {
    /// Compute kernel value K(x, y)
    fn compute(&self, x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64;

    /// Short identifier used in logs and diagnostics
    fn name(&self) -> &'static str;
}
