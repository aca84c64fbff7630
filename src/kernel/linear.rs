//! Linear kernel implementation

use crate::kernel::Kernel;
use ndarray::ArrayView1;

/// Linear kernel: K(x, y) = x^T * y
///
/// With this kernel every binary decision function collapses to a single
/// weight vector, which is what makes the coefficient matrix available on
/// a fitted classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearKernel;

impl LinearKernel {
    /// Create a new linear kernel
    pub fn new() -> Self {
        Self
    }
}

impl Kernel for LinearKernel {
    fn compute(&self, x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
        x.dot(&y)
    }

    fn name(&self) -> &'static str {
        "linear"
    }
}
