//! Utility functions for dataset diagnostics

/// Descriptive statistics for feature matrices and label vectors
pub mod stats {
    use crate::core::Label;
    use ndarray::{ArrayView2, Axis};

    /// Statistics for a single column
    #[derive(Debug, Clone, PartialEq)]
    pub struct ColumnStats {
        pub count: usize,
        pub mean: f64,
        pub std: f64,
        pub min: f64,
        pub max: f64,
    }

    /// Per-column count, mean, population std, min and max
    pub fn describe(x: ArrayView2<f64>) -> Vec<ColumnStats> {
        x.axis_iter(Axis(1))
            .map(|column| {
                let count = column.len();
                if count == 0 {
                    return ColumnStats {
                        count,
                        mean: f64::NAN,
                        std: f64::NAN,
                        min: f64::NAN,
                        max: f64::NAN,
                    };
                }
                ColumnStats {
                    count,
                    mean: column.sum() / count as f64,
                    std: column.std(0.0),
                    min: column.fold(f64::INFINITY, |a, &b| a.min(b)),
                    max: column.fold(f64::NEG_INFINITY, |a, &b| a.max(b)),
                }
            })
            .collect()
    }

    /// Distinct labels in ascending order
    pub fn sorted_unique_labels(labels: &[Label]) -> Vec<Label> {
        let mut unique = labels.to_vec();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Count of each label, in ascending label order
    pub fn label_counts(labels: &[Label]) -> Vec<(Label, usize)> {
        let mut counts: Vec<(Label, usize)> = Vec::new();
        for label in sorted_unique_labels(labels) {
            counts.push((label, labels.iter().filter(|&&l| l == label).count()));
        }
        counts
    }

    /// Round to two decimals, as the column mean summary prints them
    pub fn round2(value: f64) -> f64 {
        (value * 100.0).round() / 100.0
    }
}
