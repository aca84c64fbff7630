//! Classification metrics for multi-class predictions

use crate::core::{Label, Result, SVMError};
use std::fmt;

/// Fraction of positions where `predicted` equals `truth`
pub fn accuracy(truth: &[Label], predicted: &[Label]) -> Result<f64> {
    check_lengths(truth, predicted)?;
    if truth.is_empty() {
        return Ok(0.0);
    }
    let correct = truth
        .iter()
        .zip(predicted)
        .filter(|(actual, pred)| actual == pred)
        .count();
    Ok(correct as f64 / truth.len() as f64)
}

fn check_lengths(truth: &[Label], predicted: &[Label]) -> Result<()> {
    if truth.len() != predicted.len() {
        return Err(SVMError::SampleCountMismatch {
            features: predicted.len(),
            labels: truth.len(),
        });
    }
    Ok(())
}

/// Confusion matrix: rows are true labels, columns predicted labels
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    labels: Vec<Label>,
    counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Tabulate predictions over the given label order.
    ///
    /// Pairs involving a label outside `labels` are skipped.
    pub fn new(truth: &[Label], predicted: &[Label], labels: &[Label]) -> Result<Self> {
        check_lengths(truth, predicted)?;
        let position = |label: &Label| labels.iter().position(|l| l == label);

        let mut counts = vec![vec![0; labels.len()]; labels.len()];
        for (actual, pred) in truth.iter().zip(predicted) {
            if let (Some(row), Some(column)) = (position(actual), position(pred)) {
                counts[row][column] += 1;
            }
        }

        Ok(Self {
            labels: labels.to_vec(),
            counts,
        })
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Number of samples with true label `actual` predicted as `predicted`
    pub fn count(&self, actual: Label, predicted: Label) -> usize {
        match (self.index(actual), self.index(predicted)) {
            (Some(row), Some(column)) => self.counts[row][column],
            _ => 0,
        }
    }

    /// Samples counted in the matrix
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Diagonal sum over total
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            let correct: usize = (0..self.labels.len()).map(|i| self.counts[i][i]).sum();
            correct as f64 / total as f64
        }
    }

    /// TP / (TP + FP) for one label
    pub fn precision(&self, label: Label) -> f64 {
        let Some(i) = self.index(label) else {
            return 0.0;
        };
        let predicted: usize = self.counts.iter().map(|row| row[i]).sum();
        if predicted == 0 {
            0.0
        } else {
            self.counts[i][i] as f64 / predicted as f64
        }
    }

    /// TP / (TP + FN) for one label
    pub fn recall(&self, label: Label) -> f64 {
        let Some(i) = self.index(label) else {
            return 0.0;
        };
        let actual: usize = self.counts[i].iter().sum();
        if actual == 0 {
            0.0
        } else {
            self.counts[i][i] as f64 / actual as f64
        }
    }

    fn index(&self, label: Label) -> Option<usize> {
        self.labels.iter().position(|&l| l == label)
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .counts
            .iter()
            .flatten()
            .map(|c| c.to_string().len())
            .chain(self.labels.iter().map(|l| l.to_string().len()))
            .max()
            .unwrap_or(1);

        write!(f, "{:>width$} |", "")?;
        for label in &self.labels {
            write!(f, " {label:>width$}")?;
        }
        writeln!(f)?;
        for (label, row) in self.labels.iter().zip(&self.counts) {
            write!(f, "{label:>width$} |")?;
            for count in row {
                write!(f, " {count:>width$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
