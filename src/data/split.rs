//! Seeded train/holdout partitioning

use crate::core::{Label, Result, SVMError};
use ndarray::{Array2, ArrayView2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Partition sizes and seed
///
/// The fractions are independent: `0.2` train and `0.3` test leave half of
/// the rows in neither partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Fraction of rows assigned to the training partition
    pub train_fraction: f64,
    /// Fraction of rows assigned to the holdout partition
    pub test_fraction: f64,
    /// Seed for the shuffle
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_fraction: 0.2,
            test_fraction: 0.3,
            seed: 10,
        }
    }
}

impl SplitConfig {
    /// Check that both fractions lie in (0, 1] and together do not exceed 1
    pub fn validate(&self) -> Result<()> {
        for (name, fraction) in [
            ("train_fraction", self.train_fraction),
            ("test_fraction", self.test_fraction),
        ] {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(SVMError::InvalidParameter(format!(
                    "{name} must be in (0, 1], got: {fraction}"
                )));
            }
        }
        if self.train_fraction + self.test_fraction > 1.0 {
            return Err(SVMError::InvalidParameter(format!(
                "train_fraction + test_fraction must not exceed 1, got: {}",
                self.train_fraction + self.test_fraction
            )));
        }
        Ok(())
    }

    /// Partition sizes for `n` rows: `(train, test)`
    pub fn sizes(&self, n: usize) -> Result<(usize, usize)> {
        self.validate()?;

        let n_train = (n as f64 * self.train_fraction).round() as usize;
        let n_test = (n as f64 * self.test_fraction).round() as usize;
        if n_train == 0 || n_test == 0 {
            return Err(SVMError::InvalidDataset(format!(
                "{n} rows give an empty partition (train={n_train}, test={n_test})"
            )));
        }
        if n_train + n_test > n {
            return Err(SVMError::InvalidDataset(format!(
                "{n} rows cannot hold train={n_train} and test={n_test}"
            )));
        }
        Ok((n_train, n_test))
    }
}

/// Row indices of each partition, in shuffled order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with the configured seed and cut it into partitions.
///
/// The holdout partition is the head of the permutation and the training
/// partition follows it; the remainder is unused.
pub fn split_indices(n: usize, config: &SplitConfig) -> Result<SplitIndices> {
    let (n_train, n_test) = config.sizes(n)?;

    let mut permutation: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    permutation.shuffle(&mut rng);

    let test = permutation[..n_test].to_vec();
    let train = permutation[n_test..n_test + n_train].to_vec();
    Ok(SplitIndices { train, test })
}

/// Features and labels of both partitions
#[derive(Debug, Clone)]
pub struct Split {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Vec<Label>,
    pub y_test: Vec<Label>,
    pub indices: SplitIndices,
}

/// Partition a feature matrix and its parallel label vector
pub fn train_test_split(x: ArrayView2<f64>, y: &[Label], config: &SplitConfig) -> Result<Split> {
    if x.nrows() != y.len() {
        return Err(SVMError::SampleCountMismatch {
            features: x.nrows(),
            labels: y.len(),
        });
    }

    let indices = split_indices(x.nrows(), config)?;
    log::debug!(
        "Split {} rows into train={} and test={} (seed {})",
        x.nrows(),
        indices.train.len(),
        indices.test.len(),
        config.seed
    );

    Ok(Split {
        x_train: x.select(Axis(0), &indices.train),
        x_test: x.select(Axis(0), &indices.test),
        y_train: indices.train.iter().map(|&i| y[i]).collect(),
        y_test: indices.test.iter().map(|&i| y[i]).collect(),
        indices,
    })
}
