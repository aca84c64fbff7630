//! End-to-end digit classification pipeline
//!
//! Load train and test tables, separate labels, divide pixels by 255,
//! standardize the training features, take a seeded train/holdout split,
//! fit a linear one-vs-one SVC and predict the holdout rows.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use digitsvm::pipeline::Pipeline;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let output = Pipeline::new()
//!     .with_seed(10)
//!     .with_fractions(0.2, 0.3)
//!     .run("input/train.csv", "input/test.csv")?;
//!
//! println!("Coefficient matrix: {:?}", output.model.coef()?.dim());
//! println!("Holdout accuracy: {:.2}%", output.accuracy * 100.0);
//! # Ok(())
//! # }
//! ```
//!
//! The unlabeled test table is only divided by the pixel divisor unless
//! `standardize_test` is enabled; the training statistics are not applied
//! to it by default.

use crate::classifier::SVC;
use crate::config::{KernelChoice, PipelineConfig};
use crate::core::{Classifier, Label, Result, SVMError};
use crate::data::{train_test_split, SplitIndices, Table};
use crate::metrics::{accuracy, ConfusionMatrix};
use crate::preprocessing::{normalize, separate_label, StandardScaler, ZeroVariance};
use crate::utils::stats::{describe, round2, sorted_unique_labels, ColumnStats};
use log::{info, warn};
use ndarray::Array2;
use std::io::Write;
use std::path::Path;

/// Pipeline runner with builder-style configuration
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline with the reference configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline from an explicit configuration
    pub fn with_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Set the split seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.split.seed = seed;
        self
    }

    /// Set the train and holdout fractions
    pub fn with_fractions(mut self, train_fraction: f64, test_fraction: f64) -> Self {
        self.config.split.train_fraction = train_fraction;
        self.config.split.test_fraction = test_fraction;
        self
    }

    /// Set regularization parameter C
    pub fn with_c(mut self, c: f64) -> Self {
        self.config.optimizer.c = c;
        self
    }

    /// Set the pixel divisor
    pub fn with_divisor(mut self, divisor: f64) -> Self {
        self.config.divisor = divisor;
        self
    }

    /// Set the label column name
    pub fn with_label_column(mut self, label_column: impl Into<String>) -> Self {
        self.config.label_column = label_column.into();
        self
    }

    /// Set the zero-variance policy of standardization
    pub fn with_zero_variance(mut self, policy: ZeroVariance) -> Self {
        self.config.zero_variance = policy;
        self
    }

    /// Standardize the unlabeled test table with the training statistics
    pub fn with_standardize_test(mut self, enabled: bool) -> Self {
        self.config.standardize_test = enabled;
        self
    }

    /// Predict labels for the unlabeled test table
    pub fn with_predict_test(mut self, enabled: bool) -> Self {
        self.config.predict_test = enabled;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load both tables from CSV files and run every stage
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        train_path: P,
        test_path: Q,
    ) -> Result<PipelineOutput> {
        self.config.validate()?;
        info!("Loading training table from {:?}", train_path.as_ref());
        let train = Table::from_path(train_path)?;
        info!("Loading test table from {:?}", test_path.as_ref());
        let test = Table::from_path(test_path)?;
        self.run_tables(train, test)
    }

    /// Run every stage on tables already in memory
    pub fn run_tables(&self, train: Table, test: Table) -> Result<PipelineOutput> {
        let config = &self.config;
        config.validate()?;

        let train_table_shape = train.shape();
        let separated = separate_label(train, &config.label_column)?;
        let labels = separated.labels;
        let mut features = separated.features;
        let feature_names = separated.feature_names;
        info!(
            "Training table: {} rows, {} feature columns",
            features.nrows(),
            features.ncols()
        );

        if test.shape().1 != features.ncols() {
            return Err(SVMError::DimensionMismatch {
                expected: features.ncols(),
                actual: test.shape().1,
            });
        }
        if test.headers() != feature_names.as_slice() {
            warn!("Test table column names differ from the training feature columns");
        }

        let column_stats = describe(features.view());
        let classes = sorted_unique_labels(&labels);

        normalize(&mut features, config.divisor);
        let (_, mut test_features) = test.into_parts();
        normalize(&mut test_features, config.divisor);

        let scaler = StandardScaler::fit_transform(&mut features, config.zero_variance)?;
        if config.standardize_test {
            info!("Standardizing the test table with training statistics");
            scaler.transform(&mut test_features)?;
        }

        let split = train_test_split(features.view(), &labels, &config.split)?;
        info!(
            "Split: {} training rows, {} holdout rows",
            split.y_train.len(),
            split.y_test.len()
        );

        let mut model = match config.kernel {
            KernelChoice::Linear => SVC::new().with_config(config.optimizer.clone()),
        };
        Classifier::fit(&mut model, split.x_train.view(), &split.y_train)?;

        let holdout_predictions = Classifier::predict(&model, split.x_test.view())?;
        let holdout_accuracy = accuracy(&split.y_test, &holdout_predictions)?;
        let confusion = ConfusionMatrix::new(&split.y_test, &holdout_predictions, &classes)?;
        info!("Holdout accuracy: {:.4}", holdout_accuracy);

        let test_predictions = if config.predict_test {
            Some(Classifier::predict(&model, test_features.view())?)
        } else {
            None
        };

        Ok(PipelineOutput {
            train_table_shape,
            feature_names,
            column_stats,
            classes,
            x_train_shape: split.x_train.dim(),
            split_indices: split.indices,
            scaler,
            holdout_labels: split.y_test,
            holdout_predictions,
            accuracy: holdout_accuracy,
            confusion,
            test_features,
            test_predictions,
            model,
        })
    }
}

/// Everything a pipeline run produces
pub struct PipelineOutput {
    /// (rows, columns) of the training table, label column included
    pub train_table_shape: (usize, usize),
    pub feature_names: Vec<String>,
    /// Statistics of the raw training features, before normalization
    pub column_stats: Vec<ColumnStats>,
    /// Distinct training labels, ascending
    pub classes: Vec<Label>,
    /// (rows, columns) of the matrix the classifier was fitted on
    pub x_train_shape: (usize, usize),
    pub split_indices: SplitIndices,
    pub scaler: StandardScaler,
    pub holdout_labels: Vec<Label>,
    pub holdout_predictions: Vec<Label>,
    pub accuracy: f64,
    pub confusion: ConfusionMatrix,
    /// Normalized (and optionally standardized) test table
    pub test_features: Array2<f64>,
    pub test_predictions: Option<Vec<Label>>,
    pub model: SVC,
}

impl PipelineOutput {
    /// Write the run diagnostics
    ///
    /// Includes the full coefficient row of the last class pair.
    pub fn write_report<W: Write>(&self, out: &mut W) -> Result<()> {
        let (rows, columns) = self.train_table_shape;
        writeln!(out, "Training table shape: ({rows}, {columns})")?;
        writeln!(out, "Labels: {:?}", self.classes)?;

        writeln!(out, "Feature means (raw, 2 decimals):")?;
        let n = self.column_stats.len();
        let shown: Vec<usize> = if n > 10 {
            (0..5).chain(n - 5..n).collect()
        } else {
            (0..n).collect()
        };
        for (k, &i) in shown.iter().enumerate() {
            if n > 10 && k == 5 {
                writeln!(out, "  ...")?;
            }
            writeln!(
                out,
                "  {:<12} {:.2}",
                self.feature_names[i],
                round2(self.column_stats[i].mean)
            )?;
        }
        writeln!(out, "  Length: {n}")?;

        let (train_rows, train_columns) = self.x_train_shape;
        writeln!(out, "X_train shape: ({train_rows}, {train_columns})")?;

        let coef = self.model.coef()?;
        writeln!(out, "Coefficient matrix shape: {:?}", coef.dim())?;
        let pairs = self.model.pairs()?;
        if let (Some(row), Some((a, b))) = (coef.rows().into_iter().last(), pairs.last()) {
            writeln!(out, "Last coefficient row (classes {a} vs {b}):")?;
            let values: Vec<String> = row.iter().map(|v| format!("{v:.8e}")).collect();
            writeln!(out, "[{}]", values.join(", "))?;
        }

        writeln!(
            out,
            "Holdout accuracy: {:.2}% ({} rows)",
            self.accuracy * 100.0,
            self.holdout_labels.len()
        )?;
        writeln!(out, "Confusion matrix (rows: true, columns: predicted):")?;
        write!(out, "{}", self.confusion)?;

        if let Some(predictions) = &self.test_predictions {
            writeln!(out, "Test predictions: {} rows", predictions.len())?;
        }
        Ok(())
    }
}
