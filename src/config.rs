//! Pipeline configuration
//!
//! Defaults reproduce the reference run: pixel divisor 255.0, split seed 10,
//! 20% train / 30% holdout, linear kernel with C = 1.0.

use crate::core::{OptimizerConfig, Result, SVMError};
use crate::data::SplitConfig;
use crate::preprocessing::{ZeroVariance, PIXEL_DIVISOR};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Kernel used by the classifier stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelChoice {
    #[default]
    Linear,
}

/// Every tunable of the load -> normalize -> standardize -> split -> fit run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Name of the label column in the training table
    pub label_column: String,
    /// Divisor applied to every pixel value
    pub divisor: f64,
    /// Train/holdout partitioning
    pub split: SplitConfig,
    /// Kernel of the classifier
    pub kernel: KernelChoice,
    /// SMO solver parameters
    pub optimizer: OptimizerConfig,
    /// Treatment of zero-variance columns during standardization
    pub zero_variance: ZeroVariance,
    /// Also standardize the unlabeled test table with the training statistics
    pub standardize_test: bool,
    /// Predict labels for the unlabeled test table
    pub predict_test: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label_column: "label".to_string(),
            divisor: PIXEL_DIVISOR,
            split: SplitConfig::default(),
            kernel: KernelChoice::Linear,
            optimizer: OptimizerConfig::default(),
            zero_variance: ZeroVariance::Propagate,
            standardize_test: false,
            predict_test: false,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Check parameters that do not depend on the data
    pub fn validate(&self) -> Result<()> {
        if self.label_column.is_empty() {
            return Err(SVMError::InvalidParameter(
                "label_column must not be empty".to_string(),
            ));
        }
        if !(self.divisor.is_finite() && self.divisor != 0.0) {
            return Err(SVMError::InvalidParameter(format!(
                "divisor must be finite and non-zero, got: {}",
                self.divisor
            )));
        }
        self.split.validate()?;
        self.optimizer.validate()
    }
}
