//! Digit image classification with a linear Support Vector Classifier
//!
//! Loads pixel tables from CSV, divides intensities by 255, standardizes the
//! features, takes a seeded train/holdout split and fits a one-vs-one SVC
//! trained by Sequential Minimal Optimization.

pub mod cache;
pub mod classifier;
pub mod config;
pub mod core;
pub mod data;
pub mod kernel;
pub mod metrics;
pub mod pipeline;
pub mod preprocessing;
pub mod solver;
pub mod utils;

// Re-export main types for convenience
pub use crate::cache::{CacheStats, KernelCache};
pub use crate::classifier::SVC;
pub use crate::config::{KernelChoice, PipelineConfig};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{Result, SVMError};
pub use crate::data::{train_test_split, Split, SplitConfig, Table};
pub use crate::kernel::{Kernel, LinearKernel};
pub use crate::metrics::{accuracy, ConfusionMatrix};
pub use crate::pipeline::{Pipeline, PipelineOutput};
pub use crate::preprocessing::{StandardScaler, ZeroVariance};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
