//! Binary SVM solver
//!
//! This module implements the Sequential Minimal Optimization (SMO) algorithm
//! used for every pairwise problem of the one-vs-one classifier.

pub mod smo;

pub use self::smo::*;
