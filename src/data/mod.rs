//! Data loading and partitioning
//!
//! Tables are read from CSV into dense matrices; the split module cuts a
//! feature matrix and its labels into seeded train and holdout partitions.

pub mod csv;
pub mod split;

pub use self::csv::*;
pub use self::split::*;
