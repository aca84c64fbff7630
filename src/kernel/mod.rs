//! Kernel functions for the support vector classifier

pub mod linear;
pub mod traits;

pub use self::linear::*;
pub use self::traits::*;
