//! Feature preparation: label separation, pixel normalization, standardization

use crate::core::{Label, Result, SVMError};
use crate::data::Table;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Divisor mapping 8-bit pixel intensities onto [0, 1]
pub const PIXEL_DIVISOR: f64 = 255.0;

/// Labels, features and feature names of a labeled table
#[derive(Debug, Clone)]
pub struct LabeledFeatures {
    pub labels: Vec<Label>,
    pub features: Array2<f64>,
    pub feature_names: Vec<String>,
}

/// Split a table into its label column and the remaining feature columns.
///
/// Feature columns keep their file order. Labels must be finite integers.
pub fn separate_label(table: Table, label_column: &str) -> Result<LabeledFeatures> {
    let label_index = table
        .column_index(label_column)
        .ok_or_else(|| SVMError::MissingColumn(label_column.to_string()))?;

    let (headers, values) = table.into_parts();

    let labels = values
        .column(label_index)
        .iter()
        .enumerate()
        .map(|(row, &value)| {
            if value.is_finite() && value.fract() == 0.0 {
                Ok(value as Label)
            } else {
                Err(SVMError::InvalidLabel { row, value })
            }
        })
        .collect::<Result<Vec<_>>>()?;

    let keep: Vec<usize> = (0..headers.len()).filter(|&i| i != label_index).collect();
    let features = values.select(Axis(1), &keep);
    let feature_names = keep.iter().map(|&i| headers[i].clone()).collect();

    Ok(LabeledFeatures {
        labels,
        features,
        feature_names,
    })
}

/// Divide every value by `divisor`, in place. No range checking is done.
pub fn normalize(x: &mut Array2<f64>, divisor: f64) {
    x.mapv_inplace(|v| v / divisor);
}

/// How standardization treats a column whose training variance is zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZeroVariance {
    /// Divide by the zero deviation anyway; the column becomes NaN (or +/-inf)
    #[default]
    Propagate,
    /// Use a deviation of 1.0, leaving the centered column at zero
    Unit,
}

/// Per-column standardization to zero mean and unit variance
///
/// Statistics use the population deviation (`ddof = 0`).
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Array1<f64>,
    std: Array1<f64>,
    policy: ZeroVariance,
}

impl StandardScaler {
    /// Compute column means and deviations from `x`
    pub fn fit(x: ArrayView2<f64>, policy: ZeroVariance) -> Result<Self> {
        if x.nrows() == 0 {
            return Err(SVMError::EmptyDataset);
        }
        let mean = x.mean_axis(Axis(0)).ok_or(SVMError::EmptyDataset)?;
        let std = x.std_axis(Axis(0), 0.0);

        let zero_columns = std.iter().filter(|&&s| s == 0.0).count();
        if zero_columns > 0 {
            log::warn!(
                "{zero_columns} feature column(s) have zero variance (policy: {policy:?})"
            );
        }

        Ok(Self { mean, std, policy })
    }

    /// Fit on `x` and standardize it in place
    pub fn fit_transform(x: &mut Array2<f64>, policy: ZeroVariance) -> Result<Self> {
        let scaler = Self::fit(x.view(), policy)?;
        scaler.transform(x)?;
        Ok(scaler)
    }

    /// Standardize `x` in place with the fitted statistics
    pub fn transform(&self, x: &mut Array2<f64>) -> Result<()> {
        if x.ncols() != self.mean.len() {
            return Err(SVMError::DimensionMismatch {
                expected: self.mean.len(),
                actual: x.ncols(),
            });
        }

        for mut row in x.rows_mut() {
            for ((value, &mean), &std) in row.iter_mut().zip(&self.mean).zip(&self.std) {
                let scale = match self.policy {
                    ZeroVariance::Unit if std == 0.0 => 1.0,
                    _ => std,
                };
                *value = (*value - mean) / scale;
            }
        }
        Ok(())
    }

    /// Column means seen at fit time
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Column population deviations seen at fit time
    pub fn std(&self) -> &Array1<f64> {
        &self.std
    }
}
