//! CSV table loading
//!
//! Tables are comma-delimited with a header row. Every data cell must parse
//! as a number and every row must have as many cells as the header.

use crate::core::{Result, SVMError};
use ndarray::Array2;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// A numeric table with named columns
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    values: Array2<f64>,
}

impl Table {
    /// Build a table from headers and values; the column counts must agree
    pub fn new(headers: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if headers.len() != values.ncols() {
            return Err(SVMError::DimensionMismatch {
                expected: headers.len(),
                actual: values.ncols(),
            });
        }
        Ok(Self { headers, values })
    }

    /// Load a table from a CSV file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        log::debug!("Reading table from {}", path.display());
        Self::from_reader(BufReader::new(file))
    }

    /// Load a table from any reader producing CSV text
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() || headers.iter().all(String::is_empty) {
            return Err(SVMError::EmptyDataset);
        }

        let mut data = Vec::new();
        let mut n_rows = 0;
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            for (column, field) in record.iter().enumerate() {
                let value = field.parse::<f64>().map_err(|_| {
                    SVMError::ParseError(format!(
                        "Invalid number at row {}, column '{}': {:?}",
                        row + 1,
                        headers[column],
                        field
                    ))
                })?;
                data.push(value);
            }
            n_rows += 1;
        }

        if n_rows == 0 {
            return Err(SVMError::EmptyDataset);
        }

        let values = Array2::from_shape_vec((n_rows, headers.len()), data)
            .map_err(|e| SVMError::InvalidDataset(e.to_string()))?;
        Ok(Self { headers, values })
    }

    /// Column names in file order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// All cell values, one row per record
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Position of a named column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// Take ownership of headers and values
    pub fn into_parts(self) -> (Vec<String>, Array2<f64>) {
        (self.headers, self.values)
    }
}
