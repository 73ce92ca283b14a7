//! Contiguous dataset storage and table loading.
//!
//! The training loop operates on flat slices to avoid per-step allocations.
//! `Dataset` provides validated, row-major storage for the feature matrix X
//! and the target matrix y, plus a loader for the whitespace-delimited
//! numeric tables the BRDF samples ship in.

use std::fs;
use std::path::Path;

use crate::{Error, Result};

/// A supervised dataset: inputs (X) and targets (y).
///
/// Stored as contiguous buffers with row-major layout:
/// - `inputs.len() == len * input_dim`
/// - `targets.len() == len * target_dim`
#[derive(Debug, Clone)]
pub struct Dataset {
    inputs: Vec<f32>,
    targets: Vec<f32>,
    len: usize,
    input_dim: usize,
    target_dim: usize,
}

impl Dataset {
    /// Build a dataset from flat buffers.
    ///
    /// `inputs` is `(len, input_dim)` and `targets` is `(len, target_dim)`.
    pub fn from_flat(
        inputs: Vec<f32>,
        targets: Vec<f32>,
        input_dim: usize,
        target_dim: usize,
    ) -> Result<Self> {
        if input_dim == 0 {
            return Err(Error::DataFormat("input_dim must be > 0".to_owned()));
        }
        if target_dim == 0 {
            return Err(Error::DataFormat("target_dim must be > 0".to_owned()));
        }
        if inputs.len() % input_dim != 0 {
            return Err(Error::DataFormat(format!(
                "inputs length {} is not divisible by input_dim {}",
                inputs.len(),
                input_dim
            )));
        }

        let len = inputs.len() / input_dim;
        if targets.len() != len * target_dim {
            return Err(Error::DataFormat(format!(
                "targets length {} does not match len * target_dim ({len} * {target_dim})",
                targets.len()
            )));
        }

        Ok(Self {
            inputs,
            targets,
            len,
            input_dim,
            target_dim,
        })
    }

    /// Load a whitespace-delimited numeric table from a file.
    ///
    /// One sample per row, no header: the first `input_dim` columns are
    /// features and the remaining `target_dim` columns are targets. Any
    /// malformed row fails the whole load; there is no row-skipping recovery.
    pub fn from_table_file<P: AsRef<Path>>(
        path: P,
        input_dim: usize,
        target_dim: usize,
    ) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_table_str(&text, input_dim, target_dim)
    }

    /// Parse a whitespace-delimited numeric table from a string.
    ///
    /// Same format as [`Dataset::from_table_file`]. Blank lines are skipped.
    pub fn from_table_str(text: &str, input_dim: usize, target_dim: usize) -> Result<Self> {
        if input_dim == 0 || target_dim == 0 {
            return Err(Error::DataFormat(
                "input_dim and target_dim must be > 0".to_owned(),
            ));
        }

        let width = input_dim + target_dim;
        let mut inputs = Vec::new();
        let mut targets = Vec::new();
        let mut len = 0;
        let mut row = Vec::with_capacity(width);

        for (line_idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            row.clear();
            for token in line.split_whitespace() {
                let value: f32 = token.parse().map_err(|_| {
                    Error::DataFormat(format!(
                        "line {}: non-numeric field {token:?}",
                        line_idx + 1
                    ))
                })?;
                row.push(value);
            }

            if row.len() != width {
                return Err(Error::DataFormat(format!(
                    "line {}: expected {width} fields, found {}",
                    line_idx + 1,
                    row.len()
                )));
            }

            inputs.extend_from_slice(&row[..input_dim]);
            targets.extend_from_slice(&row[input_dim..]);
            len += 1;
        }

        if len == 0 {
            return Err(Error::DataFormat("table contains no samples".to_owned()));
        }

        Ok(Self {
            inputs,
            targets,
            len,
            input_dim,
            target_dim,
        })
    }

    #[inline]
    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    /// Returns true if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    /// Returns the per-sample input dimension.
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    #[inline]
    /// Returns the per-sample target dimension.
    pub fn target_dim(&self) -> usize {
        self.target_dim
    }

    #[inline]
    /// Returns all inputs as a flat `(len, input_dim)` buffer.
    pub fn inputs(&self) -> &[f32] {
        &self.inputs
    }

    #[inline]
    /// Returns all targets as a flat `(len, target_dim)` buffer.
    pub fn targets(&self) -> &[f32] {
        &self.targets
    }

    #[inline]
    /// Returns the `idx`-th input row (shape: `(input_dim,)`).
    ///
    /// Panics if `idx >= len`.
    pub fn input(&self, idx: usize) -> &[f32] {
        let start = idx * self.input_dim;
        &self.inputs[start..start + self.input_dim]
    }

    #[inline]
    /// Returns the `idx`-th target row (shape: `(target_dim,)`).
    ///
    /// Panics if `idx >= len`.
    pub fn target(&self, idx: usize) -> &[f32] {
        let start = idx * self.target_dim;
        &self.targets[start..start + self.target_dim]
    }

    /// Build a new dataset from the selected sample indices, in order.
    ///
    /// Panics if any index is out of range.
    pub fn gather(&self, indices: &[usize]) -> Dataset {
        let mut inputs = Vec::with_capacity(indices.len() * self.input_dim);
        let mut targets = Vec::with_capacity(indices.len() * self.target_dim);
        for &idx in indices {
            assert!(idx < self.len, "index {idx} out of range for {} samples", self.len);
            inputs.extend_from_slice(self.input(idx));
            targets.extend_from_slice(self.target(idx));
        }
        Dataset {
            inputs,
            targets,
            len: indices.len(),
            input_dim: self.input_dim,
            target_dim: self.target_dim,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_flat_validates_shapes() {
        let ok = Dataset::from_flat(vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 1.0], 2, 1);
        assert!(ok.is_ok());

        let err = Dataset::from_flat(vec![0.0, 1.0, 2.0], vec![0.0], 2, 1);
        assert!(err.is_err());

        let err = Dataset::from_flat(vec![0.0, 1.0], vec![0.0, 1.0], 2, 1);
        assert!(err.is_err());
    }

    #[test]
    fn parses_whitespace_table() {
        let table = "0.1 0.2 0.3 0.4 1.5\n-1.0\t2.0 3e-1 0.0 0.25\n\n0 0 0 0 0\n";
        let data = Dataset::from_table_str(table, 4, 1).unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data.input(0), &[0.1, 0.2, 0.3, 0.4]);
        assert_eq!(data.target(0), &[1.5]);
        assert_eq!(data.input(1), &[-1.0, 2.0, 0.3, 0.0]);
        assert_eq!(data.target(2), &[0.0]);
    }

    #[test]
    fn rejects_short_row() {
        let table = "0.1 0.2 0.3 0.4 1.5\n0.1 0.2 0.3 0.4\n";
        let err = Dataset::from_table_str(table, 4, 1).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn rejects_non_numeric_token() {
        let table = "0.1 0.2 oops 0.4 1.5\n";
        let err = Dataset::from_table_str(table, 4, 1).unwrap_err();
        assert!(err.to_string().contains("oops"));
    }

    #[test]
    fn rejects_empty_table() {
        assert!(Dataset::from_table_str("\n\n", 4, 1).is_err());
    }

    #[test]
    fn gather_selects_rows_in_order() {
        let data =
            Dataset::from_flat(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![10.0, 20.0, 30.0], 2, 1)
                .unwrap();
        let picked = data.gather(&[2, 0]);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked.input(0), &[5.0, 6.0]);
        assert_eq!(picked.target(0), &[30.0]);
        assert_eq!(picked.input(1), &[1.0, 2.0]);
    }
}
