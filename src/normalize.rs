//! Min-max normalization.
//!
//! Features are scaled per column and targets globally with
//! `(v - min) / (max - min + EPSILON)`. The fitted parameters are retained so
//! predictions can be mapped back to original units.

use crate::{Dataset, Error, Result};

/// Range floor guarding against division by zero on constant features.
pub const EPSILON: f32 = 1e-8;

/// Fitted min-max parameters: per-feature for X, global for y.
///
/// Invariant: `x_max[i] >= x_min[i]` for every feature and `y_max >= y_min`;
/// constant columns are handled by the [`EPSILON`] floor on the range.
#[derive(Debug, Clone, PartialEq)]
pub struct NormParams {
    x_min: Vec<f32>,
    x_max: Vec<f32>,
    y_min: f32,
    y_max: f32,
}

impl NormParams {
    /// Compute min-max parameters from `data`.
    ///
    /// Deterministic: identical input always yields identical parameters.
    pub fn fit(data: &Dataset) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::DataFormat(
                "cannot fit normalization on an empty dataset".to_owned(),
            ));
        }

        let dim = data.input_dim();
        let mut x_min = vec![f32::INFINITY; dim];
        let mut x_max = vec![f32::NEG_INFINITY; dim];
        for idx in 0..data.len() {
            for (col, &v) in data.input(idx).iter().enumerate() {
                x_min[col] = x_min[col].min(v);
                x_max[col] = x_max[col].max(v);
            }
        }

        let mut y_min = f32::INFINITY;
        let mut y_max = f32::NEG_INFINITY;
        for &v in data.targets() {
            y_min = y_min.min(v);
            y_max = y_max.max(v);
        }

        Ok(Self {
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }

    /// Apply the fitted scaling to `data`, returning a new dataset.
    pub fn transform(&self, data: &Dataset) -> Result<Dataset> {
        if data.input_dim() != self.x_min.len() {
            return Err(Error::DataFormat(format!(
                "dataset input_dim {} does not match fitted input_dim {}",
                data.input_dim(),
                self.x_min.len()
            )));
        }

        let dim = data.input_dim();
        let mut inputs = Vec::with_capacity(data.inputs().len());
        for (i, &v) in data.inputs().iter().enumerate() {
            let col = i % dim;
            inputs.push((v - self.x_min[col]) / (self.x_max[col] - self.x_min[col] + EPSILON));
        }

        let y_range = self.y_max - self.y_min + EPSILON;
        let targets: Vec<f32> = data.targets().iter().map(|&v| (v - self.y_min) / y_range).collect();

        Dataset::from_flat(inputs, targets, dim, data.target_dim())
    }

    /// Map a normalized prediction back to original target units.
    #[inline]
    pub fn denormalize_target(&self, y_norm: f32) -> f32 {
        y_norm * (self.y_max - self.y_min + EPSILON) + self.y_min
    }

    #[inline]
    pub fn x_min(&self) -> &[f32] {
        &self.x_min
    }

    #[inline]
    pub fn x_max(&self) -> &[f32] {
        &self.x_max
    }

    #[inline]
    pub fn y_min(&self) -> f32 {
        self.y_min
    }

    #[inline]
    pub fn y_max(&self) -> f32 {
        self.y_max
    }
}
