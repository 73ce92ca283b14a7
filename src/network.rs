//! The two-layer regression network.
//!
//! Architecture: `input -> hidden (ReLU) -> output (identity)`, with
//! hand-derived gradients. The forward pass returns an explicit
//! [`ForwardCache`] that [`Network::backward`] consumes by value, so a cache
//! backs exactly one backward call, on the batch that produced it. There is
//! no hidden mutable state between the two passes.
//!
//! Shape mismatches on this hot path are treated as programmer error and
//! panic via `assert!`; configuration problems at construction time return
//! [`Result`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::{Error, Result};

/// Learnable parameters of the network.
///
/// Flat row-major matrices: `w1` is `(input_dim, hidden_dim)` and `w2` is
/// `(hidden_dim, output_dim)`. An independently owned, cloneable value so a
/// best-weights snapshot is a true deep copy, never an alias into the live
/// tensors.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub w1: Vec<f32>,
    pub b1: Vec<f32>,
    pub w2: Vec<f32>,
    pub b2: Vec<f32>,
}

/// Hidden-layer activations cached by [`Network::forward`].
///
/// Opaque to callers; pass it to [`Network::backward`] together with the same
/// input batch. Consuming it by value makes the same-batch precondition
/// structural: a stale cache cannot back a second backward call.
#[derive(Debug)]
pub struct ForwardCache {
    rows: usize,
    /// Hidden pre-activation, `(rows, hidden_dim)`.
    z1: Vec<f32>,
    /// Hidden activation `ReLU(z1)`, `(rows, hidden_dim)`.
    a1: Vec<f32>,
}

impl ForwardCache {
    #[inline]
    /// Number of samples in the batch that produced this cache.
    pub fn rows(&self) -> usize {
        self.rows
    }
}

/// Parameter gradients produced by [`Network::backward`].
#[derive(Debug, Clone)]
pub struct Gradients {
    pub d_w1: Vec<f32>,
    pub d_b1: Vec<f32>,
    pub d_w2: Vec<f32>,
    pub d_b2: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct Network {
    input_dim: usize,
    hidden_dim: usize,
    output_dim: usize,
    params: Parameters,
}

impl Network {
    /// Construct a network with He-initialized weights from a seed.
    pub fn new_with_seed(
        input_dim: usize,
        hidden_dim: usize,
        output_dim: usize,
        seed: u64,
    ) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new_with_rng(input_dim, hidden_dim, output_dim, &mut rng)
    }

    /// Construct a network with He-initialized weights using the provided RNG.
    ///
    /// Weights are drawn from a zero-mean normal scaled by `sqrt(2 / fan_in)`
    /// (the ReLU hidden layer needs this to keep pre-activation variance
    /// stable at initialization); biases start at zero.
    pub fn new_with_rng<R: Rng + ?Sized>(
        input_dim: usize,
        hidden_dim: usize,
        output_dim: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if input_dim == 0 || hidden_dim == 0 || output_dim == 0 {
            return Err(Error::InvalidConfig(
                "network dimensions must all be > 0".to_owned(),
            ));
        }

        let w1 = he_matrix(input_dim, hidden_dim, rng);
        let w2 = he_matrix(hidden_dim, output_dim, rng);
        let params = Parameters {
            w1,
            b1: vec![0.0; hidden_dim],
            w2,
            b2: vec![0.0; output_dim],
        };

        Ok(Self {
            input_dim,
            hidden_dim,
            output_dim,
            params,
        })
    }

    /// Construct a network from existing parameters, validating their shapes.
    pub fn from_parts(
        input_dim: usize,
        hidden_dim: usize,
        output_dim: usize,
        params: Parameters,
    ) -> Result<Self> {
        if input_dim == 0 || hidden_dim == 0 || output_dim == 0 {
            return Err(Error::InvalidConfig(
                "network dimensions must all be > 0".to_owned(),
            ));
        }
        if params.w1.len() != input_dim * hidden_dim
            || params.b1.len() != hidden_dim
            || params.w2.len() != hidden_dim * output_dim
            || params.b2.len() != output_dim
        {
            return Err(Error::InvalidConfig(format!(
                "parameter lengths do not match dims ({input_dim}, {hidden_dim}, {output_dim})"
            )));
        }
        Ok(Self {
            input_dim,
            hidden_dim,
            output_dim,
            params,
        })
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    #[inline]
    pub fn hidden_dim(&self) -> usize {
        self.hidden_dim
    }

    #[inline]
    pub fn output_dim(&self) -> usize {
        self.output_dim
    }

    #[inline]
    pub fn params(&self) -> &Parameters {
        &self.params
    }

    #[inline]
    pub fn params_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    /// Deep copy of the current parameters.
    #[inline]
    pub fn snapshot(&self) -> Parameters {
        self.params.clone()
    }

    /// Overwrite the live parameters wholesale (e.g. from a best-weights
    /// snapshot).
    ///
    /// Panics if the shapes do not match this network.
    pub fn restore(&mut self, params: Parameters) {
        assert_eq!(params.w1.len(), self.input_dim * self.hidden_dim);
        assert_eq!(params.b1.len(), self.hidden_dim);
        assert_eq!(params.w2.len(), self.hidden_dim * self.output_dim);
        assert_eq!(params.b2.len(), self.output_dim);
        self.params = params;
    }

    #[inline]
    fn batch_rows(&self, x: &[f32]) -> usize {
        assert!(!x.is_empty(), "input batch must not be empty");
        assert_eq!(
            x.len() % self.input_dim,
            0,
            "input len {} is not a multiple of input_dim {}",
            x.len(),
            self.input_dim
        );
        x.len() / self.input_dim
    }

    /// Forward pass over a flat `(rows, input_dim)` batch.
    ///
    /// Computes `z1 = x * w1 + b1`, `a1 = relu(z1)`, `y = a1 * w2 + b2` and
    /// returns the predictions `(rows, output_dim)` together with the cache
    /// the matching [`Network::backward`] call consumes.
    pub fn forward(&self, x: &[f32]) -> (Vec<f32>, ForwardCache) {
        let rows = self.batch_rows(x);
        let (input_dim, hidden_dim, output_dim) = (self.input_dim, self.hidden_dim, self.output_dim);

        let mut z1 = vec![0.0_f32; rows * hidden_dim];
        for r in 0..rows {
            let x_row = r * input_dim;
            let z_row = r * hidden_dim;
            for j in 0..hidden_dim {
                let mut sum = self.params.b1[j];
                for i in 0..input_dim {
                    sum = self.params.w1[i * hidden_dim + j].mul_add(x[x_row + i], sum);
                }
                z1[z_row + j] = sum;
            }
        }

        let a1: Vec<f32> = z1.iter().map(|&z| z.max(0.0)).collect();

        // Identity output activation: this is a regression head.
        let mut y = vec![0.0_f32; rows * output_dim];
        for r in 0..rows {
            let a_row = r * hidden_dim;
            let y_row = r * output_dim;
            for o in 0..output_dim {
                let mut sum = self.params.b2[o];
                for j in 0..hidden_dim {
                    sum = self.params.w2[j * output_dim + o].mul_add(a1[a_row + j], sum);
                }
                y[y_row + o] = sum;
            }
        }

        (y, ForwardCache { rows, z1, a1 })
    }

    /// Evaluation-only forward pass: no cache is produced, so no backward
    /// call can follow from it.
    pub fn predict(&self, x: &[f32]) -> Vec<f32> {
        self.forward(x).0
    }

    /// Backward pass for the batch that produced `cache`.
    ///
    /// With `L = mean((y_pred - y_true)^2)` over the batch dimension:
    /// - `d_z2 = (2 / rows) * (y_pred - y_true)`
    /// - `d_w2 = a1^T * d_z2`, `d_b2 = column_sum(d_z2)`
    /// - `d_a1 = d_z2 * w2^T`
    /// - `d_z1 = d_a1 * relu'(z1)` with subgradient 0 at `z1 == 0`
    /// - `d_w1 = x^T * d_z1`, `d_b1 = column_sum(d_z1)`
    pub fn backward(
        &self,
        x: &[f32],
        y_true: &[f32],
        y_pred: &[f32],
        cache: ForwardCache,
    ) -> Gradients {
        let rows = self.batch_rows(x);
        let (input_dim, hidden_dim, output_dim) = (self.input_dim, self.hidden_dim, self.output_dim);
        assert_eq!(
            cache.rows, rows,
            "cache was built for {} rows, input batch has {rows}",
            cache.rows
        );
        assert_eq!(
            y_true.len(),
            rows * output_dim,
            "y_true len {} does not match rows * output_dim ({rows} * {output_dim})",
            y_true.len()
        );
        assert_eq!(
            y_pred.len(),
            rows * output_dim,
            "y_pred len {} does not match rows * output_dim ({rows} * {output_dim})",
            y_pred.len()
        );

        let inv_rows = 2.0 / rows as f32;
        let d_z2: Vec<f32> = y_pred
            .iter()
            .zip(y_true)
            .map(|(&p, &t)| inv_rows * (p - t))
            .collect();

        let mut d_w2 = vec![0.0_f32; hidden_dim * output_dim];
        let mut d_b2 = vec![0.0_f32; output_dim];
        for r in 0..rows {
            let a_row = r * hidden_dim;
            let z_row = r * output_dim;
            for o in 0..output_dim {
                let g = d_z2[z_row + o];
                d_b2[o] += g;
                for j in 0..hidden_dim {
                    d_w2[j * output_dim + o] = cache.a1[a_row + j].mul_add(g, d_w2[j * output_dim + o]);
                }
            }
        }

        let mut d_z1 = vec![0.0_f32; rows * hidden_dim];
        for r in 0..rows {
            let a_row = r * hidden_dim;
            let z_row = r * output_dim;
            for j in 0..hidden_dim {
                if cache.z1[a_row + j] > 0.0 {
                    let mut d_a = 0.0_f32;
                    for o in 0..output_dim {
                        d_a = self.params.w2[j * output_dim + o].mul_add(d_z2[z_row + o], d_a);
                    }
                    d_z1[a_row + j] = d_a;
                }
            }
        }

        let mut d_w1 = vec![0.0_f32; input_dim * hidden_dim];
        let mut d_b1 = vec![0.0_f32; hidden_dim];
        for r in 0..rows {
            let x_row = r * input_dim;
            let z_row = r * hidden_dim;
            for j in 0..hidden_dim {
                let g = d_z1[z_row + j];
                d_b1[j] += g;
                for i in 0..input_dim {
                    d_w1[i * hidden_dim + j] = x[x_row + i].mul_add(g, d_w1[i * hidden_dim + j]);
                }
            }
        }

        Gradients {
            d_w1,
            d_b1,
            d_w2,
            d_b2,
        }
    }

    /// In-place gradient-descent step: `param -= learning_rate * grad`.
    pub fn apply_gradients(&mut self, grads: &Gradients, learning_rate: f32) {
        assert!(
            learning_rate.is_finite() && learning_rate > 0.0,
            "learning rate must be finite and > 0"
        );
        assert_eq!(grads.d_w1.len(), self.params.w1.len());
        assert_eq!(grads.d_b1.len(), self.params.b1.len());
        assert_eq!(grads.d_w2.len(), self.params.w2.len());
        assert_eq!(grads.d_b2.len(), self.params.b2.len());

        step(&mut self.params.w1, &grads.d_w1, learning_rate);
        step(&mut self.params.b1, &grads.d_b1, learning_rate);
        step(&mut self.params.w2, &grads.d_w2, learning_rate);
        step(&mut self.params.b2, &grads.d_b2, learning_rate);
    }
}

#[inline]
fn step(params: &mut [f32], grads: &[f32], lr: f32) {
    for (p, &g) in params.iter_mut().zip(grads) {
        *p = g.mul_add(-lr, *p);
    }
}

fn he_matrix<R: Rng + ?Sized>(fan_in: usize, fan_out: usize, rng: &mut R) -> Vec<f32> {
    let scale = (2.0 / fan_in as f32).sqrt();
    (0..fan_in * fan_out)
        .map(|_| {
            let z: f32 = rng.sample(StandardNormal);
            z * scale
        })
        .collect()
}
