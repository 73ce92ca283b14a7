//! A small two-layer regression network for tabulated BRDF data.
//!
//! `brdf-mlp` trains a fully explicit `4 -> hidden (ReLU) -> 1` feed-forward
//! network on sampled reflectance data: min-max normalization, a seeded
//! train/test split, mini-batch SGD with hand-derived gradients, early
//! stopping with best-weight rollback, and a human-readable weight report.
//!
//! # Design goals
//!
//! - Explicit numerics: forward/backward are hand-written loops over flat
//!   row-major `f32` buffers; no autodiff, no optimizer zoo, no GPU.
//! - Explicit coupling: [`Network::forward`] returns a [`ForwardCache`] that
//!   [`Network::backward`] consumes by value, so the backward pass can only
//!   ever see the cache of the batch that produced it.
//! - Reproducibility where it matters: the train/test split is a pure
//!   function of its seed, while per-epoch shuffling is intentionally
//!   stochastic and uses a separate generator.
//!
//! # Panics vs `Result`
//!
//! - Construction, data loading, and training configuration are validated
//!   and return [`Result`].
//! - The hot path ([`Network::forward`], [`Network::backward`],
//!   [`Network::apply_gradients`]) treats shape mismatches as programmer
//!   error and panics via `assert!`.
//!
//! # Quick start
//!
//! ```rust
//! use brdf_mlp::{train_test_split, Dataset, Network, NormParams, TrainConfig};
//!
//! # fn main() -> brdf_mlp::Result<()> {
//! let table = "\
//! 0.10 0.20 0.30 0.40 0.90
//! 0.50 0.10 0.70 0.20 1.40
//! 0.90 0.80 0.10 0.60 2.10
//! 0.30 0.60 0.50 0.80 1.70
//! ";
//! let raw = Dataset::from_table_str(table, 4, 1)?;
//!
//! let norm = NormParams::fit(&raw)?;
//! let data = norm.transform(&raw)?;
//! let (train, test) = train_test_split(&data, 0.5, 42)?;
//!
//! let mut network = Network::new_with_seed(4, 8, 1, 0)?;
//! let report = network.fit(
//!     &train,
//!     &test,
//!     TrainConfig {
//!         epochs: 20,
//!         batch_size: 2,
//!         learning_rate: 0.05,
//!         patience: 10,
//!     },
//! )?;
//! assert_eq!(report.train_losses.len(), report.test_losses.len());
//! # Ok(())
//! # }
//! ```

pub mod data;
pub mod error;
pub mod loss;
pub mod network;
pub mod normalize;
pub mod report;
pub mod split;
pub mod trainer;

#[cfg(feature = "serde")]
pub mod serde_model;

pub use data::Dataset;
pub use error::{Error, Result};
pub use network::{ForwardCache, Gradients, Network, Parameters};
pub use normalize::{NormParams, EPSILON};
pub use report::{save_weights, write_weights};
pub use split::train_test_split;
pub use trainer::{TrainConfig, TrainReport};
