//! Mini-batch SGD training loop with early stopping.
//!
//! Each epoch shuffles the training indices with a fresh permutation
//! (epoch-to-epoch stochasticity is intentional and uses its own generator,
//! never the split seed), partitions them into contiguous mini-batches, and
//! runs `forward -> loss -> backward -> update` per batch. The held-out set
//! is evaluated once per epoch through [`Network::predict`], which performs
//! no update and produces no cache.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::{loss, Dataset, Error, Network, Parameters, Result};

/// Training hyperparameters.
#[derive(Debug, Clone, Copy)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f32,
    /// Consecutive non-improving epochs tolerated before stopping.
    pub patience: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 200,
            batch_size: 64,
            learning_rate: 1e-2,
            patience: 10,
        }
    }
}

impl TrainConfig {
    /// Validate hyperparameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be > 0".to_owned()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be > 0".to_owned()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(
                "learning_rate must be finite and > 0".to_owned(),
            ));
        }
        if self.patience == 0 {
            return Err(Error::InvalidConfig("patience must be > 0".to_owned()));
        }
        Ok(())
    }
}

/// Per-epoch loss histories and stopping outcome.
///
/// Histories are append-only and include every epoch that ran, including the
/// non-improving epochs after the best one.
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub train_losses: Vec<f32>,
    pub test_losses: Vec<f32>,
    /// Zero-based epoch with the lowest test loss.
    pub best_epoch: usize,
    pub stopped_early: bool,
}

impl Network {
    /// Train on `train`, evaluating on `test` once per epoch.
    ///
    /// Epoch shuffling uses an unseeded generator; use
    /// [`Network::fit_with_rng`] to pin it in tests.
    pub fn fit(&mut self, train: &Dataset, test: &Dataset, cfg: TrainConfig) -> Result<TrainReport> {
        self.fit_with_rng(train, test, cfg, &mut rand::rng())
    }

    /// Train with an explicit shuffle RNG.
    ///
    /// Early stopping tracks the best test loss seen so far; a strict
    /// improvement resets the patience counter and deep-copies the parameter
    /// set. When the counter reaches `cfg.patience` the loop stops and the
    /// live parameters are rolled back to that snapshot.
    pub fn fit_with_rng<R: Rng + ?Sized>(
        &mut self,
        train: &Dataset,
        test: &Dataset,
        cfg: TrainConfig,
        rng: &mut R,
    ) -> Result<TrainReport> {
        cfg.validate()?;
        self.check_dataset(train, "train")?;
        self.check_dataset(test, "test")?;

        let n_train = train.len();
        let mut indices: Vec<usize> = (0..n_train).collect();
        let mut batch_x = Vec::with_capacity(cfg.batch_size * train.input_dim());
        let mut batch_y = Vec::with_capacity(cfg.batch_size * train.target_dim());

        let mut train_losses = Vec::with_capacity(cfg.epochs);
        let mut test_losses = Vec::with_capacity(cfg.epochs);

        let mut best_test_loss = f32::INFINITY;
        let mut best_epoch = 0;
        let mut best_params: Option<Parameters> = None;
        let mut patience_counter = 0;
        let mut stopped_early = false;

        for epoch in 0..cfg.epochs {
            indices.shuffle(rng);

            let mut loss_sum = 0.0_f32;
            let mut batches = 0;
            for chunk in indices.chunks(cfg.batch_size) {
                batch_x.clear();
                batch_y.clear();
                for &idx in chunk {
                    batch_x.extend_from_slice(train.input(idx));
                    batch_y.extend_from_slice(train.target(idx));
                }

                let (y_pred, cache) = self.forward(&batch_x);
                let batch_loss = loss::mse(&y_pred, &batch_y, chunk.len());
                if !batch_loss.is_finite() {
                    return Err(Error::NumericInstability(format!(
                        "training loss became non-finite at epoch {}",
                        epoch + 1
                    )));
                }

                let grads = self.backward(&batch_x, &batch_y, &y_pred, cache);
                self.apply_gradients(&grads, cfg.learning_rate);

                loss_sum += batch_loss;
                batches += 1;
            }
            let train_loss = loss_sum / batches as f32;
            train_losses.push(train_loss);

            // Forward-only evaluation pass over the held-out set.
            let test_pred = self.predict(test.inputs());
            let test_loss = loss::mse(&test_pred, test.targets(), test.len());
            if !test_loss.is_finite() {
                return Err(Error::NumericInstability(format!(
                    "test loss became non-finite at epoch {}",
                    epoch + 1
                )));
            }
            test_losses.push(test_loss);

            log::debug!(
                "epoch {}/{}: train_loss={train_loss:.6} test_loss={test_loss:.6}",
                epoch + 1,
                cfg.epochs
            );
            if (epoch + 1) % 10 == 0 {
                log::info!(
                    "epoch {}/{}: train_loss={train_loss:.6} test_loss={test_loss:.6}",
                    epoch + 1,
                    cfg.epochs
                );
            }

            if test_loss < best_test_loss {
                best_test_loss = test_loss;
                best_epoch = epoch;
                best_params = Some(self.snapshot());
                patience_counter = 0;
            } else {
                patience_counter += 1;
                if patience_counter >= cfg.patience {
                    log::info!(
                        "early stopping at epoch {}: no improvement for {} epochs",
                        epoch + 1,
                        cfg.patience
                    );
                    stopped_early = true;
                    break;
                }
            }
        }

        if stopped_early {
            if let Some(params) = best_params {
                self.restore(params);
            }
        }

        Ok(TrainReport {
            train_losses,
            test_losses,
            best_epoch,
            stopped_early,
        })
    }

    fn check_dataset(&self, data: &Dataset, name: &str) -> Result<()> {
        if data.is_empty() {
            return Err(Error::DataFormat(format!(
                "{name} dataset must not be empty"
            )));
        }
        if data.input_dim() != self.input_dim() {
            return Err(Error::DataFormat(format!(
                "{name} input_dim {} does not match network input_dim {}",
                data.input_dim(),
                self.input_dim()
            )));
        }
        if data.target_dim() != self.output_dim() {
            return Err(Error::DataFormat(format!(
                "{name} target_dim {} does not match network output_dim {}",
                data.target_dim(),
                self.output_dim()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::{Rng as _, SeedableRng};

    /// `y = x0 + x1 - x2 + 0.5 * x3`, inputs uniform in [0, 1).
    fn linear_dataset(n: usize, seed: u64) -> Dataset {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut inputs = Vec::with_capacity(n * 4);
        let mut targets = Vec::with_capacity(n);
        for _ in 0..n {
            let row: [f32; 4] = [rng.random(), rng.random(), rng.random(), rng.random()];
            targets.push(row[0] + row[1] - row[2] + 0.5 * row[3]);
            inputs.extend_from_slice(&row);
        }
        Dataset::from_flat(inputs, targets, 4, 1).unwrap()
    }

    #[test]
    fn config_validation_rejects_bad_hyperparams() {
        let ok = TrainConfig::default();
        assert!(ok.validate().is_ok());

        assert!(TrainConfig { epochs: 0, ..ok }.validate().is_err());
        assert!(TrainConfig { batch_size: 0, ..ok }.validate().is_err());
        assert!(TrainConfig {
            learning_rate: 0.0,
            ..ok
        }
        .validate()
        .is_err());
        assert!(TrainConfig {
            learning_rate: f32::NAN,
            ..ok
        }
        .validate()
        .is_err());
        assert!(TrainConfig { patience: 0, ..ok }.validate().is_err());
    }

    #[test]
    fn fit_rejects_mismatched_datasets() {
        let mut net = Network::new_with_seed(4, 4, 1, 0).unwrap();
        let train = linear_dataset(16, 0);
        let other = Dataset::from_flat(vec![0.0, 1.0], vec![0.5], 2, 1).unwrap();
        assert!(net
            .fit_with_rng(&other, &train, TrainConfig::default(), &mut StdRng::seed_from_u64(0))
            .is_err());
        assert!(net
            .fit_with_rng(&train, &other, TrainConfig::default(), &mut StdRng::seed_from_u64(0))
            .is_err());
    }

    #[test]
    fn training_loss_decreases_on_learnable_data() {
        let train = linear_dataset(64, 3);
        let test = linear_dataset(32, 4);
        let mut net = Network::new_with_seed(4, 8, 1, 5).unwrap();

        let cfg = TrainConfig {
            epochs: 50,
            batch_size: 8,
            learning_rate: 0.05,
            patience: 50,
        };
        let report = net
            .fit_with_rng(&train, &test, cfg, &mut StdRng::seed_from_u64(6))
            .unwrap();

        assert_eq!(report.train_losses.len(), report.test_losses.len());
        let first = report.train_losses[0];
        let last = *report.train_losses.last().unwrap();
        assert!(last < first, "expected loss to decrease: {first} -> {last}");
    }

    #[test]
    fn early_stopping_restores_best_parameters() {
        // Train targets and test targets conflict: fitting the train set
        // pushes predictions toward 1 while the test set wants 0, so test
        // loss worsens every epoch after the first.
        let mut rng = StdRng::seed_from_u64(9);
        let mut inputs = Vec::new();
        for _ in 0..16 * 4 {
            inputs.push(rng.random::<f32>());
        }
        let train = Dataset::from_flat(inputs.clone(), vec![1.0; 16], 4, 1).unwrap();
        let test = Dataset::from_flat(inputs, vec![0.0; 16], 4, 1).unwrap();

        // All-positive parameters and inputs keep every prediction in (0, 1)
        // and rising while the train targets pull upward, so the test loss
        // increases strictly after the first epoch.
        let params = crate::Parameters {
            w1: vec![0.25; 16],
            b1: vec![0.0; 4],
            w2: vec![0.25; 4],
            b2: vec![0.0],
        };
        let mut net = Network::from_parts(4, 4, 1, params).unwrap();
        let cfg = TrainConfig {
            epochs: 100,
            batch_size: 4,
            learning_rate: 0.05,
            patience: 2,
        };
        let report = net
            .fit_with_rng(&train, &test, cfg, &mut StdRng::seed_from_u64(10))
            .unwrap();

        assert!(report.stopped_early);
        // 1 improving epoch + patience non-improving epochs at most.
        assert!(report.test_losses.len() <= 1 + cfg.patience + 1);

        let best = report
            .test_losses
            .iter()
            .copied()
            .fold(f32::INFINITY, f32::min);
        assert_eq!(report.test_losses[report.best_epoch], best);

        // The rolled-back parameters must reproduce the best test loss
        // exactly, not the final epoch's.
        let pred = net.predict(test.inputs());
        let restored_loss = loss::mse(&pred, test.targets(), test.len());
        assert_eq!(restored_loss, best);
        assert!(*report.test_losses.last().unwrap() > best);
    }

    #[test]
    fn exploded_learning_rate_is_detected() {
        let train = linear_dataset(32, 11);
        let test = linear_dataset(16, 12);
        let mut net = Network::new_with_seed(4, 8, 1, 13).unwrap();

        let cfg = TrainConfig {
            epochs: 50,
            batch_size: 8,
            learning_rate: 1e12,
            patience: 50,
        };
        let err = net
            .fit_with_rng(&train, &test, cfg, &mut StdRng::seed_from_u64(14))
            .unwrap_err();
        assert!(matches!(err, Error::NumericInstability(_)), "{err}");
    }

    #[test]
    fn histories_cover_every_epoch_without_early_stop() {
        let train = linear_dataset(16, 20);
        let test = linear_dataset(8, 21);
        let mut net = Network::new_with_seed(4, 4, 1, 22).unwrap();

        let cfg = TrainConfig {
            epochs: 12,
            batch_size: 4,
            learning_rate: 1e-3,
            patience: 100,
        };
        let report = net
            .fit_with_rng(&train, &test, cfg, &mut StdRng::seed_from_u64(23))
            .unwrap();
        assert!(!report.stopped_early);
        assert_eq!(report.train_losses.len(), 12);
        assert_eq!(report.test_losses.len(), 12);
    }
}
