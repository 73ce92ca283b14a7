//! Seeded train/test partitioning.
//!
//! Splitting is a pure, reproducible function of `(n, train_ratio, seed)`.
//! This is deliberately separate from the training loop's per-epoch shuffle,
//! which uses its own generator so run-to-run stochasticity in training never
//! perturbs the partition.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::{Dataset, Error, Result};

/// Shuffle sample indices with a seeded permutation and partition at
/// `floor(n * train_ratio)`.
///
/// Same `(n, train_ratio, seed)` always yields the identical partition.
/// `train_ratio` must lie in `(0, 1)` and both sides must be non-empty.
pub fn train_test_split(
    data: &Dataset,
    train_ratio: f32,
    seed: u64,
) -> Result<(Dataset, Dataset)> {
    if !(train_ratio.is_finite() && train_ratio > 0.0 && train_ratio < 1.0) {
        return Err(Error::InvalidConfig(format!(
            "train_ratio must lie in (0, 1), got {train_ratio}"
        )));
    }

    let n = data.len();
    let n_train = (n as f32 * train_ratio).floor() as usize;
    if n_train == 0 || n_train == n {
        return Err(Error::InvalidConfig(format!(
            "train_ratio {train_ratio} leaves an empty partition for {n} samples"
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = data.gather(&indices[..n_train]);
    let test = data.gather(&indices[n_train..]);
    Ok((train, test))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(n: usize) -> Dataset {
        let inputs: Vec<f32> = (0..n * 2).map(|i| i as f32).collect();
        let targets: Vec<f32> = (0..n).map(|i| i as f32).collect();
        Dataset::from_flat(inputs, targets, 2, 1).unwrap()
    }

    #[test]
    fn partition_is_disjoint_and_complete() {
        let data = sample(10);
        let (train, test) = train_test_split(&data, 0.7, 42).unwrap();
        assert_eq!(train.len(), 7);
        assert_eq!(test.len(), 3);

        // Targets uniquely identify rows here, so disjointness + coverage can
        // be checked on them.
        let mut seen: Vec<f32> = train
            .targets()
            .iter()
            .chain(test.targets())
            .copied()
            .collect();
        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let expected: Vec<f32> = (0..10).map(|i| i as f32).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn same_seed_gives_identical_partition() {
        let data = sample(20);
        let (train_a, test_a) = train_test_split(&data, 0.5, 7).unwrap();
        let (train_b, test_b) = train_test_split(&data, 0.5, 7).unwrap();
        assert_eq!(train_a.inputs(), train_b.inputs());
        assert_eq!(train_a.targets(), train_b.targets());
        assert_eq!(test_a.inputs(), test_b.inputs());
        assert_eq!(test_a.targets(), test_b.targets());
    }

    #[test]
    fn different_seed_gives_different_partition() {
        let data = sample(20);
        let (train_a, _) = train_test_split(&data, 0.5, 1).unwrap();
        let (train_b, _) = train_test_split(&data, 0.5, 2).unwrap();
        assert_ne!(train_a.targets(), train_b.targets());
    }

    #[test]
    fn rejects_out_of_range_ratio() {
        let data = sample(10);
        assert!(train_test_split(&data, 0.0, 0).is_err());
        assert!(train_test_split(&data, 1.0, 0).is_err());
        assert!(train_test_split(&data, -0.5, 0).is_err());
        assert!(train_test_split(&data, f32::NAN, 0).is_err());
    }

    #[test]
    fn rejects_degenerate_partition() {
        let data = sample(2);
        // floor(2 * 0.4) == 0 samples for training.
        assert!(train_test_split(&data, 0.4, 0).is_err());
    }
}
