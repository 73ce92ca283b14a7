//! Loss helpers.

/// Mean squared error over the batch dimension.
///
/// `pred` and `target` are flat `(rows, output_dim)` buffers; the sum of
/// squared errors is divided by `rows`, matching the gradient convention
/// used by [`crate::Network::backward`].
///
/// Shape contract:
/// - `pred.len() == target.len()`
/// - `pred.len()` is a multiple of `rows`
#[inline]
pub fn mse(pred: &[f32], target: &[f32], rows: usize) -> f32 {
    assert_eq!(
        pred.len(),
        target.len(),
        "pred len {} does not match target len {}",
        pred.len(),
        target.len()
    );

    if rows == 0 {
        return 0.0;
    }
    assert_eq!(
        pred.len() % rows,
        0,
        "pred len {} is not a multiple of rows {rows}",
        pred.len()
    );

    let mut sum_sq = 0.0_f32;
    for i in 0..pred.len() {
        let diff = pred[i] - target[i];
        sum_sq = diff.mul_add(diff, sum_sq);
    }
    sum_sq / rows as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mse_of_equal_slices_is_zero() {
        assert_eq!(mse(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0], 3), 0.0);
    }

    #[test]
    fn mse_averages_over_rows() {
        // Per-row squared errors: 1, 9 -> mean 5.
        let got = mse(&[1.0, 0.0], &[0.0, 3.0], 2);
        assert!((got - 5.0).abs() < 1e-6);
    }

    #[test]
    fn mse_of_empty_batch_is_zero() {
        assert_eq!(mse(&[], &[], 0), 0.0);
    }

    #[test]
    #[should_panic]
    fn mse_panics_on_length_mismatch() {
        mse(&[1.0], &[1.0, 2.0], 1);
    }
}
