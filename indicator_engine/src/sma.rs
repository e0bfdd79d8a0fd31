/// Simple moving average: mean of the closes in `[i - window + 1, i]`.
///
/// `None` while `i < window - 1`, and everywhere for `window == 0`.
pub fn sma(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; closes.len()];
    }

    // Each window is summed from scratch so long series don't accumulate drift.
    (0..closes.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let slice = &closes[i + 1 - window..=i];
            Some(slice.iter().sum::<f64>() / window as f64)
        })
        .collect()
}
