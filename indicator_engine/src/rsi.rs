//! Relative strength index over close-to-close deltas.
//!
//! At bar `i` (needs `period` deltas, so `i >= period`):
//!
//! ```text
//! avg_gain = mean(max(delta, 0))   over the last `period` deltas
//! avg_loss = mean(max(-delta, 0))
//! RSI      = 100 - 100 / (1 + avg_gain / avg_loss)
//! ```
//!
//! A window without losses is pinned to 100 and a window with losses but no
//! gains to 0, so the result never divides by zero and stays in `[0, 100]`.

pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() <= period {
        return out;
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    for i in period..closes.len() {
        // deltas[j] is the change into bar j + 1
        let window = &deltas[i - period..i];
        let gain = window.iter().map(|d| d.max(0.0)).sum::<f64>() / period as f64;
        let loss = window.iter().map(|d| (-d).max(0.0)).sum::<f64>() / period as f64;
        out[i] = Some(strength_index(gain, loss));
    }
    out
}

fn strength_index(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    if avg_gain == 0.0 {
        return 0.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_gains_is_exactly_100() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let out = rsi(&closes, 14);
        assert!(out[..14].iter().all(Option::is_none));
        assert!(out[14..].iter().all(|v| *v == Some(100.0)));
    }

    #[test]
    fn all_losses_is_exactly_0() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let out = rsi(&closes, 14);
        assert!(out[14..].iter().all(|v| *v == Some(0.0)));
    }

    #[test]
    fn flat_window_has_no_losses() {
        let out = rsi(&[50.0; 16], 14);
        assert_eq!(out[15], Some(100.0));
    }

    #[test]
    fn balanced_moves_sit_at_50() {
        let closes: Vec<f64> = (0..15).map(|i| if i % 2 == 0 { 10.0 } else { 11.0 }).collect();
        let out = rsi(&closes, 14);
        assert!((out[14].unwrap() - 50.0).abs() < 1e-9);
    }
}
