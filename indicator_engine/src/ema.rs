//! Exponential moving average.
//!
//! ```text
//! alpha  = 2 / (span + 1)
//! EMA[span-1] = mean(close[0..span])
//! EMA[i]      = alpha * close[i] + (1 - alpha) * EMA[i-1]   for i >= span
//! ```

/// EMA aligned with `closes`; `None` for `i < span - 1`.
pub fn ema(closes: &[f64], span: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if span == 0 || closes.len() < span {
        return out;
    }

    let alpha = smoothing(span);
    let mut prev = closes[..span].iter().sum::<f64>() / span as f64;
    out[span - 1] = Some(prev);

    for (i, &close) in closes.iter().enumerate().skip(span) {
        prev = alpha * close + (1.0 - alpha) * prev;
        out[i] = Some(prev);
    }
    out
}

/// Smoothing factor for an EMA over `span` observations.
pub(crate) fn smoothing(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_with_simple_average() {
        let out = ema(&[2.0, 4.0, 6.0], 3);
        assert_eq!(out[..2], [None, None]);
        assert!((out[2].unwrap() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn follows_recurrence() {
        let closes: Vec<f64> = (1..=10).map(f64::from).collect();
        let out = ema(&closes, 5);

        let alpha = 2.0 / 6.0;
        let mut expected = 3.0;
        for i in 5..10 {
            expected = alpha * closes[i] + (1.0 - alpha) * expected;
            assert!((out[i].unwrap() - expected).abs() < 1e-10, "index {i}");
        }
        assert!(out[..4].iter().all(Option::is_none));
    }

    #[test]
    fn too_short() {
        assert_eq!(ema(&[1.0, 2.0], 12), vec![None, None]);
        assert_eq!(ema(&[1.0, 2.0], 0), vec![None, None]);
    }
}
