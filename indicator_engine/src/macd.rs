use crate::ema::{ema, smoothing};

/// MACD line and its signal, both aligned with the input closes.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub line: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
}

/// `line = EMA(fast) - EMA(slow)`, `signal = EMA(line, signal_span)`.
///
/// The signal EMA starts at the first defined MACD value instead of waiting
/// for `signal_span` of them, so it is defined exactly where the line is.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal_span: usize) -> MacdSeries {
    let fast_ema = ema(closes, fast);
    let slow_ema = ema(closes, slow);

    let line: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    let mut signal = vec![None; line.len()];
    if signal_span > 0 {
        let alpha = smoothing(signal_span);
        let mut prev: Option<f64> = None;
        for (i, value) in line.iter().enumerate() {
            let Some(value) = *value else { continue };
            let next = match prev {
                None => value,
                Some(p) => alpha * value + (1.0 - alpha) * p,
            };
            signal[i] = Some(next);
            prev = Some(next);
        }
    }

    MacdSeries { line, signal }
}
