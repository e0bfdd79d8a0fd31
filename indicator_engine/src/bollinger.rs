/// Upper and lower bands aligned with the input closes.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// `SMA(window) ± k * sigma`, with sigma the sample standard deviation of the
/// same window. Windows shorter than 2 have no sample deviation and yield `None`.
pub fn bollinger(closes: &[f64], window: usize, k: f64) -> BollingerBands {
    let mut upper = vec![None; closes.len()];
    let mut lower = vec![None; closes.len()];
    if window < 2 {
        return BollingerBands { upper, lower };
    }

    for i in (window - 1)..closes.len() {
        let slice = &closes[i + 1 - window..=i];
        let mean = slice.iter().sum::<f64>() / window as f64;
        let variance = slice.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / (window - 1) as f64;
        let sigma = variance.sqrt();
        upper[i] = Some(mean + k * sigma);
        lower[i] = Some(mean - k * sigma);
    }

    BollingerBands { upper, lower }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_sample_deviation() {
        // mean 2, sample variance 1
        let bands = bollinger(&[1.0, 2.0, 3.0], 3, 2.0);
        assert_eq!(bands.upper[..2], [None, None]);
        assert!((bands.upper[2].unwrap() - 4.0).abs() < 1e-12);
        assert!((bands.lower[2].unwrap() - 0.0).abs() < 1e-12);
    }

    #[test]
    fn flat_prices_collapse_bands() {
        let bands = bollinger(&[10.0; 25], 20, 2.0);
        assert_eq!(bands.upper[24], Some(10.0));
        assert_eq!(bands.lower[24], Some(10.0));
    }
}
