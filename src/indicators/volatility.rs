/// Rolling sample standard deviation.
///
/// `result[i]` covers `values[i + 1 - window ..= i]`, None while the
/// window is not yet full. Sample variance (n - 1 denominator), matching
/// the realized-volatility convention for return series.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if window < 2 || values.len() < window {
        return result;
    }

    for i in (window - 1)..values.len() {
        let slice = &values[i + 1 - window..=i];
        let mean: f64 = slice.iter().sum::<f64>() / window as f64;
        let variance: f64 =
            slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (window as f64 - 1.0);
        result[i] = Some(variance.sqrt());
    }

    result
}
