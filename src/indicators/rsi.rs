/// Relative Strength Index with Wilder smoothing.
///
/// `result[i]` is the RSI of `prices[..=i]`, None until `period` price
/// changes have been observed. The average gain/loss series is seeded
/// with the simple average of the first `period` changes and then
/// smoothed recursively: `avg = (avg * (period - 1) + change) / period`.
///
/// RSI = 100 - 100 / (1 + avg_gain / avg_loss). A window with losses
/// averaging zero but gains present saturates at 100; a window with no
/// price variation at all has no defined RSI and yields None.
pub fn wilder_rsi(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; prices.len()];
    if period == 0 || prices.len() < period + 1 {
        return result;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for i in 1..prices.len() {
        let change = prices[i] - prices[i - 1];
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        if i <= period {
            avg_gain += gain / period as f64;
            avg_loss += loss / period as f64;
            if i < period {
                continue;
            }
        } else {
            avg_gain = (avg_gain * (period as f64 - 1.0) + gain) / period as f64;
            avg_loss = (avg_loss * (period as f64 - 1.0) + loss) / period as f64;
        }

        result[i] = if avg_loss == 0.0 {
            // No variation at all: the ratio is undefined, drop the row
            if avg_gain == 0.0 {
                None
            } else {
                Some(100.0)
            }
        } else {
            let rs = avg_gain / avg_loss;
            Some(100.0 - 100.0 / (1.0 + rs))
        };
    }

    result
}
