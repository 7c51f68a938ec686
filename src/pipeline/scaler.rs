use super::FEATURE_DIM;

/// Standardize each column to zero mean and unit variance, in place.
///
/// Statistics are computed over the rows given — batch-relative, nothing
/// is persisted between calls. Population variance; a column with zero
/// variance is centered and left at zero rather than divided by zero.
pub fn standardize(rows: &mut [[f64; FEATURE_DIM]]) {
    if rows.is_empty() {
        return;
    }

    let n = rows.len() as f64;

    for col in 0..FEATURE_DIM {
        let mean: f64 = rows.iter().map(|r| r[col]).sum::<f64>() / n;
        let variance: f64 = rows.iter().map(|r| (r[col] - mean).powi(2)).sum::<f64>() / n;
        let std = if variance > 0.0 { variance.sqrt() } else { 1.0 };

        for row in rows.iter_mut() {
            row[col] = (row[col] - mean) / std;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(rows: &[[f64; FEATURE_DIM]], col: usize) -> Vec<f64> {
        rows.iter().map(|r| r[col]).collect()
    }

    #[test]
    fn test_zero_mean_unit_variance() {
        let mut rows = vec![[1.0; FEATURE_DIM], [2.0; FEATURE_DIM], [3.0; FEATURE_DIM]];
        rows[0][0] = 10.0;
        rows[1][0] = 20.0;
        rows[2][0] = 30.0;

        standardize(&mut rows);

        let col = column(&rows, 0);
        let mean: f64 = col.iter().sum::<f64>() / col.len() as f64;
        let var: f64 = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / col.len() as f64;

        assert!(mean.abs() < 1e-12);
        assert!((var - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_column_becomes_zero() {
        let mut rows = vec![[5.0; FEATURE_DIM], [5.0; FEATURE_DIM]];
        standardize(&mut rows);
        assert!(rows.iter().all(|r| r.iter().all(|v| *v == 0.0)));
    }

    #[test]
    fn test_single_row_degenerates_to_zero() {
        // A one-row batch has no spread: everything standardizes to zero
        let mut rows = vec![[42.0; FEATURE_DIM]];
        standardize(&mut rows);
        assert!(rows[0].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let mut rows: Vec<[f64; FEATURE_DIM]> = vec![];
        standardize(&mut rows);
        assert!(rows.is_empty());
    }
}
