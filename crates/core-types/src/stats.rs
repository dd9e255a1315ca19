//! Descriptive statistics shared by factor scoring and performance analysis.
//!
//! Standard deviations are population (divide by `n`) throughout.

/// Trading days per year used for every annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// A standard deviation at or below this is treated as zero.
pub const ZERO_STD: f64 = 1e-12;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mean_and_population_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_abs_diff_eq!(mean(&values).unwrap(), 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(population_std(&values).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_input_is_undefined() {
        assert!(mean(&[]).is_none());
        assert!(population_std(&[]).is_none());
    }
}
