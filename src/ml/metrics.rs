//! Evaluation metrics for regression models.

/// Mean squared error between aligned slices; `0.0` for empty input.
pub fn mean_squared_error(predicted: &[f64], actual: &[f64]) -> f64 {
    let n = predicted.len().min(actual.len());
    if n == 0 {
        return 0.0;
    }
    let sum: f64 = predicted
        .iter()
        .zip(actual)
        .map(|(p, a)| (p - a) * (p - a))
        .sum();
    sum / n as f64
}

/// `|error / actual| * 100`, defined as `0` when `actual` is exactly zero.
pub fn percentage_error(error: f64, actual: f64) -> f64 {
    if actual == 0.0 {
        0.0
    } else {
        (error / actual).abs() * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squared_error_is_averaged() {
        let predicted = [1.0, 2.0, 5.0];
        let actual = [1.0, 4.0, 4.0];
        assert!((mean_squared_error(&predicted, &actual) - 5.0 / 3.0).abs() < 1e-12);
        assert_eq!(mean_squared_error(&[], &[]), 0.0);
    }

    #[test]
    fn zero_actual_yields_zero_percentage() {
        assert_eq!(percentage_error(12_345.0, 0.0), 0.0);
        assert_eq!(percentage_error(-1.0, 0.0), 0.0);
        assert_eq!(percentage_error(f64::INFINITY, 0.0), 0.0);
    }

    #[test]
    fn nonzero_actual_is_absolute_ratio() {
        assert!((percentage_error(-50.0, 200.0) - 25.0).abs() < 1e-12);
        assert!((percentage_error(50.0, -200.0) - 25.0).abs() < 1e-12);
    }
}
