//! Small descriptive-statistics helpers shared by the analytics functions.

/// Round half away from zero to two decimals.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator).
#[must_use]
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    #[allow(clippy::cast_precision_loss)]
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Pearson correlation of two equally long series.
/// `None` when fewer than two pairs or either side has zero variance.
#[must_use]
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;

    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        cov += dx * dy;
        vx += dx * dx;
        vy += dy * dy;
    }

    if vx == 0.0 || vy == 0.0 {
        return None;
    }
    Some(cov / (vx.sqrt() * vy.sqrt()))
}

/// Evenly spaced values over `[start, end]`, inclusive of both ends.
#[must_use]
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            #[allow(clippy::cast_precision_loss)]
            let step = (end - start) / (n - 1) as f64;
            #[allow(clippy::cast_precision_loss)]
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Percentage of `part` in `whole`, 0 when `whole` is 0.
#[must_use]
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    round2(part as f64 / whole as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert!((round2(1.234_9) - 1.23).abs() < 1e-9);
        assert!((round2(2.675_1) - 2.68).abs() < 1e-9);
        assert!((round2(-1.005_1) + 1.01).abs() < 1e-9);
    }

    #[test]
    fn test_mean_and_std() {
        assert_eq!(mean(&[]), None);
        assert!((mean(&[1.0, 2.0, 3.0]).unwrap() - 2.0).abs() < 1e-9);
        assert_eq!(sample_std(&[5.0]), None);
        assert!((sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap() - 2.138_089_935).abs() < 1e-6);
    }

    #[test]
    fn test_pearson() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [2.0, 4.0, 6.0, 8.0];
        assert!((pearson(&xs, &ys).unwrap() - 1.0).abs() < 1e-9);

        let inverse = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&xs, &inverse).unwrap() + 1.0).abs() < 1e-9);

        assert_eq!(pearson(&xs, &[3.0, 3.0, 3.0, 3.0]), None);
        assert_eq!(pearson(&[1.0], &[1.0]), None);
    }

    #[test]
    fn test_linspace() {
        let v = linspace(0.95, 1.0, 6);
        assert_eq!(v.len(), 6);
        assert!((v[0] - 0.95).abs() < 1e-12);
        assert!((v[5] - 1.0).abs() < 1e-12);
        assert_eq!(linspace(0.0, 1.0, 1), vec![0.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_percentage() {
        assert!((percentage(1, 3) - 33.33).abs() < 1e-9);
        assert!(percentage(5, 0).abs() < f64::EPSILON);
    }
}
