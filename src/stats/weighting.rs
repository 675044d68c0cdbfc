/// Logs this short are averaged without weighting
const MIN_WEIGHTED_GAMES: usize = 3;

/// Recency-weighted mean: game `i` of `n` (oldest first) weighs `base^(i/n)`.
/// Short logs use a plain mean. Empty input gives 0.0.
pub fn recency_weighted(values: &[f64], base: f64) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    if n <= MIN_WEIGHTED_GAMES {
        return values.iter().sum::<f64>() / n as f64;
    }
    let (weighted, total) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(sum, weights), (i, v)| {
            let w = base.powf(i as f64 / n as f64);
            (sum + v * w, weights + w)
        });
    weighted / total
}

/// Plain mean, `None` for no values
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn short_logs_use_plain_mean() {
        assert_relative_eq!(recency_weighted(&[10.0, 20.0, 30.0], 1.5), 20.0);
    }

    #[test]
    fn recent_games_weigh_more() {
        let rising = recency_weighted(&[10.0, 10.0, 10.0, 30.0], 1.5);
        let falling = recency_weighted(&[30.0, 10.0, 10.0, 10.0], 1.5);
        assert!(rising > 15.0, "got {:.3}", rising);
        assert!(falling < 15.0, "got {:.3}", falling);
    }

    #[test]
    fn constant_series_is_unchanged() {
        assert_relative_eq!(recency_weighted(&[4.0; 12], 2.0), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_inputs() {
        assert_relative_eq!(recency_weighted(&[], 1.5), 0.0);
        assert!(mean(Vec::new()).is_none());
        assert_relative_eq!(mean(vec![1.0, 2.0]).unwrap(), 1.5);
    }
}
