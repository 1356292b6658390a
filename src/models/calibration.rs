//! Baseline 30-day drift and volatility from a daily price history.
//!
//! Both estimators are robust summaries of a rolling window series:
//! sigma_base is the median rolling horizon volatility, mu_base is a trimmed
//! mean of rolling cumulative log returns.

use crate::errors::{HedgeError, HedgeResult};
use crate::types::{CalibrationParams, HistoricalSeries};
use statrs::statistics::{Data, Median, Statistics};

/// Below this many rolling drift points the trimmed mean falls back to the median.
const TRIM_MIN_SAMPLES: usize = 50;

/// Daily log returns r_t = ln(P_t) - ln(P_{t-1}). Length is `prices.len() - 1`.
pub fn compute_log_returns(prices: &[f64]) -> HedgeResult<Vec<f64>> {
    if prices.len() < 2 {
        return Err(HedgeError::InsufficientData {
            needed: 2,
            got: prices.len(),
        });
    }

    Ok(prices.windows(2).map(|w| w[1].ln() - w[0].ln()).collect())
}

/// Rolling sample stdev scaled to the window horizon: stdev(window) * sqrt(window).
/// Entry `k` covers `returns[k..k + window]`; leading incomplete windows are dropped.
pub fn rolling_sigma(returns: &[f64], window: usize) -> HedgeResult<Vec<f64>> {
    if window < 2 {
        return Err(HedgeError::InvalidInput(format!(
            "sigma window must be at least 2, got {window}"
        )));
    }

    let horizon = (window as f64).sqrt();
    Ok(returns
        .windows(window)
        .map(|w| w.iter().std_dev() * horizon)
        .collect())
}

/// Rolling cumulative log return over `window` days.
pub fn rolling_mu(returns: &[f64], window: usize) -> HedgeResult<Vec<f64>> {
    if window == 0 {
        return Err(HedgeError::InvalidInput("mu window must be positive".into()));
    }

    Ok(returns.windows(window).map(|w| w.iter().sum()).collect())
}

/// Median of the rolling horizon volatility.
pub fn baseline_sigma(prices: &[f64], window: usize) -> HedgeResult<f64> {
    let returns = compute_log_returns(prices)?;
    let sigma = rolling_sigma(&returns, window)?;

    if sigma.is_empty() {
        return Err(HedgeError::InsufficientData {
            needed: window + 1,
            got: prices.len(),
        });
    }

    Ok(Data::new(sigma).median())
}

/// Trimmed mean of rolling cumulative log returns.
///
/// Drops `floor(n * trim)` points from each tail. Small samples (fewer than
/// 50 rolling points) use the plain median instead.
pub fn baseline_mu(prices: &[f64], window: usize, trim: f64) -> HedgeResult<f64> {
    if !(0.0..0.5).contains(&trim) {
        return Err(HedgeError::InvalidInput(format!(
            "trim must be in [0, 0.5), got {trim}"
        )));
    }

    let returns = compute_log_returns(prices)?;
    let mut mu = rolling_mu(&returns, window)?;

    if mu.is_empty() {
        return Err(HedgeError::InsufficientData {
            needed: window + 1,
            got: prices.len(),
        });
    }

    let n = mu.len();
    if n < TRIM_MIN_SAMPLES {
        tracing::debug!(points = n, "small rolling sample, using median drift");
        return Ok(Data::new(mu).median());
    }

    mu.sort_by(f64::total_cmp);
    let k = (n as f64 * trim) as usize;
    Ok(mu[k..n - k].iter().mean())
}

/// Both baselines from one series.
pub fn calibrate(series: &HistoricalSeries, window: usize, trim: f64) -> HedgeResult<CalibrationParams> {
    let closes = series.closes();
    let params = CalibrationParams {
        mu_base: baseline_mu(&closes, window, trim)?,
        sigma_base: baseline_sigma(&closes, window)?,
    };

    tracing::info!(
        mu_base = params.mu_base,
        sigma_base = params.sigma_base,
        window,
        trim,
        points = closes.len(),
        "calibrated baseline parameters"
    );

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Prices whose daily log returns are exactly `returns`.
    fn prices_from_returns(start: f64, returns: &[f64]) -> Vec<f64> {
        let mut out = Vec::with_capacity(returns.len() + 1);
        let mut log_p = start.ln();
        out.push(start);
        for r in returns {
            log_p += r;
            out.push(log_p.exp());
        }
        out
    }

    #[test]
    fn test_log_returns_length_and_values() {
        let r = compute_log_returns(&[100.0, 110.0, 121.0]).unwrap();
        assert_eq!(r.len(), 2);
        for x in r {
            assert!((x - 1.1_f64.ln()).abs() < 1e-12, "got {x}");
        }
    }

    #[test]
    fn test_log_returns_insufficient() {
        let err = compute_log_returns(&[100.0]).unwrap_err();
        assert!(matches!(err, HedgeError::InsufficientData { needed: 2, got: 1 }));
    }

    #[test]
    fn test_rolling_sigma_drops_incomplete_windows() {
        let returns = [0.01, -0.02, 0.03, 0.0, 0.01];
        let s = rolling_sigma(&returns, 3).unwrap();
        assert_eq!(s.len(), 3);

        // First window: mean 0.00667, sample variance of [0.01,-0.02,0.03]
        let mean = (0.01 - 0.02 + 0.03) / 3.0;
        let var = [0.01_f64, -0.02, 0.03].iter().map(|x| (x - mean).powi(2)).sum::<f64>() / 2.0;
        assert!((s[0] - var.sqrt() * 3.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_sigma_constant_returns_is_zero() {
        let s = rolling_sigma(&[0.002; 40], 30).unwrap();
        assert_eq!(s.len(), 11);
        assert!(s.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_rolling_mu_sums_window() {
        let m = rolling_mu(&[0.01, 0.02, 0.03, 0.04], 2).unwrap();
        let expected = [0.03, 0.05, 0.07];
        for (a, b) in m.iter().zip(expected) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_baseline_sigma_needs_window_plus_one() {
        let prices = prices_from_returns(100.0, &[0.01; 29]);
        let err = baseline_sigma(&prices, 30).unwrap_err();
        assert!(matches!(err, HedgeError::InsufficientData { needed: 31, got: 30 }), "got {err}");

        let prices = prices_from_returns(100.0, &[0.01; 30]);
        assert!(baseline_sigma(&prices, 30).is_ok());
    }

    #[test]
    fn test_baseline_sigma_is_median_of_rolling() {
        // Two calm regimes around one violent stretch: the median ignores the spike.
        let mut returns = Vec::new();
        for i in 0..120 {
            returns.push(if i % 2 == 0 { 0.01 } else { -0.01 });
        }
        for i in 0..20 {
            returns.push(if i % 2 == 0 { 0.08 } else { -0.08 });
        }
        for i in 0..120 {
            returns.push(if i % 2 == 0 { 0.01 } else { -0.01 });
        }
        let prices = prices_from_returns(50.0, &returns);
        let sigma = baseline_sigma(&prices, 10).unwrap();

        let calm = rolling_sigma(&[0.01, -0.01, 0.01, -0.01, 0.01, -0.01, 0.01, -0.01, 0.01, -0.01], 10)
            .unwrap()[0];
        assert!((sigma - calm).abs() < 1e-9, "median sigma {sigma} should equal calm sigma {calm}");
    }

    #[test]
    fn test_baseline_mu_trimmed_mean_removes_tails() {
        // window = 1 makes the rolling series equal the returns themselves.
        let mut returns: Vec<f64> = (0..99).map(|i| i as f64 * 0.001).collect();
        returns.push(10.0);
        let prices = prices_from_returns(100.0, &returns);

        let mu = baseline_mu(&prices, 1, 0.10).unwrap();
        // n = 100, k = 10: keeps sorted indices 10..90, i.e. 0.010..=0.089
        assert!((mu - 0.0495).abs() < 1e-9, "trimmed mean {mu}");
    }

    #[test]
    fn test_baseline_mu_small_sample_uses_median() {
        let returns = [0.01, 0.02, 0.03, 0.50];
        let prices = prices_from_returns(100.0, &returns);
        let mu = baseline_mu(&prices, 1, 0.10).unwrap();
        assert!((mu - 0.025).abs() < 1e-9, "median of 4 returns, got {mu}");
    }

    #[test]
    fn test_baseline_mu_rejects_bad_trim() {
        let prices = prices_from_returns(100.0, &[0.01; 80]);
        assert!(matches!(baseline_mu(&prices, 30, 0.5), Err(HedgeError::InvalidInput(_))));
        assert!(matches!(baseline_mu(&prices, 30, -0.1), Err(HedgeError::InvalidInput(_))));
    }

    #[test]
    fn test_constant_drift_calibrates_exactly() {
        let prices = prices_from_returns(100.0, &[0.001; 200]);
        let mu = baseline_mu(&prices, 30, 0.10).unwrap();
        assert!((mu - 0.03).abs() < 1e-9, "30 days of 0.1% drift, got {mu}");
        let sigma = baseline_sigma(&prices, 30).unwrap();
        assert!(sigma.abs() < 1e-9);
    }
}
