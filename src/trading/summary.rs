//! Dollar metrics for a debit put spread (one spread = one long + one short contract).
//!
//! width      = (K_long - K_short) * 100
//! max_profit = width - premium
//! max_loss   = premium
//! breakeven  = K_long - premium / 100
//!
//! `premium_paid` is already in dollars per spread. Pure closed-form functions.

use crate::errors::{HedgeError, HedgeResult};
use crate::trading::payoff::put_spread_payoff;
use crate::types::{PnlStats, TradeSummary, CONTRACT_MULTIPLIER};
use statrs::statistics::Statistics;

#[inline]
pub fn put_spread_metrics(k_long: f64, k_short: f64, premium_paid: f64) -> TradeSummary {
    let width = (k_long - k_short) * CONTRACT_MULTIPLIER;
    TradeSummary {
        width,
        premium: premium_paid,
        max_profit: width - premium_paid,
        max_loss: premium_paid,
        breakeven: k_long - premium_paid / CONTRACT_MULTIPLIER,
    }
}

/// Expiry P&L in dollars for one spread at each price (grid points or simulated terminals).
pub fn put_spread_payoff_dollars(prices: &[f64], k_long: f64, k_short: f64, premium_paid: f64) -> Vec<f64> {
    prices
        .iter()
        .map(|&s| put_spread_payoff(s, k_long, k_short) * CONTRACT_MULTIPLIER - premium_paid)
        .collect()
}

/// Expected P&L and probability of finishing with a profit.
pub fn pnl_stats(pnl: &[f64]) -> HedgeResult<PnlStats> {
    if pnl.is_empty() {
        return Err(HedgeError::NoData("no P&L samples".into()));
    }

    Ok(PnlStats {
        expected_value: pnl.iter().mean(),
        prob_profit: pnl.iter().filter(|&&x| x > 0.0).count() as f64 / pnl.len() as f64,
        samples: pnl.len(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PnlRow {
    pub s_t: f64,
    pub pnl: f64,
}

pub fn pnl_rows(prices: &[f64], pnl: &[f64]) -> Vec<PnlRow> {
    prices
        .iter()
        .zip(pnl)
        .map(|(&s_t, &pnl)| PnlRow { s_t, pnl })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_trade_metrics() {
        let m = put_spread_metrics(385.0, 350.0, 577.0);
        assert!((m.width - 3500.0).abs() < 1e-9);
        assert!((m.max_profit - 2923.0).abs() < 1e-9);
        assert!((m.max_loss - 577.0).abs() < 1e-9);
        assert!((m.premium - 577.0).abs() < 1e-9);
        assert!((m.breakeven - 379.23).abs() < 1e-9, "breakeven {}", m.breakeven);
    }

    #[test]
    fn test_pnl_profile() {
        let prices = [300.0, 350.0, 379.23, 385.0, 420.0];
        let pnl = put_spread_payoff_dollars(&prices, 385.0, 350.0, 577.0);
        assert!((pnl[0] - 2923.0).abs() < 1e-9, "below short strike: max profit");
        assert!((pnl[1] - 2923.0).abs() < 1e-9);
        assert!(pnl[2].abs() < 1e-6, "zero at breakeven, got {}", pnl[2]);
        assert!((pnl[3] + 577.0).abs() < 1e-9, "at long strike: max loss");
        assert!((pnl[4] + 577.0).abs() < 1e-9);
    }

    #[test]
    fn test_profit_and_loss_span_dollar_width() {
        for (k_long, k_short, premium) in [(385.0, 350.0, 577.0), (100.0, 90.0, 250.0)] {
            let m = put_spread_metrics(k_long, k_short, premium);
            assert!(
                (m.max_profit + m.max_loss - m.width).abs() < 1e-9,
                "width is already in dollars: {m:?}"
            );
        }
    }

    #[test]
    fn test_pnl_stats() {
        let stats = pnl_stats(&[-100.0, 300.0, -100.0, 0.0]).unwrap();
        assert!((stats.expected_value - 25.0).abs() < 1e-12);
        assert!((stats.prob_profit - 0.25).abs() < 1e-12, "zero P&L is not a profit");
        assert_eq!(stats.samples, 4);

        assert!(matches!(pnl_stats(&[]), Err(HedgeError::NoData(_))));
    }

    #[test]
    fn test_pnl_rows_pair_inputs() {
        let rows = pnl_rows(&[1.0, 2.0], &[-5.0, 5.0]);
        assert_eq!(rows, vec![PnlRow { s_t: 1.0, pnl: -5.0 }, PnlRow { s_t: 2.0, pnl: 5.0 }]);
    }
}
