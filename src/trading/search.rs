//! Put-spread search by discretized least squares against a target payoff.
//!
//! Every (long, short) strike pair with K_long > K_short is scored by the mean
//! squared gap between its width-normalized payoff and the target on the shared
//! grid. Quadratic in strike count; liquid chains per expiry are small.

use crate::errors::{HedgeError, HedgeResult};
use crate::trading::payoff::put_spread_payoff;
use crate::trading::target::{PriceGrid, TargetCurve};
use crate::types::{OptionContract, OptionType, SpreadCandidate, CONTRACT_MULTIPLIER};

/// Candidates ordered by ascending fit error, best first.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SpreadSearchResult {
    candidates: Vec<SpreadCandidate>,
}

impl SpreadSearchResult {
    #[inline]
    pub fn candidates(&self) -> &[SpreadCandidate] {
        &self.candidates
    }

    /// Recommended trade: first minimum-error candidate.
    #[inline]
    pub fn best(&self) -> Option<&SpreadCandidate> {
        self.candidates.first()
    }

    pub fn top(&self, n: usize) -> &[SpreadCandidate] {
        &self.candidates[..n.min(self.candidates.len())]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Width-normalized spread payoff (max 1) on each grid point.
/// `None` when the structure has no positive width.
pub fn scaled_put_spread_payoff(grid: &PriceGrid, k_long: f64, k_short: f64) -> Option<Vec<f64>> {
    let width = k_long - k_short;
    if !(width > 0.0) {
        return None;
    }

    Some(
        grid.points()
            .iter()
            .map(|&s| put_spread_payoff(s, k_long, k_short) / width)
            .collect(),
    )
}

/// Mean squared error of the normalized spread payoff against the target.
///
/// Returns `f64::INFINITY` for an infeasible structure (width <= 0) or when the
/// target was not built on this grid.
pub fn evaluate_put_spread(grid: &PriceGrid, k_long: f64, k_short: f64, target: &TargetCurve) -> f64 {
    if grid.len() != target.len() || grid.is_empty() {
        return f64::INFINITY;
    }
    let Some(scaled) = scaled_put_spread_payoff(grid, k_long, k_short) else {
        return f64::INFINITY;
    };

    let sse: f64 = scaled
        .iter()
        .zip(target.values())
        .map(|(&v, &y)| (v - y) * (v - y))
        .sum();

    sse / grid.len() as f64
}

/// Exhaustive pairwise search over the put universe.
///
/// Pairs are generated in strike array order (long outer, short inner) and
/// stably sorted by error, so equal errors keep generation order.
pub fn search_best_spread(
    grid: &PriceGrid,
    puts: &[OptionContract],
    target: &TargetCurve,
) -> HedgeResult<SpreadSearchResult> {
    if grid.len() != target.len() {
        return Err(HedgeError::InvalidInput(format!(
            "target has {} points but grid has {}",
            target.len(),
            grid.len()
        )));
    }

    let puts: Vec<&OptionContract> = puts
        .iter()
        .filter(|c| c.option_type == OptionType::Put)
        .collect();

    let mut candidates = Vec::with_capacity(puts.len() * puts.len().saturating_sub(1) / 2);
    for long in &puts {
        for short in &puts {
            if long.strike <= short.strike {
                continue;
            }

            candidates.push(SpreadCandidate {
                k_long: long.strike,
                k_short: short.strike,
                dollar_cost: (long.mid_price - short.mid_price) * CONTRACT_MULTIPLIER,
                fit_error: evaluate_put_spread(grid, long.strike, short.strike, target),
                long_symbol: long.symbol.clone(),
                short_symbol: short.symbol.clone(),
            });
        }
    }

    candidates.sort_by(|a, b| a.fit_error.total_cmp(&b.fit_error));

    if let Some(best) = candidates.first() {
        tracing::info!(
            strikes = puts.len(),
            candidates = candidates.len(),
            k_long = best.k_long,
            k_short = best.k_short,
            fit_error = best.fit_error,
            dollar_cost = best.dollar_cost,
            "put spread search complete"
        );
    } else {
        tracing::warn!(strikes = puts.len(), "no valid put spread pairs");
    }

    Ok(SpreadSearchResult { candidates })
}
