//! Scenario-weighted lognormal mixture for the 30-day terminal price.
//!
//! Each draw picks a severity from the scenario weights, then a log return
//! from that severity's normal. All randomness comes from one seeded stream,
//! so a (inputs, seed) pair always reproduces the same sample bag.

use crate::errors::{HedgeError, HedgeResult};
use crate::models::scenarios::params_from_calibration;
use crate::types::{ScenarioSet, Severity, SimulatedSample};
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;
use statrs::statistics::Statistics;

/// Bag of independent terminal-price draws. Read-only after simulation.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct TerminalDistribution {
    samples: Vec<SimulatedSample>,
}

impl TerminalDistribution {
    pub fn from_samples(samples: Vec<SimulatedSample>) -> Self {
        Self { samples }
    }

    #[inline]
    pub fn samples(&self) -> &[SimulatedSample] {
        &self.samples
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn terminal_prices(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.terminal_price).collect()
    }

    pub fn log_returns(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.log_return).collect()
    }

    /// NaN when empty.
    pub fn mean_price(&self) -> f64 {
        self.samples.iter().map(|s| s.terminal_price).mean()
    }

    /// Fraction of draws finishing strictly below `level`.
    pub fn prob_below(&self, level: f64) -> f64 {
        if self.samples.is_empty() {
            return f64::NAN;
        }
        let hits = self.samples.iter().filter(|s| s.terminal_price < level).count();
        hits as f64 / self.samples.len() as f64
    }

    /// Terminal-price quantiles with linear interpolation between order statistics.
    pub fn quantiles(&self, levels: &[f64]) -> Vec<Quantile> {
        let mut sorted = self.terminal_prices();
        sorted.sort_by(f64::total_cmp);
        levels
            .iter()
            .map(|&q| Quantile {
                level: q,
                price: interpolate_quantile(&sorted, q),
            })
            .collect()
    }

    /// Draw count per severity, ascending by severity.
    pub fn severity_counts(&self) -> Vec<(Severity, usize)> {
        Severity::ALL
            .iter()
            .map(|&sev| (sev, self.samples.iter().filter(|s| s.severity == sev).count()))
            .filter(|&(_, n)| n > 0)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Quantile {
    pub level: f64,
    pub price: f64,
}

fn interpolate_quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return f64::NAN;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Simulate `n_sims` terminal prices with a generator seeded from `seed`.
pub fn simulate(
    s0: f64,
    scenarios: &ScenarioSet,
    mu_base: f64,
    sigma_base: f64,
    n_sims: usize,
    seed: u64,
) -> HedgeResult<TerminalDistribution> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    simulate_with_rng(s0, scenarios, mu_base, sigma_base, n_sims, &mut rng)
}

/// Simulate with a caller-owned generator.
///
/// Draw order on the stream: all `n_sims` scenario assignments first, then
/// one normal per assigned slot, severity by severity in ascending order.
pub fn simulate_with_rng<R: Rng + ?Sized>(
    s0: f64,
    scenarios: &ScenarioSet,
    mu_base: f64,
    sigma_base: f64,
    n_sims: usize,
    rng: &mut R,
) -> HedgeResult<TerminalDistribution> {
    if n_sims == 0 {
        return Err(HedgeError::InvalidSimulationInput("n_sims must be positive".into()));
    }
    if !s0.is_finite() || s0 <= 0.0 {
        return Err(HedgeError::InvalidSimulationInput(format!(
            "spot must be positive and finite, got {s0}"
        )));
    }
    if !mu_base.is_finite() || !sigma_base.is_finite() || sigma_base < 0.0 {
        return Err(HedgeError::InvalidSimulationInput(format!(
            "baseline parameters invalid: mu={mu_base}, sigma={sigma_base}"
        )));
    }

    let table = scenarios.as_slice();
    let picker = WeightedIndex::new(table.iter().map(|s| s.probability))
        .map_err(|e| HedgeError::InvalidSimulationInput(format!("scenario weights: {e}")))?;

    let assigned: Vec<Severity> = (0..n_sims)
        .map(|_| table[picker.sample(&mut *rng)].severity)
        .collect();

    let mut log_returns = vec![0.0_f64; n_sims];
    for severity in Severity::ALL {
        if !assigned.contains(&severity) {
            continue;
        }

        let params = params_from_calibration(severity, mu_base, sigma_base);
        let normal = Normal::new(params.mu, params.sigma).map_err(|e| {
            HedgeError::InvalidSimulationInput(format!("severity {severity} normal: {e}"))
        })?;

        for (slot, _) in log_returns
            .iter_mut()
            .zip(&assigned)
            .filter(|(_, s)| **s == severity)
        {
            *slot = normal.sample(&mut *rng);
        }
    }

    let samples = assigned
        .into_iter()
        .zip(log_returns)
        .map(|(severity, log_return)| SimulatedSample {
            severity,
            log_return,
            terminal_price: s0 * log_return.exp(),
        })
        .collect();

    let dist = TerminalDistribution { samples };
    tracing::debug!(
        n_sims,
        mean_price = dist.mean_price(),
        "terminal distribution simulated"
    );
    Ok(dist)
}
