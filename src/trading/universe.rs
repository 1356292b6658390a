//! Chain cleaning and liquidity filtering.
//!
//! Runs before the optimizer; the search itself assumes a filtered universe.

use crate::types::{OptionContract, OptionQuote, OptionType, OptionsChain, OptionsUniverse};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiquidityFilter {
    /// Widest acceptable bid-ask spread, in option price units.
    pub max_spread: f64,
    pub min_open_interest: u64,
}

impl Default for LiquidityFilter {
    fn default() -> Self {
        Self {
            max_spread: 1.00,
            min_open_interest: 50,
        }
    }
}

impl OptionQuote {
    /// Bid/ask midpoint, or the last trade when either side is missing.
    pub fn mid(&self) -> Option<f64> {
        match (self.bid, self.ask) {
            (Some(bid), Some(ask)) => Some((bid + ask) / 2.0),
            _ => self.last_price,
        }
    }

    #[inline]
    pub fn spread(&self) -> Option<f64> {
        Some(self.ask? - self.bid?)
    }
}

/// Keep quotes with a usable mid and strike, a tight enough spread, and enough
/// open interest. Missing spread or open interest does not disqualify a quote.
pub fn filter_liquid_options(
    quotes: &[OptionQuote],
    option_type: OptionType,
    filter: &LiquidityFilter,
) -> Vec<OptionContract> {
    quotes
        .iter()
        .filter_map(|q| {
            let mid = q.mid().filter(|m| m.is_finite())?;
            if !q.strike.is_finite() || q.strike <= 0.0 {
                return None;
            }

            let spread = q.spread();
            if spread.is_some_and(|s| s > filter.max_spread) {
                return None;
            }
            if q.open_interest.is_some_and(|oi| oi < filter.min_open_interest) {
                return None;
            }

            Some(OptionContract {
                symbol: q.contract_symbol.clone(),
                option_type,
                strike: q.strike,
                mid_price: mid,
                spread,
                open_interest: q.open_interest,
            })
        })
        .collect()
}

/// Clean and filter both sides of a chain.
pub fn clean_universe(ticker: &str, chain: &OptionsChain, filter: &LiquidityFilter) -> OptionsUniverse {
    let calls = filter_liquid_options(&chain.calls, OptionType::Call, filter);
    let puts = filter_liquid_options(&chain.puts, OptionType::Put, filter);

    tracing::info!(
        expiry = %chain.expiry,
        calls_in = chain.calls.len(),
        calls_kept = calls.len(),
        puts_in = chain.puts.len(),
        puts_kept = puts.len(),
        "liquidity filter applied"
    );

    OptionsUniverse {
        ticker: ticker.to_string(),
        expiry: chain.expiry,
        calls,
        puts,
    }
}
