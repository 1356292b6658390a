//! Expiry payoffs and the payoff design matrix over a price grid.

use crate::trading::target::PriceGrid;
use crate::types::{OptionContract, OptionType, OptionsUniverse, CONTRACT_MULTIPLIER};

#[inline]
pub fn call_payoff(s: f64, k: f64) -> f64 {
    (s - k).max(0.0)
}

#[inline]
pub fn put_payoff(s: f64, k: f64) -> f64 {
    (k - s).max(0.0)
}

/// Long `k_long` put, short `k_short` put, per share, at expiry.
#[inline]
pub fn put_spread_payoff(s: f64, k_long: f64, k_short: f64) -> f64 {
    put_payoff(s, k_long) - put_payoff(s, k_short)
}

#[inline]
pub fn contract_payoff(option_type: OptionType, s: f64, k: f64) -> f64 {
    match option_type {
        OptionType::Call => call_payoff(s, k),
        OptionType::Put => put_payoff(s, k),
    }
}

/// Metadata for one column of the design matrix.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ContractMeta {
    pub option_type: OptionType,
    pub strike: f64,
    pub mid: f64,
    pub symbol: String,
}

/// Per-share expiry payoff of every contract on the grid.
/// `columns[j][i]` is contract `j` evaluated at grid point `i`; calls first, then puts.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DesignMatrix {
    pub columns: Vec<Vec<f64>>,
    pub meta: Vec<ContractMeta>,
}

impl DesignMatrix {
    /// (grid points, contracts)
    pub fn shape(&self) -> (usize, usize) {
        (self.columns.first().map_or(0, Vec::len), self.columns.len())
    }
}

pub fn build_design_matrix(grid: &PriceGrid, universe: &OptionsUniverse) -> DesignMatrix {
    let contracts: Vec<&OptionContract> = universe.calls.iter().chain(&universe.puts).collect();

    let columns = contracts
        .iter()
        .map(|c| {
            grid.points()
                .iter()
                .map(|&s| contract_payoff(c.option_type, s, c.strike))
                .collect()
        })
        .collect();

    let meta = contracts
        .iter()
        .map(|c| ContractMeta {
            option_type: c.option_type,
            strike: c.strike,
            mid: c.mid_price,
            symbol: c.symbol.clone(),
        })
        .collect();

    DesignMatrix { columns, meta }
}

/// Dollar cost per contract, aligned with the design matrix columns.
pub fn cost_vector(meta: &[ContractMeta]) -> Vec<f64> {
    meta.iter().map(|m| m.mid * CONTRACT_MULTIPLIER).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trading::target::build_price_grid;
    use chrono::NaiveDate;

    fn contract(option_type: OptionType, strike: f64, mid: f64) -> OptionContract {
        OptionContract {
            symbol: format!("SMH{option_type}{strike}"),
            option_type,
            strike,
            mid_price: mid,
            spread: None,
            open_interest: None,
        }
    }

    #[test]
    fn test_vanilla_payoffs() {
        assert_eq!(call_payoff(110.0, 100.0), 10.0);
        assert_eq!(call_payoff(90.0, 100.0), 0.0);
        assert_eq!(put_payoff(90.0, 100.0), 10.0);
        assert_eq!(put_payoff(110.0, 100.0), 0.0);
    }

    #[test]
    fn test_put_spread_payoff_bounded_by_width() {
        for s in [50.0, 90.0, 95.0, 100.0, 120.0] {
            let p = put_spread_payoff(s, 100.0, 90.0);
            assert!((0.0..=10.0).contains(&p), "payoff {p} at {s}");
        }
        assert_eq!(put_spread_payoff(95.0, 100.0, 90.0), 5.0);
    }

    #[test]
    fn test_design_matrix_layout() {
        let grid = build_price_grid(100.0, 0.8, 1.2, 5).unwrap();
        let universe = OptionsUniverse {
            ticker: "SMH".into(),
            expiry: NaiveDate::from_ymd_opt(2026, 2, 13).unwrap(),
            calls: vec![contract(OptionType::Call, 100.0, 2.0)],
            puts: vec![contract(OptionType::Put, 95.0, 1.5), contract(OptionType::Put, 105.0, 6.0)],
        };

        let x = build_design_matrix(&grid, &universe);
        assert_eq!(x.shape(), (5, 3));
        assert_eq!(x.meta[0].option_type, OptionType::Call);
        assert_eq!(x.meta[2].strike, 105.0);

        // grid = [80, 90, 100, 110, 120]
        assert!((x.columns[0][4] - 20.0).abs() < 1e-9);
        assert!((x.columns[1][0] - 15.0).abs() < 1e-9);
        assert_eq!(x.columns[2][4], 0.0);

        let c = cost_vector(&x.meta);
        assert_eq!(c, vec![200.0, 150.0, 600.0]);
    }
}
