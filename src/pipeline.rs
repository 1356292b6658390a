//! One hedge-estimation run, stage by stage.
//!
//! calibrate -> scenarios -> simulate -> grid/target -> clean chain ->
//! spread search -> trade summary -> P&L. No I/O happens here; the binary
//! fetches inputs and persists the returned artefacts.

use crate::config::ModelConfig;
use crate::errors::{HedgeError, HedgeResult};
use crate::models::calibration::calibrate;
use crate::models::distribution::{simulate, Quantile, TerminalDistribution};
use crate::models::scenarios::tariff_scenarios;
use crate::trading::payoff::{build_design_matrix, DesignMatrix};
use crate::trading::search::{search_best_spread, SpreadSearchResult};
use crate::trading::summary::{pnl_rows, pnl_stats, put_spread_metrics, put_spread_payoff_dollars, PnlRow};
use crate::trading::target::{build_price_grid, downside_target_payoff, PriceGrid, TargetCurve};
use crate::trading::universe::{clean_universe, LiquidityFilter};
use crate::types::{
    CalibrationParams, HistoricalSeries, OptionsChain, OptionsUniverse, PnlStats, ScenarioSet,
    SpreadCandidate, TradeSummary,
};
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

pub const REPORT_QUANTILES: [f64; 5] = [0.01, 0.05, 0.50, 0.95, 0.99];

pub struct PipelineInputs {
    pub ticker: String,
    pub series: HistoricalSeries,
    pub chain: OptionsChain,
}

/// Every intermediate artefact of a run, plus the report.
#[derive(Debug, Clone)]
pub struct HedgeRun {
    pub series: HistoricalSeries,
    pub scenarios: ScenarioSet,
    pub distribution: TerminalDistribution,
    pub grid: PriceGrid,
    pub target: TargetCurve,
    pub universe: OptionsUniverse,
    pub design: DesignMatrix,
    pub search: SpreadSearchResult,
    pub pnl_grid: Vec<PnlRow>,
    pub pnl_simulated: Vec<f64>,
    pub report: HedgeReport,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct HedgeReport {
    pub run_id: Uuid,
    pub ticker: String,
    pub expiry: NaiveDate,
    pub s0: f64,
    pub calibration: CalibrationParams,
    pub scenarios: ScenarioSet,
    pub quantiles: Vec<Quantile>,
    pub mean_terminal_price: f64,
    pub top_candidates: Vec<SpreadCandidate>,
    pub chosen: SpreadCandidate,
    pub trade: TradeSummary,
    pub pnl: PnlStats,
    pub generated_at: DateTime<Utc>,
}

pub fn run(inputs: PipelineInputs, cfg: &ModelConfig) -> HedgeResult<HedgeRun> {
    let PipelineInputs { ticker, series, chain } = inputs;

    let s0 = series
        .latest_close()
        .ok_or_else(|| HedgeError::NoData(format!("no closes for {ticker}")))?;

    let calibration = calibrate(&series, cfg.calibration_window, cfg.drift_trim)?;
    let scenarios = tariff_scenarios()?;
    let distribution = simulate(
        s0,
        &scenarios,
        calibration.mu_base,
        calibration.sigma_base,
        cfg.n_sims,
        cfg.seed,
    )?;

    let grid = build_price_grid(s0, cfg.grid_min, cfg.grid_max, cfg.grid_points)?;
    let target = downside_target_payoff(&grid, s0, cfg.target_floor, cfg.target_cap, cfg.target_scale)?;

    let filter = LiquidityFilter {
        max_spread: cfg.max_bid_ask_spread,
        min_open_interest: cfg.min_open_interest,
    };
    let universe = clean_universe(&ticker, &chain, &filter);
    let design = build_design_matrix(&grid, &universe);

    let search = search_best_spread(&grid, &universe.puts, &target)?;
    let chosen = search
        .best()
        .filter(|c| c.fit_error.is_finite())
        .cloned()
        .ok_or_else(|| {
            HedgeError::NoData(format!(
                "no feasible put spread among {} liquid puts",
                universe.puts.len()
            ))
        })?;

    let trade = put_spread_metrics(chosen.k_long, chosen.k_short, chosen.dollar_cost);
    let grid_pnl = put_spread_payoff_dollars(grid.points(), chosen.k_long, chosen.k_short, chosen.dollar_cost);
    let pnl_grid = pnl_rows(grid.points(), &grid_pnl);
    let pnl_simulated = put_spread_payoff_dollars(
        &distribution.terminal_prices(),
        chosen.k_long,
        chosen.k_short,
        chosen.dollar_cost,
    );
    let pnl = pnl_stats(&pnl_simulated)?;

    let report = HedgeReport {
        run_id: Uuid::new_v4(),
        ticker,
        expiry: chain.expiry,
        s0,
        calibration,
        scenarios: scenarios.clone(),
        quantiles: distribution.quantiles(&REPORT_QUANTILES),
        mean_terminal_price: distribution.mean_price(),
        top_candidates: search.top(cfg.report_top_n).to_vec(),
        chosen,
        trade,
        pnl,
        generated_at: Utc::now(),
    };

    tracing::info!(
        run_id = %report.run_id,
        ticker = %report.ticker,
        expiry = %report.expiry,
        s0,
        k_long = report.chosen.k_long,
        k_short = report.chosen.k_short,
        premium = report.trade.premium,
        expected_value = report.pnl.expected_value,
        prob_profit = report.pnl.prob_profit,
        "hedge run complete"
    );

    Ok(HedgeRun {
        series,
        scenarios,
        distribution,
        grid,
        target,
        universe,
        design,
        search,
        pnl_grid,
        pnl_simulated,
        report,
    })
}
