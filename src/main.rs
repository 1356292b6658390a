use tariff_hedge::config::{AppConfig, MarketDataMode};
use tariff_hedge::errors::HedgeResult;
use tariff_hedge::feeds::yahoo::{YahooClient, YahooEndpoints};
use tariff_hedge::feeds::{self, files};
use tariff_hedge::pipeline::{self, HedgeRun, PipelineInputs};
use tariff_hedge::store::{write_json, ArtifactStore};
use tariff_hedge::trading::payoff::cost_vector;
use tariff_hedge::trading::summary::pnl_rows;
use tariff_hedge::types::{HistoricalSeries, OptionsChain};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cfg = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        ticker = %cfg.ticker,
        market_data = ?cfg.market_data,
        n_sims = cfg.model.n_sims,
        seed = cfg.model.seed,
        "tariff hedge run starting"
    );

    if let Err(e) = run(&cfg).await {
        tracing::error!("run failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: &AppConfig) -> HedgeResult<()> {
    let store = ArtifactStore::open(&cfg.data_dir)?;
    let (series, chain) = load_market_data(cfg).await?;

    let run = pipeline::run(
        PipelineInputs {
            ticker: cfg.ticker.clone(),
            series,
            chain,
        },
        &cfg.model,
    )?;

    persist(&store, &run)?;
    log_report(&run);
    Ok(())
}

async fn load_market_data(cfg: &AppConfig) -> HedgeResult<(HistoricalSeries, OptionsChain)> {
    match cfg.market_data {
        MarketDataMode::Files => {
            let series = files::load_price_history(&cfg.prices_file)?;
            let chain = files::load_options_chain(&cfg.chain_file)?;
            Ok((series, chain))
        }
        MarketDataMode::Yahoo => {
            let client = YahooClient::new(YahooEndpoints {
                chart: cfg.yahoo_chart_url.clone(),
                options: cfg.yahoo_options_url.clone(),
                cookie: cfg.yahoo_cookie_url.clone(),
                crumb: cfg.yahoo_crumb_url.clone(),
            });
            let series = client.fetch_price_history(&cfg.ticker, &cfg.lookback).await?;

            let expiries = client.list_option_expiries(&cfg.ticker).await?;
            let today = chrono::Utc::now().date_naive();
            let expiry = feeds::nearest_expiry(&expiries, today, cfg.target_days)?;
            tracing::info!(expiry = %expiry, days_out = (expiry - today).num_days(), "expiry selected");

            let chain = client.fetch_options_chain(&cfg.ticker, expiry).await?;

            // Snapshot raw inputs so MARKET_DATA=files can replay this run.
            write_json(&cfg.prices_file, &series)?;
            write_json(&cfg.chain_file, &chain)?;
            tracing::info!(
                prices = %cfg.prices_file.display(),
                chain = %cfg.chain_file.display(),
                "market data snapshot saved"
            );
            Ok((series, chain))
        }
    }
}

fn persist(store: &ArtifactStore, run: &HedgeRun) -> HedgeResult<()> {
    store.write("scenarios.json", &run.scenarios)?;
    store.write("terminal_distribution.json", &run.distribution)?;
    store.write("target_payoff.json", &run.target.rows(&run.grid))?;
    store.write("puts_clean.json", &run.universe.puts)?;
    store.write("calls_clean.json", &run.universe.calls)?;
    store.write("contract_meta.json", &run.design.meta)?;
    store.write("contract_costs.json", &cost_vector(&run.design.meta))?;
    store.write("spread_search.json", &run.search)?;
    store.write("pnl_grid.json", &run.pnl_grid)?;
    store.write(
        "pnl_simulated.json",
        &pnl_rows(&run.distribution.terminal_prices(), &run.pnl_simulated),
    )?;
    let path = store.write("report.json", &run.report)?;

    tracing::info!(dir = %store.path("").display(), report = %path.display(), "artifacts written");
    Ok(())
}

fn log_report(run: &HedgeRun) {
    let r = &run.report;

    for q in &r.quantiles {
        tracing::info!(level = q.level, price = q.price, "terminal quantile");
    }
    tracing::info!(
        mean = r.mean_terminal_price,
        s0 = r.s0,
        mu_base = r.calibration.mu_base,
        sigma_base = r.calibration.sigma_base,
        "terminal distribution"
    );
    for c in &r.top_candidates {
        tracing::info!(
            k_long = c.k_long,
            k_short = c.k_short,
            fit_error = c.fit_error,
            dollar_cost = c.dollar_cost,
            "candidate"
        );
    }
    tracing::info!(
        long = %r.chosen.long_symbol,
        short = %r.chosen.short_symbol,
        width = r.trade.width,
        premium = r.trade.premium,
        max_profit = r.trade.max_profit,
        max_loss = r.trade.max_loss,
        breakeven = r.trade.breakeven,
        expected_value = r.pnl.expected_value,
        prob_profit = r.pnl.prob_profit,
        "chosen put spread"
    );
}
