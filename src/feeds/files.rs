use crate::errors::{HedgeError, HedgeResult};
use crate::store::read_json;
use crate::types::{HistoricalSeries, OptionsChain};
use std::path::Path;

/// Saved price history (array of `{date, adj_close}` records).
pub fn load_price_history(path: &Path) -> HedgeResult<HistoricalSeries> {
    let series: HistoricalSeries = read_json(path)?;
    tracing::info!(points = series.len(), "loaded price history from {}", path.display());
    Ok(series)
}

/// Saved options chain for one expiry. Both sides must be non-empty.
pub fn load_options_chain(path: &Path) -> HedgeResult<OptionsChain> {
    let chain: OptionsChain = read_json(path)?;
    if chain.calls.is_empty() || chain.puts.is_empty() {
        return Err(HedgeError::NoData(format!(
            "empty options chain at expiry {} in {}",
            chain.expiry,
            path.display()
        )));
    }
    tracing::info!(
        expiry = %chain.expiry,
        calls = chain.calls.len(),
        puts = chain.puts.len(),
        "loaded options chain from {}",
        path.display()
    );
    Ok(chain)
}
