use crate::errors::{HedgeError, HedgeResult};
use crate::types::{HistoricalSeries, OptionQuote, OptionsChain, PricePoint};
use chrono::{DateTime, NaiveDate};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use tokio::sync::OnceCell;

#[derive(Debug, Clone)]
pub struct YahooEndpoints {
    pub chart: String,
    pub options: String,
    /// Any Yahoo host that sets the session cookie.
    pub cookie: String,
    pub crumb: String,
}

impl Default for YahooEndpoints {
    fn default() -> Self {
        Self {
            chart: "https://query1.finance.yahoo.com/v8/finance/chart".into(),
            options: "https://query2.finance.yahoo.com/v7/finance/options".into(),
            cookie: "https://fc.yahoo.com".into(),
            crumb: "https://query1.finance.yahoo.com/v1/test/getcrumb".into(),
        }
    }
}

/// Yahoo Finance chart + options client. Every method returns Result; no retries.
///
/// The options endpoint rejects requests without a session cookie and matching
/// crumb. Both are fetched lazily on the first options call and reused.
#[derive(Clone)]
pub struct YahooClient {
    client: Client,
    endpoints: YahooEndpoints,
    crumb: Arc<OnceCell<String>>,
}

impl YahooClient {
    pub fn new(endpoints: YahooEndpoints) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .user_agent("Mozilla/5.0 (compatible; tariff_hedge/0.1)")
                .cookie_store(true)
                .build()
                .unwrap_or_default(),
            endpoints: YahooEndpoints {
                chart: endpoints.chart.trim_end_matches('/').to_string(),
                options: endpoints.options.trim_end_matches('/').to_string(),
                ..endpoints
            },
            crumb: Arc::new(OnceCell::new()),
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> HedgeResult<T> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| HedgeError::Network(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error(status, url, &body));
        }

        resp.json()
            .await
            .map_err(|e| HedgeError::Parse(format!("{url}: {e}")))
    }

    async fn crumb(&self) -> HedgeResult<&str> {
        self.crumb
            .get_or_try_init(|| self.fetch_crumb())
            .await
            .map(String::as_str)
    }

    async fn fetch_crumb(&self) -> HedgeResult<String> {
        // The cookie host usually answers 404; only the Set-Cookie header matters.
        self.client
            .get(&self.endpoints.cookie)
            .send()
            .await
            .map_err(|e| HedgeError::Network(format!("session cookie request failed: {e}")))?;

        let url = &self.endpoints.crumb;
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HedgeError::Network(format!("crumb request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| HedgeError::Network(format!("crumb body: {e}")))?;
        if !status.is_success() {
            return Err(status_error(status, url, &body));
        }

        let crumb = parse_crumb(&body)?;
        tracing::debug!("yahoo session crumb acquired");
        Ok(crumb)
    }

    /// Daily adjusted closes over `range` (e.g. "6mo", "2y"). Null closes are skipped.
    pub async fn fetch_price_history(&self, ticker: &str, range: &str) -> HedgeResult<HistoricalSeries> {
        let url = format!("{}/{ticker}", self.endpoints.chart);
        let body: ChartResponse = self.get(&url, &[("range", range), ("interval", "1d")]).await?;
        let points = chart_points(body)?;

        if points.is_empty() {
            return Err(HedgeError::NoData(format!("no price data returned for {ticker}")));
        }

        tracing::info!(ticker, range, points = points.len(), "price history fetched");
        HistoricalSeries::new(points)
    }

    /// Listed option expiries, ascending.
    pub async fn list_option_expiries(&self, ticker: &str) -> HedgeResult<Vec<NaiveDate>> {
        let crumb = self.crumb().await?;
        let url = format!("{}/{ticker}", self.endpoints.options);
        let body: OptionsResponse = self.get(&url, &[("crumb", crumb)]).await?;
        let result = first_options_result(body, ticker)?;

        let mut expiries: Vec<NaiveDate> = result
            .expiration_dates
            .iter()
            .filter_map(|&ts| DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive()))
            .collect();
        expiries.sort();
        expiries.dedup();

        if expiries.is_empty() {
            return Err(HedgeError::NoData(format!("no option expiries found for {ticker}")));
        }
        Ok(expiries)
    }

    /// Calls and puts for one expiry.
    pub async fn fetch_options_chain(&self, ticker: &str, expiry: NaiveDate) -> HedgeResult<OptionsChain> {
        let ts = expiry
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .ok_or_else(|| HedgeError::InvalidInput(format!("bad expiry {expiry}")))?;

        let crumb = self.crumb().await?;
        let url = format!("{}/{ticker}", self.endpoints.options);
        let date = ts.to_string();
        let body: OptionsResponse = self
            .get(&url, &[("date", date.as_str()), ("crumb", crumb)])
            .await?;
        let chain = first_options_result(body, ticker)?
            .options
            .into_iter()
            .next()
            .unwrap_or_default();

        if chain.calls.is_empty() || chain.puts.is_empty() {
            return Err(HedgeError::NoData(format!(
                "empty options chain for {ticker} at expiry {expiry}"
            )));
        }

        tracing::info!(
            ticker,
            expiry = %expiry,
            calls = chain.calls.len(),
            puts = chain.puts.len(),
            "options chain fetched"
        );

        Ok(OptionsChain {
            expiry,
            calls: chain.calls.into_iter().filter_map(RawContract::into_quote).collect(),
            puts: chain.puts.into_iter().filter_map(RawContract::into_quote).collect(),
        })
    }
}

/// 401/403 from Yahoo means the cookie or crumb was refused.
fn status_error(status: StatusCode, url: &str, body: &str) -> HedgeError {
    let body = body.trim();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => HedgeError::Network(format!(
            "HTTP {status} from {url}: session cookie/crumb rejected ({body})"
        )),
        StatusCode::NOT_FOUND => HedgeError::NoData(format!("HTTP {status} from {url}: {body}")),
        _ => HedgeError::Network(format!("HTTP {status} from {url}: {body}")),
    }
}

/// The crumb endpoint answers with the bare token. Rate-limit and consent pages
/// come back as prose or HTML instead.
fn parse_crumb(body: &str) -> HedgeResult<String> {
    let crumb = body.trim();
    if crumb.is_empty() || crumb.contains(char::is_whitespace) || crumb.contains('<') {
        return Err(HedgeError::Network(format!(
            "unusable crumb response: {}",
            crumb.chars().take(80).collect::<String>()
        )));
    }
    Ok(crumb.to_string())
}

// ── Chart endpoint (v8) ──
// {"chart":{"result":[{"timestamp":[...],
//   "indicators":{"adjclose":[{"adjclose":[...]}], "quote":[{"close":[...]}]}}],
//   "error":null}}

#[derive(serde::Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(serde::Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<serde_json::Value>,
}

#[derive(serde::Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(serde::Deserialize)]
struct Indicators {
    #[serde(default)]
    adjclose: Vec<AdjCloseBlock>,
}

#[derive(serde::Deserialize)]
struct AdjCloseBlock {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

fn chart_points(body: ChartResponse) -> HedgeResult<Vec<PricePoint>> {
    if let Some(err) = body.chart.error.filter(|e| !e.is_null()) {
        return Err(HedgeError::NoData(format!("chart error: {err}")));
    }

    let Some(result) = body.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };

    let closes = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|b| b.adjclose)
        .unwrap_or_default();

    Ok(result
        .timestamp
        .iter()
        .zip(closes)
        .filter_map(|(&ts, close)| {
            let date = DateTime::from_timestamp(ts, 0)?.date_naive();
            Some(PricePoint {
                date,
                adj_close: close?,
            })
        })
        .collect())
}

// ── Options endpoint (v7) ──

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionsResponse {
    option_chain: OptionsBody,
}

#[derive(serde::Deserialize)]
struct OptionsBody {
    result: Option<Vec<OptionsResult>>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionsResult {
    #[serde(default)]
    expiration_dates: Vec<i64>,
    #[serde(default)]
    options: Vec<RawChain>,
}

#[derive(Default, serde::Deserialize)]
struct RawChain {
    #[serde(default)]
    calls: Vec<RawContract>,
    #[serde(default)]
    puts: Vec<RawContract>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContract {
    contract_symbol: Option<String>,
    strike: Option<f64>,
    last_price: Option<f64>,
    bid: Option<f64>,
    ask: Option<f64>,
    volume: Option<u64>,
    open_interest: Option<u64>,
    implied_volatility: Option<f64>,
    in_the_money: Option<bool>,
}

impl RawContract {
    /// Contracts without a strike cannot be priced on the grid and are dropped here.
    fn into_quote(self) -> Option<OptionQuote> {
        Some(OptionQuote {
            contract_symbol: self.contract_symbol.unwrap_or_default(),
            strike: self.strike?,
            last_price: self.last_price,
            bid: self.bid,
            ask: self.ask,
            volume: self.volume,
            open_interest: self.open_interest,
            implied_volatility: self.implied_volatility,
            in_the_money: self.in_the_money,
        })
    }
}

fn first_options_result(body: OptionsResponse, ticker: &str) -> HedgeResult<OptionsResult> {
    body.option_chain
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| HedgeError::NoData(format!("no options data for {ticker}")))
}
