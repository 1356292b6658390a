use crate::errors::{HedgeError, HedgeResult};
use chrono::NaiveDate;
use smallvec::SmallVec;

/// Dollars per option contract point.
pub const CONTRACT_MULTIPLIER: f64 = 100.0;

/// Tolerance for the scenario probability sum.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

// ── Historical prices ──

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub adj_close: f64,
}

/// Chronologically ordered adjusted closes. Read-only once built.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct HistoricalSeries {
    points: Vec<PricePoint>,
}

impl HistoricalSeries {
    /// Build a series, excluding non-finite or non-positive closes.
    /// Dates must be strictly increasing.
    pub fn new(points: Vec<PricePoint>) -> HedgeResult<Self> {
        let total = points.len();
        let points: Vec<PricePoint> = points
            .into_iter()
            .filter(|p| p.adj_close.is_finite() && p.adj_close > 0.0)
            .collect();

        let dropped = total - points.len();
        if dropped > 0 {
            tracing::warn!(dropped, total, "excluded unusable adjusted closes");
        }

        if points.is_empty() {
            return Err(HedgeError::NoData("price series is empty".into()));
        }

        if let Some(w) = points.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(HedgeError::InvalidInput(format!(
                "price dates not strictly increasing: {} then {}",
                w[0].date, w[1].date
            )));
        }

        Ok(Self { points })
    }

    #[inline]
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.adj_close).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Latest adjusted close, used as S0.
    pub fn latest_close(&self) -> Option<f64> {
        self.points.last().map(|p| p.adj_close)
    }
}

impl TryFrom<Vec<PricePoint>> for HistoricalSeries {
    type Error = HedgeError;

    fn try_from(points: Vec<PricePoint>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<HistoricalSeries> for Vec<PricePoint> {
    fn from(series: HistoricalSeries) -> Self {
        series.points
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CalibrationParams {
    pub mu_base: f64,
    pub sigma_base: f64,
}

// ── Scenarios ──

/// Tariff escalation level. Ordinal 0 is the baseline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Severity {
    Baseline,
    Mild,
    Aggressive,
    Retaliation,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Baseline,
        Severity::Mild,
        Severity::Aggressive,
        Severity::Retaliation,
    ];

    #[inline]
    pub fn level(self) -> u8 {
        match self {
            Self::Baseline => 0,
            Self::Mild => 1,
            Self::Aggressive => 2,
            Self::Retaliation => 3,
        }
    }
}

impl TryFrom<u8> for Severity {
    type Error = HedgeError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(Self::Baseline),
            1 => Ok(Self::Mild),
            2 => Ok(Self::Aggressive),
            3 => Ok(Self::Retaliation),
            other => Err(HedgeError::UnknownSeverity(other)),
        }
    }
}

impl From<Severity> for u8 {
    fn from(s: Severity) -> Self {
        s.level()
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.level())
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scenario {
    pub label: String,
    pub probability: f64,
    pub severity: Severity,
}

/// Discrete distribution over severities. Probabilities are validated on
/// construction and on deserialization.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<Scenario>", into = "Vec<Scenario>")]
pub struct ScenarioSet {
    scenarios: SmallVec<[Scenario; 4]>,
}

impl ScenarioSet {
    pub fn new(scenarios: impl IntoIterator<Item = Scenario>) -> HedgeResult<Self> {
        let scenarios: SmallVec<[Scenario; 4]> = scenarios.into_iter().collect();

        if scenarios.is_empty() {
            return Err(HedgeError::InvariantViolation("scenario set is empty".into()));
        }

        if let Some(s) = scenarios
            .iter()
            .find(|s| !s.probability.is_finite() || s.probability < 0.0)
        {
            return Err(HedgeError::InvariantViolation(format!(
                "scenario `{}` has invalid probability {}",
                s.label, s.probability
            )));
        }

        let total: f64 = scenarios.iter().map(|s| s.probability).sum();
        if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(HedgeError::InvariantViolation(format!(
                "scenario probabilities sum to {total}, expected 1"
            )));
        }

        for (i, s) in scenarios.iter().enumerate() {
            if scenarios[..i].iter().any(|prev| prev.severity == s.severity) {
                return Err(HedgeError::InvariantViolation(format!(
                    "duplicate severity level {}",
                    s.severity
                )));
            }
        }

        Ok(Self { scenarios })
    }

    #[inline]
    pub fn as_slice(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn total_probability(&self) -> f64 {
        self.scenarios.iter().map(|s| s.probability).sum()
    }
}

impl TryFrom<Vec<Scenario>> for ScenarioSet {
    type Error = HedgeError;

    fn try_from(scenarios: Vec<Scenario>) -> Result<Self, Self::Error> {
        Self::new(scenarios)
    }
}

impl From<ScenarioSet> for Vec<Scenario> {
    fn from(set: ScenarioSet) -> Self {
        set.scenarios.into_vec()
    }
}

/// 30-day log-return parameters for one severity.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ScenarioParams {
    pub mu: f64,
    pub sigma: f64,
}

// ── Simulation output ──

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SimulatedSample {
    pub severity: Severity,
    pub log_return: f64,
    pub terminal_price: f64,
}

// ── Options ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

/// Raw quote as delivered by the market-data source. Every market field may be missing.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OptionQuote {
    pub contract_symbol: String,
    pub strike: f64,
    pub last_price: Option<f64>,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub volume: Option<u64>,
    pub open_interest: Option<u64>,
    pub implied_volatility: Option<f64>,
    pub in_the_money: Option<bool>,
}

/// Calls and puts for one underlying and one expiry, before cleaning.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OptionsChain {
    pub expiry: NaiveDate,
    pub calls: Vec<OptionQuote>,
    pub puts: Vec<OptionQuote>,
}

/// A cleaned, priced contract that passed the liquidity filter.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OptionContract {
    pub symbol: String,
    pub option_type: OptionType,
    pub strike: f64,
    pub mid_price: f64,
    pub spread: Option<f64>,
    pub open_interest: Option<u64>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct OptionsUniverse {
    pub ticker: String,
    pub expiry: NaiveDate,
    pub calls: Vec<OptionContract>,
    pub puts: Vec<OptionContract>,
}

// ── Spread search ──

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SpreadCandidate {
    pub k_long: f64,
    pub k_short: f64,
    /// (mid_long - mid_short) * 100
    pub dollar_cost: f64,
    pub fit_error: f64,
    pub long_symbol: String,
    pub short_symbol: String,
}

/// Dollar risk/reward for one debit put spread.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct TradeSummary {
    pub width: f64,
    pub premium: f64,
    pub max_profit: f64,
    pub max_loss: f64,
    pub breakeven: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PnlStats {
    pub expected_value: f64,
    pub prob_profit: f64,
    pub samples: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(day: u32, px: f64) -> PricePoint {
        PricePoint {
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            adj_close: px,
        }
    }

    #[test]
    fn test_series_excludes_bad_closes() {
        let s = HistoricalSeries::new(vec![pt(3, 100.0), pt(4, f64::NAN), pt(5, 101.0), pt(6, 0.0)])
            .unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.latest_close(), Some(101.0));
    }

    #[test]
    fn test_series_rejects_unordered_dates() {
        let err = HistoricalSeries::new(vec![pt(5, 100.0), pt(4, 101.0)]).unwrap_err();
        assert!(matches!(err, HedgeError::InvalidInput(_)), "got {err}");

        let dup = HistoricalSeries::new(vec![pt(5, 100.0), pt(5, 101.0)]).unwrap_err();
        assert!(matches!(dup, HedgeError::InvalidInput(_)), "got {dup}");
    }

    #[test]
    fn test_series_empty_is_no_data() {
        let err = HistoricalSeries::new(vec![pt(3, f64::NAN)]).unwrap_err();
        assert!(matches!(err, HedgeError::NoData(_)));
    }

    #[test]
    fn test_severity_roundtrip_and_unknown() {
        for s in Severity::ALL {
            assert_eq!(Severity::try_from(s.level()).unwrap(), s);
        }
        let err = Severity::try_from(4).unwrap_err();
        assert!(matches!(err, HedgeError::UnknownSeverity(4)));
    }

    #[test]
    fn test_scenario_set_rejects_bad_sum() {
        let err = ScenarioSet::new(vec![
            Scenario { label: "a".into(), probability: 0.5, severity: Severity::Baseline },
            Scenario { label: "b".into(), probability: 0.4, severity: Severity::Mild },
        ])
        .unwrap_err();
        assert!(matches!(err, HedgeError::InvariantViolation(_)), "got {err}");
    }

    #[test]
    fn test_scenario_set_rejects_duplicate_severity() {
        let err = ScenarioSet::new(vec![
            Scenario { label: "a".into(), probability: 0.5, severity: Severity::Mild },
            Scenario { label: "b".into(), probability: 0.5, severity: Severity::Mild },
        ])
        .unwrap_err();
        assert!(matches!(err, HedgeError::InvariantViolation(_)), "got {err}");
    }

    #[test]
    fn test_scenario_set_deserialize_validates() {
        let bad = r#"[{"label":"x","probability":0.7,"severity":0}]"#;
        assert!(serde_json::from_str::<ScenarioSet>(bad).is_err());

        let unknown = r#"[{"label":"x","probability":1.0,"severity":9}]"#;
        assert!(serde_json::from_str::<ScenarioSet>(unknown).is_err());

        let good = r#"[{"label":"x","probability":1.0,"severity":0}]"#;
        let set = serde_json::from_str::<ScenarioSet>(good).unwrap();
        assert_eq!(set.len(), 1);
    }
}
