use crate::errors::HedgeResult;
use crate::types::{Scenario, ScenarioParams, ScenarioSet, Severity};

/// Discrete tariff-policy outcomes over the 30-day horizon.
///
/// The probability sum is checked when the set is built; a failure here is a
/// table defect, not a data condition.
pub fn tariff_scenarios() -> HedgeResult<ScenarioSet> {
    ScenarioSet::new([
        Scenario {
            label: "No new measures".into(),
            probability: 0.45,
            severity: Severity::Baseline,
        },
        Scenario {
            label: "Mild tariffs / tighter language".into(),
            probability: 0.30,
            severity: Severity::Mild,
        },
        Scenario {
            label: "Aggressive tariffs / restrictions".into(),
            probability: 0.20,
            severity: Severity::Aggressive,
        },
        Scenario {
            label: "Aggressive + retaliation".into(),
            probability: 0.05,
            severity: Severity::Retaliation,
        },
    ])
}

/// Volatility multiplier per severity. Escalation widens uncertainty.
#[inline]
pub fn sigma_multiplier(severity: Severity) -> f64 {
    match severity {
        Severity::Baseline => 1.00,
        Severity::Mild => 1.20,
        Severity::Aggressive => 1.60,
        Severity::Retaliation => 2.10,
    }
}

/// Additive 30-day log-return penalty per severity.
#[inline]
pub fn mu_penalty(severity: Severity) -> f64 {
    match severity {
        Severity::Baseline => 0.00,
        Severity::Mild => -0.01,
        Severity::Aggressive => -0.04,
        Severity::Retaliation => -0.07,
    }
}

/// Scenario log-return parameters from the calibrated baseline.
#[inline]
pub fn params_from_calibration(severity: Severity, mu_base: f64, sigma_base: f64) -> ScenarioParams {
    ScenarioParams {
        mu: mu_base + mu_penalty(severity),
        sigma: sigma_base * sigma_multiplier(severity),
    }
}

/// Same as [`params_from_calibration`] for a raw ordinal (e.g. read from a table).
pub fn params_for_level(level: u8, mu_base: f64, sigma_base: f64) -> HedgeResult<ScenarioParams> {
    let severity = Severity::try_from(level)?;
    Ok(params_from_calibration(severity, mu_base, sigma_base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HedgeError;
    use crate::types::PROBABILITY_TOLERANCE;

    #[test]
    fn test_tariff_scenarios_sum_to_one() {
        let set = tariff_scenarios().unwrap();
        assert_eq!(set.len(), 4);
        assert!((set.total_probability() - 1.0).abs() <= PROBABILITY_TOLERANCE);
    }

    #[test]
    fn test_tariff_scenarios_cover_every_severity_once() {
        let set = tariff_scenarios().unwrap();
        let levels: Vec<u8> = set.iter().map(|s| s.severity.level()).collect();
        assert_eq!(levels, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_escalation_never_improves() {
        for pair in Severity::ALL.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            assert!(
                sigma_multiplier(hi) >= sigma_multiplier(lo),
                "sigma multiplier must be non-decreasing: {lo} -> {hi}"
            );
            assert!(
                mu_penalty(hi) <= mu_penalty(lo),
                "mu penalty must be non-increasing: {lo} -> {hi}"
            );
        }
    }

    #[test]
    fn test_params_from_calibration() {
        let p = params_from_calibration(Severity::Aggressive, 0.02, 0.10);
        assert!((p.mu - (-0.02)).abs() < 1e-12);
        assert!((p.sigma - 0.16).abs() < 1e-12);

        let base = params_from_calibration(Severity::Baseline, 0.02, 0.10);
        assert_eq!(base, ScenarioParams { mu: 0.02, sigma: 0.10 });
    }

    #[test]
    fn test_unknown_level_fails() {
        assert!(params_for_level(3, 0.0, 0.1).is_ok());
        let err = params_for_level(7, 0.0, 0.1).unwrap_err();
        assert!(matches!(err, HedgeError::UnknownSeverity(7)));
    }
}
