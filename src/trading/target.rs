use crate::errors::{HedgeError, HedgeResult};

/// Strictly increasing terminal-price grid.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PriceGrid {
    points: Vec<f64>,
}

impl PriceGrid {
    #[inline]
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Desired payoff per grid point. Only meaningful with the grid it was built on.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct TargetCurve {
    values: Vec<f64>,
}

impl TargetCurve {
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Grid/target pairs for tabular export.
    pub fn rows(&self, grid: &PriceGrid) -> Vec<TargetRow> {
        grid.points()
            .iter()
            .zip(&self.values)
            .map(|(&s_t, &target_payoff)| TargetRow { s_t, target_payoff })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TargetRow {
    pub s_t: f64,
    pub target_payoff: f64,
}

/// `n` evenly spaced prices from `grid_min * s0` to `grid_max * s0`, both inclusive.
pub fn build_price_grid(s0: f64, grid_min: f64, grid_max: f64, n: usize) -> HedgeResult<PriceGrid> {
    if !s0.is_finite() || s0 <= 0.0 {
        return Err(HedgeError::InvalidInput(format!("spot must be positive, got {s0}")));
    }
    if !(grid_min < grid_max) || grid_min < 0.0 {
        return Err(HedgeError::InvalidInput(format!(
            "grid bounds must satisfy 0 <= min < max, got [{grid_min}, {grid_max}]"
        )));
    }
    if n < 2 {
        return Err(HedgeError::InvalidInput(format!("grid needs at least 2 points, got {n}")));
    }

    let lo = grid_min * s0;
    let hi = grid_max * s0;
    let step = (hi - lo) / (n - 1) as f64;

    let mut points: Vec<f64> = (0..n).map(|i| lo + step * i as f64).collect();
    points[n - 1] = hi;

    Ok(PriceGrid { points })
}

/// Downside hedge shape: zero at or above `cap * s0`, rising linearly to `scale`
/// at `floor * s0`, flat at `scale` below.
pub fn downside_target_payoff(
    grid: &PriceGrid,
    s0: f64,
    floor: f64,
    cap: f64,
    scale: f64,
) -> HedgeResult<TargetCurve> {
    if !(floor < cap) {
        return Err(HedgeError::InvalidInput(format!(
            "target floor must be below cap, got floor={floor} cap={cap}"
        )));
    }

    let floor_price = floor * s0;
    let cap_price = cap * s0;
    let depth = cap_price - floor_price;

    let values = grid
        .points()
        .iter()
        .map(|&s| scale * ((cap_price - s) / depth).clamp(0.0, 1.0))
        .collect();

    Ok(TargetCurve { values })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_endpoints_inclusive() {
        let g = build_price_grid(300.0, 0.60, 1.40, 250).unwrap();
        assert_eq!(g.len(), 250);
        assert!((g.points()[0] - 180.0).abs() < 1e-9);
        assert_eq!(g.points()[249], 1.40 * 300.0);
        assert!(g.points().windows(2).all(|w| w[1] > w[0]), "grid must be strictly increasing");
    }

    #[test]
    fn test_grid_rejects_bad_params() {
        assert!(build_price_grid(100.0, 1.2, 0.8, 10).is_err());
        assert!(build_price_grid(100.0, 0.8, 0.8, 10).is_err());
        assert!(build_price_grid(100.0, 0.8, 1.2, 1).is_err());
        assert!(build_price_grid(-1.0, 0.8, 1.2, 10).is_err());
    }

    #[test]
    fn test_target_boundaries() {
        // 1-dollar grid from 60 to 140 so 85 and 100 are grid points
        let g = build_price_grid(100.0, 0.60, 1.40, 81).unwrap();
        let t = downside_target_payoff(&g, 100.0, 0.85, 1.00, 1.0).unwrap();

        for (&s, &v) in g.points().iter().zip(t.values()) {
            if s >= 100.0 - 1e-9 {
                assert!(v.abs() < 1e-9, "payoff at {s} should be 0, got {v}");
            } else if s <= 85.0 + 1e-9 {
                assert!((v - 1.0).abs() < 1e-9, "payoff at {s} should be 1, got {v}");
            }
        }

        let interior: Vec<(f64, f64)> = g
            .points()
            .iter()
            .zip(t.values())
            .filter(|(&s, _)| s > 85.0 + 1e-9 && s < 100.0 - 1e-9)
            .map(|(&s, &v)| (s, v))
            .collect();
        assert_eq!(interior.len(), 14);
        for w in interior.windows(2) {
            assert!(w[1].1 < w[0].1, "target must strictly decrease on (85, 100)");
        }
    }

    #[test]
    fn test_target_scale() {
        let g = build_price_grid(50.0, 0.5, 1.5, 11).unwrap();
        let t = downside_target_payoff(&g, 50.0, 0.85, 1.00, 2.5).unwrap();
        assert!(t.values().iter().all(|&v| (0.0..=2.5).contains(&v)));
        assert!((t.values()[0] - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_target_requires_floor_below_cap() {
        let g = build_price_grid(100.0, 0.6, 1.4, 10).unwrap();
        assert!(matches!(
            downside_target_payoff(&g, 100.0, 1.0, 0.85, 1.0),
            Err(HedgeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rows_pair_by_index() {
        let g = build_price_grid(100.0, 0.9, 1.1, 3).unwrap();
        let t = downside_target_payoff(&g, 100.0, 0.9, 1.0, 1.0).unwrap();
        let rows = t.rows(&g);
        assert_eq!(rows.len(), 3);
        assert!((rows[0].s_t - 90.0).abs() < 1e-9);
        assert!((rows[0].target_payoff - 1.0).abs() < 1e-9);
        assert_eq!(rows[2].target_payoff, 0.0);
    }
}
