pub mod files;
pub mod yahoo;

use crate::errors::{HedgeError, HedgeResult};
use chrono::NaiveDate;

/// Expiry closest to `target_days` from `today`. Past expiries are ignored;
/// the earliest listed wins a tie.
pub fn nearest_expiry(expiries: &[NaiveDate], today: NaiveDate, target_days: i64) -> HedgeResult<NaiveDate> {
    expiries
        .iter()
        .copied()
        .filter(|&d| d >= today)
        .min_by_key(|&d| ((d - today).num_days() - target_days).abs())
        .ok_or_else(|| HedgeError::NoData(format!("no option expiry on or after {today}")))
}
