//! Normalization of the endpoint's ambiguous utilization encoding.
//!
//! The endpoint sends utilization either as a fraction (`0.45`) or as a whole
//! percentage (`45`). The encoding is inferred from magnitude only: anything
//! above `1` is a percentage. A raw value of exactly `1` is read as a full
//! fraction (100%), never as "1 percent".

use chrono::{DateTime, Utc};
use tracing::debug;

use super::types::{Bucket, NormalizedBucket};

/// Compensates float error from percentage division (0.29 * 100 = 28.999...)
const PERCENT_EPSILON: f64 = 1e-9;

/// Normalize a raw bucket; absent input stays absent.
///
/// A bucket without a utilization value reads as 0%.
pub fn normalize(bucket: Option<&Bucket>) -> Option<NormalizedBucket> {
    let bucket = bucket?;
    Some(NormalizedBucket {
        fraction: normalize_utilization(bucket.utilization.unwrap_or(0.0)),
        resets_at: bucket.resets_at.as_deref().and_then(parse_reset_time),
    })
}

/// Convert a raw utilization value to a fraction in [0, 1]
pub fn normalize_utilization(raw: f64) -> f64 {
    if raw.is_nan() {
        return 0.0;
    }
    let fraction = if raw > 1.0 { raw / 100.0 } else { raw };
    fraction.clamp(0.0, 1.0)
}

/// Whole percentage for display: `floor(fraction * 100)` within 0-100
pub fn display_percent(fraction: f64) -> u8 {
    if fraction.is_nan() {
        return 0;
    }
    ((fraction * 100.0) + PERCENT_EPSILON).floor().clamp(0.0, 100.0) as u8
}

/// Larger of the two window fractions; 0 when both are absent
pub fn dominant_fraction(
    five_hour: Option<&NormalizedBucket>,
    seven_day: Option<&NormalizedBucket>,
) -> f64 {
    [five_hour, seven_day]
        .into_iter()
        .flatten()
        .map(|b| b.fraction)
        .fold(0.0, f64::max)
}

fn parse_reset_time(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            debug!(resets_at = %raw, error = %e, "Ignoring unparseable reset time");
            None
        }
    }
}
