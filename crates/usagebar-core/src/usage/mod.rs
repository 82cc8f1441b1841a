//! Usage monitoring: fetch the usage endpoint and normalize its windows.
//!
//! The endpoint returns a 5-hour and a 7-day window whose utilization may be
//! encoded either as a fraction or as a percentage. Everything downstream of
//! [`normalize`] works on fractions in [0, 1].

pub mod fetcher;
pub mod format;
pub mod normalizer;
pub mod types;

pub use fetcher::{FetchError, HttpUsageFetcher, UsageSource, DEFAULT_TIMEOUT, DEFAULT_USAGE_URL};
pub use format::{format_reset_in, menu_error_line, menu_line, percent_text};
pub use normalizer::{display_percent, dominant_fraction, normalize, normalize_utilization};
pub use types::{Bucket, NormalizedBucket, UsagePayload, UsageWindow};
