//! Fault regions and flag rates from PCA statistics.
//!
//! A sample is anomalous when its T² and Q p-values are both below a threshold. Runs of
//! anomalous samples become [`Region`]s; the region indicator, smoothed with a centred
//! rolling mean, gives a flag rate in events per day.

pub mod extract;
pub mod rate;
pub mod summary;

pub use extract::{
    anomaly_mask, collect_regions, extract_regions, find_regions, region_flags,
    CollectedRegions, Region, RegionConfig, RegionReport,
};
pub use rate::{flag_rate, rates_for_limits, RateConfig};
pub use summary::PcaSummary;
