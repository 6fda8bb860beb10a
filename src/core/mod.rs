//! Core matching and alignment modules

pub mod distance;
pub mod nearest;
pub mod threshold;
pub mod projection;
pub mod backscatter;
pub mod snowpit;
pub mod radiometer;

// Re-export main types
pub use distance::DistanceMetric;
pub use nearest::{match_all, LinearScan, Nearest, NearestMatch};
pub use threshold::{apply_mask, distance_mask, threshold_mask};
pub use projection::{reproject, reproject_set, Utm};
pub use snowpit::{aggregate_pits, filter_pits_to_sar, PitLayer, PitSarMatch, PitSwe};
pub use radiometer::{
    filter_radiometer_points, flight_line_utm, join_sar_radiometer, Footprints, RadiometerBand,
    RadiometerPitMatch, RadiometerSample, SarRadiometerJoin,
};
