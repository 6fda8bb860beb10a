//! SWESARR: helpers for aligning airborne SAR and radiometer measurements
//! with ground-truth snow pits.
//!
//! The crate also carries the small activation-function helpers used by the
//! neural-network tutorial.

pub mod types;
pub mod io;
pub mod core;
pub mod nn;
pub mod plot;

#[cfg(feature = "python")]
mod python;

// Re-export main types and functions for easier access
pub use types::{
    BandLabel, BoundingBox, Crs, GeoTransform, MatchResult, Point, PointSet, SwesarrError,
    SwesarrResult,
};

pub use core::{
    filter_pits_to_sar, filter_radiometer_points, join_sar_radiometer, match_all,
    DistanceMetric, Footprints, LinearScan, NearestMatch,
};
pub use io::{OutputConfig, SarRaster};
