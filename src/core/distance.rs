use crate::types::{Crs, Point};
use geo::{Distance, Geodesic};

/// WGS84 semi-major axis (meters)
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

pub fn cosd(a: f64) -> f64 {
    a.to_radians().cos()
}

pub fn sind(a: f64) -> f64 {
    a.to_radians().sin()
}

pub fn tand(a: f64) -> f64 {
    a.to_radians().tan()
}

/// Distance between two points of the same coordinate system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMetric {
    /// Euclidean distance in the units of a projected system
    Planar,
    /// Ellipsoidal distance in meters between latitude/longitude pairs (Karney)
    Geodesic,
}

impl DistanceMetric {
    /// Natural metric for a coordinate system
    pub fn for_crs(crs: &Crs) -> Self {
        if crs.is_geographic() {
            DistanceMetric::Geodesic
        } else {
            DistanceMetric::Planar
        }
    }

    /// Distance between `a` and `b`.
    ///
    /// Both points must share a coordinate system; the search layer checks
    /// this before calling. NaN coordinates yield NaN.
    pub fn distance(&self, a: &Point, b: &Point) -> f64 {
        match self {
            DistanceMetric::Planar => euclidean(a.x, a.y, b.x, b.y),
            DistanceMetric::Geodesic => geodesic(a.lat(), a.lon(), b.lat(), b.lon()),
        }
    }
}

pub fn euclidean(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    (dx * dx + dy * dy).sqrt()
}

/// Shortest distance on the WGS84 ellipsoid between two latitude/longitude
/// pairs (meters). NaN coordinates yield NaN.
pub fn geodesic(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    if lat1.is_nan() || lon1.is_nan() || lat2.is_nan() || lon2.is_nan() {
        return f64::NAN;
    }
    Geodesic.distance(geo::Point::new(lon1, lat1), geo::Point::new(lon2, lat2))
}
