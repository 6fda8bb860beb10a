//! WGS84 <-> UTM conversions.
//!
//! Only the transverse Mercator zones (EPSG 326xx north, 327xx south) are
//! supported. Series expansions follow Snyder, "Map Projections: A Working
//! Manual" (USGS PP 1395), accurate to well under a meter inside a zone.

use crate::core::distance::{WGS84_A, WGS84_F};
use crate::types::{Crs, Point, PointSet, SwesarrError, SwesarrResult};

const UTM_SCALE: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// A single UTM zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Utm {
    pub zone: u8,
    pub north: bool,
}

impl Utm {
    pub fn new(zone: u8, north: bool) -> SwesarrResult<Self> {
        if !(1..=60).contains(&zone) {
            return Err(SwesarrError::UnsupportedCrs(format!("UTM zone {}", zone)));
        }
        Ok(Self { zone, north })
    }

    /// Resolve EPSG 326xx / 327xx
    pub fn from_epsg(epsg: u32) -> SwesarrResult<Self> {
        let crs = Crs::Projected { epsg };
        match crs.utm_zone() {
            Some((zone, north)) => Self::new(zone, north),
            None => Err(SwesarrError::UnsupportedCrs(format!("EPSG:{}", epsg))),
        }
    }

    /// Zone containing a geographic point
    pub fn for_location(lat: f64, lon: f64) -> SwesarrResult<Self> {
        let zone = (((lon + 180.0) / 6.0).floor() as i64).rem_euclid(60) + 1;
        Self::new(zone as u8, lat >= 0.0)
    }

    pub fn epsg(&self) -> u32 {
        let base = if self.north { 32600 } else { 32700 };
        base + self.zone as u32
    }

    pub fn crs(&self) -> Crs {
        Crs::Projected { epsg: self.epsg() }
    }

    fn central_meridian(&self) -> f64 {
        (self.zone as f64 - 1.0) * 6.0 - 180.0 + 3.0
    }

    /// Latitude/longitude (degrees) to easting/northing (meters)
    pub fn forward(&self, lat: f64, lon: f64) -> (f64, f64) {
        let a = WGS84_A;
        let e2 = WGS84_F * (2.0 - WGS84_F);
        let ep2 = e2 / (1.0 - e2);

        let phi = lat.to_radians();
        let (sin_phi, cos_phi) = phi.sin_cos();
        let tan_phi = phi.tan();

        let n = a / (1.0 - e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = ep2 * cos_phi * cos_phi;
        let big_a = cos_phi * (lon - self.central_meridian()).to_radians();
        let m = meridian_arc(phi);

        let easting = UTM_SCALE
            * n
            * (big_a
                + (1.0 - t + c) * big_a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * big_a.powi(5) / 120.0)
            + FALSE_EASTING;

        let mut northing = UTM_SCALE
            * (m + n
                * tan_phi
                * (big_a * big_a / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * big_a.powi(4) / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * big_a.powi(6)
                        / 720.0));
        if !self.north {
            northing += FALSE_NORTHING_SOUTH;
        }

        (easting, northing)
    }

    /// Easting/northing (meters) to latitude/longitude (degrees)
    pub fn inverse(&self, easting: f64, northing: f64) -> (f64, f64) {
        let a = WGS84_A;
        let e2 = WGS84_F * (2.0 - WGS84_F);
        let ep2 = e2 / (1.0 - e2);
        let e4 = e2 * e2;
        let e6 = e4 * e2;

        let x = easting - FALSE_EASTING;
        let y = if self.north {
            northing
        } else {
            northing - FALSE_NORTHING_SOUTH
        };

        let m = y / UTM_SCALE;
        let mu = m / (a * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
        let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let (sin_phi1, cos_phi1) = phi1.sin_cos();
        let tan_phi1 = phi1.tan();
        let n1 = a / (1.0 - e2 * sin_phi1 * sin_phi1).sqrt();
        let t1 = tan_phi1 * tan_phi1;
        let c1 = ep2 * cos_phi1 * cos_phi1;
        let r1 = a * (1.0 - e2) / (1.0 - e2 * sin_phi1 * sin_phi1).powf(1.5);
        let d = x / (n1 * UTM_SCALE);

        let phi = phi1
            - (n1 * tan_phi1 / r1)
                * (d * d / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2
                        - 3.0 * c1 * c1)
                        * d.powi(6)
                        / 720.0);

        let lambda = (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1)
                * d.powi(5)
                / 120.0)
            / cos_phi1;

        (phi.to_degrees(), self.central_meridian() + lambda.to_degrees())
    }
}

/// Meridian arc length from the equator to latitude `phi` (radians)
fn meridian_arc(phi: f64) -> f64 {
    let e2 = WGS84_F * (2.0 - WGS84_F);
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    WGS84_A
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
}

/// Transform a point into `target`
pub fn reproject(point: &Point, target: &Crs) -> SwesarrResult<Point> {
    if point.crs == *target {
        return Ok(*point);
    }

    let (lat, lon) = match point.crs {
        Crs::Geographic => (point.lat(), point.lon()),
        Crs::Projected { epsg } => Utm::from_epsg(epsg)?.inverse(point.x, point.y),
    };

    match target {
        Crs::Geographic => Ok(Point::geographic(lat, lon)),
        Crs::Projected { epsg } => {
            let (e, n) = Utm::from_epsg(*epsg)?.forward(lat, lon);
            Ok(Point::projected(e, n, *epsg))
        }
    }
}

/// Transform every point of a set, keeping order
pub fn reproject_set(points: &PointSet, target: &Crs) -> SwesarrResult<PointSet> {
    log::debug!("Reprojecting {} points from {} to {}", points.len(), points.crs(), target);
    let projected = points
        .iter()
        .map(|p| reproject(p, target))
        .collect::<SwesarrResult<Vec<_>>>()?;
    PointSet::new(*target, projected)
}
