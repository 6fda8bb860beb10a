use serde::{Deserialize, Serialize};

/// EPSG code of WGS84 geographic coordinates
pub const EPSG_WGS84: u32 = 4326;

/// Coordinate reference system attached to every point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Crs {
    /// Geographic coordinates (latitude, longitude) in degrees on WGS84
    Geographic,
    /// Projected coordinates in meters (e.g., UTM)
    Projected { epsg: u32 },
}

impl Crs {
    /// Map an EPSG code onto a coordinate system
    pub fn from_epsg(epsg: u32) -> Self {
        if epsg == EPSG_WGS84 {
            Crs::Geographic
        } else {
            Crs::Projected { epsg }
        }
    }

    pub fn epsg(&self) -> u32 {
        match self {
            Crs::Geographic => EPSG_WGS84,
            Crs::Projected { epsg } => *epsg,
        }
    }

    pub fn is_geographic(&self) -> bool {
        matches!(self, Crs::Geographic)
    }

    /// UTM zone and hemisphere (`true` = north) for EPSG 326xx/327xx
    pub fn utm_zone(&self) -> Option<(u8, bool)> {
        match self {
            Crs::Projected { epsg } if (32601..=32660).contains(epsg) => {
                Some(((epsg - 32600) as u8, true))
            }
            Crs::Projected { epsg } if (32701..=32760).contains(epsg) => {
                Some(((epsg - 32700) as u8, false))
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

/// A 2-D coordinate pair tagged with its coordinate system.
///
/// `x` holds easting or longitude, `y` holds northing or latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub crs: Crs,
}

impl Point {
    pub fn new(x: f64, y: f64, crs: Crs) -> Self {
        Self { x, y, crs }
    }

    /// Geographic point from latitude/longitude in degrees
    pub fn geographic(lat: f64, lon: f64) -> Self {
        Self::new(lon, lat, Crs::Geographic)
    }

    /// Projected point from easting/northing in meters
    pub fn projected(easting: f64, northing: f64, epsg: u32) -> Self {
        Self::new(easting, northing, Crs::Projected { epsg })
    }

    pub fn lat(&self) -> f64 {
        self.y
    }

    pub fn lon(&self) -> f64 {
        self.x
    }
}

/// Ordered points sharing one coordinate system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSet {
    crs: Crs,
    points: Vec<Point>,
}

impl PointSet {
    /// Create an empty set in the given coordinate system
    pub fn empty(crs: Crs) -> Self {
        Self { crs, points: Vec::new() }
    }

    /// Build a set from points, rejecting mixed coordinate systems
    pub fn new(crs: Crs, points: Vec<Point>) -> SwesarrResult<Self> {
        if let Some(bad) = points.iter().find(|p| p.crs != crs) {
            return Err(SwesarrError::CrsMismatch {
                expected: crs,
                actual: bad.crs,
            });
        }
        Ok(Self { crs, points })
    }

    /// Build a set from parallel x/y coordinate columns
    pub fn from_xy(crs: Crs, xs: &[f64], ys: &[f64]) -> SwesarrResult<Self> {
        if xs.len() != ys.len() {
            return Err(SwesarrError::LengthMismatch {
                what: "y coordinates".to_string(),
                expected: xs.len(),
                actual: ys.len(),
            });
        }
        let points = xs
            .iter()
            .zip(ys)
            .map(|(&x, &y)| Point::new(x, y, crs))
            .collect();
        Ok(Self { crs, points })
    }

    pub fn push(&mut self, point: Point) -> SwesarrResult<()> {
        if point.crs != self.crs {
            return Err(SwesarrError::CrsMismatch {
                expected: self.crs,
                actual: point.crs,
            });
        }
        self.points.push(point);
        Ok(())
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Point> {
        self.points.get(index)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }
}

/// Outcome of matching one query point against a reference set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Index of the nearest reference point
    pub index: usize,
    /// Distance to that point (meters for geographic/UTM inputs)
    pub distance: f64,
    /// True iff `distance` is within the threshold used for the match
    pub valid: bool,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Geospatial transformation parameters (GDAL ordering)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn from_gdal(gt: [f64; 6]) -> Self {
        Self {
            top_left_x: gt[0],
            pixel_width: gt[1],
            rotation_x: gt[2],
            top_left_y: gt[3],
            rotation_y: gt[4],
            pixel_height: gt[5],
        }
    }

    /// Outer corners of a `width` x `height` raster
    pub fn corners(&self, width: usize, height: usize) -> BoundingBox {
        let w = width as f64;
        let h = height as f64;
        BoundingBox {
            min_x: self.top_left_x,
            min_y: self.top_left_y + w * self.rotation_y + h * self.pixel_height,
            max_x: self.top_left_x + w * self.pixel_width + h * self.rotation_x,
            max_y: self.top_left_y,
        }
    }

    /// Map coordinates of the center of pixel (row, col)
    pub fn pixel_center(&self, row: usize, col: usize) -> (f64, f64) {
        let c = col as f64 + 0.5;
        let r = row as f64 + 0.5;
        (
            self.top_left_x + c * self.pixel_width + r * self.rotation_x,
            self.top_left_y + c * self.rotation_y + r * self.pixel_height,
        )
    }
}

/// Frequency/polarization label of one SAR band, e.g. `09VV`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BandLabel(pub String);

impl BandLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The six SWESARR channels in file order
    pub fn swesarr_bands() -> Vec<BandLabel> {
        ["09VV", "09VH", "13VV", "13VH", "17VV", "17VH"]
            .iter()
            .map(|s| BandLabel::new(*s))
            .collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Co-polarized (VV) channel
    pub fn is_copol(&self) -> bool {
        self.0.ends_with("VV")
    }
}

impl std::fmt::Display for BandLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error types for SWESARR helpers
#[derive(Debug, thiserror::Error)]
pub enum SwesarrError {
    #[error("Nearest match requested against an empty reference set")]
    EmptySet,

    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("Coordinate system mismatch: expected {expected}, got {actual}")]
    CrsMismatch { expected: Crs, actual: Crs },

    #[error("Unsupported coordinate system: {0}")]
    UnsupportedCrs(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Time parsing error: {0}")]
    Time(#[from] chrono::ParseError),

    #[cfg(feature = "gdal")]
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),
}

/// Result type for SWESARR operations
pub type SwesarrResult<T> = Result<T, SwesarrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utm_zone_from_epsg() {
        assert_eq!(Crs::from_epsg(32612).utm_zone(), Some((12, true)));
        assert_eq!(Crs::from_epsg(32733).utm_zone(), Some((33, false)));
        assert_eq!(Crs::from_epsg(3857).utm_zone(), None);
        assert_eq!(Crs::Geographic.utm_zone(), None);
    }

    #[test]
    fn test_point_set_rejects_mixed_crs() {
        let points = vec![
            Point::projected(0.0, 0.0, 32612),
            Point::geographic(39.0, -108.0),
        ];
        let result = PointSet::new(Crs::Projected { epsg: 32612 }, points);
        assert!(matches!(result, Err(SwesarrError::CrsMismatch { .. })));
    }

    #[test]
    fn test_point_set_from_xy_length_mismatch() {
        let result = PointSet::from_xy(Crs::Geographic, &[1.0, 2.0], &[1.0]);
        assert!(matches!(
            result,
            Err(SwesarrError::LengthMismatch { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn test_geotransform_corners() {
        let gt = GeoTransform::from_gdal([740000.0, 2.0, 0.0, 4330000.0, 0.0, -2.0]);
        let bbox = gt.corners(100, 50);
        assert_eq!(bbox.min_x, 740000.0);
        assert_eq!(bbox.max_x, 740200.0);
        assert_eq!(bbox.max_y, 4330000.0);
        assert_eq!(bbox.min_y, 4329900.0);

        let (x, y) = gt.pixel_center(0, 0);
        assert_eq!((x, y), (740001.0, 4329999.0));
    }

    #[test]
    fn test_crs_from_epsg() {
        assert_eq!(Crs::from_epsg(4326), Crs::Geographic);
        assert_eq!(Crs::from_epsg(32612), Crs::Projected { epsg: 32612 });
        assert_eq!(format!("{}", Crs::Projected { epsg: 32612 }), "EPSG:32612");
    }
}
