use crate::types::{BandLabel, Crs, GeoTransform, Point, SwesarrError, SwesarrResult};
use ndarray::{s, Array3, ArrayView2, Axis};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Multi-band SAR raster on a regular grid (band x row x col).
///
/// `x` holds column center coordinates, `y` holds row center coordinates
/// (north to south for north-up rasters), both in `crs`.
#[derive(Debug, Clone)]
pub struct SarRaster {
    data: Array3<f32>,
    x: Vec<f64>,
    y: Vec<f64>,
    bands: Vec<BandLabel>,
    crs: Crs,
}

impl SarRaster {
    pub fn new(
        data: Array3<f32>,
        x: Vec<f64>,
        y: Vec<f64>,
        bands: Vec<BandLabel>,
        crs: Crs,
    ) -> SwesarrResult<Self> {
        let (n_bands, rows, cols) = data.dim();
        for (what, expected, actual) in [
            ("band labels", n_bands, bands.len()),
            ("y axis", rows, y.len()),
            ("x axis", cols, x.len()),
        ] {
            if expected != actual {
                return Err(SwesarrError::LengthMismatch {
                    what: what.to_string(),
                    expected,
                    actual,
                });
            }
        }
        Ok(Self { data, x, y, bands, crs })
    }

    /// Build axes from a north-up geotransform
    pub fn from_geotransform(
        data: Array3<f32>,
        geo_transform: &GeoTransform,
        bands: Vec<BandLabel>,
        crs: Crs,
    ) -> SwesarrResult<Self> {
        if geo_transform.rotation_x != 0.0 || geo_transform.rotation_y != 0.0 {
            return Err(SwesarrError::InvalidFormat(
                "Rotated geotransforms are not supported".to_string(),
            ));
        }
        let (_, rows, cols) = data.dim();
        let x = (0..cols).map(|c| geo_transform.pixel_center(0, c).0).collect();
        let y = (0..rows).map(|r| geo_transform.pixel_center(r, 0).1).collect();
        Self::new(data, x, y, bands, crs)
    }

    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn bands(&self) -> &[BandLabel] {
        &self.bands
    }

    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    pub fn band_index(&self, label: &BandLabel) -> Option<usize> {
        self.bands.iter().position(|b| b == label)
    }

    pub fn band(&self, label: &BandLabel) -> Option<ArrayView2<'_, f32>> {
        self.band_index(label)
            .map(|i| self.data.index_axis(Axis(0), i))
    }

    pub fn value_at(&self, band: usize, row: usize, col: usize) -> Option<f32> {
        self.data.get((band, row, col)).copied()
    }

    /// All band values of one pixel, in band order
    pub fn pixel_values(&self, row: usize, col: usize) -> Option<Vec<f32>> {
        let (_, rows, cols) = self.data.dim();
        if row >= rows || col >= cols {
            return None;
        }
        Some(self.data.slice(s![.., row, col]).to_vec())
    }

    pub fn pixel_center(&self, row: usize, col: usize) -> Option<Point> {
        let x = *self.x.get(col)?;
        let y = *self.y.get(row)?;
        Some(Point::new(x, y, self.crs))
    }

    /// Pixels whose centers fall in `[x_min, x_max] x [y_min, y_max]`.
    ///
    /// Returns a (band, row, col) array which is empty along an axis when no
    /// center falls inside the range.
    pub fn window(&self, x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Array3<f32> {
        let cols: Vec<usize> = axis_range(&self.x, x_min, x_max);
        let rows: Vec<usize> = axis_range(&self.y, y_min, y_max);
        self.data.select(Axis(1), &rows).select(Axis(2), &cols)
    }
}

fn axis_range(axis: &[f64], lo: f64, hi: f64) -> Vec<usize> {
    axis.iter()
        .enumerate()
        .filter(|(_, &v)| v >= lo && v <= hi)
        .map(|(i, _)| i)
        .collect()
}

/// Frequency + polarization, compiled once
fn band_pattern() -> SwesarrResult<&'static Regex> {
    static BAND_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    BAND_PATTERN
        .get_or_init(|| Regex::new(r"^\d{2}(VV|VH|HV|HH)$").ok())
        .as_ref()
        .ok_or_else(|| SwesarrError::Processing("Invalid band pattern".to_string()))
}

/// Band label of a SWESARR GeoTIFF file name.
///
/// The sixth `_`-separated field carries frequency and polarization, e.g.
/// `09N55VV` -> `09VV`: the first two characters plus everything from the
/// sixth character on.
pub fn parse_band_label<P: AsRef<Path>>(path: P) -> SwesarrResult<BandLabel> {
    let name = path
        .as_ref()
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            SwesarrError::InvalidFormat(format!("No file name in {}", path.as_ref().display()))
        })?;

    let field = name.split('_').nth(5).ok_or_else(|| {
        SwesarrError::InvalidFormat(format!("Missing band field in file name: {}", name))
    })?;

    let chars: Vec<char> = field.chars().collect();
    if chars.len() < 6 {
        return Err(SwesarrError::InvalidFormat(format!(
            "Band field too short: {}",
            field
        )));
    }
    let label: String = chars[0..2].iter().chain(chars[5..].iter()).collect();

    if !band_pattern()?.is_match(&label) {
        return Err(SwesarrError::InvalidFormat(format!(
            "Unrecognized band label '{}' in {}",
            label, name
        )));
    }

    Ok(BandLabel::new(label))
}

/// Raster readers backed by GDAL
#[cfg(feature = "gdal")]
pub mod gdal_io {
    use super::*;
    use crate::types::BoundingBox;
    use gdal::Dataset;
    use ndarray::Array2;

    /// Outer corners of a raster file
    pub fn read_raster_corners<P: AsRef<Path>>(path: P) -> SwesarrResult<BoundingBox> {
        let dataset = Dataset::open(path.as_ref())?;
        let geo_transform = GeoTransform::from_gdal(dataset.geo_transform()?);
        let (width, height) = dataset.raster_size();
        Ok(geo_transform.corners(width, height))
    }

    /// Stack single-band SWESARR GeoTIFFs along the band axis.
    ///
    /// The first file fixes grid, geotransform and coordinate system; every
    /// other file must match its size.
    pub fn join_files<P: AsRef<Path>>(paths: &[P]) -> SwesarrResult<SarRaster> {
        let first = paths.first().ok_or(SwesarrError::EmptySet)?;
        log::info!("Joining {} SAR band files", paths.len());

        let dataset = Dataset::open(first.as_ref())?;
        let geo_transform = GeoTransform::from_gdal(dataset.geo_transform()?);
        let (width, height) = dataset.raster_size();
        let epsg = dataset.spatial_ref()?.auth_code()?;
        let crs = Crs::from_epsg(epsg as u32);
        log::debug!("Grid {}x{} in {}, geotransform {:?}", width, height, crs, geo_transform);

        let mut data = Array3::<f32>::zeros((paths.len(), height, width));
        let mut bands = Vec::with_capacity(paths.len());

        for (i, path) in paths.iter().enumerate() {
            let dataset = Dataset::open(path.as_ref())?;
            if dataset.raster_size() != (width, height) {
                return Err(SwesarrError::InvalidFormat(format!(
                    "{} is {:?}, expected {:?}",
                    path.as_ref().display(),
                    dataset.raster_size(),
                    (width, height)
                )));
            }
            let band = dataset.rasterband(1)?;
            let buffer = band.read_as::<f32>((0, 0), (width, height), (width, height), None)?;
            let grid = Array2::from_shape_vec((height, width), buffer.data)
                .map_err(|e| SwesarrError::Processing(format!("Failed to reshape band: {}", e)))?;
            data.index_axis_mut(Axis(0), i).assign(&grid);

            let label = parse_band_label(path)?;
            log::debug!("Band {} <- {}", label, path.as_ref().display());
            bands.push(label);
        }

        SarRaster::from_geotransform(data, &geo_transform, bands, crs)
    }
}
