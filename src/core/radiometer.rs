use crate::core::distance::geodesic;
use crate::core::nearest::{nearest_axis_index, LinearScan, NearestMatch};
use crate::core::projection::{reproject, reproject_set, Utm};
use crate::core::snowpit::PitSwe;
use crate::core::threshold::{apply_mask, finite_mask};
use crate::io::raster::SarRaster;
use crate::types::{BandLabel, Crs, Point, PointSet, SwesarrError, SwesarrResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Radiometer channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RadiometerBand {
    /// 10 GHz
    X,
    /// 18 GHz
    K,
    /// 37 GHz
    Ka,
}

impl RadiometerBand {
    pub const ALL: [RadiometerBand; 3] = [RadiometerBand::X, RadiometerBand::K, RadiometerBand::Ka];

    /// Series id used in long-format tables
    pub fn series_id(&self) -> &'static str {
        match self {
            RadiometerBand::X => "X-band Rad",
            RadiometerBand::K => "K-band Rad",
            RadiometerBand::Ka => "Ka-band Rad",
        }
    }

    /// Legend label with center frequency in GHz
    pub fn legend(&self) -> &'static str {
        match self {
            RadiometerBand::X => "X (10)",
            RadiometerBand::K => "K (18)",
            RadiometerBand::Ka => "Ka (37)",
        }
    }
}

/// One radiometer measurement along the flight line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiometerSample {
    pub utc: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    /// Brightness temperatures (K)
    pub tb_x: f64,
    pub tb_k: f64,
    pub tb_ka: f64,
}

impl RadiometerSample {
    pub fn location(&self) -> Point {
        Point::geographic(self.latitude, self.longitude)
    }

    pub fn tb(&self, band: RadiometerBand) -> f64 {
        match band {
            RadiometerBand::X => self.tb_x,
            RadiometerBand::K => self.tb_k,
            RadiometerBand::Ka => self.tb_ka,
        }
    }
}

/// Footprint semi-major axes per radiometer channel (meters)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprints {
    pub x_10ghz: f64,
    pub k_18ghz: f64,
    pub ka_37ghz: f64,
}

impl Default for Footprints {
    fn default() -> Self {
        Self {
            x_10ghz: 60.0,
            k_18ghz: 50.0,
            ka_37ghz: 40.0,
        }
    }
}

impl Footprints {
    pub fn radius(&self, band: RadiometerBand) -> f64 {
        match band {
            RadiometerBand::X => self.x_10ghz,
            RadiometerBand::K => self.k_18ghz,
            RadiometerBand::Ka => self.ka_37ghz,
        }
    }
}

/// Snow pit paired with the nearest radiometer sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiometerPitMatch {
    pub pit: PitSwe,
    pub radiometer_index: usize,
    /// Distance from pit to radiometer footprint center (meters)
    pub distance: f64,
    /// NaN when the pit is outside that channel's footprint
    pub tb_x: f64,
    pub tb_k: f64,
    pub tb_ka: f64,
}

impl RadiometerPitMatch {
    pub fn tb(&self, band: RadiometerBand) -> f64 {
        match band {
            RadiometerBand::X => self.tb_x,
            RadiometerBand::K => self.tb_k,
            RadiometerBand::Ka => self.tb_ka,
        }
    }
}

/// Geographic point set of all radiometer footprint centers
pub fn radiometer_locations(radiometer: &[RadiometerSample]) -> SwesarrResult<PointSet> {
    PointSet::new(
        Crs::Geographic,
        radiometer.iter().map(|r| r.location()).collect(),
    )
}

/// UTM zone under the first located radiometer sample
pub fn flight_line_utm(radiometer: &[RadiometerSample]) -> SwesarrResult<Utm> {
    let sample = radiometer
        .iter()
        .find(|s| s.latitude.is_finite() && s.longitude.is_finite())
        .ok_or(SwesarrError::EmptySet)?;
    Utm::for_location(sample.latitude, sample.longitude)
}

/// Attach the nearest radiometer brightness temperatures to each snow pit.
///
/// Radiometer positions are reprojected into the pits' (projected) system
/// and matched with planar distances. A channel's temperature is kept only
/// when the pit lies inside that channel's footprint. Pits are retained iff
/// the 10 GHz temperature is present; the narrower 18 and 37 GHz footprints
/// only blank their own columns.
pub fn filter_radiometer_points(
    footprints: &Footprints,
    radiometer: &[RadiometerSample],
    pits: &[PitSwe],
) -> SwesarrResult<Vec<RadiometerPitMatch>> {
    let Some(first) = pits.first() else {
        return Ok(Vec::new());
    };
    let pit_crs = first.location.crs;
    if pit_crs.is_geographic() {
        return Err(SwesarrError::UnsupportedCrs(
            "Snow pit locations must be projected".to_string(),
        ));
    }
    let pit_points = PointSet::new(pit_crs, pits.iter().map(|p| p.location).collect())?;

    log::info!(
        "Matching {} pits against {} radiometer samples in {}",
        pits.len(),
        radiometer.len(),
        pit_crs
    );
    log::debug!("Footprints: {:?}", footprints);

    let reference = reproject_set(&radiometer_locations(radiometer)?, &pit_crs)?;
    let search = LinearScan::new(&reference);

    let mut matches = Vec::with_capacity(pits.len());
    for (pit, point) in pits.iter().zip(pit_points.iter()) {
        let hit = search.nearest(point)?;
        let sample = &radiometer[hit.index];
        let within = |band: RadiometerBand| {
            if hit.distance <= footprints.radius(band) {
                sample.tb(band)
            } else {
                f64::NAN
            }
        };
        matches.push(RadiometerPitMatch {
            pit: pit.clone(),
            radiometer_index: hit.index,
            distance: hit.distance,
            tb_x: within(RadiometerBand::X),
            tb_k: within(RadiometerBand::K),
            tb_ka: within(RadiometerBand::Ka),
        });
    }

    let tb_x: Vec<f64> = matches.iter().map(|m| m.tb_x).collect();
    let mask = finite_mask(&tb_x);
    let kept = apply_mask(&matches, &mask)?;
    log::info!("{} of {} pits fall inside the 10 GHz footprint", kept.len(), pits.len());
    Ok(kept)
}

/// Radiometer sample joined with the SAR pixel nearest to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedSample {
    pub utc: DateTime<Utc>,
    pub rad_lat: f64,
    pub rad_lon: f64,
    pub sar_lat: f64,
    pub sar_lon: f64,
    /// (row, col) of the SAR pixel, `None` when the sample position is NaN
    pub pixel: Option<(usize, usize)>,
    /// Geodesic distance between footprint center and pixel center (meters)
    pub distance_m: f64,
    /// Pixel values in raster band order
    pub backscatter: Vec<f64>,
    pub tb_x: f64,
    pub tb_k: f64,
    pub tb_ka: f64,
}

impl JoinedSample {
    pub fn tb(&self, band: RadiometerBand) -> f64 {
        match band {
            RadiometerBand::X => self.tb_x,
            RadiometerBand::K => self.tb_k,
            RadiometerBand::Ka => self.tb_ka,
        }
    }
}

/// One value of the long (one measurement per row) table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongMeasurement {
    pub longitude: f64,
    pub latitude: f64,
    pub value: f64,
    pub id: String,
}

/// SAR and radiometer data on common sample positions
#[derive(Debug, Clone)]
pub struct SarRadiometerJoin {
    pub bands: Vec<BandLabel>,
    pub samples: Vec<JoinedSample>,
}

impl SarRadiometerJoin {
    /// Column names of the wide table, SAR bands first
    pub fn column_names(&self) -> Vec<String> {
        self.bands
            .iter()
            .map(|b| format!("{} SAR", b))
            .chain(RadiometerBand::ALL.iter().map(|b| b.series_id().to_string()))
            .collect()
    }

    /// Band-major long table for grouped plotting.
    ///
    /// SAR rows carry pixel-center coordinates, radiometer rows carry
    /// footprint-center coordinates.
    pub fn long_format(&self) -> Vec<LongMeasurement> {
        let mut rows = Vec::with_capacity(self.samples.len() * (self.bands.len() + 3));
        for (b, band) in self.bands.iter().enumerate() {
            let id = format!("{} SAR", band);
            for s in &self.samples {
                rows.push(LongMeasurement {
                    longitude: s.sar_lon,
                    latitude: s.sar_lat,
                    value: s.backscatter.get(b).copied().unwrap_or(f64::NAN),
                    id: id.clone(),
                });
            }
        }
        for band in RadiometerBand::ALL {
            for s in &self.samples {
                rows.push(LongMeasurement {
                    longitude: s.rad_lon,
                    latitude: s.rad_lat,
                    value: s.tb(band),
                    id: band.series_id().to_string(),
                });
            }
        }
        rows
    }
}

/// Pair every radiometer sample with the nearest SAR pixel.
///
/// Column and row are looked up independently on the raster axes (after
/// moving the sample into the raster's coordinate system); the reported
/// distance is the geodesic distance between the two centers.
pub fn join_sar_radiometer(
    raster: &SarRaster,
    radiometer: &[RadiometerSample],
) -> SwesarrResult<SarRadiometerJoin> {
    if raster.x().is_empty() || raster.y().is_empty() {
        return Err(SwesarrError::EmptySet);
    }
    let n_bands = raster.bands().len();
    log::info!(
        "Joining {} radiometer samples with {} SAR bands",
        radiometer.len(),
        n_bands
    );

    let mut samples = Vec::with_capacity(radiometer.len());
    for sample in radiometer {
        let local = reproject(&sample.location(), &raster.crs())?;
        let pixel = nearest_axis_index(raster.y(), local.y)
            .zip(nearest_axis_index(raster.x(), local.x));

        let (sar_lat, sar_lon, distance_m, backscatter) = match pixel {
            Some((row, col)) => {
                let center = raster
                    .pixel_center(row, col)
                    .ok_or_else(|| SwesarrError::Processing("Pixel outside raster".to_string()))?;
                let geo = reproject(&center, &Crs::Geographic)?;
                let values = raster
                    .pixel_values(row, col)
                    .ok_or_else(|| SwesarrError::Processing("Pixel outside raster".to_string()))?;
                (
                    geo.lat(),
                    geo.lon(),
                    geodesic(sample.latitude, sample.longitude, geo.lat(), geo.lon()),
                    values.into_iter().map(f64::from).collect(),
                )
            }
            None => (f64::NAN, f64::NAN, f64::NAN, vec![f64::NAN; n_bands]),
        };

        samples.push(JoinedSample {
            utc: sample.utc,
            rad_lat: sample.latitude,
            rad_lon: sample.longitude,
            sar_lat,
            sar_lon,
            pixel,
            distance_m,
            backscatter,
            tb_x: sample.tb_x,
            tb_k: sample.tb_k,
            tb_ka: sample.tb_ka,
        });
    }

    Ok(SarRadiometerJoin {
        bands: raster.bands().to_vec(),
        samples,
    })
}
