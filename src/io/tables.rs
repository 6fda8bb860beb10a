//! Typed CSV tables: radiometer flight lines, snow pit layers and the
//! matched outputs.

use crate::core::radiometer::{RadiometerPitMatch, RadiometerSample, SarRadiometerJoin};
use crate::core::snowpit::PitLayer;
use crate::types::{Point, SwesarrError, SwesarrResult};
use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

/// Timestamp layout of the radiometer `UTC` column, e.g. `20200211-18:47:03.250`
pub const RADIOMETER_TIME_FORMAT: &str = "%Y%m%d-%H:%M:%S%.f";

#[derive(Debug, Deserialize)]
struct RadiometerRow {
    #[serde(rename = "UTC")]
    utc: String,
    #[serde(rename = "Latitude (deg)")]
    latitude: f64,
    #[serde(rename = "Longitude (deg)")]
    longitude: f64,
    #[serde(rename = "TB X (K)")]
    tb_x: Option<f64>,
    #[serde(rename = "TB K (K)")]
    tb_k: Option<f64>,
    #[serde(rename = "TB Ka (K)")]
    tb_ka: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PitLayerRow {
    site_id: String,
    date: NaiveDate,
    depth: f64,
    bottom_depth: f64,
    value: Option<f64>,
    easting: f64,
    northing: f64,
}

#[derive(Debug, Serialize)]
struct RadiometerPitRow<'a> {
    site_id: &'a str,
    date: NaiveDate,
    swe: f64,
    easting: f64,
    northing: f64,
    distance_m: f64,
    #[serde(rename = "TB_X")]
    tb_x: f64,
    #[serde(rename = "TB_K")]
    tb_k: f64,
    #[serde(rename = "TB_Ka")]
    tb_ka: f64,
}

/// Parse a radiometer `UTC` value
pub fn parse_radiometer_time(value: &str) -> SwesarrResult<chrono::DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(value.trim(), RADIOMETER_TIME_FORMAT)?;
    Ok(Utc.from_utc_datetime(&naive))
}

/// Read radiometer samples from CSV. Extra columns are ignored and empty
/// brightness temperatures become NaN.
pub fn read_radiometer<R: Read>(reader: R) -> SwesarrResult<Vec<RadiometerSample>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut samples = Vec::new();
    for row in csv_reader.deserialize::<RadiometerRow>() {
        let row = row?;
        samples.push(RadiometerSample {
            utc: parse_radiometer_time(&row.utc)?,
            latitude: row.latitude,
            longitude: row.longitude,
            tb_x: row.tb_x.unwrap_or(f64::NAN),
            tb_k: row.tb_k.unwrap_or(f64::NAN),
            tb_ka: row.tb_ka.unwrap_or(f64::NAN),
        });
    }
    log::info!("Read {} radiometer samples", samples.len());
    Ok(samples)
}

pub fn read_radiometer_file<P: AsRef<Path>>(path: P) -> SwesarrResult<Vec<RadiometerSample>> {
    log::info!("Reading radiometer table: {}", path.as_ref().display());
    read_radiometer(std::fs::File::open(path.as_ref())?)
}

/// Read snow pit density layers from CSV with coordinates in `epsg`.
///
/// Layers without a density value are kept with NaN density.
pub fn read_pit_layers<R: Read>(reader: R, epsg: u32) -> SwesarrResult<Vec<PitLayer>> {
    if epsg == crate::types::EPSG_WGS84 {
        return Err(SwesarrError::UnsupportedCrs(
            "Snow pit layers must use projected coordinates".to_string(),
        ));
    }
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut layers = Vec::new();
    for row in csv_reader.deserialize::<PitLayerRow>() {
        let row = row?;
        layers.push(PitLayer {
            site_id: row.site_id,
            date: row.date,
            depth: row.depth,
            bottom_depth: row.bottom_depth,
            density: row.value.unwrap_or(f64::NAN),
            location: Point::projected(row.easting, row.northing, epsg),
        });
    }
    log::info!("Read {} snow pit layers", layers.len());
    Ok(layers)
}

pub fn read_pit_layers_file<P: AsRef<Path>>(path: P, epsg: u32) -> SwesarrResult<Vec<PitLayer>> {
    log::info!("Reading snow pit layers: {}", path.as_ref().display());
    read_pit_layers(std::fs::File::open(path.as_ref())?, epsg)
}

/// Write pit/radiometer matches as CSV
pub fn write_radiometer_matches<W: Write>(
    writer: W,
    matches: &[RadiometerPitMatch],
) -> SwesarrResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for m in matches {
        csv_writer.serialize(RadiometerPitRow {
            site_id: &m.pit.site_id,
            date: m.pit.date,
            swe: m.pit.swe,
            easting: m.pit.location.x,
            northing: m.pit.location.y,
            distance_m: m.distance,
            tb_x: m.tb_x,
            tb_k: m.tb_k,
            tb_ka: m.tb_ka,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the wide SAR/radiometer table: time, SAR bands, brightness temperatures
pub fn write_joined_samples<W: Write>(writer: W, join: &SarRadiometerJoin) -> SwesarrResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec!["UTC".to_string()];
    header.extend(join.column_names());
    csv_writer.write_record(&header)?;

    for s in &join.samples {
        let mut record = Vec::with_capacity(header.len());
        record.push(s.utc.format(RADIOMETER_TIME_FORMAT).to_string());
        record.extend(s.backscatter.iter().map(|v| v.to_string()));
        record.extend([s.tb_x, s.tb_k, s.tb_ka].iter().map(|v| v.to_string()));
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}
