//! Plot-ready series for the tutorial figures.
//!
//! Rendering is left to whatever plotting front end consumes these
//! structures; this module only orders, labels and masks the data.

use crate::core::projection::Utm;
use crate::core::radiometer::{Footprints, RadiometerBand, RadiometerPitMatch, RadiometerSample};
use crate::core::snowpit::PitSwe;
use crate::core::threshold::check_len;
use crate::types::{BandLabel, SwesarrError, SwesarrResult};
use ndarray::Array2;

/// Okabe-Ito colorblind-safe palette
pub const OKABE_ITO: [&str; 8] = [
    "#000000", "#E69F00", "#56B4E9", "#009E73", "#F0E442", "#0072B2", "#D55E00", "#CC79A7",
];

/// Backscatter outside this open interval (dB) is hidden in SWE plots
pub const BACKSCATTER_PLOT_RANGE: (f64, f64) = (-20.0, 0.0);

/// One line/marker series against the site axis
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub color: &'static str,
    pub values: Vec<f64>,
}

/// SWE per site on the left axis, measurements on the right axis
#[derive(Debug, Clone, PartialEq)]
pub struct SweChart {
    /// Site ids, sorted by increasing SWE
    pub sites: Vec<String>,
    pub swe: Series,
    pub measurements: Vec<Series>,
    pub x_label: &'static str,
    pub left_label: &'static str,
    pub right_label: &'static str,
}

/// Indices that sort `values` ascending (stable, NaN last)
pub fn argsort(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    order
}

fn swe_series(pits: &[&PitSwe], order: &[usize]) -> (Vec<String>, Series) {
    let sites = order.iter().map(|&i| pits[i].site_id.clone()).collect();
    let swe = Series {
        label: "SWE".to_string(),
        color: OKABE_ITO[OKABE_ITO.len() - 1],
        values: order.iter().map(|&i| pits[i].swe).collect(),
    };
    (sites, swe)
}

/// SWE and co-polarized backscatter per snow pit.
///
/// `backscatter` has one row per entry of `bands` and one column per pit.
pub fn sar_swe_series(
    pits: &[PitSwe],
    backscatter: &Array2<f64>,
    bands: &[BandLabel],
) -> SwesarrResult<SweChart> {
    check_len("backscatter columns", pits.len(), backscatter.ncols())?;
    check_len("backscatter rows", bands.len(), backscatter.nrows())?;

    let pit_refs: Vec<&PitSwe> = pits.iter().collect();
    let swe: Vec<f64> = pits.iter().map(|p| p.swe).collect();
    let order = argsort(&swe);
    let (sites, swe) = swe_series(&pit_refs, &order);

    let (lo, hi) = BACKSCATTER_PLOT_RANGE;
    let measurements = bands
        .iter()
        .enumerate()
        .filter(|(_, band)| band.is_copol())
        .zip(OKABE_ITO.iter())
        .map(|((row, band), &color)| Series {
            label: band.to_string(),
            color,
            values: order
                .iter()
                .map(|&col| {
                    let v = backscatter[[row, col]];
                    if v > lo && v < hi {
                        v
                    } else {
                        f64::NAN
                    }
                })
                .collect(),
        })
        .collect();

    Ok(SweChart {
        sites,
        swe,
        measurements,
        x_label: "SnowEx20 Pit ID",
        left_label: "SWE [mm]",
        right_label: "Backscatter [dB]",
    })
}

/// SWE and brightness temperatures per snow pit
pub fn radiometer_swe_series(matches: &[RadiometerPitMatch]) -> SweChart {
    let pit_refs: Vec<&PitSwe> = matches.iter().map(|m| &m.pit).collect();
    let swe: Vec<f64> = pit_refs.iter().map(|p| p.swe).collect();
    let order = argsort(&swe);
    let (sites, swe) = swe_series(&pit_refs, &order);

    let measurements = RadiometerBand::ALL
        .iter()
        .zip(OKABE_ITO.iter())
        .map(|(band, &color)| Series {
            label: band.legend().to_string(),
            color,
            values: order.iter().map(|&i| matches[i].tb(*band)).collect(),
        })
        .collect();

    SweChart {
        sites,
        swe,
        measurements,
        x_label: "SnowEx20 Pit ID",
        left_label: "SWE [mm]",
        right_label: "Brightness Temperature [K]",
    }
}

/// Closed polygon (first vertex repeated) in UTM coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct FootprintPolygon {
    pub band: RadiometerBand,
    pub color: &'static str,
    pub x: [f64; 5],
    pub y: [f64; 5],
}

/// Rough area swept by each radiometer footprint along the flight line.
///
/// The line runs from the earliest to the latest sample; each band gets a
/// quadrilateral padded by its footprint radius.
pub fn footprint_polygons(
    radiometer: &[RadiometerSample],
    footprints: &Footprints,
    utm: &Utm,
) -> SwesarrResult<Vec<FootprintPolygon>> {
    let first = radiometer
        .iter()
        .min_by_key(|s| s.utc)
        .ok_or(SwesarrError::EmptySet)?;
    // first in input order among the latest timestamps
    let last = radiometer
        .iter()
        .rev()
        .max_by_key(|s| s.utc)
        .ok_or(SwesarrError::EmptySet)?;

    let (e0, n0) = utm.forward(first.latitude, first.longitude);
    let (e1, n1) = utm.forward(last.latitude, last.longitude);
    log::debug!("Flight line ({:.1}, {:.1}) -> ({:.1}, {:.1})", e0, n0, e1, n1);

    let colors = ["blue", "orange", "purple"];
    Ok(RadiometerBand::ALL
        .iter()
        .zip(colors)
        .map(|(&band, color)| {
            let a = footprints.radius(band);
            FootprintPolygon {
                band,
                color,
                x: [e0 - a, e1 - a, e1 + a, e0 + a, e0 - a],
                y: [n0 + a, n1 - a, n1 - a, n0 + a, n0 + a],
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;
    use chrono::{NaiveDate, TimeZone, Utc};
    use ndarray::array;

    fn pit(site: &str, swe: f64) -> PitSwe {
        PitSwe {
            site_id: site.to_string(),
            date: NaiveDate::from_ymd_opt(2020, 2, 11).unwrap(),
            swe,
            location: Point::projected(0.0, 0.0, 32612),
        }
    }

    #[test]
    fn test_argsort() {
        assert_eq!(argsort(&[3.0, f64::NAN, 1.0, 2.0]), vec![2, 3, 0, 1]);
    }

    #[test]
    fn test_sar_swe_series() {
        let pits = vec![pit("B", 300.0), pit("A", 100.0)];
        let bands = vec![BandLabel::new("09VV"), BandLabel::new("09VH"), BandLabel::new("13VV")];
        let backscatter = array![[-5.0, -25.0], [-15.0, -16.0], [1.0, -8.0]];

        let chart = sar_swe_series(&pits, &backscatter, &bands).unwrap();
        assert_eq!(chart.sites, vec!["A", "B"]);
        assert_eq!(chart.swe.values, vec![100.0, 300.0]);
        assert_eq!(chart.measurements.len(), 2);
        assert_eq!(chart.measurements[0].label, "09VV");
        assert!(chart.measurements[0].values[0].is_nan());
        assert_eq!(chart.measurements[0].values[1], -5.0);
        assert_eq!(chart.measurements[1].label, "13VV");
        assert_eq!(chart.measurements[1].values[0], -8.0);
        assert!(chart.measurements[1].values[1].is_nan());

        let bad = sar_swe_series(&pits, &backscatter, &bands[..2]);
        assert!(matches!(bad, Err(SwesarrError::LengthMismatch { .. })));
    }

    #[test]
    fn test_footprint_polygons() {
        let utm = Utm::from_epsg(32612).unwrap();
        let t0 = Utc.with_ymd_and_hms(2020, 2, 11, 18, 0, 0).unwrap();
        let sample = |secs: i64, lat: f64| RadiometerSample {
            utc: t0 + chrono::Duration::seconds(secs),
            latitude: lat,
            longitude: -108.2,
            tb_x: 250.0,
            tb_k: 240.0,
            tb_ka: 230.0,
        };
        let radiometer = vec![sample(10, 39.05), sample(0, 39.03), sample(20, 39.07)];
        let polys = footprint_polygons(&radiometer, &Footprints::default(), &utm).unwrap();
        assert_eq!(polys.len(), 3);

        let (e0, n0) = utm.forward(39.03, -108.2);
        let x10 = &polys[0];
        assert_eq!(x10.band, RadiometerBand::X);
        assert_eq!(x10.x[0], e0 - 60.0);
        assert_eq!(x10.y[0], n0 + 60.0);
        assert_eq!(x10.x[4], x10.x[0]);
        assert_eq!(x10.y[4], x10.y[0]);

        assert!(matches!(
            footprint_polygons(&[], &Footprints::default(), &utm),
            Err(SwesarrError::EmptySet)
        ));
    }

    #[test]
    fn test_footprint_polygons_first_of_tied_samples() {
        let utm = Utm::from_epsg(32612).unwrap();
        let t0 = Utc.with_ymd_and_hms(2020, 2, 11, 18, 0, 0).unwrap();
        let sample = |secs: i64, lat: f64| RadiometerSample {
            utc: t0 + chrono::Duration::seconds(secs),
            latitude: lat,
            longitude: -108.2,
            tb_x: 250.0,
            tb_k: 240.0,
            tb_ka: 230.0,
        };
        let radiometer = vec![
            sample(0, 39.03),
            sample(0, 39.04),
            sample(20, 39.06),
            sample(20, 39.07),
        ];
        let polys = footprint_polygons(&radiometer, &Footprints::default(), &utm).unwrap();

        let (e0, n0) = utm.forward(39.03, -108.2);
        let (e1, n1) = utm.forward(39.06, -108.2);
        let x10 = &polys[0];
        assert_eq!((x10.x[0], x10.y[0]), (e0 - 60.0, n0 + 60.0));
        assert_eq!((x10.x[1], x10.y[1]), (e1 - 60.0, n1 - 60.0));
    }
}
