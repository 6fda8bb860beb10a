use crate::core::backscatter::mean_db;
use crate::core::threshold::{all_finite_columns, apply_column_mask, apply_mask};
use crate::io::raster::SarRaster;
use crate::types::{Crs, Point, SwesarrError, SwesarrResult};
use chrono::NaiveDate;
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// One density layer of a snow pit profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitLayer {
    pub site_id: String,
    pub date: NaiveDate,
    /// Top of the layer (cm)
    pub depth: f64,
    /// Bottom of the layer (cm)
    pub bottom_depth: f64,
    /// Layer density (kg/m^3)
    pub density: f64,
    pub location: Point,
}

impl PitLayer {
    /// Snow water equivalent of the layer (mm)
    pub fn swe(&self) -> f64 {
        self.density * (self.depth - self.bottom_depth) / 100.0
    }
}

/// Total SWE of one pit on one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitSwe {
    pub site_id: String,
    pub date: NaiveDate,
    pub swe: f64,
    pub location: Point,
}

/// Pits that overlap the SAR raster and their band-mean backscatter
#[derive(Debug, Clone)]
pub struct PitSarMatch {
    pub pits: Vec<PitSwe>,
    /// Mean backscatter (dB), shape (bands, pits); column `i` belongs to `pits[i]`
    pub backscatter: Array2<f64>,
}

/// Sum layer SWE per (site, date).
///
/// Groups keep the order in which sites first appear, then the order in
/// which their dates first appear. The first layer of a group supplies its
/// location. Site ids made of more than one word are skipped. Layers with a
/// NaN SWE are left out of the sum, so a pit with no density at all has
/// zero SWE.
pub fn aggregate_pits(layers: &[PitLayer]) -> Vec<PitSwe> {
    let mut sites: Vec<&str> = Vec::new();
    for layer in layers {
        if !sites.contains(&layer.site_id.as_str()) {
            sites.push(&layer.site_id);
        }
    }

    let mut pits = Vec::new();
    for site in sites {
        if site.split_whitespace().count() != 1 {
            log::debug!("Skipping multi-word site id '{}'", site);
            continue;
        }
        let site_layers: Vec<&PitLayer> = layers.iter().filter(|l| l.site_id == site).collect();

        let mut dates: Vec<NaiveDate> = Vec::new();
        for layer in &site_layers {
            if !dates.contains(&layer.date) {
                dates.push(layer.date);
            }
        }

        for date in dates {
            let profile: Vec<&&PitLayer> = site_layers.iter().filter(|l| l.date == date).collect();
            // layers without a density do not count
            let swe: f64 = profile.iter().map(|l| l.swe()).filter(|v| !v.is_nan()).sum();
            pits.push(PitSwe {
                site_id: site.to_string(),
                date,
                swe,
                location: profile[0].location,
            });
        }
    }

    log::info!("Aggregated {} layers into {} pit profiles", layers.len(), pits.len());
    pits
}

/// Average SAR backscatter in a `box_size` square around every pit.
///
/// Means are taken in linear power per band. Pits whose box misses the
/// raster, or that get a NaN mean in any band, are dropped together with
/// their column.
pub fn filter_pits_to_sar(
    layers: &[PitLayer],
    raster: &SarRaster,
    box_size: f64,
) -> SwesarrResult<PitSarMatch> {
    let pits = aggregate_pits(layers);
    mean_backscatter_at_pits(pits, raster, box_size)
}

/// Box averaging on already aggregated pits
pub fn mean_backscatter_at_pits(
    pits: Vec<PitSwe>,
    raster: &SarRaster,
    box_size: f64,
) -> SwesarrResult<PitSarMatch> {
    let crs = raster.crs();
    if let Some(bad) = pits.iter().find(|p| p.location.crs != crs) {
        return Err(SwesarrError::CrsMismatch {
            expected: crs,
            actual: bad.location.crs,
        });
    }
    if let Crs::Geographic = crs {
        log::warn!("Box size {} applied in degrees on a geographic raster", box_size);
    }

    let half = box_size / 2.0;
    let n_bands = raster.dim().0;
    let mut means = Array2::<f64>::from_elem((n_bands, pits.len()), f64::NAN);

    for (i, pit) in pits.iter().enumerate() {
        let (x, y) = (pit.location.x, pit.location.y);
        let window = raster.window(x - half, x + half, y - half, y + half);
        if window.is_empty() {
            continue;
        }
        for (band, sub) in window.axis_iter(Axis(0)).enumerate() {
            let values: Vec<f64> = sub.iter().map(|&v| v as f64).collect();
            means[[band, i]] = mean_db(&values);
        }
    }

    let mask = all_finite_columns(&means);
    let kept = mask.iter().filter(|&&k| k).count();
    if kept < pits.len() {
        log::warn!("Dropping {} of {} pits without valid backscatter", pits.len() - kept, pits.len());
    }

    let backscatter = apply_column_mask(&means, &mask)?;
    let pits = apply_mask(&pits, &mask)?;

    Ok(PitSarMatch { pits, backscatter })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BandLabel, GeoTransform};
    use approx::assert_relative_eq;
    use ndarray::Array3;

    const UTM12N: u32 = 32612;

    fn layer(site: &str, date: &str, depth: f64, bottom: f64, density: f64, x: f64, y: f64) -> PitLayer {
        PitLayer {
            site_id: site.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            depth,
            bottom_depth: bottom,
            density,
            location: Point::projected(x, y, UTM12N),
        }
    }

    #[test]
    fn test_layer_swe() {
        let l = layer("2N13", "2020-02-11", 100.0, 90.0, 250.0, 0.0, 0.0);
        assert_relative_eq!(l.swe(), 25.0);
    }

    #[test]
    fn test_aggregate_by_site_and_date() {
        let layers = vec![
            layer("2N13", "2020-02-11", 100.0, 90.0, 200.0, 1.0, 2.0),
            layer("5S21", "2020-02-11", 50.0, 40.0, 300.0, 5.0, 6.0),
            layer("2N13", "2020-02-11", 90.0, 80.0, 300.0, 9.0, 9.0),
            layer("2N13", "2020-02-12", 90.0, 80.0, 100.0, 1.0, 2.0),
            layer("Open Flat", "2020-02-11", 90.0, 80.0, 100.0, 1.0, 2.0),
        ];
        let pits = aggregate_pits(&layers);
        assert_eq!(pits.len(), 3);
        assert_eq!(pits[0].site_id, "2N13");
        assert_relative_eq!(pits[0].swe, 50.0);
        assert_eq!((pits[0].location.x, pits[0].location.y), (1.0, 2.0));
        assert_eq!(pits[1].site_id, "2N13");
        assert_relative_eq!(pits[1].swe, 10.0);
        assert_eq!(pits[2].site_id, "5S21");
    }

    #[test]
    fn test_aggregate_skips_missing_density() {
        let layers = vec![
            layer("2N13", "2020-02-11", 100.0, 90.0, 250.0, 1.0, 2.0),
            layer("2N13", "2020-02-11", 90.0, 80.0, f64::NAN, 1.0, 2.0),
            layer("5S21", "2020-02-11", 50.0, 40.0, f64::NAN, 5.0, 6.0),
        ];
        let pits = aggregate_pits(&layers);
        assert_eq!(pits.len(), 2);
        assert_relative_eq!(pits[0].swe, 25.0);
        assert_eq!(pits[1].swe, 0.0);
    }

    #[test]
    fn test_filter_pits_to_sar() {
        // 1 m grid, 10x10, two bands with constant -10 dB and -20 dB
        let mut data = Array3::<f32>::zeros((2, 10, 10));
        data.index_axis_mut(Axis(0), 0).fill(-10.0);
        data.index_axis_mut(Axis(0), 1).fill(-20.0);
        let gt = GeoTransform::from_gdal([0.0, 1.0, 0.0, 10.0, 0.0, -1.0]);
        let raster = SarRaster::from_geotransform(
            data,
            &gt,
            vec![BandLabel::new("09VV"), BandLabel::new("09VH")],
            Crs::Projected { epsg: UTM12N },
        )
        .unwrap();

        let layers = vec![
            layer("1N1", "2020-02-11", 10.0, 0.0, 200.0, 5.0, 5.0),
            layer("9X9", "2020-02-11", 10.0, 0.0, 300.0, 500.0, 500.0),
            layer("2N2", "2020-02-11", 10.0, 0.0, 400.0, 2.0, 8.0),
        ];

        let matched = filter_pits_to_sar(&layers, &raster, 3.0).unwrap();
        assert_eq!(matched.pits.len(), 2);
        assert_eq!(matched.pits[0].site_id, "1N1");
        assert_eq!(matched.pits[1].site_id, "2N2");
        assert_eq!(matched.backscatter.dim(), (2, 2));
        assert_relative_eq!(matched.backscatter[[0, 1]], -10.0, epsilon = 1e-5);
        assert_relative_eq!(matched.backscatter[[1, 0]], -20.0, epsilon = 1e-5);
    }

    #[test]
    fn test_crs_mismatch() {
        let data = Array3::<f32>::zeros((1, 2, 2));
        let gt = GeoTransform::from_gdal([0.0, 1.0, 0.0, 2.0, 0.0, -1.0]);
        let raster = SarRaster::from_geotransform(
            data,
            &gt,
            vec![BandLabel::new("09VV")],
            Crs::Projected { epsg: 32613 },
        )
        .unwrap();
        let layers = vec![layer("1N1", "2020-02-11", 10.0, 0.0, 200.0, 1.0, 1.0)];
        let err = filter_pits_to_sar(&layers, &raster, 2.0);
        assert!(matches!(err, Err(SwesarrError::CrsMismatch { .. })));
    }
}
