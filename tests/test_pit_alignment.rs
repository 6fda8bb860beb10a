use ndarray::{Array3, Axis};
use swesarr::core::projection::Utm;
use swesarr::core::snowpit::{aggregate_pits, filter_pits_to_sar};
use swesarr::io::tables::{read_pit_layers, read_radiometer, write_radiometer_matches};
use swesarr::plot::{radiometer_swe_series, sar_swe_series};
use swesarr::types::{BandLabel, GeoTransform};
use swesarr::{filter_radiometer_points, Footprints, OutputConfig, SarRaster};
use tempfile::TempDir;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Flight line over three pits: one right under the aircraft, one 45 m off
/// (outside the 37 GHz footprint only), one well outside every footprint.
fn fixture() -> (String, String, Utm) {
    let utm = Utm::from_epsg(32612).unwrap();
    let (e_a, n_a) = utm.forward(39.0300, -108.2000);
    let (e_b, n_b) = utm.forward(39.0400, -108.2000);

    let radiometer = "UTC,Latitude (deg),Longitude (deg),TB X (K),TB K (K),TB Ka (K)\n\
         20200211-18:47:00.000,39.0300,-108.2000,250.0,240.0,230.0\n\
         20200211-18:47:05.500,39.0350,-108.2000,255.0,245.0,235.0\n\
         20200211-18:47:11.000,39.0400,-108.2000,260.0,250.0,240.0\n"
        .to_string();

    let pits = format!(
        "site_id,date,depth,bottom_depth,value,easting,northing\n\
         1N6,2020-02-11,100,50,200,{ea},{na}\n\
         1N6,2020-02-11,50,0,300,{ea},{na}\n\
         2S3,2020-02-11,80,0,250,{eb},{nb}\n\
         9C9,2020-02-11,80,0,250,{ec},{nc}\n",
        ea = e_a,
        na = n_a,
        eb = e_b + 45.0,
        nb = n_b,
        ec = e_b + 5000.0,
        nc = n_b,
    );

    (radiometer, pits, utm)
}

#[test]
fn test_radiometer_to_pits_end_to_end() {
    init_logging();
    let (radiometer_csv, pits_csv, _) = fixture();

    let radiometer = read_radiometer(radiometer_csv.as_bytes()).unwrap();
    let layers = read_pit_layers(pits_csv.as_bytes(), 32612).unwrap();
    let pits = aggregate_pits(&layers);
    assert_eq!(pits.len(), 3);
    assert_eq!(pits[0].swe, 100.0 + 150.0);

    let matches = filter_radiometer_points(&Footprints::default(), &radiometer, &pits).unwrap();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].pit.site_id, "1N6");
    assert_eq!(matches[0].radiometer_index, 0);
    assert_eq!(matches[0].tb_x, 250.0);
    assert_eq!(matches[1].pit.site_id, "2S3");
    assert_eq!(matches[1].radiometer_index, 2);
    assert_eq!(matches[1].tb_k, 250.0);
    assert!(matches[1].tb_ka.is_nan());

    let chart = radiometer_swe_series(&matches);
    assert_eq!(chart.sites, vec!["2S3", "1N6"]);
    assert_eq!(chart.measurements[0].values, vec![260.0, 250.0]);

    let temp = TempDir::new().unwrap();
    let output = OutputConfig::new(temp.path().join("out"));
    output.prepare().unwrap();
    let path = output.path_for("radiometer_pits.csv");
    write_radiometer_matches(std::fs::File::create(&path).unwrap(), &matches).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    let mut lines = written.lines();
    assert_eq!(
        lines.next().unwrap(),
        "site_id,date,swe,easting,northing,distance_m,TB_X,TB_K,TB_Ka"
    );
    assert!(lines.next().unwrap().starts_with("1N6,2020-02-11,250.0,"));
    assert!(lines.next().unwrap().ends_with(",260.0,250.0,NaN"));
    assert!(lines.next().is_none());
}

#[test]
fn test_pit_swe_ignores_empty_density() {
    init_logging();
    let csv = "site_id,date,depth,bottom_depth,value,easting,northing\n\
         2N13,2020-02-11,100,90,250,743000.0,4324000.0\n\
         2N13,2020-02-11,90,80,,743000.0,4324000.0\n";

    let layers = read_pit_layers(csv.as_bytes(), 32612).unwrap();
    assert!(layers[1].density.is_nan());
    let pits = aggregate_pits(&layers);
    assert_eq!(pits.len(), 1);
    assert_eq!(pits[0].swe, 25.0);
}

#[test]
fn test_pits_to_sar_box_means() {
    init_logging();
    let (_, pits_csv, utm) = fixture();
    let layers = read_pit_layers(pits_csv.as_bytes(), 32612).unwrap();

    // 5 m grid covering both near pits, -12 dB VV and -18 dB VH everywhere
    let (e0, n0) = utm.forward(39.0410, -108.2010);
    let (e1, n1) = utm.forward(39.0290, -108.1990);
    let cols = ((e1 - e0) / 5.0).ceil() as usize + 20;
    let rows = ((n0 - n1) / 5.0).ceil() as usize;
    let mut data = Array3::<f32>::zeros((2, rows, cols));
    data.index_axis_mut(Axis(0), 0).fill(-12.0);
    data.index_axis_mut(Axis(0), 1).fill(-18.0);
    let gt = GeoTransform::from_gdal([e0.floor(), 5.0, 0.0, n0.ceil(), 0.0, -5.0]);
    let bands = vec![BandLabel::new("13VV"), BandLabel::new("13VH")];
    let raster = SarRaster::from_geotransform(data, &gt, bands.clone(), utm.crs()).unwrap();

    let matched = filter_pits_to_sar(&layers, &raster, 20.0).unwrap();
    let sites: Vec<&str> = matched.pits.iter().map(|p| p.site_id.as_str()).collect();
    assert_eq!(sites, vec!["1N6", "2S3"]);
    assert_eq!(matched.backscatter.dim(), (2, 2));
    for v in matched.backscatter.row(0) {
        assert!((v + 12.0).abs() < 1e-4);
    }

    let chart = sar_swe_series(&matched.pits, &matched.backscatter, &bands).unwrap();
    assert_eq!(chart.measurements.len(), 1);
    assert_eq!(chart.measurements[0].label, "13VV");
    assert_eq!(chart.sites, vec!["2S3", "1N6"]);
}
