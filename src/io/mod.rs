//! I/O modules for SAR rasters, tabular measurements and output locations

pub mod raster;
pub mod tables;
pub mod output;

pub use raster::{parse_band_label, SarRaster};
pub use tables::{read_pit_layers_file, read_radiometer_file};
pub use output::OutputConfig;

#[cfg(feature = "gdal")]
pub use raster::gdal_io::{join_files, read_raster_corners};
