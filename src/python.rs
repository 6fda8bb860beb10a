//! Python module definition

use crate::core::nearest::{LinearScan, NearestMatch};
use crate::core::threshold::distance_mask;
use crate::nn::activation::{activate, Activation};
use crate::types::{Crs, Point, PointSet};
use numpy::{IntoPyArray, PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;

fn to_py_err(e: crate::types::SwesarrError) -> PyErr {
    match e {
        crate::types::SwesarrError::EmptySet | crate::types::SwesarrError::LengthMismatch { .. } => {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("{}", e))
        }
        _ => PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}", e)),
    }
}

fn parse_crs(epsg: Option<u32>) -> Crs {
    epsg.map(Crs::from_epsg).unwrap_or(Crs::Geographic)
}

/// Nearest reference point for each query point.
///
/// Returns (indices, distances). Without `epsg` the coordinates are
/// longitude/latitude and distances are geodesic meters.
#[pyfunction]
#[pyo3(signature = (query_x, query_y, ref_x, ref_y, epsg = None))]
fn nearest_match<'py>(
    py: Python<'py>,
    query_x: PyReadonlyArray1<f64>,
    query_y: PyReadonlyArray1<f64>,
    ref_x: PyReadonlyArray1<f64>,
    ref_y: PyReadonlyArray1<f64>,
    epsg: Option<u32>,
) -> PyResult<(&'py PyArray1<i64>, &'py PyArray1<f64>)> {
    let crs = parse_crs(epsg);
    let reference = PointSet::from_xy(crs, ref_x.as_slice()?, ref_y.as_slice()?).map_err(to_py_err)?;
    let queries = PointSet::from_xy(crs, query_x.as_slice()?, query_y.as_slice()?).map_err(to_py_err)?;

    let search = LinearScan::new(&reference);
    let mut indices = Vec::with_capacity(queries.len());
    let mut distances = Vec::with_capacity(queries.len());
    for q in queries.iter() {
        let hit = search.nearest(q).map_err(to_py_err)?;
        indices.push(hit.index as i64);
        distances.push(hit.distance);
    }

    Ok((indices.into_pyarray(py), distances.into_pyarray(py)))
}

/// Boolean mask of distances within `max_distance` (NaN is False)
#[pyfunction]
fn threshold_mask<'py>(
    py: Python<'py>,
    distances: PyReadonlyArray1<f64>,
    max_distance: f64,
) -> PyResult<&'py PyArray1<bool>> {
    Ok(distance_mask(distances.as_slice()?, max_distance).into_pyarray(py))
}

#[pyfunction]
#[pyo3(name = "Sigmoid")]
fn py_sigmoid<'py>(py: Python<'py>, z: PyReadonlyArray1<f64>) -> &'py PyArray1<f64> {
    activate(&z.as_array().to_owned(), Activation::Sigmoid).into_pyarray(py)
}

#[pyfunction]
#[pyo3(name = "Tanh")]
fn py_tanh<'py>(py: Python<'py>, z: PyReadonlyArray1<f64>) -> &'py PyArray1<f64> {
    activate(&z.as_array().to_owned(), Activation::Tanh).into_pyarray(py)
}

#[pyfunction]
#[pyo3(name = "ReLu")]
fn py_relu<'py>(py: Python<'py>, z: PyReadonlyArray1<f64>) -> &'py PyArray1<f64> {
    activate(&z.as_array().to_owned(), Activation::Relu).into_pyarray(py)
}

/// Geodesic distance in meters between two latitude/longitude pairs
#[pyfunction]
fn geodesic_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    crate::core::distance::DistanceMetric::Geodesic
        .distance(&Point::geographic(lat1, lon1), &Point::geographic(lat2, lon2))
}

#[pymodule]
fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(nearest_match, m)?)?;
    m.add_function(wrap_pyfunction!(threshold_mask, m)?)?;
    m.add_function(wrap_pyfunction!(geodesic_distance, m)?)?;
    m.add_function(wrap_pyfunction!(py_sigmoid, m)?)?;
    m.add_function(wrap_pyfunction!(py_tanh, m)?)?;
    m.add_function(wrap_pyfunction!(py_relu, m)?)?;
    Ok(())
}
