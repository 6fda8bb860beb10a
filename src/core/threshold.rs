use crate::types::{MatchResult, SwesarrError, SwesarrResult};
use ndarray::Array2;

/// Validity mask for match results: true where distance <= `max_distance`
pub fn threshold_mask(results: &[MatchResult], max_distance: f64) -> Vec<bool> {
    results.iter().map(|r| r.distance <= max_distance).collect()
}

/// Same as [`threshold_mask`] for bare distances. NaN is never valid.
pub fn distance_mask(distances: &[f64], max_distance: f64) -> Vec<bool> {
    distances.iter().map(|&d| d <= max_distance).collect()
}

/// True where the value is not NaN
pub fn finite_mask(values: &[f64]) -> Vec<bool> {
    values.iter().map(|v| !v.is_nan()).collect()
}

/// Column mask that is true only where every row of that column is not NaN
pub fn all_finite_columns(matrix: &Array2<f64>) -> Vec<bool> {
    matrix
        .columns()
        .into_iter()
        .map(|col| col.iter().all(|v| !v.is_nan()))
        .collect()
}

/// Keep the items whose mask entry is true.
///
/// Every parallel per-point array must go through this with the same mask so
/// that index correspondence survives filtering.
pub fn apply_mask<T: Clone>(items: &[T], mask: &[bool]) -> SwesarrResult<Vec<T>> {
    check_len("mask", items.len(), mask.len())?;
    Ok(items
        .iter()
        .zip(mask)
        .filter(|(_, &keep)| keep)
        .map(|(item, _)| item.clone())
        .collect())
}

/// Keep the matrix columns whose mask entry is true
pub fn apply_column_mask(matrix: &Array2<f64>, mask: &[bool]) -> SwesarrResult<Array2<f64>> {
    check_len("column mask", matrix.ncols(), mask.len())?;
    let keep: Vec<usize> = mask
        .iter()
        .enumerate()
        .filter(|(_, &k)| k)
        .map(|(i, _)| i)
        .collect();
    Ok(matrix.select(ndarray::Axis(1), &keep))
}

pub(crate) fn check_len(what: &str, expected: usize, actual: usize) -> SwesarrResult<()> {
    if expected != actual {
        return Err(SwesarrError::LengthMismatch {
            what: what.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}
