use crate::core::distance::DistanceMetric;
use crate::types::{MatchResult, Point, PointSet, SwesarrError, SwesarrResult};

/// Nearest reference point for a single query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    pub index: usize,
    pub distance: f64,
}

impl Nearest {
    /// Attach the threshold verdict; NaN distances are never valid
    pub fn into_match(self, max_distance: f64) -> MatchResult {
        MatchResult {
            index: self.index,
            distance: self.distance,
            valid: self.distance <= max_distance,
        }
    }
}

/// Nearest-neighbor lookup against a fixed reference set.
///
/// Implementations must return an index inside the reference set and break
/// ties on the lowest index.
pub trait NearestMatch: Sync {
    fn nearest(&self, query: &Point) -> SwesarrResult<Nearest>;

    /// Number of reference points
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Brute-force search over every reference point
pub struct LinearScan<'a> {
    reference: &'a PointSet,
    metric: DistanceMetric,
}

impl<'a> LinearScan<'a> {
    /// Scan with the metric implied by the reference coordinate system
    pub fn new(reference: &'a PointSet) -> Self {
        Self {
            reference,
            metric: DistanceMetric::for_crs(&reference.crs()),
        }
    }

    pub fn with_metric(reference: &'a PointSet, metric: DistanceMetric) -> Self {
        Self { reference, metric }
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }
}

impl NearestMatch for LinearScan<'_> {
    fn nearest(&self, query: &Point) -> SwesarrResult<Nearest> {
        if self.reference.is_empty() {
            return Err(SwesarrError::EmptySet);
        }
        if query.crs != self.reference.crs() {
            return Err(SwesarrError::CrsMismatch {
                expected: self.reference.crs(),
                actual: query.crs,
            });
        }

        let mut best = Nearest {
            index: 0,
            distance: f64::NAN,
        };
        for (index, candidate) in self.reference.iter().enumerate() {
            let distance = self.metric.distance(query, candidate);
            // strict comparison keeps the first minimum; NaN never wins
            if distance < best.distance || (best.distance.is_nan() && !distance.is_nan()) {
                best = Nearest { index, distance };
            }
        }

        Ok(best)
    }

    fn len(&self) -> usize {
        self.reference.len()
    }
}

/// Match every query point and flag results within `max_distance`.
///
/// Output order follows `queries`.
pub fn match_all<S: NearestMatch + ?Sized>(
    search: &S,
    queries: &PointSet,
    max_distance: f64,
) -> SwesarrResult<Vec<MatchResult>> {
    log::debug!(
        "Matching {} query points against {} reference points (max distance {})",
        queries.len(),
        search.len(),
        max_distance
    );

    #[cfg(feature = "parallel")]
    let results = {
        use rayon::prelude::*;
        queries
            .points()
            .par_iter()
            .map(|q| search.nearest(q).map(|n| n.into_match(max_distance)))
            .collect::<SwesarrResult<Vec<_>>>()?
    };

    #[cfg(not(feature = "parallel"))]
    let results = queries
        .iter()
        .map(|q| search.nearest(q).map(|n| n.into_match(max_distance)))
        .collect::<SwesarrResult<Vec<_>>>()?;

    let valid = results.iter().filter(|r| r.valid).count();
    log::info!("{} of {} query points matched within {}", valid, results.len(), max_distance);
    Ok(results)
}

/// Index of the axis coordinate closest to `target` (first on ties).
///
/// Returns `None` for an empty axis or when every difference is NaN.
pub fn nearest_axis_index(axis: &[f64], target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in axis.iter().enumerate() {
        let d = (v - target).abs();
        if d.is_nan() {
            continue;
        }
        match best {
            Some((_, bd)) if d >= bd => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Crs;

    const UTM12N: u32 = 32612;

    fn planar_set(coords: &[(f64, f64)]) -> PointSet {
        let points = coords
            .iter()
            .map(|&(x, y)| Point::projected(x, y, UTM12N))
            .collect();
        PointSet::new(Crs::Projected { epsg: UTM12N }, points).unwrap()
    }

    #[test]
    fn test_nearest_basic() {
        let reference = planar_set(&[(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)]);
        let search = LinearScan::new(&reference);
        let hit = search.nearest(&Point::projected(1.0, 0.0, UTM12N)).unwrap();
        assert_eq!(hit.index, 0);
        assert_eq!(hit.distance, 1.0);
    }

    #[test]
    fn test_tie_breaks_on_first_index() {
        let reference = planar_set(&[(5.0, 5.0), (-1.0, 0.0), (1.0, 0.0)]);
        let search = LinearScan::new(&reference);
        let hit = search.nearest(&Point::projected(0.0, 0.0, UTM12N)).unwrap();
        assert_eq!(hit.index, 1);
    }

    #[test]
    fn test_nan_reference_points_are_skipped() {
        let reference = planar_set(&[(f64::NAN, 0.0), (3.0, 4.0)]);
        let search = LinearScan::new(&reference);
        let hit = search.nearest(&Point::projected(0.0, 0.0, UTM12N)).unwrap();
        assert_eq!(hit.index, 1);
        assert_eq!(hit.distance, 5.0);
    }

    #[test]
    fn test_nan_query_returns_in_bounds_index() {
        let reference = planar_set(&[(0.0, 0.0), (1.0, 1.0)]);
        let search = LinearScan::new(&reference);
        let hit = search.nearest(&Point::projected(f64::NAN, 0.0, UTM12N)).unwrap();
        assert_eq!(hit.index, 0);
        assert!(hit.distance.is_nan());
        assert!(!hit.into_match(100.0).valid);
    }

    #[test]
    fn test_empty_reference_fails() {
        let reference = PointSet::empty(Crs::Projected { epsg: UTM12N });
        let search = LinearScan::new(&reference);
        assert!(search.is_empty());
        let err = search.nearest(&Point::projected(0.0, 0.0, UTM12N));
        assert!(matches!(err, Err(SwesarrError::EmptySet)));
    }

    #[test]
    fn test_crs_mismatch_is_rejected() {
        let reference = planar_set(&[(0.0, 0.0)]);
        let search = LinearScan::new(&reference);
        let err = search.nearest(&Point::geographic(39.0, -108.0));
        assert!(matches!(err, Err(SwesarrError::CrsMismatch { .. })));
    }

    #[test]
    fn test_match_all_preserves_order() {
        let reference = planar_set(&[(0.0, 0.0), (100.0, 0.0)]);
        let queries = planar_set(&[(99.0, 0.0), (2.0, 0.0), (50.0, 40.0)]);
        let results = match_all(&LinearScan::new(&reference), &queries, 5.0).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].index, 1);
        assert!(results[0].valid);
        assert_eq!(results[1].index, 0);
        assert!(results[1].valid);
        assert!(!results[2].valid);
    }

    #[test]
    fn test_nearest_axis_index() {
        let axis = [4330000.0, 4329998.0, 4329996.0];
        assert_eq!(nearest_axis_index(&axis, 4329997.2), Some(1));
        assert_eq!(nearest_axis_index(&axis, 4329996.4), Some(2));
        assert_eq!(nearest_axis_index(&axis, 4329999.0), Some(0));
        assert_eq!(nearest_axis_index(&[], 1.0), None);
        assert_eq!(nearest_axis_index(&axis, f64::NAN), None);
    }
}
