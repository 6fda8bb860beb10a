//! Backscatter unit conversions

/// Decibels to linear power
pub fn to_linear(db: f64) -> f64 {
    10f64.powf(db / 10.0)
}

/// Linear power to decibels
pub fn to_db(linear: f64) -> f64 {
    10.0 * linear.log10()
}

/// Mean of dB values taken in linear power and reported back in dB.
///
/// NaN samples are included (and therefore poison the mean). An empty input
/// yields NaN.
pub fn mean_db<'a, I>(values: I) -> f64
where
    I: IntoIterator<Item = &'a f64>,
{
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += to_linear(*v);
        count += 1;
    }
    if count == 0 {
        return f64::NAN;
    }
    to_db(sum / count as f64)
}
