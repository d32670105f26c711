use std::cmp::Ordering;

/// Rounds a value to the given number of decimal places, half away from zero.
///
/// All rates and judgments leave the crate rounded through this, so reported
/// numbers are stable across runs and platforms.
pub fn round(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}

/// Allows to compare, if possible, two f64 values.
///
/// NaN values are treated as the smallest possible value.
pub(crate) fn nan_safe_f64_cmp(a: &f64, b: &f64) -> Ordering {
    a.partial_cmp(b).unwrap_or_else(|| {
        // if `partial_cmp` returns None we have at least one NaN
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => unreachable!("partial_cmp returned None without a NaN"),
        }
    })
}

/// `nan_safe_f64_cmp` but in descending order.
pub(crate) fn nan_safe_f64_cmp_desc(a: &f64, b: &f64) -> Ordering {
    nan_safe_f64_cmp(b, a)
}
