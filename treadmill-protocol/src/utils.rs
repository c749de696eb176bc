/// Converts a one-decimal quantity (temperature, pressure) to its tenths
/// representation, truncating toward zero.
///
/// The result is not range checked: it can be negative or exceed `u16::MAX`.
pub fn to_tenths(value: f64) -> i64 {
    (value * 10.0).trunc() as i64
}

pub fn from_tenths(raw: u16) -> f64 {
    f64::from(raw) / 10.0
}
