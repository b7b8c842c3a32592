//! Decimal formatting used for every number the encoder writes.

/// Format `value` with `precision` decimal places, then trim.
///
/// Rounding is standard fixed-point rounding of the exact binary value.
///
/// # Examples
/// ```
/// use vectext_data::format_decimal;
///
/// assert_eq!(format_decimal(5.0, 1), "5");
/// assert_eq!(format_decimal(1.2345, 3), "1.234");
/// assert_eq!(format_decimal(-7.25, 4), "-7.25");
/// assert_eq!(format_decimal(100.0, 0), "100");
/// ```
#[must_use]
pub fn format_decimal(value: f64, precision: usize) -> String {
    let mut text = format!("{value:.precision$}");
    trim_decimal(&mut text);
    text
}

/// Strip trailing zeros after a decimal point, then a bare trailing point.
///
/// Text without a decimal point is left untouched.
pub fn trim_decimal(text: &mut String) {
    if !text.contains('.') {
        return;
    }
    let kept = text.trim_end_matches('0').trim_end_matches('.').len();
    text.truncate(kept);
}
