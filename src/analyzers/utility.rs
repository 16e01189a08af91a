/// Divides `numerator` by `denominator` and rounds half up. Returns 0 when
/// the denominator is zero.
pub fn round_ratio(numerator: usize, denominator: usize) -> usize {
    if denominator == 0 {
        return 0;
    }
    (2 * numerator + denominator) / (2 * denominator)
}

/// Whole-number percentage of `part` in `total`, rounded half up. 0 when
/// `total` is zero.
pub fn pct(part: usize, total: usize) -> usize {
    round_ratio(part * 100, total)
}
