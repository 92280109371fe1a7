/// Round to the nearest integer, halves toward positive infinity.
///
/// `-2.5` rounds to `-2`, `2.5` rounds to `3`. All scores and deltas in the
/// insight map go through this so negative mood swings round consistently.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Clamp a raw score into the 0-100 display range.
pub fn clamp_score(value: f64) -> u8 {
    round_half_up(value.clamp(0.0, 100.0)) as u8
}
