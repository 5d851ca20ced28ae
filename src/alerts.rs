pub const LOW_GRADE_THRESHOLD: f64 = 60.0;

/// Checked once for each newly recorded grade; edits and history are never re-checked.
pub fn is_low_grade(value: f64, threshold: f64) -> bool {
    value < threshold
}
