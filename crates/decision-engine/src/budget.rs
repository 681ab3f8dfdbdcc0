//! Budget delta computation in micros.

/// Candidate budget after one `increase_percent` step, clamped to `cap_micros`.
///
/// The percent is used as given; only the raised amount is rounded, to the
/// nearest micro.
pub fn candidate_budget(current_micros: i64, increase_percent: f64, cap_micros: i64) -> i64 {
    let raised = (current_micros as f64 * (100.0 + increase_percent) / 100.0).round() as i64;
    raised.min(cap_micros)
}
