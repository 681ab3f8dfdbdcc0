//! Monetary amounts are carried as integer micros (1 unit = 1_000_000).

pub const MICROS_PER_UNIT: i64 = 1_000_000;

/// Convert a currency amount to micros, rounding to the nearest micro.
pub fn to_micros(amount: f64) -> i64 {
    (amount * MICROS_PER_UNIT as f64).round() as i64
}

/// Convert micros back to a currency amount for display and ratios.
pub fn from_micros(micros: i64) -> f64 {
    micros as f64 / MICROS_PER_UNIT as f64
}

/// Render micros as `$1234.56`.
pub fn format_money(micros: i64) -> String {
    format!("${:.2}", from_micros(micros))
}
