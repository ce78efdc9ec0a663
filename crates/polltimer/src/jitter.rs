use std::time::Duration;

use rand::Rng;

pub const DEFAULT_JITTER_FACTOR: f64 = 0.1;

/// Normalizes a jitter factor into `[0.0, 1.0]`. NaN is treated as full jitter.
pub fn clamp_jitter_factor(factor: f64) -> f64 {
    if factor.is_nan() {
        return 1.0;
    }
    factor.clamp(0.0, 1.0)
}

/// Spreads `base` uniformly over `[base * (1 - factor), base * (1 + factor))`,
/// floored at zero.
///
/// Draws exactly one value from `rng` when the clamped factor is positive and
/// none otherwise, so a zero factor returns `base` untouched.
pub fn apply_jitter<R: Rng + ?Sized>(base: Duration, factor: f64, rng: &mut R) -> Duration {
    let factor = clamp_jitter_factor(factor);
    if factor == 0.0 {
        return base;
    }

    let base_secs = base.as_secs_f64();
    let unit: f64 = rng.gen();
    let jitter = base_secs * factor * (2.0 * unit - 1.0);
    let candidate = (base_secs + jitter).max(0.0);
    Duration::try_from_secs_f64(candidate).unwrap_or(Duration::MAX)
}
