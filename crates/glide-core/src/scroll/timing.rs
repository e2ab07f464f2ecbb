//! Interpolation helpers for the scroll position and tween sampling

/// Linear interpolation between two values
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// One first-order smoothing step: cover `factor` of the remaining distance
#[inline]
pub fn approach(current: f64, target: f64, factor: f64) -> f64 {
    current + (target - current) * factor
}

/// Whether two positions are closer than `epsilon`
#[inline]
pub fn is_converged(current: f64, target: f64, epsilon: f64) -> bool {
    (current - target).abs() < epsilon
}

/// Position of `value` inside `[from, to]` as a fraction clamped to [0, 1]
///
/// An empty interval reports 1.0 once `value` reaches it.
#[inline]
pub fn fraction(value: f64, from: f64, to: f64) -> f64 {
    let span = to - from;
    if span <= 0.0 {
        return if value >= from { 1.0 } else { 0.0 };
    }
    ((value - from) / span).clamp(0.0, 1.0)
}

/// Tween progress after `elapsed` seconds of a `duration`-second tween
#[inline]
pub fn progress(elapsed: f64, duration: f64) -> f64 {
    if duration <= 0.0 {
        return 1.0;
    }
    (elapsed / duration).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp() {
        assert!((lerp(0.0, 100.0, 0.0) - 0.0).abs() < 0.001);
        assert!((lerp(0.0, 100.0, 0.5) - 50.0).abs() < 0.001);
        assert!((lerp(0.0, 100.0, 1.0) - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_approach_covers_factor_of_distance() {
        assert!((approach(0.0, 100.0, 0.1) - 10.0).abs() < 1e-9);
        assert!((approach(100.0, 0.0, 0.5) - 50.0).abs() < 1e-9);
        assert_eq!(approach(3.0, 7.0, 1.0), 7.0);
    }

    #[test]
    fn test_is_converged() {
        assert!(is_converged(10.05, 10.0, 0.1));
        assert!(!is_converged(10.1, 10.0, 0.1));
    }

    #[test]
    fn test_fraction() {
        assert_eq!(fraction(50.0, 0.0, 100.0), 0.5);
        assert_eq!(fraction(-5.0, 0.0, 100.0), 0.0);
        assert_eq!(fraction(500.0, 0.0, 100.0), 1.0);
        assert_eq!(fraction(10.0, 10.0, 10.0), 1.0);
    }

    #[test]
    fn test_progress_zero_duration() {
        assert!((progress(0.0, 0.0) - 1.0).abs() < 0.001);
        assert!((progress(0.2, 0.4) - 0.5).abs() < 0.001);
    }
}
