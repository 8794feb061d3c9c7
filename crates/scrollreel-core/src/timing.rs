//! Pure interpolation helpers shared by tweens, triggers and smooth scroll

/// Linear interpolation between two values
///
/// # Arguments
/// * `from` - Start value
/// * `to` - End value
/// * `t` - Interpolation factor [0.0, 1.0]
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from * (1.0 - t) + to * t
}

/// Normalized position of `value` inside `[start, end]`, clamped to [0, 1]
///
/// A zero-length range is treated as a step: 0 before `start`, 1 from it on.
#[inline]
pub fn progress_in(value: f64, start: f64, end: f64) -> f64 {
    let span = end - start;
    if span <= 0.0 {
        return if value >= start { 1.0 } else { 0.0 };
    }
    ((value - start) / span).clamp(0.0, 1.0)
}

/// Frame-rate independent exponential approach of `current` toward `target`
///
/// `lambda` is the per-second rate; `dt` is the elapsed time in seconds.
#[inline]
pub fn damp(current: f64, target: f64, lambda: f64, dt: f64) -> f64 {
    lerp(current, target, 1.0 - (-lambda * dt).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp() {
        assert!((lerp(0.0, 100.0, 0.0) - 0.0).abs() < 0.001);
        assert!((lerp(0.0, 100.0, 0.5) - 50.0).abs() < 0.001);
        assert!((lerp(0.0, 100.0, 1.0) - 100.0).abs() < 0.001);
        assert!((lerp(400.0, 25.0, 1.0) - 25.0).abs() < 0.001);
    }

    #[test]
    fn test_progress_in_clamps() {
        assert_eq!(progress_in(-10.0, 0.0, 100.0), 0.0);
        assert_eq!(progress_in(50.0, 0.0, 100.0), 0.5);
        assert_eq!(progress_in(150.0, 0.0, 100.0), 1.0);
    }

    #[test]
    fn test_progress_in_zero_span() {
        assert_eq!(progress_in(9.0, 10.0, 10.0), 0.0);
        assert_eq!(progress_in(10.0, 10.0, 10.0), 1.0);
    }

    #[test]
    fn test_damp_approaches_target() {
        let mut x = 0.0;
        for _ in 0..600 {
            x = damp(x, 100.0, 6.0, 1.0 / 60.0);
        }
        assert!((x - 100.0).abs() < 0.01);
        assert!(damp(0.0, 100.0, 6.0, 0.0).abs() < 1e-12);
    }
}
