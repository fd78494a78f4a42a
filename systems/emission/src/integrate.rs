//! Trapezoidal integration over rate curves.

use surge_core::Curve;

/// Signed area of the single trapezoid spanning `[t1, t2]`.
///
/// Exact when the curve is linear across the interval; an approximation
/// otherwise. A reversed interval yields a negative width and therefore a
/// negative area.
#[must_use]
pub fn trapezoid_area(curve: &Curve, t1: f64, t2: f64) -> f64 {
    (curve.sample(t1) + curve.sample(t2)) * 0.5 * (t2 - t1)
}

/// Total area of `[start, end]` accumulated from trapezoids of width
/// `segment_width / time_scale`.
///
/// The division rescales the configured width from real-time units into the
/// curve's own time axis. Boundaries advance iteratively and the final one
/// clamps to `end`, so the last trapezoid narrows rather than extrapolating
/// past the interval. Returns 0 when `start >= end`. Smaller widths raise
/// accuracy at linear cost in trapezoid count.
#[must_use]
pub fn segmented_area(
    curve: &Curve,
    start: f64,
    end: f64,
    segment_width: f64,
    time_scale: f64,
) -> f64 {
    if start >= end {
        return 0.0;
    }

    let step = segment_width / time_scale;
    let mut total = 0.0;
    let mut left = start;
    while left < end {
        let right = (left + step).min(end);
        if right <= left {
            break;
        }
        total += trapezoid_area(curve, left, right);
        left = right;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::{segmented_area, trapezoid_area};
    use surge_core::{Curve, Interpolation, Keyframe};

    fn ramp() -> Curve {
        let keyframes = vec![Keyframe::new(0.0, 0.0), Keyframe::new(1.0, 1.0)];
        Curve::new(keyframes, Interpolation::Linear).expect("valid curve")
    }

    fn constant(value: f64) -> Curve {
        let keyframes = vec![Keyframe::new(0.0, value), Keyframe::new(1.0, value)];
        Curve::new(keyframes, Interpolation::Linear).expect("valid curve")
    }

    #[test]
    fn zero_width_trapezoid_has_zero_area() {
        let curve = ramp();
        assert_eq!(trapezoid_area(&curve, 0.3, 0.3), 0.0);
    }

    #[test]
    fn reversed_interval_yields_negative_area() {
        let curve = constant(2.0);
        assert!((trapezoid_area(&curve, 0.5, 0.0) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn segmented_area_converges_on_the_analytic_integral() {
        let curve = ramp();
        let area = segmented_area(&curve, 0.0, 1.0, 0.01, 1.0);
        assert!(
            (area - 0.5).abs() < 1e-4,
            "expected area near 0.5, got {area}"
        );
    }

    #[test]
    fn degenerate_interval_contributes_nothing() {
        let curve = ramp();
        assert_eq!(segmented_area(&curve, 0.7, 0.7, 0.01, 1.0), 0.0);
        assert_eq!(segmented_area(&curve, 0.9, 0.1, 0.01, 1.0), 0.0);
    }

    #[test]
    fn final_partial_trapezoid_clamps_to_the_interval_end() {
        let curve = constant(1.0);
        let area = segmented_area(&curve, 0.0, 0.35, 0.1, 1.0);
        assert!(
            (area - 0.35).abs() < 1e-12,
            "expected exact coverage, got {area}"
        );
    }

    #[test]
    fn split_integration_matches_the_single_pass() {
        let keyframes = vec![
            Keyframe::new(0.0, 0.5),
            Keyframe::new(0.4, 2.0),
            Keyframe::new(1.0, 1.0),
        ];
        let curve = Curve::new(keyframes, Interpolation::SmoothStep).expect("valid curve");

        let whole = segmented_area(&curve, 0.0, 1.0, 0.01, 1.0);
        let mid = 0.37;
        let split = segmented_area(&curve, 0.0, mid, 0.01, 1.0)
            + segmented_area(&curve, mid, 1.0, 0.01, 1.0);
        assert!(
            (whole - split).abs() < 1e-3,
            "split integration diverged: {whole} vs {split}"
        );
    }

    #[test]
    fn time_scale_rescales_the_segment_width() {
        let curve = ramp();
        let fine = segmented_area(&curve, 0.0, 1.0, 0.01, 1.0);
        let rescaled = segmented_area(&curve, 0.0, 1.0, 0.1, 10.0);
        assert!((fine - rescaled).abs() < 1e-12);
    }
}
