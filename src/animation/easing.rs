/// Easing curves used by the node state machine and overlays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EasingType {
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseOutCubic,
    EaseInOutCubic,
    Smooth,
}

impl EasingType {
    /// Apply easing function to a normalized time value (0.0 to 1.0)
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingType::Linear => t,
            EasingType::EaseInQuad => t * t,
            EasingType::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            EasingType::EaseOutCubic => {
                let t = t - 1.0;
                t * t * t + 1.0
            }
            EasingType::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            // 3t^2 - 2t^3
            EasingType::Smooth => t * t * (3.0 - 2.0 * t),
        }
    }
}

pub fn ease_out_quad(t: f64) -> f64 {
    EasingType::EaseOutQuad.apply(t)
}

pub fn ease_out_cubic(t: f64) -> f64 {
    EasingType::EaseOutCubic.apply(t)
}

/// `(1 - t)^exponent` with `t` clamped to `[0, 1]`
pub fn decay(t: f64, exponent: f64) -> f64 {
    (1.0 - t.clamp(0.0, 1.0)).powf(exponent)
}

pub fn lerp(start: f64, end: f64, t: f64) -> f64 {
    start + (end - start) * t
}

/// Ratio of `elapsed` over `duration`, clamped to `[0, 1]`. A zero duration
/// counts as already complete.
pub fn progress(elapsed: f64, duration: f64) -> f64 {
    if duration <= 0.0 {
        1.0
    } else {
        (elapsed / duration).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        for easing in [
            EasingType::Linear,
            EasingType::EaseInQuad,
            EasingType::EaseOutQuad,
            EasingType::EaseOutCubic,
            EasingType::EaseInOutCubic,
            EasingType::Smooth,
        ] {
            assert!(easing.apply(0.0).abs() < 1e-12, "{easing:?}");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-12, "{easing:?}");
            assert_eq!(easing.apply(-3.0), easing.apply(0.0));
            assert_eq!(easing.apply(7.0), easing.apply(1.0));
        }
    }

    #[test]
    fn test_ease_out_is_front_loaded() {
        assert_eq!(ease_out_quad(0.5), 0.75);
        assert_eq!(ease_out_cubic(0.5), 0.875);
        assert!(EasingType::EaseInQuad.apply(0.5) < 0.5);
    }

    #[test]
    fn test_decay() {
        assert_eq!(decay(0.0, 2.0), 1.0);
        assert_eq!(decay(0.5, 2.0), 0.25);
        assert_eq!(decay(1.5, 2.0), 0.0);
    }

    #[test]
    fn test_progress() {
        assert_eq!(progress(1.0, 4.0), 0.25);
        assert_eq!(progress(9.0, 4.0), 1.0);
        assert_eq!(progress(1.0, 0.0), 1.0);
        assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
    }
}
