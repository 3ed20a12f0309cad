#![forbid(unsafe_code)]

//! Easing curves used by effect progress helpers.
//!
//! Every curve maps a progress value `t` (clamped to `[0, 1]`) to an output
//! that starts at `0` and ends at `1`. `Elastic`, `Back`, and `BackIn` may
//! overshoot in between.

use std::f32::consts::{PI, TAU};

/// A named interpolation curve.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Easing {
    /// `t`, constant velocity.
    #[default]
    Linear,
    /// Hermite smoothstep, `3t² - 2t³`.
    Smooth,

    // --- Sine ---
    /// Half-cosine S-curve.
    Sine,
    /// Quarter-sine, slow start.
    SineIn,
    /// Quarter-sine, slow end.
    SineOut,

    // --- Quadratic ---
    /// `t²`
    Pow2In,
    /// `1 - (1-t)²`
    Pow2Out,
    /// Quadratic S-curve.
    Pow2InOut,

    // --- Cubic ---
    /// `t³`
    Pow3In,
    /// `1 - (1-t)³`
    Pow3Out,

    // --- Playful ---
    /// Ball bounce at the end.
    Bounce,
    /// Spring with overshoot. **Can exceed 1.0.**
    Elastic,
    /// Overshoot then settle. **Can exceed 1.0.**
    Back,
    /// Wind up below zero then accelerate. **Can go below 0.0.**
    BackIn,

    /// Discrete steps. `Step(4)` outputs {0, 0.25, 0.5, 0.75, 1.0}.
    Step(u8),
}

impl Easing {
    /// Apply the curve to a progress value.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Smooth => t * t * (3.0 - 2.0 * t),

            Self::Sine => (1.0 - (t * PI).cos()) / 2.0,
            Self::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Self::SineOut => (t * PI / 2.0).sin(),

            Self::Pow2In => t * t,
            Self::Pow2Out => {
                let inv = 1.0 - t;
                1.0 - inv * inv
            }
            Self::Pow2InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    let inv = -2.0 * t + 2.0;
                    1.0 - inv * inv / 2.0
                }
            }

            Self::Pow3In => t * t * t,
            Self::Pow3Out => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }

            Self::Bounce => {
                let n1 = 7.5625;
                let d1 = 2.75;
                let mut t = t;
                if t < 1.0 / d1 {
                    n1 * t * t
                } else if t < 2.0 / d1 {
                    t -= 1.5 / d1;
                    n1 * t * t + 0.75
                } else if t < 2.5 / d1 {
                    t -= 2.25 / d1;
                    n1 * t * t + 0.9375
                } else {
                    t -= 2.625 / d1;
                    n1 * t * t + 0.984_375
                }
            }

            Self::Elastic => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    let c4 = TAU / 3.0;
                    2.0_f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
                }
            }

            Self::Back => {
                let c1 = 1.70158;
                let c3 = c1 + 1.0;
                let u = t - 1.0;
                1.0 + c3 * u * u * u + c1 * u * u
            }
            Self::BackIn => {
                let c1 = 1.70158;
                let c3 = c1 + 1.0;
                c3 * t * t * t - c1 * t * t
            }

            Self::Step(steps) => {
                if steps == 0 {
                    t
                } else {
                    let s = f32::from(steps);
                    (t * s).round() / s
                }
            }
        }
    }

    /// Interpolate between `from` and `to` along this curve.
    #[inline]
    pub fn interpolate(self, from: f32, to: f32, t: f32) -> f32 {
        from + (to - from) * self.apply(t)
    }

    /// Whether the curve can leave `[0, 1]`.
    pub fn can_overshoot(self) -> bool {
        matches!(self, Self::Elastic | Self::Back | Self::BackIn)
    }

    /// Look a curve up by name, case-insensitively. Used for effect
    /// parameters such as `{EASE=...;elastic}`.
    pub fn from_name(name: &str) -> Option<Self> {
        let curve = match name.trim().to_ascii_lowercase().as_str() {
            "linear" => Self::Linear,
            "smooth" | "smoothstep" => Self::Smooth,
            "sine" => Self::Sine,
            "sinein" => Self::SineIn,
            "sineout" => Self::SineOut,
            "pow2in" | "quadin" => Self::Pow2In,
            "pow2out" | "quadout" => Self::Pow2Out,
            "pow2" | "pow2inout" | "quad" => Self::Pow2InOut,
            "pow3in" | "cubicin" => Self::Pow3In,
            "pow3out" | "cubicout" => Self::Pow3Out,
            "bounce" | "bounceout" => Self::Bounce,
            "elastic" | "elasticout" => Self::Elastic,
            "back" | "swing" | "swingout" => Self::Back,
            "backin" | "swingin" => Self::BackIn,
            _ => return None,
        };
        Some(curve)
    }
}

/// Linear interpolation.
#[inline]
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 15] = [
        Easing::Linear,
        Easing::Smooth,
        Easing::Sine,
        Easing::SineIn,
        Easing::SineOut,
        Easing::Pow2In,
        Easing::Pow2Out,
        Easing::Pow2InOut,
        Easing::Pow3In,
        Easing::Pow3Out,
        Easing::Bounce,
        Easing::Elastic,
        Easing::Back,
        Easing::BackIn,
        Easing::Step(4),
    ];

    #[test]
    fn curves_hit_endpoints() {
        for curve in ALL {
            assert!(curve.apply(0.0).abs() < 1e-4, "{curve:?} at 0");
            assert!((curve.apply(1.0) - 1.0).abs() < 1e-4, "{curve:?} at 1");
        }
    }

    #[test]
    fn input_is_clamped() {
        assert_eq!(Easing::Linear.apply(-3.0), 0.0);
        assert_eq!(Easing::Linear.apply(7.0), 1.0);
    }

    #[test]
    fn monotone_curves_stay_in_range() {
        for curve in ALL.iter().filter(|c| !c.can_overshoot()) {
            for i in 0..=100 {
                let v = curve.apply(i as f32 / 100.0);
                assert!((-1e-4..=1.0 + 1e-4).contains(&v), "{curve:?} -> {v}");
            }
        }
    }

    #[test]
    fn back_overshoots() {
        let peak = (1..100)
            .map(|i| Easing::Back.apply(i as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0);
        assert!(Easing::BackIn.apply(0.2) < 0.0);
    }

    #[test]
    fn step_quantizes() {
        assert_eq!(Easing::Step(4).apply(0.3), 0.25);
        assert_eq!(Easing::Step(0).apply(0.3), 0.3);
    }

    #[test]
    fn names_resolve_case_insensitively() {
        assert_eq!(Easing::from_name("Elastic"), Some(Easing::Elastic));
        assert_eq!(Easing::from_name(" BOUNCE "), Some(Easing::Bounce));
        assert_eq!(Easing::from_name("wobble"), None);
    }

    #[test]
    fn interpolate_scales_output() {
        assert_eq!(Easing::Linear.interpolate(2.0, 4.0, 0.5), 3.0);
        assert_eq!(lerp(-1.0, 1.0, 0.25), -0.5);
    }
}
